use anyhow::Result;

use vcbench_core::{
    comment, CmdOutcome, CommitFailedButVerified, CommitFalsePositive, CorruptRepo,
    VerificationOutcome,
};
use vcbench_vcs::VcsRepo;

/// Runs `op` and records whether it succeeded. The result itself passes
/// through untouched; this only fills the outcome slot.
pub fn record_cmd<T>(slot: &mut CmdOutcome, op: impl FnOnce() -> Result<T>) -> Result<T> {
    let outcome = op();
    *slot = match outcome {
        Ok(_) => CmdOutcome::Ok,
        Err(_) => CmdOutcome::Failed,
    };
    outcome
}

/// Commit-effect classification, computed after the wrapped operation has
/// finished. Consults only the adapter's observation points.
fn classify_commit(
    repo: &dyn VcsRepo,
    before: &Option<String>,
    must_contain: Option<&str>,
) -> (VerificationOutcome, String) {
    let after = match repo.last_commit_id() {
        Ok(id) => id,
        Err(err) => {
            comment(format!("Could not verify commit: {:#}", err));
            return (VerificationOutcome::VerificationError, String::new());
        }
    };
    if after == *before {
        let reason = format!(
            "No new commit recorded. Latest commit id same as before: {:?}",
            after
        );
        return (VerificationOutcome::Bad, reason);
    }
    if let Some(name) = must_contain {
        let id = match after.as_deref() {
            Some(id) => id,
            None => {
                let reason =
                    format!("No commit id to check for expected file '{}'", name);
                return (VerificationOutcome::Bad, reason);
            }
        };
        match repo.is_file_in_commit(id, name) {
            Ok(true) => {}
            Ok(false) => {
                let reason = format!(
                    "Commit '{}' was created, but does not contain expected file '{}'",
                    id, name
                );
                return (VerificationOutcome::Bad, reason);
            }
            Err(err) => {
                comment(format!("Could not verify commit: {:#}", err));
                return (VerificationOutcome::VerificationError, String::new());
            }
        }
    }
    (VerificationOutcome::Verified, String::new())
}

/// Wraps a commit-like operation, corroborating its claimed result against
/// the repository head (and, when `must_contain` is given, the presence of
/// that file in the new commit).
///
/// Reconciliation after classification:
/// - operation failed, effect `Verified`: the error is replaced by
///   [`CommitFailedButVerified`] so outer scopes know the exit code lied in
///   the harmless direction. Git does this when committing a file larger
///   than available memory.
/// - operation succeeded, effect `Bad`: [`CommitFalsePositive`] is raised;
///   the tool's success claim is falsified.
/// - anything else passes through unchanged, with the slot telling the rest
///   of the story.
pub fn verify_commit<T>(
    repo: &dyn VcsRepo,
    must_contain: Option<&str>,
    slot: &mut VerificationOutcome,
    op: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let before = repo.last_commit_id()?;
    let outcome = op();

    let (verdict, reason) = classify_commit(repo, &before, must_contain);
    *slot = verdict;

    match outcome {
        Err(original) if verdict == VerificationOutcome::Verified => {
            Err(CommitFailedButVerified { original }.into())
        }
        Ok(_) if verdict == VerificationOutcome::Bad => {
            Err(CommitFalsePositive { reason }.into())
        }
        other => other,
    }
}

/// Wraps an operation with whole-repository integrity verification. The
/// happy path records `AssumedOk` without running the (expensive) integrity
/// scan; only a failure triggers it.
///
/// Returns `Ok(None)` when an inner [`CommitFailedButVerified`] arrives and
/// the store checks out sound: the step is suppressed and the trial may
/// continue. The same inner error over a broken store escalates to
/// [`CorruptRepo`]. Every other error, including [`CommitFalsePositive`],
/// propagates unchanged: commit-level falsified evidence already names the
/// problem more precisely than an integrity verdict could.
pub fn verify_repo<T>(
    repo: &dyn VcsRepo,
    slot: &mut VerificationOutcome,
    op: impl FnOnce() -> Result<T>,
) -> Result<Option<T>> {
    match op() {
        Ok(v) => {
            *slot = VerificationOutcome::AssumedOk;
            Ok(Some(v))
        }
        Err(err) => {
            *slot = match repo.check_integrity() {
                Ok(true) => VerificationOutcome::Verified,
                Ok(false) => VerificationOutcome::Bad,
                Err(verr) => {
                    comment(format!("Could not verify repo: {:#}", verr));
                    VerificationOutcome::VerificationError
                }
            };
            match err.downcast::<CommitFailedButVerified>() {
                Ok(fbv) => match *slot {
                    VerificationOutcome::Verified => {
                        comment(format!(
                            "Commit error, however commit seems ok and repo intact. Original error: {:#}",
                            fbv.original
                        ));
                        Ok(None)
                    }
                    VerificationOutcome::Bad => Err(CorruptRepo {
                        original: fbv.original,
                    }
                    .into()),
                    _ => Err(fbv.into()),
                },
                Err(err) => Err(err),
            }
        }
    }
}
