use thiserror::Error;

/// Nonzero exit from a shelled-out command. Exit code is `-1` when the
/// process was killed by a signal.
#[derive(Debug, Error)]
#[error("command failed (exit code {exit_code}): {command}")]
pub struct CommandFailed {
    pub command: String,
    pub exit_code: i32,
}

/// The tool claimed success, but the repository shows no matching effect.
#[derive(Debug, Error)]
#[error("commit reported success but verification failed: {reason}")]
pub struct CommitFalsePositive {
    pub reason: String,
}

/// Not a failure: the tool reported failure, but the commit is
/// independently confirmed. Replaces the raw error so outer scopes know
/// not to trust the exit code here. Carries the original error.
///
/// Git exhibits this when committing a file larger than available memory:
/// the wrapping process dies with a nonzero exit while the storage layer
/// has already completed the commit.
#[derive(Debug, Error)]
#[error("commit command failed but the commit was verified; original error: {original}")]
pub struct CommitFailedButVerified {
    pub original: anyhow::Error,
}

/// The genuinely bad case: the tool failed, the commit landed anyway, and
/// the store is now unsound. Must stop the trial.
#[derive(Debug, Error)]
#[error("commit command failed, commit written, repository corrupt; original commit error: {original}")]
pub struct CorruptRepo {
    pub original: anyhow::Error,
}
