use std::cell::Cell;

use anyhow::{anyhow, Result};

use vcbench_core::{
    CmdOutcome, CommitFailedButVerified, CommitFalsePositive, CorruptRepo, StepResult,
    VerificationOutcome,
};
use vcbench_trial::{record_cmd, run_commit_step, verify_commit, verify_repo};
use vcbench_vcs::scripted::{Script, ScriptedRepo};
use vcbench_vcs::VcsRepo;

fn head(id: &str) -> Script<Option<String>> {
    Script::Value(Some(id.to_string()))
}

fn no_head() -> Script<Option<String>> {
    Script::Value(None)
}

#[test]
fn record_cmd_marks_success_and_failure() {
    let mut slot = CmdOutcome::default();
    let v = record_cmd(&mut slot, || Ok::<_, anyhow::Error>(7)).unwrap();
    assert_eq!(v, 7);
    assert_eq!(slot, CmdOutcome::Ok);

    let err = record_cmd(&mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(slot, CmdOutcome::Failed);
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn commit_ok_is_verified() {
    let repo = ScriptedRepo::new().heads(vec![no_head(), head("12345")]);
    let mut slot = VerificationOutcome::default();
    verify_commit(&repo, None, &mut slot, || Ok(())).unwrap();
    assert_eq!(slot, VerificationOutcome::Verified);
}

#[test]
fn commit_claims_success_but_head_unmoved() {
    let repo = ScriptedRepo::new().heads(vec![no_head()]);
    let mut slot = VerificationOutcome::default();
    let err = verify_commit(&repo, None, &mut slot, || Ok(())).unwrap_err();
    assert!(err.is::<CommitFalsePositive>());
    assert_eq!(slot, VerificationOutcome::Bad);
}

#[test]
fn commit_failed_and_head_unmoved_keeps_original_error() {
    let repo = ScriptedRepo::new().heads(vec![head("12345")]);
    let mut slot = VerificationOutcome::default();
    let err = verify_commit(&repo, None, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert!(!err.is::<CommitFailedButVerified>());
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::Bad);
}

#[test]
fn commit_failed_but_head_moved_is_rescued() {
    let repo = ScriptedRepo::new().heads(vec![head("12345"), head("abcde")]);
    let mut slot = VerificationOutcome::default();
    let err = verify_commit(&repo, None, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert!(err.is::<CommitFailedButVerified>());
    assert_eq!(slot, VerificationOutcome::Verified);
}

#[test]
fn commit_failed_new_commit_missing_expected_file() {
    let repo = ScriptedRepo::new()
        .heads(vec![head("12345"), head("abcde")])
        .file_present(Script::Value(false));
    let mut slot = VerificationOutcome::default();
    let err =
        verify_commit(&repo, Some("f"), &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert!(!err.is::<CommitFailedButVerified>());
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::Bad);
}

#[test]
fn commit_failed_new_commit_has_expected_file() {
    let repo = ScriptedRepo::new()
        .heads(vec![head("12345"), head("abcde")])
        .file_present(Script::Value(true));
    let mut slot = VerificationOutcome::default();
    let err =
        verify_commit(&repo, Some("f"), &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert!(err.is::<CommitFailedButVerified>());
    assert_eq!(slot, VerificationOutcome::Verified);
}

#[test]
fn head_query_error_during_verification() {
    let repo = ScriptedRepo::new().heads(vec![head("12345"), Script::Fail]);
    let mut slot = VerificationOutcome::default();
    let err = verify_commit(&repo, None, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::VerificationError);
}

#[test]
fn file_query_error_during_verification() {
    let repo = ScriptedRepo::new()
        .heads(vec![head("12345"), head("abcde")])
        .file_present(Script::Fail);
    let mut slot = VerificationOutcome::default();
    let err =
        verify_commit(&repo, Some("f"), &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::VerificationError);
}

#[test]
fn head_query_error_before_the_operation_skips_it() {
    let repo = ScriptedRepo::new().heads(vec![Script::Fail]);
    let mut slot = VerificationOutcome::default();
    let ran = Cell::new(false);
    let result: Result<()> = verify_commit(&repo, None, &mut slot, || {
        ran.set(true);
        Ok(())
    });
    assert!(result.is_err());
    assert!(!ran.get());
    assert_eq!(slot, VerificationOutcome::NotVerified);
}

#[test]
fn repo_verifier_assumes_ok_on_success() {
    let repo = ScriptedRepo::new();
    let mut slot = VerificationOutcome::default();
    let v = verify_repo(&repo, &mut slot, || Ok(3)).unwrap();
    assert_eq!(v, Some(3));
    assert_eq!(slot, VerificationOutcome::AssumedOk);
}

#[test]
fn repo_verifier_scans_on_plain_failure() {
    let repo = ScriptedRepo::new().integrity(Script::Value(true));
    let mut slot = VerificationOutcome::default();
    let err = verify_repo(&repo, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::Verified);

    let repo = ScriptedRepo::new().integrity(Script::Value(false));
    let mut slot = VerificationOutcome::default();
    let err = verify_repo(&repo, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::Bad);

    let repo = ScriptedRepo::new().integrity(Script::Fail);
    let mut slot = VerificationOutcome::default();
    let err = verify_repo(&repo, &mut slot, || Err::<(), _>(anyhow!("boom"))).unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(slot, VerificationOutcome::VerificationError);
}

#[test]
fn failed_but_verified_with_sound_store_is_suppressed() {
    let repo = ScriptedRepo::new().integrity(Script::Value(true));
    let mut slot = VerificationOutcome::default();
    let v = verify_repo(&repo, &mut slot, || {
        Err::<(), _>(
            CommitFailedButVerified {
                original: anyhow!("boom"),
            }
            .into(),
        )
    })
    .unwrap();
    assert_eq!(v, None);
    assert_eq!(slot, VerificationOutcome::Verified);
}

#[test]
fn failed_but_verified_with_broken_store_is_corruption() {
    let repo = ScriptedRepo::new().integrity(Script::Value(false));
    let mut slot = VerificationOutcome::default();
    let err = verify_repo(&repo, &mut slot, || {
        Err::<(), _>(
            CommitFailedButVerified {
                original: anyhow!("boom"),
            }
            .into(),
        )
    })
    .unwrap_err();
    assert!(err.is::<CorruptRepo>());
    assert_eq!(slot, VerificationOutcome::Bad);
}

#[test]
fn false_positive_outranks_integrity_escalation() {
    // A falsified success claim from the commit verifier must reach the
    // caller as-is even when the store is also broken.
    let repo = ScriptedRepo::new()
        .heads(vec![no_head()])
        .integrity(Script::Value(false));
    let mut step = StepResult::default();
    let mut seconds = 0.0;
    let err = run_commit_step(&repo, None, &mut seconds, &mut step, || repo.commit("f"))
        .unwrap_err();
    assert!(err.is::<CommitFalsePositive>());
    assert_eq!(step.cmd, CmdOutcome::Ok);
    assert_eq!(step.effect, VerificationOutcome::Bad);
    assert_eq!(step.repo, VerificationOutcome::Bad);
    assert!(!step.acceptable());
}

#[test]
fn full_stack_happy_path() {
    let repo = ScriptedRepo::new().heads(vec![no_head(), head("abcde")]);
    let mut step = StepResult::default();
    let mut seconds = 0.0;
    let v = run_commit_step(&repo, None, &mut seconds, &mut step, || repo.commit("f")).unwrap();
    assert_eq!(v, Some(()));
    assert_eq!(step.cmd, CmdOutcome::Ok);
    assert_eq!(step.effect, VerificationOutcome::Verified);
    assert_eq!(step.repo, VerificationOutcome::AssumedOk);
    assert!(step.acceptable());
}

#[test]
fn full_stack_rescued_failure_is_still_acceptable() {
    let repo = ScriptedRepo::new()
        .heads(vec![no_head(), head("abcde")])
        .commit_outcome(Script::Fail)
        .integrity(Script::Value(true));
    let mut step = StepResult::default();
    let mut seconds = 0.0;
    let v = run_commit_step(&repo, None, &mut seconds, &mut step, || repo.commit("f")).unwrap();
    assert_eq!(v, None);
    assert_eq!(step.cmd, CmdOutcome::Failed);
    assert_eq!(step.effect, VerificationOutcome::Verified);
    assert_eq!(step.repo, VerificationOutcome::Verified);
    assert!(step.acceptable());
}
