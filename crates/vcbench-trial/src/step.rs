use anyhow::Result;

use vcbench_core::{timed, StepResult};
use vcbench_vcs::VcsRepo;

/// Runs one commit-like operation under the full verification stack:
/// repository verifier outermost, commit verifier inside it, raw command
/// outcome and wall clock innermost. Fills all three slots of `step` and
/// the `seconds` slot regardless of how the operation exits.
///
/// `Ok(None)` means the step failed but was confirmed harmless; check
/// [`StepResult::acceptable`] before running the next risky step.
pub fn run_commit_step<T>(
    vcs: &dyn VcsRepo,
    must_contain: Option<&str>,
    seconds: &mut f64,
    step: &mut StepResult,
    op: impl FnOnce() -> Result<T>,
) -> Result<Option<T>> {
    let StepResult { cmd, effect, repo } = step;
    crate::verify_repo(vcs, repo, || {
        crate::verify_commit(vcs, must_contain, effect, || {
            crate::record_cmd(cmd, || timed(seconds, op))
        })
    })
}

/// Like [`run_commit_step`] but without the commit verifier, for operations
/// that move no head (garbage collection). The `effect` slot stays as it
/// was.
pub fn run_repo_step<T>(
    vcs: &dyn VcsRepo,
    seconds: &mut f64,
    step: &mut StepResult,
    op: impl FnOnce() -> Result<T>,
) -> Result<Option<T>> {
    let StepResult { cmd, effect: _, repo } = step;
    crate::verify_repo(vcs, repo, || crate::record_cmd(cmd, || timed(seconds, op)))
}
