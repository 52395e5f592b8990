//! Shared adapter contract suite. Intentionally small; every concrete
//! adapter's tests run these same checks against a real repository so the
//! trial machinery can rely on identical observation-point semantics
//! across backends.

use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, ensure, Result};

use vcbench_gen::{create_file, DataGen};

use crate::types::VcsRepo;

/// Whether an external program is on PATH and answers `--version`.
/// Adapter tests skip (with a stderr note) when the tool is missing.
pub fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Core contract: init, commit, observation points, idempotence.
pub fn run_repo_contract_suite(repo: &dyn VcsRepo, workdir: &Path) -> Result<()> {
    repo.init()?;
    ensure!(
        repo.last_commit_id()?.is_none(),
        "fresh repository must have no commits"
    );

    create_file(workdir, "test_file", 10, DataGen::Random, true)?;
    repo.start_tracking("test_file")?;
    repo.commit("test_file")?;

    let commit_id = repo
        .last_commit_id()?
        .ok_or_else(|| anyhow!("commit must produce a head id"))?;
    let commit_id = commit_id.as_str();

    ensure!(repo.is_file_in_commit(commit_id, "test_file")?);
    ensure!(!repo.is_file_in_commit(commit_id, "test_fil")?);
    ensure!(!repo.is_file_in_commit(commit_id, "est_file")?);
    ensure!(
        !repo.is_file_in_commit("no_such_commit_id", "test_file")?,
        "unknown commit ids must read as absent, not as errors"
    );

    // Same question twice, no intervening mutation, same answer.
    let first = repo.is_file_in_commit(commit_id, "test_file")?;
    let second = repo.is_file_in_commit(commit_id, "test_file")?;
    ensure!(first == second);

    repo.status("test_file")?;
    repo.garbage_collect()?;
    ensure!(repo.total_size_bytes()? > 0);
    ensure!(repo.check_integrity()?, "fresh repository must pass integrity check");
    Ok(())
}

/// Corruption contract: a deliberately damaged store must be detected.
pub fn run_corruption_suite(repo: &dyn VcsRepo, workdir: &Path) -> Result<()> {
    repo.init()?;
    create_file(workdir, "test_file", 10, DataGen::Random, true)?;
    repo.start_tracking("test_file")?;
    repo.commit("test_file")?;

    ensure!(repo.check_integrity()?);
    repo.corrupt()?;
    ensure!(!repo.check_integrity()?, "corrupted repository must fail integrity check");
    Ok(())
}
