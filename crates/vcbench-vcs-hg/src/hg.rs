use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use vcbench_core::{check_output, is_command_failure, logcall};
use vcbench_gen::make_small_edit;
use vcbench_vcs::{CommitId, VcsKind, VcsRepo};

/// Mercurial adapter. Unlike git, paths must be `hg add`ed before their
/// first commit, and there is no garbage collector.
#[derive(Clone, Debug)]
pub struct HgRepo {
    workdir: PathBuf,
}

impl HgRepo {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        logcall(&self.workdir, "hg", args, &[])
    }

    fn output(&self, args: &[&str]) -> Result<String> {
        check_output(&self.workdir, "hg", args, &[])
    }
}

impl VcsRepo for HgRepo {
    fn kind(&self) -> VcsKind {
        VcsKind::Hg
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tool_version(&self) -> Result<String> {
        let out = self.output(&["version"])?;
        Ok(out.lines().next().unwrap_or_default().to_string())
    }

    fn init(&self) -> Result<()> {
        self.run(&["init"])
    }

    fn start_tracking(&self, path: &str) -> Result<()> {
        self.run(&["add", path])?;
        tracing::info!("Tracking test file {}", path);
        Ok(())
    }

    fn commit(&self, path: &str) -> Result<()> {
        self.run(&["commit", "-m", &format!("Add {}", path)])?;
        tracing::info!("Commit finished");
        Ok(())
    }

    fn status(&self, path: &str) -> Result<()> {
        self.run(&["status", path])
    }

    fn garbage_collect(&self) -> Result<()> {
        tracing::info!("HG has no garbage collection");
        Ok(())
    }

    fn last_commit_id(&self) -> Result<Option<CommitId>> {
        let revid = self.output(&["id", "-i"])?;
        // The null revision reads as all zeroes, with a trailing '+' when
        // the working tree is dirty.
        if revid == "000000000000" || revid == "000000000000+" {
            Ok(None)
        } else {
            Ok(Some(revid))
        }
    }

    fn is_file_in_commit(&self, commit_id: &str, name: &str) -> Result<bool> {
        match self.output(&["manifest", "-r", commit_id]) {
            Ok(listing) => Ok(listing.lines().any(|line| line == name)),
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn check_integrity(&self) -> Result<bool> {
        match self.run(&["verify"]) {
            Ok(()) => Ok(true),
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn corrupt(&self) -> Result<()> {
        let listing = check_output(&self.workdir, "find", &[".hg/store/data", "-type", "f"], &[])?;
        let internal_file = listing
            .lines()
            .next()
            .ok_or_else(|| anyhow!("no store files to corrupt"))?;
        make_small_edit(&self.workdir, internal_file, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vcbench_vcs::contract::{run_corruption_suite, run_repo_contract_suite, tool_available};

    #[test]
    fn hg_adapter_contract() {
        if !tool_available("hg") {
            eprintln!("hg not available; skipping");
            return;
        }
        let dir = tempdir().unwrap();
        let repo = HgRepo::new(dir.path().to_path_buf());
        run_repo_contract_suite(&repo, dir.path()).unwrap();
    }

    #[test]
    fn hg_adapter_detects_corruption() {
        if !tool_available("hg") {
            eprintln!("hg not available; skipping");
            return;
        }
        let dir = tempdir().unwrap();
        let repo = HgRepo::new(dir.path().to_path_buf());
        run_corruption_suite(&repo, dir.path()).unwrap();
    }
}
