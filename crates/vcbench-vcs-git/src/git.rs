use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use vcbench_core::{check_output, is_command_failure, logcall};
use vcbench_gen::make_small_edit;
use vcbench_vcs::{CommitId, VcsKind, VcsRepo};

#[derive(Clone, Debug)]
pub struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        logcall(&self.workdir, "git", args, &[])
    }

    fn output(&self, args: &[&str]) -> Result<String> {
        check_output(&self.workdir, "git", args, &[])
    }
}

impl VcsRepo for GitRepo {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tool_version(&self) -> Result<String> {
        self.output(&["--version"])
    }

    fn init(&self) -> Result<()> {
        self.run(&["init"])?;
        // Throwaway repos must not depend on the user's global identity.
        self.run(&["config", "user.email", "vcbench@example.com"])?;
        self.run(&["config", "user.name", "vcbench"])?;
        Ok(())
    }

    fn start_tracking(&self, _path: &str) -> Result<()> {
        // git stages at commit time
        Ok(())
    }

    fn commit(&self, path: &str) -> Result<()> {
        self.run(&["add", path])?;
        self.run(&["commit", "-m", &format!("Add {}", path)])?;
        tracing::info!("Commit finished");
        Ok(())
    }

    fn status(&self, path: &str) -> Result<()> {
        self.run(&["status", path])
    }

    fn garbage_collect(&self) -> Result<()> {
        self.run(&["gc"])
    }

    fn last_commit_id(&self) -> Result<Option<CommitId>> {
        match self.output(&["rev-parse", "HEAD"]) {
            Ok(id) => Ok(Some(id)),
            Err(err) if is_command_failure(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn is_file_in_commit(&self, commit_id: &str, name: &str) -> Result<bool> {
        // Top-level names only; tree listings put the full path after a tab.
        match self.output(&["ls-tree", "-r", commit_id]) {
            Ok(listing) => Ok(listing
                .lines()
                .filter_map(|line| line.split_once('\t'))
                .any(|(_, path)| path == name)),
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn check_integrity(&self) -> Result<bool> {
        match self.run(&["fsck"]) {
            Ok(()) => Ok(true),
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn corrupt(&self) -> Result<()> {
        let listing = check_output(&self.workdir, "find", &[".git/objects", "-type", "f"], &[])?;
        let internal_file = listing
            .lines()
            .next()
            .ok_or_else(|| anyhow!("no object files to corrupt"))?;
        make_writable(&self.workdir.join(internal_file))?;
        make_small_edit(&self.workdir, internal_file, true)
    }
}

/// Loose object files are read-only; restore the owner write bit before
/// scribbling on one.
fn make_writable(path: &Path) -> Result<()> {
    let mut perms = std::fs::metadata(path)?.permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(perms.mode() | 0o200);
    }
    std::fs::set_permissions(path, perms)?;
    Ok(())
}
