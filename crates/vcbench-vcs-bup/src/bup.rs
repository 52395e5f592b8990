use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use vcbench_core::{check_output, is_command_failure, logcall};
use vcbench_gen::make_small_edit;
use vcbench_vcs::{CommitId, VcsKind, VcsRepo};

const BRANCH: &str = "test_run";

/// Bup adapter. The backing store is a bare git repository under
/// `<workdir>/.bup`, addressed through a per-invocation `BUP_DIR` /
/// `GIT_DIR` environment overlay rather than any global state; the
/// observation points (head id, tree listing, fsck) go straight to git
/// against that store.
#[derive(Clone, Debug)]
pub struct BupRepo {
    workdir: PathBuf,
    repodir: PathBuf,
}

impl BupRepo {
    pub fn new(workdir: PathBuf) -> Self {
        let repodir = workdir.join(".bup");
        Self { workdir, repodir }
    }

    fn env(&self) -> Vec<(&'static str, String)> {
        let repodir = self.repodir.display().to_string();
        vec![("BUP_DIR", repodir.clone()), ("GIT_DIR", repodir)]
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        logcall(&self.workdir, program, args, &self.env())
    }

    fn output(&self, program: &str, args: &[&str]) -> Result<String> {
        check_output(&self.workdir, program, args, &self.env())
    }
}

impl VcsRepo for BupRepo {
    fn kind(&self) -> VcsKind {
        VcsKind::Bup
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tool_version(&self) -> Result<String> {
        self.output("bup", &["--version"])
    }

    fn init(&self) -> Result<()> {
        self.run("bup", &["init"])
    }

    fn start_tracking(&self, _path: &str) -> Result<()> {
        // bup index runs as part of commit
        Ok(())
    }

    fn commit(&self, path: &str) -> Result<()> {
        self.run("bup", &["index", path])?;
        self.run("bup", &["save", "-n", BRANCH, path])?;
        tracing::info!("Commit finished");
        Ok(())
    }

    fn status(&self, path: &str) -> Result<()> {
        self.run("bup", &["index", path])?;
        self.run("bup", &["index", "--status", path])
    }

    fn garbage_collect(&self) -> Result<()> {
        tracing::info!("Bup has no garbage collection");
        Ok(())
    }

    fn last_commit_id(&self) -> Result<Option<CommitId>> {
        match self.output("git", &["rev-parse", BRANCH]) {
            Ok(id) => Ok(Some(id)),
            Err(err) if is_command_failure(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn is_file_in_commit(&self, commit_id: &str, name: &str) -> Result<bool> {
        // Save trees nest the path under the branch directory, so match on
        // the trailing path segment rather than the whole path.
        match self.output("git", &["ls-tree", "-r", commit_id]) {
            Ok(listing) => {
                let suffix = format!("/{}", name);
                Ok(listing
                    .lines()
                    .filter_map(|line| line.split_once('\t'))
                    .any(|(_, path)| path.ends_with(&suffix)))
            }
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn check_integrity(&self) -> Result<bool> {
        match self.run("git", &["fsck"]) {
            Ok(()) => Ok(true),
            Err(err) if is_command_failure(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn corrupt(&self) -> Result<()> {
        let listing = self.output("find", &[".bup/objects", "-name", "*.pack"])?;
        let internal_file = listing
            .lines()
            .next()
            .ok_or_else(|| anyhow!("no pack files to corrupt"))?;
        make_small_edit(&self.workdir, internal_file, true)
    }
}
