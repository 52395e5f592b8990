use std::path::Path;

use anyhow::Result;

use vcbench_core::check_output;

pub type CommitId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Hg,
    Bup,
}

impl VcsKind {
    pub const ALL: [VcsKind; 3] = [VcsKind::Git, VcsKind::Hg, VcsKind::Bup];

    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Hg => "hg",
            VcsKind::Bup => "bup",
        }
    }
}

/// Uniform capability surface over one external version-control binary.
///
/// An adapter owns a working directory; each operation is one (or a
/// couple of) blocking command invocations classified by exit code. The
/// observation points (`last_commit_id`, `is_file_in_commit`,
/// `check_integrity`) exist so callers can corroborate an operation's
/// effect independently of the exit code it reported.
pub trait VcsRepo {
    fn kind(&self) -> VcsKind;
    fn workdir(&self) -> &Path;

    /// Version string of the external tool being driven.
    fn tool_version(&self) -> Result<String>;

    /// Creates a fresh repository in the working directory.
    fn init(&self) -> Result<()>;

    /// Explicit add-to-index step required by some backends before the
    /// first commit of a path. No-op where the backend stages implicitly.
    fn start_tracking(&self, path: &str) -> Result<()>;

    /// Stages (if needed) and commits the given path or subtree.
    fn commit(&self, path: &str) -> Result<()>;

    /// Triggers the working-tree diff computation. Output is discarded;
    /// only the cost matters.
    fn status(&self, path: &str) -> Result<()>;

    /// Backend compaction. Completes immediately without error on
    /// backends that have no garbage collector.
    fn garbage_collect(&self) -> Result<()>;

    /// Allocated on-disk footprint of working directory plus repository
    /// metadata, in `du` semantics: consumed blocks, not logical length.
    fn total_size_bytes(&self) -> Result<u64> {
        du_bytes(self.workdir())
    }

    /// Opaque identifier of the newest commit, or `None` before the
    /// first commit.
    fn last_commit_id(&self) -> Result<Option<CommitId>>;

    /// Whether `name` exists in the tree at `commit_id`. Unknown ids and
    /// absent files report `false`; only adapter-internal failures to
    /// reach the backend are errors.
    fn is_file_in_commit(&self, commit_id: &str, name: &str) -> Result<bool>;

    /// Runs the backend's self-check tool. Read-only.
    fn check_integrity(&self) -> Result<bool>;

    /// Damages one internal object file so `check_integrity` reports
    /// unsound. Test support only.
    fn corrupt(&self) -> Result<()>;
}

/// Allocated size of a directory tree as `du` reports it.
pub fn du_bytes(dir: &Path) -> Result<u64> {
    let out = check_output(dir, "du", &["-s", "--block-size=1", "."], &[])?;
    let field = out.split_whitespace().next().unwrap_or("0");
    Ok(field.parse()?)
}
