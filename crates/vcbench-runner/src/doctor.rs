use std::path::Path;

use anyhow::{anyhow, Context, Result};

use vcbench_vcs::contract::tool_available;
use vcbench_vcs::VcsKind;

use crate::adapter_for;

/// Validates the sweep's preconditions: the selected tool is on PATH and
/// answers a version query, and the scratch directory is writable.
pub fn doctor(kind: VcsKind, tmp_dir: &Path) -> Result<()> {
    if !tool_available(kind.as_str()) {
        return Err(anyhow!("{} not found on PATH", kind.as_str()));
    }
    // bup trials verify through git against the backing store
    if kind == VcsKind::Bup && !tool_available("git") {
        return Err(anyhow!("bup trials also require git on PATH"));
    }

    let probe = tempfile::Builder::new()
        .prefix("vcbench_doctor")
        .tempdir_in(tmp_dir)
        .with_context(|| format!("scratch dir {} is not writable", tmp_dir.display()))?;

    let repo = adapter_for(kind, probe.path().to_path_buf());
    let version = repo.tool_version()?;
    tracing::info!("{} available: {}", kind.as_str(), version);

    probe.close().context("remove doctor probe dir")?;
    Ok(())
}
