use std::path::{Path, PathBuf};

use anyhow::Result;

use vcbench_core::logcall;
use vcbench_vcs::{VcsKind, VcsRepo};
use vcbench_vcs_bup::BupRepo;
use vcbench_vcs_git::GitRepo;
use vcbench_vcs_hg::HgRepo;

pub fn adapter_for(kind: VcsKind, workdir: PathBuf) -> Box<dyn VcsRepo> {
    match kind {
        VcsKind::Git => Box::new(GitRepo::new(workdir)),
        VcsKind::Hg => Box::new(HgRepo::new(workdir)),
        VcsKind::Bup => Box::new(BupRepo::new(workdir)),
    }
}

/// Reformats a partition instead of deleting its files one by one.
///
/// Ext filesystems are slow at mass deletion; after a trial that wrote
/// millions of files, a reformat finishes in seconds where an rm would run
/// for hours. THIS DESTROYS ALL DATA ON THE PARTITION. The device must be
/// in fstab (mount is called with the device alone) and sudo must allow
/// umount/mke2fs/mount without a password.
pub fn reformat_device(device: &str) -> Result<()> {
    let root = Path::new("/");
    logcall(root, "sudo", &["umount", device], &[])?;
    logcall(
        root,
        "sudo",
        &[
            "mke2fs",
            "-F",
            "-t",
            "ext4",
            "-m0",
            "-L",
            "test",
            "-E",
            "root_owner=1000:1000",
            device,
        ],
        &[],
    )?;
    logcall(root, "sudo", &["mount", device], &[])
}
