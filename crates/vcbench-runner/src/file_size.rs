//! Small-change-in-large-file sweep: commit a file of 2^N bytes, edit a
//! sliver of it, commit again, garbage collect, and watch how repository
//! size and commit time scale with N.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use vcbench_core::{
    align_kvs, base2_trials, comment, hsize, log2, outcome_legend, print_header, print_row, timed,
    CmdOutcome, Column, StepResult, VerificationOutcome,
};
use vcbench_gen::{create_file, make_small_edit, DataGen};
use vcbench_trial::{run_commit_step, run_repo_step};
use vcbench_vcs::{VcsKind, VcsRepo};

use crate::adapter_for;

const TEST_FILE: &str = "test_file";

pub struct FileSizeParams {
    pub vcs: VcsKind,
    pub start_mag: u32,
    pub end_mag: u32,
    pub mag_steps: u64,
    pub data_gen: DataGen,
    pub tmp_dir: PathBuf,
}

struct FileSizeStats {
    magnitude: u32,
    filebytes: u64,
    create_time: f64,
    c1_time: f64,
    c1_size: u64,
    c1: StepResult,
    c2_time: f64,
    c2_size: u64,
    c2: StepResult,
    gc_time: f64,
    gc_size: u64,
    gc: StepResult,
    cleanup_time: f64,
}

impl FileSizeStats {
    fn new(filebytes: u64) -> Self {
        Self {
            magnitude: log2(filebytes),
            filebytes,
            create_time: 0.0,
            c1_time: 0.0,
            c1_size: 0,
            c1: StepResult::default(),
            c2_time: 0.0,
            c2_size: 0,
            c2: StepResult::default(),
            gc_time: 0.0,
            gc_size: 0,
            gc: StepResult::default(),
            cleanup_time: 0.0,
        }
    }

    fn ratio(&self, size: u64) -> f64 {
        size as f64 / self.filebytes as f64
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{}", self.magnitude),
            format!("0x{:010x}", self.filebytes),
            hsize(self.filebytes),
            format!("{:.3}", self.create_time),
            format!("{:.3}", self.c1_time),
            format!("0x{:010x}", self.c1_size),
            format!("{:.2}", self.ratio(self.c1_size)),
            self.c1.cmd.to_string(),
            self.c1.effect.to_string(),
            self.c1.repo.to_string(),
            format!("{:.3}", self.c2_time),
            format!("0x{:010x}", self.c2_size),
            format!("{:.2}", self.ratio(self.c2_size)),
            self.c2.cmd.to_string(),
            self.c2.effect.to_string(),
            self.c2.repo.to_string(),
            format!("{:.3}", self.gc_time),
            format!("0x{:010x}", self.gc_size),
            format!("{:.2}", self.ratio(self.gc_size)),
            self.gc.cmd.to_string(),
            self.gc.repo.to_string(),
            format!("{:.3}", self.cleanup_time),
        ]
    }
}

fn columns() -> Vec<Column> {
    let cmdmax = CmdOutcome::max_width();
    let vermax = VerificationOutcome::max_width();
    vec![
        Column::new("magnitude", 9),
        Column::new("filebytes", 12),
        Column::new("filehsize", 9),
        Column::new("create_time", 11),
        Column::new("c1_time", 11),
        Column::new("c1_size", 12),
        Column::new("c1_ratio", 13),
        Column::new("c1_cmd", cmdmax),
        Column::new("c1_ver", vermax),
        Column::new("c1_repo", vermax),
        Column::new("c2_time", 11),
        Column::new("c2_size", 12),
        Column::new("c2_ratio", 13),
        Column::new("c2_cmd", cmdmax),
        Column::new("c2_ver", vermax),
        Column::new("c2_repo", vermax),
        Column::new("gc_time", 11),
        Column::new("gc_size", 12),
        Column::new("gc_ratio", 8),
        Column::new("gc_cmd", cmdmax),
        Column::new("gc_repo", vermax),
        Column::new("cleanup_time", 11),
    ]
}

fn trial_steps(
    ts: &mut FileSizeStats,
    repo: &dyn VcsRepo,
    data_gen: DataGen,
    dir: &Path,
) -> Result<()> {
    repo.init()?;

    timed(&mut ts.create_time, || {
        create_file(dir, TEST_FILE, ts.filebytes, data_gen, false)
    })?;

    run_commit_step(repo, Some(TEST_FILE), &mut ts.c1_time, &mut ts.c1, || {
        repo.start_tracking(TEST_FILE)?;
        repo.commit(TEST_FILE)
    })?;
    ts.c1_size = repo.total_size_bytes()?;
    if !ts.c1.acceptable() {
        return Ok(());
    }

    make_small_edit(dir, TEST_FILE, false)?;

    run_commit_step(repo, Some(TEST_FILE), &mut ts.c2_time, &mut ts.c2, || {
        repo.commit(TEST_FILE)
    })?;
    ts.c2_size = repo.total_size_bytes()?;
    if !ts.c2.acceptable() {
        return Ok(());
    }

    run_repo_step(repo, &mut ts.gc_time, &mut ts.gc, || repo.garbage_collect())?;
    ts.gc_size = repo.total_size_bytes()?;
    Ok(())
}

fn run_trial(
    ts: &mut FileSizeStats,
    data_gen: DataGen,
    tmp_dir: &Path,
    make_repo: impl FnOnce(PathBuf) -> Box<dyn VcsRepo>,
) -> Result<()> {
    let repodir = tempfile::Builder::new()
        .prefix("vcs_benchmark")
        .tempdir_in(tmp_dir)
        .context("create trial dir")?;
    let repo = make_repo(repodir.path().to_path_buf());

    let outcome = trial_steps(ts, &*repo, data_gen, repodir.path());

    tracing::info!("Cleaning up trial files...");
    let mut cleanup = Ok(());
    timed(&mut ts.cleanup_time, || cleanup = repodir.close());
    tracing::info!("Removed trial files in {:5.3} seconds", ts.cleanup_time);

    outcome?;
    cleanup.context("remove trial dir")?;
    Ok(())
}

pub fn sweep(params: &FileSizeParams, interrupt: &AtomicBool) -> Result<()> {
    let env = vcbench_env::gather(&[params.tmp_dir.as_path()])?;
    let version = adapter_for(params.vcs, params.tmp_dir.clone()).tool_version()?;

    comment("Committing increasingly large files");
    comment("");
    comment(align_kvs(&[
        ("data_gen", params.data_gen.as_str().to_string()),
        ("vcs", params.vcs.as_str().to_string()),
        ("vcs_version", version),
    ]));
    comment("");
    comment(align_kvs(&env.kvs()));
    comment("");
    comment("Outcome codes:");
    comment(align_kvs(&outcome_legend()));
    comment("");

    let columns = columns();
    print_header(&columns);

    for filebytes in base2_trials(params.start_mag, params.end_mag, params.mag_steps) {
        if interrupt.load(Ordering::SeqCst) {
            comment("Cancelled");
            break;
        }
        let mut ts = FileSizeStats::new(filebytes);
        let outcome = run_trial(&mut ts, params.data_gen, &params.tmp_dir, |dir| {
            adapter_for(params.vcs, dir)
        });
        if let Err(err) = outcome {
            comment(format!("{:#}", err));
        }
        print_row(&columns, &ts.cells());
    }
    Ok(())
}
