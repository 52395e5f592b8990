//! Many-files sweep: commit trees of 10^N small files, re-run status after
//! touching every 16th file, and commit again. This is where tools fall
//! over long before any single file gets big.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use vcbench_core::{
    align_kvs, base10_trials, comment, digitlength, hsize, outcome_legend, print_header,
    print_row, timed, CmdOutcome, Column, StepResult, VerificationOutcome,
};
use vcbench_gen::{create_many_files, update_many_files, DataGen};
use vcbench_trial::{record_cmd, run_commit_step};
use vcbench_vcs::{VcsKind, VcsRepo};

use crate::adapter_for;

const TREE: &str = "many_files_dir";

pub struct ManyFilesParams {
    pub vcs: VcsKind,
    pub start_mag: u32,
    pub end_mag: u32,
    pub mag_steps: u64,
    /// Size of each generated file, 2^N bytes.
    pub each_file_mag: u32,
    pub data_gen: DataGen,
    pub tmp_dir: PathBuf,
}

struct ManyFilesStats {
    magnitude: u32,
    filecount: u64,
    eachbytes: u64,
    create_time: f64,
    c1_time: f64,
    c1_size: u64,
    c1: StepResult,
    stat1_time: f64,
    stat1_cmd: CmdOutcome,
    stat2_time: f64,
    stat2_cmd: CmdOutcome,
    c2_time: f64,
    c2_size: u64,
    c2: StepResult,
    cleanup_time: f64,
}

impl ManyFilesStats {
    fn new(filecount: u64, eachbytes: u64) -> Self {
        Self {
            magnitude: digitlength(filecount) - 1,
            filecount,
            eachbytes,
            create_time: 0.0,
            c1_time: 0.0,
            c1_size: 0,
            c1: StepResult::default(),
            stat1_time: 0.0,
            stat1_cmd: CmdOutcome::default(),
            stat2_time: 0.0,
            stat2_cmd: CmdOutcome::default(),
            c2_time: 0.0,
            c2_size: 0,
            c2: StepResult::default(),
            cleanup_time: 0.0,
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{}", self.magnitude),
            format!("{}", self.filecount),
            format!("0x{:010x}", self.filecount * self.eachbytes),
            format!("{:.3}", self.create_time),
            format!("{:.3}", self.c1_time),
            format!("0x{:010x}", self.c1_size),
            self.c1.cmd.to_string(),
            self.c1.effect.to_string(),
            self.c1.repo.to_string(),
            format!("{:.3}", self.stat1_time),
            self.stat1_cmd.to_string(),
            format!("{:.3}", self.stat2_time),
            self.stat2_cmd.to_string(),
            format!("{:.3}", self.c2_time),
            format!("0x{:010x}", self.c2_size),
            self.c2.cmd.to_string(),
            self.c2.effect.to_string(),
            self.c2.repo.to_string(),
            format!("{:.3}", self.cleanup_time),
        ]
    }
}

fn columns() -> Vec<Column> {
    let cmdmax = CmdOutcome::max_width();
    let vermax = VerificationOutcome::max_width();
    vec![
        Column::new("magnitude", 9),
        Column::new("filecount", 12),
        Column::new("totalbytes", 12),
        Column::new("create_time", 11),
        Column::new("c1_time", 11),
        Column::new("c1_size", 12),
        Column::new("c1_cmd", cmdmax),
        Column::new("c1_ver", vermax),
        Column::new("c1_repo", vermax),
        Column::new("stat1_time", 11),
        Column::new("stat1_cmd", cmdmax),
        Column::new("stat2_time", 11),
        Column::new("stat2_cmd", cmdmax),
        Column::new("c2_time", 11),
        Column::new("c2_size", 12),
        Column::new("c2_cmd", cmdmax),
        Column::new("c2_ver", vermax),
        Column::new("c2_repo", vermax),
        Column::new("cleanup_time", 11),
    ]
}

fn trial_steps(
    ts: &mut ManyFilesStats,
    repo: &dyn VcsRepo,
    data_gen: DataGen,
    dir: &Path,
) -> Result<()> {
    repo.init()?;

    timed(&mut ts.create_time, || {
        create_many_files(dir, ts.filecount, ts.eachbytes, TREE, data_gen)
    })?;

    run_commit_step(repo, None, &mut ts.c1_time, &mut ts.c1, || {
        repo.start_tracking(TREE)?;
        repo.commit(TREE)
    })?;
    ts.c1_size = repo.total_size_bytes()?;
    if !ts.c1.acceptable() {
        return Ok(());
    }

    record_cmd(&mut ts.stat1_cmd, || {
        timed(&mut ts.stat1_time, || repo.status(TREE))
    })?;

    update_many_files(dir, TREE, 16)?;

    record_cmd(&mut ts.stat2_cmd, || {
        timed(&mut ts.stat2_time, || repo.status(TREE))
    })?;

    run_commit_step(repo, None, &mut ts.c2_time, &mut ts.c2, || repo.commit(TREE))?;
    ts.c2_size = repo.total_size_bytes()?;
    Ok(())
}

fn run_trial(
    ts: &mut ManyFilesStats,
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

pub fn sweep(params: &ManyFilesParams, interrupt: &AtomicBool) -> Result<()> {
    let eachbytes = 1u64 << params.each_file_mag;
    let env = vcbench_env::gather(&[params.tmp_dir.as_path()])?;
    let version = adapter_for(params.vcs, params.tmp_dir.clone()).tool_version()?;

    comment("Committing increasingly large numbers of files");
    comment("");
    comment(align_kvs(&[
        ("data_gen", params.data_gen.as_str().to_string()),
        (
            "each_file_size",
            format!("0x{:x} bytes ({})", eachbytes, hsize(eachbytes)),
        ),
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

    for filecount in base10_trials(params.start_mag, params.end_mag, params.mag_steps) {
        if interrupt.load(Ordering::SeqCst) {
            comment("Cancelled");
            break;
        }
        let mut ts = ManyFilesStats::new(filecount, eachbytes);
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;
    use vcbench_core::{CommitFalsePositive, VerificationOutcome};
    use vcbench_vcs::scripted::{Script, ScriptedRepo};

    fn head(id: &str) -> Script<Option<String>> {
        Script::Value(Some(id.to_string()))
    }

    #[test]
    fn happy_path_runs_every_step() {
        let dir = tempdir().unwrap();
        let repo = ScriptedRepo::new().heads(vec![
            Script::Value(None),
            head("a"),
            head("a"),
            head("b"),
        ]);
        let mut ts = ManyFilesStats::new(10, 10);
        trial_steps(&mut ts, &repo, DataGen::Sparse, dir.path()).unwrap();

        assert!(ts.c1.acceptable());
        assert!(ts.c2.acceptable());
        assert_eq!(ts.stat1_cmd, CmdOutcome::Ok);
        assert_eq!(ts.stat2_cmd, CmdOutcome::Ok);
        assert_eq!(
            repo.calls(),
            vec!["init", "start_tracking", "commit", "status", "status", "commit"]
        );
    }

    #[test]
    fn unacceptable_first_commit_skips_remaining_steps() {
        // Head query during verification fails: the step finishes without
        // an error but its effect slot reads ver_err.
        let dir = tempdir().unwrap();
        let repo = ScriptedRepo::new().heads(vec![Script::Value(None), Script::Fail]);
        let mut ts = ManyFilesStats::new(10, 10);
        trial_steps(&mut ts, &repo, DataGen::Sparse, dir.path()).unwrap();

        assert_eq!(ts.c1.effect, VerificationOutcome::VerificationError);
        assert!(!ts.c1.acceptable());
        assert_eq!(ts.stat1_cmd, CmdOutcome::NeverExecuted);
        assert_eq!(ts.c2.cmd, CmdOutcome::NeverExecuted);
        assert!(!repo.calls().contains(&"status"));
    }

    #[test]
    fn false_positive_aborts_the_trial() {
        let dir = tempdir().unwrap();
        let repo = ScriptedRepo::new();
        let mut ts = ManyFilesStats::new(10, 10);
        let err = trial_steps(&mut ts, &repo, DataGen::Sparse, dir.path()).unwrap_err();

        assert!(err.is::<CommitFalsePositive>());
        assert_eq!(ts.c1.effect, VerificationOutcome::Bad);
        assert!(!repo.calls().contains(&"status"));
    }

    #[test]
    fn failed_trial_still_cleans_up_its_directory() {
        let captured = RefCell::new(None);
        let mut ts = ManyFilesStats::new(10, 10);
        let outcome = run_trial(&mut ts, DataGen::Sparse, &std::env::temp_dir(), |dir| {
            *captured.borrow_mut() = Some(dir);
            Box::new(ScriptedRepo::new())
        });

        assert!(outcome.is_err());
        let dir = captured.into_inner().unwrap();
        assert!(!dir.exists());
        assert!(ts.cleanup_time >= 0.0);
    }

    #[test]
    fn cells_match_column_count() {
        let ts = ManyFilesStats::new(100, 1024);
        assert_eq!(ts.cells().len(), columns().len());
        assert_eq!(ts.magnitude, 2);
    }
}
