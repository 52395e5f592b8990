//! Filesystem-limit probe: no VCS at all, just hash-named objects written
//! into a split-directory tree the way content stores lay them out, until
//! the disk or the operator gives up. Each write is one report row.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Context, Result};

use rand::RngCore;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use vcbench_core::{
    align_kvs, check_output, comment, hsize, outcome_legend, print_header, print_row, timed,
    CmdOutcome, Column,
};
use vcbench_gen::{create_file, object_dir_split, DataGen};
use vcbench_trial::record_cmd;

use crate::reformat_device;

pub struct FsLimitParams {
    pub each_file_bytes: u64,
    pub dir_split: usize,
    pub dir_depth: usize,
    pub data_gen: DataGen,
    pub tmp_dir: PathBuf,
    /// Reformat this device on cleanup instead of deleting files one by one.
    pub reformat_partition: Option<String>,
}

struct FsLimitStats {
    each_bytes: u64,
    dir_split: usize,
    dir_depth: usize,
    f_num: u64,
    d_f_num: u64,
    d_ct_time: f64,
    write_ok: CmdOutcome,
    write_time: f64,
    df_total: u64,
    df_used: u64,
    df_avail: u64,
    du: u64,
    du_time: f64,
}

impl FsLimitStats {
    fn new(params: &FsLimitParams, f_num: u64) -> Self {
        Self {
            each_bytes: params.each_file_bytes,
            dir_split: params.dir_split,
            dir_depth: params.dir_depth,
            f_num,
            d_f_num: 0,
            d_ct_time: 0.0,
            write_ok: CmdOutcome::default(),
            write_time: 0.0,
            df_total: 0,
            df_used: 0,
            df_avail: 0,
            du: 0,
            du_time: 0.0,
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("0x{:010x}", self.each_bytes),
            format!("{}", self.dir_split),
            format!("{}", self.dir_depth),
            format!("{}", self.f_num),
            format!("{}", self.d_f_num),
            format!("{:.3}", self.d_ct_time),
            self.write_ok.to_string(),
            format!("{:.3}", self.write_time),
            format!("0x{:010x}", self.df_total),
            format!("0x{:010x}", self.df_used),
            format!("0x{:010x}", self.df_avail),
            format!("0x{:010x}", self.du),
            format!("{:.3}", self.du_time),
        ]
    }
}

fn columns() -> Vec<Column> {
    let cmdmax = CmdOutcome::max_width();
    vec![
        Column::new("each_bytes", 12),
        Column::new("dir_split", 2),
        Column::new("dir_depth", 2),
        Column::new("f_num", 12),
        Column::new("d_f_num", 12),
        Column::new("d_ct_time", 9),
        Column::new("write_ok", cmdmax),
        Column::new("write_time", 9),
        Column::new("df_total", 12),
        Column::new("df_used", 12),
        Column::new("df_avail", 12),
        Column::new("du", 12),
        Column::new("du_time", 9),
    ]
}

/// A fresh hash-shaped object name, split into its storage directory.
fn object_location(dir_split: usize, dir_depth: usize) -> Result<(String, String)> {
    let mut seed = [0u8; 200];
    rand::thread_rng().fill_bytes(&mut seed);
    let obj_name = hex::encode(Sha256::digest(seed));
    object_dir_split(&obj_name, dir_split, dir_depth)
}

fn run_trial(ts: &mut FsLimitStats, data_gen: DataGen, repodir: &Path) -> Result<()> {
    let (dirname, fname) = object_location(ts.dir_split, ts.dir_depth)?;
    let objdir = repodir.join("objects").join(&dirname);
    std::fs::create_dir_all(&objdir).with_context(|| format!("create {}", objdir.display()))?;

    let entries = timed(&mut ts.d_ct_time, || -> Result<u64> {
        let listing = std::fs::read_dir(&objdir).context("list object dir")?;
        Ok(listing.count() as u64)
    })?;
    ts.d_f_num = entries + 1;

    record_cmd(&mut ts.write_ok, || {
        timed(&mut ts.write_time, || {
            create_file(&objdir, &fname, ts.each_bytes, data_gen, true)
        })
    })?;

    let objdir_str = objdir
        .to_str()
        .ok_or_else(|| anyhow!("non-utf8 path: {}", objdir.display()))?;
    let df = check_output(repodir, "df", &["-B1", objdir_str], &[])?;
    let line = df.lines().last().ok_or_else(|| anyhow!("empty df output"))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    ts.df_total = fields.get(1).unwrap_or(&"0").parse()?;
    ts.df_used = fields.get(2).unwrap_or(&"0").parse()?;
    ts.df_avail = fields.get(3).unwrap_or(&"0").parse()?;

    ts.du = timed(&mut ts.du_time, || -> Result<u64> {
        let out = check_output(&objdir, "du", &["--bytes", "-s", "."], &[])?;
        Ok(out.split_whitespace().next().unwrap_or("0").parse()?)
    })?;

    Ok(())
}

fn cleanup(repodir: TempDir, reformat_partition: &Option<String>) -> Result<()> {
    tracing::info!("Cleaning up trial files...");
    match reformat_partition {
        Some(device) => {
            // The reformat wipes the directory out from under us; don't let
            // the TempDir destructor try again.
            let _ = repodir.into_path();
            reformat_device(device)
        }
        None => repodir.close().context("remove trial dir"),
    }
}

pub fn sweep(params: &FsLimitParams, interrupt: &AtomicBool) -> Result<()> {
    let env = vcbench_env::gather(&[params.tmp_dir.as_path()])?;

    comment("Simulating growing object file directories");
    comment("");
    comment(align_kvs(&[
        ("data_gen", params.data_gen.as_str().to_string()),
        (
            "each_file_size",
            format!(
                "0x{:x} bytes ({})",
                params.each_file_bytes,
                hsize(params.each_file_bytes)
            ),
        ),
        (
            "reformat_partition",
            params.reformat_partition.clone().unwrap_or_else(|| "-".to_string()),
        ),
    ]));
    comment("");
    comment(align_kvs(&env.kvs()));
    comment("");
    comment("Outcome codes:");
    comment(align_kvs(&outcome_legend()));
    comment("");

    let columns = columns();
    print_header(&columns);

    // Start from a reformatted partition so every run begins under the same
    // conditions; the previous run may have been cancelled before cleanup.
    if let Some(device) = &params.reformat_partition {
        reformat_device(device)?;
    }

    let repodir = tempfile::Builder::new()
        .prefix("filesystem_limit_")
        .tempdir_in(&params.tmp_dir)
        .context("create trial dir")?;

    let mut f_num = 0u64;
    loop {
        if interrupt.load(Ordering::SeqCst) {
            comment("Cancelled");
            break;
        }
        f_num += 1;
        let mut ts = FsLimitStats::new(params, f_num);
        let outcome = run_trial(&mut ts, params.data_gen, repodir.path());
        print_row(&columns, &ts.cells());
        if let Err(err) = outcome {
            comment(format!("{:#}", err));
            break;
        }
    }

    let mut cleanup_ok = CmdOutcome::default();
    let mut cleanup_time = 0.0;
    let cleaned = record_cmd(&mut cleanup_ok, || {
        timed(&mut cleanup_time, || {
            cleanup(repodir, &params.reformat_partition)
        })
    });
    comment(align_kvs(&[
        (
            "reformat_partition",
            params.reformat_partition.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("cleanup_ok", cleanup_ok.code().to_string()),
        ("cleanup_time", format!("{:.3}", cleanup_time)),
    ]));
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn params(tmp_dir: PathBuf) -> FsLimitParams {
        FsLimitParams {
            each_file_bytes: 4096,
            dir_split: 2,
            dir_depth: 2,
            data_gen: DataGen::Sparse,
            tmp_dir,
            reformat_partition: None,
        }
    }

    #[test]
    fn object_names_split_into_directories() {
        let (dirname, fname) = object_location(2, 2).unwrap();
        assert_eq!(dirname.len(), 6); // two 2-char segments plus slashes
        assert_eq!(fname.len(), 64 - 4);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn one_write_fills_the_row() {
        let dir = tempdir().unwrap();
        let p = params(dir.path().to_path_buf());
        let mut ts = FsLimitStats::new(&p, 1);
        run_trial(&mut ts, p.data_gen, dir.path()).unwrap();

        assert_eq!(ts.d_f_num, 1);
        assert_eq!(ts.write_ok, CmdOutcome::Ok);
        assert!(ts.df_total > 0);
        assert!(ts.du > 0);
    }

    #[test]
    fn cells_match_column_count() {
        let dir = tempdir().unwrap();
        let p = params(dir.path().to_path_buf());
        assert_eq!(FsLimitStats::new(&p, 1).cells().len(), columns().len());
    }
}
