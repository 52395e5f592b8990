use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vcbench_gen::DataGen;
use vcbench_runner::{doctor, file_size, fs_limit, many_files, Config};
use vcbench_vcs::VcsKind;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "vcbench", version, about = "Version control scaling benchmarks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum VcsArg {
    Git,
    Hg,
    Bup,
}

impl From<VcsArg> for VcsKind {
    fn from(v: VcsArg) -> Self {
        match v {
            VcsArg::Git => VcsKind::Git,
            VcsArg::Hg => VcsKind::Hg,
            VcsArg::Bup => VcsKind::Bup,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DataGenArg {
    Sparse,
    Random,
}

impl From<DataGenArg> for DataGen {
    fn from(v: DataGenArg) -> Self {
        match v {
            DataGenArg::Sparse => DataGen::Sparse,
            DataGenArg::Random => DataGen::Random,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Measure performance committing small changes to increasingly large files
    FileSize {
        vcs: VcsArg,
        /// Starting magnitude (2^N bytes)
        start_mag: u32,
        /// Ending magnitude, exclusive (defaults to start_mag + 1)
        end_mag: Option<u32>,
        /// Steps per order of magnitude
        #[arg(long, default_value_t = 1)]
        mag_steps: u64,
        #[arg(long, value_enum)]
        data_gen: Option<DataGenArg>,
        #[arg(long)]
        tmp_dir: Option<String>,
    },

    /// Measure performance committing increasingly large numbers of files
    ManyFiles {
        vcs: VcsArg,
        /// Starting magnitude (10^N files)
        start_mag: u32,
        /// Ending magnitude, exclusive (defaults to start_mag + 1)
        end_mag: Option<u32>,
        /// Steps per order of magnitude
        #[arg(long, default_value_t = 1)]
        mag_steps: u64,
        /// Size of each file (2^N bytes)
        #[arg(long, default_value_t = 10)]
        each_file_mag: u32,
        #[arg(long, value_enum)]
        data_gen: Option<DataGenArg>,
        #[arg(long)]
        tmp_dir: Option<String>,
    },

    /// Fill a filesystem with hash-named object files until interrupted
    FsLimit {
        /// Size in bytes of each file
        #[arg(long, default_value_t = 4096)]
        each_file_size: u64,
        /// Split subdirectories after this many hex characters
        #[arg(long, default_value_t = 2)]
        dir_split: usize,
        /// Depth of subdirectories
        #[arg(long, default_value_t = 2)]
        dir_depth: usize,
        #[arg(long, value_enum)]
        data_gen: Option<DataGenArg>,
        #[arg(long)]
        tmp_dir: Option<String>,
        /// Reformat this device on cleanup instead of deleting files
        #[arg(long)]
        reformat_partition: Option<String>,
    },

    /// Validate the tool and scratch directory before a sweep
    Doctor {
        vcs: VcsArg,
        #[arg(long)]
        tmp_dir: Option<String>,
    },
}

fn resolve_tmp_dir(cfg: &Config, flag: Option<String>) -> PathBuf {
    match flag {
        Some(dir) => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
        None => cfg.tmp_dir(),
    }
}

fn resolve_data_gen(cfg: &Config, flag: Option<DataGenArg>) -> Result<DataGen> {
    match flag {
        Some(arg) => Ok(arg.into()),
        None => cfg.data_gen(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .context("install interrupt handler")?;

    let cli = Cli::parse();
    let cfg = Config::load_default()?;

    match cli.cmd {
        Command::FileSize {
            vcs,
            start_mag,
            end_mag,
            mag_steps,
            data_gen,
            tmp_dir,
        } => {
            let params = file_size::FileSizeParams {
                vcs: vcs.into(),
                start_mag,
                end_mag: end_mag.unwrap_or(start_mag + 1),
                mag_steps,
                data_gen: resolve_data_gen(&cfg, data_gen)?,
                tmp_dir: resolve_tmp_dir(&cfg, tmp_dir),
            };
            doctor(params.vcs, &params.tmp_dir)?;
            file_size::sweep(&params, &INTERRUPTED)?;
        }
        Command::ManyFiles {
            vcs,
            start_mag,
            end_mag,
            mag_steps,
            each_file_mag,
            data_gen,
            tmp_dir,
        } => {
            let params = many_files::ManyFilesParams {
                vcs: vcs.into(),
                start_mag,
                end_mag: end_mag.unwrap_or(start_mag + 1),
                mag_steps,
                each_file_mag,
                data_gen: resolve_data_gen(&cfg, data_gen)?,
                tmp_dir: resolve_tmp_dir(&cfg, tmp_dir),
            };
            doctor(params.vcs, &params.tmp_dir)?;
            many_files::sweep(&params, &INTERRUPTED)?;
        }
        Command::FsLimit {
            each_file_size,
            dir_split,
            dir_depth,
            data_gen,
            tmp_dir,
            reformat_partition,
        } => {
            let params = fs_limit::FsLimitParams {
                each_file_bytes: each_file_size,
                dir_split,
                dir_depth,
                data_gen: resolve_data_gen(&cfg, data_gen)?,
                tmp_dir: resolve_tmp_dir(&cfg, tmp_dir),
                reformat_partition,
            };
            fs_limit::sweep(&params, &INTERRUPTED)?;
        }
        Command::Doctor { vcs, tmp_dir } => {
            doctor(vcs.into(), &resolve_tmp_dir(&cfg, tmp_dir))?;
            println!("OK");
        }
    }
    Ok(())
}
