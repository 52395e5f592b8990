use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vcbench_gen::DataGen;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub trial: TrialConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Directory in which trial repositories are created and destroyed.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
    /// Data generating strategy: "sparse" or "random".
    #[serde(default = "default_data_gen")]
    pub data_gen: String,
}

fn default_tmp_dir() -> String {
    "/tmp".to_string()
}

fn default_data_gen() -> String {
    "sparse".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trial: TrialConfig {
                tmp_dir: default_tmp_dir(),
                data_gen: default_data_gen(),
            },
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.config/vcbench/vcbench.toml").into_owned())
    }

    /// Loads the config file if one exists, otherwise built-in defaults.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse vcbench.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn tmp_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.trial.tmp_dir).into_owned())
    }

    pub fn data_gen(&self) -> Result<DataGen> {
        self.trial.data_gen.parse()
    }
}
