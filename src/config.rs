// Configuration loading.
// Reads ari.toml from the current directory or the path in ARI_CONFIG.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ARI_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "ari.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { path: default_data_path() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Rows shown in each console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Size of the "worst districts" table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preview_rows: default_preview_rows(),
            top_n: default_top_n(),
        }
    }
}

fn default_data_path() -> PathBuf { PathBuf::from("data_processed/ARI_final_district_final.csv") }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_preview_rows() -> usize { 5 }
fn default_top_n() -> usize { 20 }

impl Config {
    /// Load from `$ARI_CONFIG` or `./ari.toml`. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
