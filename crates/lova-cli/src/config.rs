//! CLI configuration

use anyhow::Context;
use lova_sdk::TunerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// Tab-separated values without a header; cells may be `\x02`-packed
    Tsv,
}

/// Column layout of the input files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// User id column
    pub user: String,

    /// Item id column
    pub item: String,

    /// Bit-encoded label column
    pub label: String,

    /// Column names in file order (TSV only)
    pub names: Vec<String>,

    /// Columns ignored while reading
    pub drop: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            user: "user".to_string(),
            item: "item".to_string(),
            label: "label".to_string(),
            names: Vec::new(),
            drop: Vec::new(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Training interactions
    pub train_path: PathBuf,

    /// Held-out interactions
    pub holdout_path: PathBuf,

    /// Artifact output directory
    pub output_dir: PathBuf,

    /// Input format of both files
    pub format: InputFormat,

    /// Column layout
    pub columns: ColumnConfig,

    /// Tuner configuration file (YAML), used when `tuner` is not set inline
    pub tuner_file: PathBuf,

    /// Inline tuner configuration
    pub tuner: Option<TunerConfig>,

    /// Log level for the lova crates
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.jsonl"),
            holdout_path: PathBuf::from("data/holdout.jsonl"),
            output_dir: PathBuf::from("artifacts"),
            format: InputFormat::default(),
            columns: ColumnConfig::default(),
            tuner_file: PathBuf::from("config/tuner.yaml"),
            tuner: None,
            log_level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables and an optional file
    /// stem. A missing file means defaults; an unreadable one is an error.
    pub fn load_with_name(name: &str) -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("LOVA").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config file {}", name))?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    /// Config file found for a stem, if any
    pub fn source_file(name: &str) -> Option<PathBuf> {
        ["yaml", "yml", "toml", "json"]
            .iter()
            .map(|ext| PathBuf::from(format!("{}.{}", name, ext)))
            .find(|path| path.exists())
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    /// Resolve the tuner configuration: inline first, then the YAML file
    pub fn tuner_config(&self) -> anyhow::Result<TunerConfig> {
        match &self.tuner {
            Some(tuner) => {
                tuner.validate()?;
                Ok(tuner.clone())
            }
            None => TunerConfig::from_yaml_file(&self.tuner_file).with_context(|| {
                format!(
                    "Failed to load tuner config from {}",
                    self.tuner_file.display()
                )
            }),
        }
    }

    /// Default tracing filter for the configured level
    pub fn log_filter(&self) -> String {
        format!(
            "lova_cli={0},lova_sdk={0},lova_runtime={0}",
            self.log_level
        )
    }
}
