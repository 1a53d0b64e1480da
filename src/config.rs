//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.inspectboard.toml` files.

use crate::models::InspectionCountMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".inspectboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Required column names.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "dashboard.md".to_string()
}

/// Input dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the inspection CSV.
    #[serde(default = "default_data_path")]
    pub path: String,

    /// Field delimiter. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_data_path() -> String {
    "data.csv".to_string()
}

fn default_delimiter() -> char {
    ','
}

/// Header names of the four required columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_inspection_id")]
    pub inspection_id: String,

    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: String,

    #[serde(default = "default_inspection_date")]
    pub inspection_date: String,

    #[serde(default = "default_part_detected")]
    pub part_detected: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            inspection_id: default_inspection_id(),
            vehicle_id: default_vehicle_id(),
            inspection_date: default_inspection_date(),
            part_detected: default_part_detected(),
        }
    }
}

fn default_inspection_id() -> String {
    "Inspection ID".to_string()
}

fn default_vehicle_id() -> String {
    "Vehicle ID".to_string()
}

fn default_inspection_date() -> String {
    "Inspection date".to_string()
}

fn default_part_detected() -> String {
    "Part detected".to_string()
}

/// Aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How the inspection frequency section counts inspections.
    #[serde(default)]
    pub inspection_count: InspectionCountMode,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dashboard title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Maximum rows shown in the raw data section.
    #[serde(default = "default_raw_row_limit")]
    pub raw_row_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            raw_row_limit: default_raw_row_limit(),
        }
    }
}

fn default_title() -> String {
    "Automobile Inspection Dashboard".to_string()
}

fn default_raw_row_limit() -> usize {
    100
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed are applied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.display().to_string();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(mode) = args.inspection_count {
            self.analysis.inspection_count = mode.into();
        }

        if let Some(limit) = args.raw_row_limit {
            self.report.raw_row_limit = limit;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Report path for the given format extension.
    ///
    /// Only the built-in default output takes the format's extension; a
    /// path set in the config file is used as written.
    pub fn report_path(&self, extension: &str) -> PathBuf {
        let path = PathBuf::from(&self.general.output);
        if self.general.output == default_output() {
            path.with_extension(extension)
        } else {
            path
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
