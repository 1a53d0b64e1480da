//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dashboard::Selection;
use crate::models::InspectionCountMode;
use clap::Parser;
use std::path::PathBuf;

/// InspectBoard - vehicle inspection dashboard
///
/// Loads a CSV of vehicle inspection records and renders descriptive
/// statistics and charts as a Markdown, JSON or HTML report.
///
/// Examples:
///   inspectboard --data data.csv
///   inspectboard --data data.csv --format html --output dashboard.html
///   inspectboard --vehicle V-102 --show-most-frequent --show-least-frequent
///   inspectboard --interactive
///   inspectboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the inspection CSV
    ///
    /// Defaults to the `[data] path` setting, or data.csv.
    #[arg(short, long, value_name = "FILE", env = "INSPECTBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, html)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .inspectboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Vehicle ID shown in the part coverage heatmap
    ///
    /// Defaults to the first vehicle in the dataset.
    #[arg(long, value_name = "ID")]
    pub vehicle: Option<String>,

    /// Include the raw data table
    #[arg(long)]
    pub show_raw: bool,

    /// Include the missing value counts
    #[arg(long)]
    pub show_missing: bool,

    /// Include the most frequently detected parts
    #[arg(long)]
    pub show_most_frequent: bool,

    /// Include the least frequently detected parts
    #[arg(long)]
    pub show_least_frequent: bool,

    /// How inspections are counted per vehicle (distinct, rows)
    #[arg(long, value_name = "MODE")]
    pub inspection_count: Option<CountMode>,

    /// Maximum rows shown in the raw data table
    #[arg(long, value_name = "COUNT")]
    pub raw_row_limit: Option<usize>,

    /// Start an interactive session reading commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Generate a default .inspectboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Self-contained HTML with SVG charts
    Html,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

/// Inspection counting mode for --inspection-count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CountMode {
    Distinct,
    Rows,
}

impl From<CountMode> for InspectionCountMode {
    fn from(mode: CountMode) -> Self {
        match mode {
            CountMode::Distinct => InspectionCountMode::Distinct,
            CountMode::Rows => InspectionCountMode::Rows,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.raw_row_limit == Some(0) {
            return Err("Raw row limit must be at least 1".to_string());
        }

        if let Some(ref vehicle) = self.vehicle {
            if vehicle.trim().is_empty() {
                return Err("Vehicle ID must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over `verbose = true` from the config file.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Returns the initial dashboard selection from the toggle flags.
    pub fn selection(&self) -> Selection {
        Selection {
            show_raw: self.show_raw,
            show_missing: self.show_missing,
            show_most_frequent: self.show_most_frequent,
            show_least_frequent: self.show_least_frequent,
            vehicle_id: self.vehicle.as_ref().map(|v| v.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: Some(PathBuf::from("data.csv")),
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            verbose: false,
            quiet: false,
            vehicle: None,
            show_raw: false,
            show_missing: false,
            show_most_frequent: false,
            show_least_frequent: false,
            inspection_count: None,
            raw_row_limit: None,
            interactive: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "inspectboard",
            "--data",
            "inspections.csv",
            "--format",
            "html",
            "--vehicle",
            "V-7",
            "--show-missing",
            "--inspection-count",
            "rows",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("inspections.csv")));
        assert_eq!(args.format, OutputFormat::Html);
        assert_eq!(args.vehicle.as_deref(), Some("V-7"));
        assert!(args.show_missing);
        assert!(!args.show_raw);
        assert_eq!(args.inspection_count, Some(CountMode::Rows));
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Html.extension(), "html");
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_raw_row_limit() {
        let mut args = make_args();
        args.raw_row_limit = Some(0);
        assert!(args.validate().is_err());

        args.raw_row_limit = Some(10);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_blank_vehicle() {
        let mut args = make_args();
        args.vehicle = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_selection_from_flags() {
        let mut args = make_args();
        args.show_raw = true;
        args.show_least_frequent = true;
        args.vehicle = Some(" V-1 ".to_string());

        let selection = args.selection();
        assert!(selection.show_raw);
        assert!(!selection.show_missing);
        assert!(!selection.show_most_frequent);
        assert!(selection.show_least_frequent);
        assert_eq!(selection.vehicle_id.as_deref(), Some("V-1"));
    }
}
