//! InspectBoard - vehicle inspection dashboard
//!
//! A CLI tool that loads a CSV of vehicle inspection records, computes
//! descriptive statistics and renders them as Markdown, JSON or HTML
//! reports with bar charts, histograms and a coverage heatmap.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration or runtime error (missing file, missing column, etc.)

mod analysis;
mod cli;
mod config;
mod dashboard;
mod dataset;
mod models;
mod report;
mod session;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use dashboard::{build_dashboard, DashboardOptions};
use dataset::{InspectionTable, Schema};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration (may enable verbose logging)
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("InspectBoard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(&args, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .inspectboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the data path, column names, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset and render the dashboard once, or start a session.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    let schema = Schema::from_config(config).context("Invalid [data] settings")?;
    let data_path = Path::new(&config.data.path);
    let table = InspectionTable::load(data_path, &schema)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;

    if table.is_empty() {
        warn!("Dataset {} has no rows", data_path.display());
    }

    let options = DashboardOptions::from(config);
    let selection = args.selection();

    if args.interactive {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut session = session::Session::new(&table, options, selection);
        session.run(stdin.lock(), stdout.lock())?;
        return Ok(());
    }

    let dashboard = build_dashboard(&table, &selection, &options);

    let output = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&dashboard),
        OutputFormat::Json => report::generate_json_report(&dashboard)?,
        OutputFormat::Html => report::generate_html_report(&dashboard),
    };

    let output_path = match args.output {
        Some(ref path) => path.clone(),
        None => config.report_path(args.format.extension()),
    };
    report::write_report(&output, &output_path)?;

    if !args.quiet {
        println!("\n📊 Dashboard Summary:");
        println!("   Rows: {}", dashboard.metadata.rows);
        println!("   Vehicles: {}", dashboard.metadata.vehicles);
        println!("   Sections: {}", dashboard.sections.len());
        if let Some(ref vehicle) = dashboard.metadata.selected_vehicle {
            println!("   Heatmap vehicle: {}", vehicle);
        }
        println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            output_path.display()
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Also returns the path the configuration came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(CONFIG_FILE_NAME)))),
        None => Ok((Config::default(), None)),
    }
}
