//! Markdown and JSON report generation.
//!
//! This module turns a built [`Dashboard`] into a Markdown document or a
//! JSON string.

use crate::models::{Chart, Dashboard, DashboardMetadata, Section, Table};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", dashboard.metadata.title));

    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_table_of_contents(&dashboard.sections));

    for section in &dashboard.sections {
        output.push_str(&generate_section(section));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.data_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Rows:** {} | **Columns:** {} | **Vehicles:** {}\n",
        metadata.rows, metadata.columns, metadata.vehicles
    ));
    section.push_str(&format!(
        "- **Inspection counting:** {}\n",
        metadata.inspection_count_mode
    ));
    if let Some(ref vehicle) = metadata.selected_vehicle {
        section.push_str(&format!("- **Selected vehicle:** {}\n", vehicle));
    }
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(sections: &[Section]) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    for section in sections {
        toc.push_str(&format!("- [{}](#{})\n", section.title, section.id));
    }
    toc.push('\n');

    toc
}

/// Generate one dashboard section.
fn generate_section(section: &Section) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {} {{#{}}}\n\n", section.title, section.id));

    if let Some(ref header) = section.header {
        output.push_str(&format!("**{}**\n\n", header));
    }

    for table in &section.tables {
        output.push_str(&generate_table(table));
    }

    if let Some(ref chart) = section.chart {
        output.push_str(&generate_chart_caption(chart));
    }

    output
}

/// Generate a pipe table with its caption.
fn generate_table(table: &Table) -> String {
    let mut output = String::new();

    output.push_str(&format!("### {}\n\n", table.caption));

    if table.is_empty() {
        output.push_str("_No rows._\n\n");
        return output;
    }

    output.push_str(&format!("| {} |\n", escape_cells(&table.columns).join(" | ")));
    output.push_str(&format!(
        "|{}\n",
        table.columns.iter().map(|_| ":---|").collect::<String>()
    ));
    for row in &table.rows {
        output.push_str(&format!("| {} |\n", escape_cells(row).join(" | ")));
    }
    output.push('\n');

    output
}

/// Generate a one-line description of a chart.
fn generate_chart_caption(chart: &Chart) -> String {
    if chart.points.is_empty() {
        return format!("*{}: {} (no data)*\n\n", chart.kind, chart.title);
    }

    format!(
        "*{}: {} ({} vs {}, {} points, max {})*\n\n",
        chart.kind,
        chart.title,
        chart.y_label,
        chart.x_label,
        chart.points.len(),
        chart.max_value()
    )
}

fn escape_cells(cells: &[String]) -> Vec<String> {
    cells.iter().map(|c| c.replace('|', "\\|")).collect()
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by InspectBoard v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
