//! Data models for the inspection dashboard.
//!
//! This module contains the derived tables produced by the aggregation
//! pipeline and the dashboard structures handed to the report renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A part detected at least this many times is considered well covered.
pub const GOOD_COVERAGE_THRESHOLD: usize = 3;

/// Coverage classification of a detected part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coverage {
    /// Detected at least [`GOOD_COVERAGE_THRESHOLD`] times
    Good,
    /// Detected fewer than [`GOOD_COVERAGE_THRESHOLD`] times
    Poor,
}

impl Coverage {
    /// Classify a detection count.
    pub fn classify(count: usize) -> Self {
        if count >= GOOD_COVERAGE_THRESHOLD {
            Coverage::Good
        } else {
            Coverage::Poor
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Good => write!(f, "Good"),
            Coverage::Poor => write!(f, "Poor"),
        }
    }
}

/// How inspections are counted per vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionCountMode {
    /// Count distinct Inspection IDs.
    #[default]
    Distinct,
    /// Count records (one per detected part).
    Rows,
}

impl fmt::Display for InspectionCountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionCountMode::Distinct => write!(f, "distinct inspections"),
            InspectionCountMode::Rows => write!(f, "rows"),
        }
    }
}

/// Number of null entries in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Distinct vehicles inspected on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateVehicleCount {
    pub date: String,
    pub vehicles: usize,
}

/// A label (part name or vehicle ID) with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Returns every entry whose count equals the maximum, in input order.
pub fn max_ties(counts: &[LabelCount]) -> Vec<LabelCount> {
    match counts.iter().map(|c| c.count).max() {
        Some(max) => counts.iter().filter(|c| c.count == max).cloned().collect(),
        None => Vec::new(),
    }
}

/// Returns every entry whose count equals the minimum, in input order.
pub fn min_ties(counts: &[LabelCount]) -> Vec<LabelCount> {
    match counts.iter().map(|c| c.count).min() {
        Some(min) => counts.iter().filter(|c| c.count == min).cloned().collect(),
        None => Vec::new(),
    }
}

/// Part detection frequency, sorted by count descending.
///
/// Parts with equal counts are in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartFrequency {
    pub parts: Vec<LabelCount>,
}

impl PartFrequency {
    /// All parts tied at the highest count.
    pub fn most_frequent(&self) -> Vec<LabelCount> {
        max_ties(&self.parts)
    }

    /// All parts tied at the lowest count.
    pub fn least_frequent(&self) -> Vec<LabelCount> {
        min_ties(&self.parts)
    }
}

/// Parts detected per vehicle, with the vehicles at both extremes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCoverage {
    /// One entry per vehicle, ordered by vehicle ID.
    pub vehicles: Vec<LabelCount>,
    /// Vehicles tied at the maximum part count.
    pub thorough: Vec<LabelCount>,
    /// Vehicles tied at the minimum part count.
    pub poor: Vec<LabelCount>,
}

/// Detection count of one part within one inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionPartCoverage {
    pub inspection_id: String,
    pub part: String,
    pub count: usize,
    pub coverage: Coverage,
}

/// Per-inspection part coverage, partitioned by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSplit {
    /// Every (inspection, part) group, ordered by key.
    pub all: Vec<InspectionPartCoverage>,
    pub good: Vec<InspectionPartCoverage>,
    pub poor: Vec<InspectionPartCoverage>,
}

/// Detection count of one part for a single vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCoverage {
    pub part: String,
    pub count: usize,
    pub coverage: Coverage,
}

/// Part coverage for the selected vehicle, keyed for a heatmap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleHeatmap {
    pub vehicle_id: String,
    pub parts: Vec<PartCoverage>,
}

/// Inspection counts per vehicle, sorted by count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFrequency {
    pub mode: InspectionCountMode,
    pub vehicles: Vec<LabelCount>,
    /// Vehicles tied at the highest count.
    pub most: Vec<LabelCount>,
    /// Vehicles tied at the lowest count.
    pub least: Vec<LabelCount>,
}

/// A plain table of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub caption: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given caption and column names.
    pub fn new(caption: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            caption: caption.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Kind of chart a section is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Histogram,
    Heatmap,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "Bar chart"),
            ChartKind::Histogram => write!(f, "Histogram"),
            ChartKind::Heatmap => write!(f, "Heatmap"),
        }
    }
}

/// One data point of a chart.
///
/// Bar charts and histograms use `x` and `value`; `series` selects the
/// colour. Heatmaps additionally use `y` as the row category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub value: usize,
}

impl ChartPoint {
    pub fn bar(x: impl Into<String>, value: usize) -> Self {
        Self {
            x: x.into(),
            y: None,
            series: None,
            value,
        }
    }
}

/// Chart descriptor handed to the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

impl Chart {
    pub fn max_value(&self) -> usize {
        self.points.iter().map(|p| p.value).max().unwrap_or(0)
    }
}

/// One section of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier used for anchors.
    pub id: String,
    pub title: String,
    /// The question the section answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub tables: Vec<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

/// Metadata about a rendered dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetadata {
    pub title: String,
    pub data_path: String,
    pub generated_at: DateTime<Utc>,
    pub rows: usize,
    pub columns: usize,
    pub vehicles: usize,
    pub inspection_count_mode: InspectionCountMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_vehicle: Option<String>,
}

/// The complete dashboard for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    pub sections: Vec<Section>,
}

impl Dashboard {
    /// Look up a section by its identifier.
    #[cfg(test)]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}
