//! Dashboard assembly.
//!
//! Runs every aggregation against the loaded table and turns the results
//! into titled sections with tables and chart descriptors. Building is a
//! pure function of the table and the current [`Selection`], so callers
//! rebuild the whole dashboard whenever the selection changes.

use crate::analysis;
use crate::config::Config;
use crate::dataset::InspectionTable;
use crate::models::{
    Chart, ChartKind, ChartPoint, Dashboard, DashboardMetadata, InspectionCountMode,
    InspectionPartCoverage, LabelCount, Section, Table,
};
use chrono::Utc;
use tracing::debug;

/// Current values of the user controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub show_raw: bool,
    pub show_missing: bool,
    pub show_most_frequent: bool,
    pub show_least_frequent: bool,
    /// Vehicle shown in the heatmap; `None` picks the first vehicle.
    pub vehicle_id: Option<String>,
}

/// Settings that shape the dashboard but are not user selections.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub title: String,
    pub data_path: String,
    pub raw_row_limit: usize,
    pub inspection_count: InspectionCountMode,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            title: config.report.title.clone(),
            data_path: config.data.path.clone(),
            raw_row_limit: config.report.raw_row_limit,
            inspection_count: config.analysis.inspection_count,
        }
    }
}

/// Build the complete dashboard for one selection.
pub fn build_dashboard(
    table: &InspectionTable,
    selection: &Selection,
    options: &DashboardOptions,
) -> Dashboard {
    let vehicle_ids = table.vehicle_ids();
    let selected_vehicle = selection
        .vehicle_id
        .clone()
        .or_else(|| vehicle_ids.first().map(|v| v.to_string()));

    debug!(
        "Building dashboard (vehicle: {:?}, raw: {}, missing: {})",
        selected_vehicle, selection.show_raw, selection.show_missing
    );

    let mut sections = Vec::new();

    if selection.show_raw {
        sections.push(raw_data_section(table, options.raw_row_limit));
    }
    if selection.show_missing {
        sections.push(missing_values_section(table));
    }
    sections.push(vehicles_by_date_section(table));
    sections.push(part_frequency_section(table, selection));
    sections.push(vehicle_coverage_section(table));
    sections.push(part_coverage_section(table));
    sections.push(vehicle_heatmap_section(table, selected_vehicle.as_deref()));
    sections.push(inspection_frequency_section(table, options.inspection_count));

    Dashboard {
        metadata: DashboardMetadata {
            title: options.title.clone(),
            data_path: options.data_path.clone(),
            generated_at: Utc::now(),
            rows: table.len(),
            columns: table.headers().len(),
            vehicles: vehicle_ids.len(),
            inspection_count_mode: options.inspection_count,
            selected_vehicle,
        },
        sections,
    }
}

fn raw_data_section(table: &InspectionTable, limit: usize) -> Section {
    let columns: Vec<&str> = table.headers().iter().map(String::as_str).collect();
    let shown = table.len().min(limit);
    let mut raw = Table::new(
        format!("Showing {} of {} rows", shown, table.len()),
        &columns,
    );

    for row in table.rows().iter().take(limit) {
        raw.push_row(
            (0..columns.len())
                .map(|i| row.get(i).cloned().flatten().unwrap_or_default())
                .collect(),
        );
    }

    Section {
        id: "raw-data".to_string(),
        title: "Raw Data".to_string(),
        header: None,
        tables: vec![raw],
        chart: None,
    }
}

fn missing_values_section(table: &InspectionTable) -> Section {
    let summary = analysis::missing_value_summary(table);

    let mut counts = Table::new("Missing values per column", &["Column", "Missing"]);
    for entry in &summary {
        counts.push_row(vec![entry.column.clone(), entry.missing.to_string()]);
    }

    Section {
        id: "missing-values".to_string(),
        title: "Missing Values".to_string(),
        header: Some("Is there any missing information in the data?".to_string()),
        tables: vec![counts],
        chart: Some(Chart {
            kind: ChartKind::Histogram,
            title: "Histogram of Missing Values per Column".to_string(),
            x_label: "Columns".to_string(),
            y_label: "Number of Missing Values".to_string(),
            points: summary
                .iter()
                .map(|m| ChartPoint::bar(m.column.clone(), m.missing))
                .collect(),
        }),
    }
}

fn vehicles_by_date_section(table: &InspectionTable) -> Section {
    let by_date = analysis::vehicles_inspected_by_date(table);

    let mut counts = Table::new(
        "Vehicles inspected per date",
        &["Inspection date", "Number of unique vehicles"],
    );
    for entry in &by_date {
        counts.push_row(vec![entry.date.clone(), entry.vehicles.to_string()]);
    }

    Section {
        id: "vehicles-by-date".to_string(),
        title: "Number of Vehicles Inspected by Date".to_string(),
        header: Some("How many vehicles were inspected by date?".to_string()),
        tables: vec![counts],
        chart: Some(Chart {
            kind: ChartKind::Bar,
            title: "Number of Vehicles Inspected by Date".to_string(),
            x_label: "Inspection date".to_string(),
            y_label: "Number of unique vehicles".to_string(),
            points: by_date
                .iter()
                .map(|d| ChartPoint::bar(d.date.clone(), d.vehicles))
                .collect(),
        }),
    }
}

fn part_frequency_section(table: &InspectionTable, selection: &Selection) -> Section {
    let frequency = analysis::part_frequency(table);

    let mut tables = vec![label_table(
        "Detections per part",
        "Part detected",
        "Count",
        &frequency.parts,
    )];
    if selection.show_most_frequent {
        tables.push(label_table(
            "Most frequently detected parts",
            "Part detected",
            "Count",
            &frequency.most_frequent(),
        ));
    }
    if selection.show_least_frequent {
        tables.push(label_table(
            "Least frequently detected parts",
            "Part detected",
            "Count",
            &frequency.least_frequent(),
        ));
    }

    Section {
        id: "part-frequency".to_string(),
        title: "Frequency of Part Detected".to_string(),
        header: Some("Which parts were most and least frequently detected?".to_string()),
        tables,
        chart: Some(label_chart(
            "Most Frequently Detected Parts",
            "Part detected",
            "Frequency",
            &frequency.parts,
        )),
    }
}

fn vehicle_coverage_section(table: &InspectionTable) -> Section {
    let coverage = analysis::vehicle_part_counts(table);
    let count_column = "Count of Part detected";

    Section {
        id: "vehicle-coverage".to_string(),
        title: "Vehicle Inspection Coverage".to_string(),
        header: Some(
            "Which vehicles have been inspected thoroughly (max number of parts detected) \
             and which ones have poor coverage?"
                .to_string(),
        ),
        tables: vec![
            label_table(
                "Thoroughly Inspected Vehicles",
                "Vehicle ID",
                count_column,
                &coverage.thorough,
            ),
            label_table(
                "Vehicles with Poor Coverage",
                "Vehicle ID",
                count_column,
                &coverage.poor,
            ),
        ],
        chart: Some(label_chart(
            "Frequency of detected Parts by Vehicle ID",
            "Vehicle ID",
            "Frequency",
            &coverage.vehicles,
        )),
    }
}

fn part_coverage_section(table: &InspectionTable) -> Section {
    let split = analysis::inspection_part_coverage(table);

    Section {
        id: "part-coverage".to_string(),
        title: "Coverage of Parts Detected in Inspections".to_string(),
        header: Some(
            "A part detected at least 3 times in an inspection has good coverage. \
             Which parts have good coverage and which have poor coverage?"
                .to_string(),
        ),
        tables: vec![
            coverage_table("Parts with Good Coverage", &split.good),
            coverage_table("Parts with Poor Coverage", &split.poor),
        ],
        chart: Some(Chart {
            kind: ChartKind::Bar,
            title: "Coverage of Parts Detected".to_string(),
            x_label: "Part detected".to_string(),
            y_label: "Number of Detections".to_string(),
            points: split
                .all
                .iter()
                .map(|g| ChartPoint {
                    x: g.part.clone(),
                    y: None,
                    series: Some(g.coverage.to_string()),
                    value: g.count,
                })
                .collect(),
        }),
    }
}

fn vehicle_heatmap_section(table: &InspectionTable, vehicle_id: Option<&str>) -> Section {
    let heatmap = vehicle_id.map(|id| analysis::vehicle_part_coverage(table, id));

    let mut parts = Table::new(
        "Part counts and coverage",
        &["Part detected", "Count", "Coverage"],
    );
    let mut points = Vec::new();

    if let Some(ref heatmap) = heatmap {
        for part in &heatmap.parts {
            parts.push_row(vec![
                part.part.clone(),
                part.count.to_string(),
                part.coverage.to_string(),
            ]);
            points.push(ChartPoint {
                x: part.part.clone(),
                y: Some(part.coverage.to_string()),
                series: None,
                value: part.count,
            });
        }
    }

    let title = match vehicle_id {
        Some(id) => format!("Heatmap of Part Detection Coverage for Vehicle ID: {}", id),
        None => "Heatmap of Part Detection Coverage".to_string(),
    };

    Section {
        id: "vehicle-heatmap".to_string(),
        title: "Vehicle Part Inspection Coverage".to_string(),
        header: Some(
            "For the selected vehicle, which parts have been detected well and which have not?"
                .to_string(),
        ),
        tables: vec![parts],
        chart: Some(Chart {
            kind: ChartKind::Heatmap,
            title,
            x_label: "Part detected".to_string(),
            y_label: "Coverage".to_string(),
            points,
        }),
    }
}

fn inspection_frequency_section(table: &InspectionTable, mode: InspectionCountMode) -> Section {
    let frequency = analysis::inspection_frequency(table, mode);
    let count_column = "Inspection Count";

    Section {
        id: "inspection-frequency".to_string(),
        title: "Vehicle Inspection Frequency".to_string(),
        header: Some(format!(
            "Which vehicles were inspected the most and the least number of times? \
             (counting {})",
            mode
        )),
        tables: vec![
            label_table(
                "Most Inspected Vehicles",
                "Vehicle ID",
                count_column,
                &frequency.most,
            ),
            label_table(
                "Least Inspected Vehicles",
                "Vehicle ID",
                count_column,
                &frequency.least,
            ),
        ],
        chart: Some(label_chart(
            "Vehicle Inspection Frequency",
            "Vehicle ID",
            "Number of Inspections",
            &frequency.vehicles,
        )),
    }
}

fn label_table(
    caption: &str,
    label_column: &str,
    count_column: &str,
    counts: &[LabelCount],
) -> Table {
    let mut table = Table::new(caption, &[label_column, count_column]);
    for entry in counts {
        table.push_row(vec![entry.label.clone(), entry.count.to_string()]);
    }
    table
}

fn label_chart(title: &str, x_label: &str, y_label: &str, counts: &[LabelCount]) -> Chart {
    Chart {
        kind: ChartKind::Bar,
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points: counts
            .iter()
            .map(|c| ChartPoint::bar(c.label.clone(), c.count))
            .collect(),
    }
}

fn coverage_table(caption: &str, groups: &[InspectionPartCoverage]) -> Table {
    let mut table = Table::new(
        caption,
        &["Inspection ID", "Part detected", "Count", "Coverage"],
    );
    for group in groups {
        table.push_row(vec![
            group.inspection_id.clone(),
            group.part.clone(),
            group.count.to_string(),
            group.coverage.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::table;

    const HEADER: &str = "Inspection ID,Vehicle ID,Inspection date,Part detected";

    fn sample() -> InspectionTable {
        table(&format!(
            "{HEADER}\n\
             1,A,2023-01-01,brake\n\
             1,A,2023-01-01,brake\n\
             1,A,2023-01-01,brake\n\
             2,B,2023-01-02,tire\n\
             2,B,2023-01-02,\n"
        ))
    }

    fn ids(dashboard: &Dashboard) -> Vec<&str> {
        dashboard.sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_default_sections() {
        let dashboard = build_dashboard(&sample(), &Selection::default(), &DashboardOptions::default());

        assert_eq!(
            ids(&dashboard),
            vec![
                "vehicles-by-date",
                "part-frequency",
                "vehicle-coverage",
                "part-coverage",
                "vehicle-heatmap",
                "inspection-frequency",
            ]
        );
        assert_eq!(dashboard.metadata.rows, 5);
        assert_eq!(dashboard.metadata.vehicles, 2);
        // Defaults to the first vehicle in the file.
        assert_eq!(dashboard.metadata.selected_vehicle.as_deref(), Some("A"));
    }

    #[test]
    fn test_toggles_add_sections_and_tables() {
        let selection = Selection {
            show_raw: true,
            show_missing: true,
            show_most_frequent: true,
            show_least_frequent: true,
            vehicle_id: None,
        };
        let dashboard = build_dashboard(&sample(), &selection, &DashboardOptions::default());

        assert_eq!(ids(&dashboard)[..2], ["raw-data", "missing-values"]);

        let parts = dashboard.section("part-frequency").unwrap();
        assert_eq!(parts.tables.len(), 3);
        assert_eq!(parts.tables[1].rows, vec![vec!["brake".to_string(), "3".to_string()]]);
        assert_eq!(parts.tables[2].rows, vec![vec!["tire".to_string(), "1".to_string()]]);

        let missing = dashboard.section("missing-values").unwrap();
        assert_eq!(missing.chart.as_ref().unwrap().kind, ChartKind::Histogram);
        assert_eq!(missing.tables[0].rows[3], vec!["Part detected".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_raw_data_respects_limit() {
        let selection = Selection {
            show_raw: true,
            ..Selection::default()
        };
        let options = DashboardOptions {
            raw_row_limit: 2,
            ..DashboardOptions::default()
        };
        let dashboard = build_dashboard(&sample(), &selection, &options);

        let raw = &dashboard.section("raw-data").unwrap().tables[0];
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.caption, "Showing 2 of 5 rows");
        assert_eq!(raw.columns.len(), 4);
    }

    #[test]
    fn test_chart_kinds() {
        let dashboard = build_dashboard(&sample(), &Selection::default(), &DashboardOptions::default());
        let kind = |id: &str| dashboard.section(id).unwrap().chart.as_ref().unwrap().kind;

        assert_eq!(kind("vehicles-by-date"), ChartKind::Bar);
        assert_eq!(kind("part-frequency"), ChartKind::Bar);
        assert_eq!(kind("vehicle-coverage"), ChartKind::Bar);
        assert_eq!(kind("part-coverage"), ChartKind::Bar);
        assert_eq!(kind("vehicle-heatmap"), ChartKind::Heatmap);
        assert_eq!(kind("inspection-frequency"), ChartKind::Bar);
    }

    #[test]
    fn test_heatmap_for_selected_vehicle() {
        let selection = Selection {
            vehicle_id: Some("A".to_string()),
            ..Selection::default()
        };
        let dashboard = build_dashboard(&sample(), &selection, &DashboardOptions::default());

        let chart = dashboard.section("vehicle-heatmap").unwrap().chart.clone().unwrap();
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].x, "brake");
        assert_eq!(chart.points[0].y.as_deref(), Some("Good"));
        assert_eq!(chart.points[0].value, 3);
    }

    #[test]
    fn test_unknown_vehicle_renders_empty_heatmap() {
        let selection = Selection {
            vehicle_id: Some("nope".to_string()),
            ..Selection::default()
        };
        let dashboard = build_dashboard(&sample(), &selection, &DashboardOptions::default());

        let section = dashboard.section("vehicle-heatmap").unwrap();
        assert!(section.tables[0].is_empty());
        assert!(section.chart.as_ref().unwrap().points.is_empty());
    }

    #[test]
    fn test_empty_table_builds() {
        let empty = table(&format!("{HEADER}\n"));
        let dashboard = build_dashboard(&empty, &Selection::default(), &DashboardOptions::default());

        assert_eq!(dashboard.metadata.selected_vehicle, None);
        for section in &dashboard.sections {
            assert!(section.tables.iter().all(Table::is_empty), "{}", section.id);
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let t = sample();
        let selection = Selection::default();
        let options = DashboardOptions::default();

        let first = build_dashboard(&t, &selection, &options);
        let second = build_dashboard(&t, &selection, &options);
        assert_eq!(first.sections, second.sections);
    }
}
