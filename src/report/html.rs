//! HTML report generation
//!
//! Generates a self-contained HTML dashboard with embedded CSS. Charts are
//! drawn as inline SVG so the report works offline without scripts.

use crate::models::{Chart, ChartKind, Dashboard, DashboardMetadata, Section, Table};

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 72.0;

/// Render a dashboard as an HTML page
pub fn generate_html_report(dashboard: &Dashboard) -> String {
    let sections: String = dashboard.sections.iter().map(render_section).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {sections}
        {footer}
    </div>
</body>
</html>"#,
        title = html_escape(&dashboard.metadata.title),
        css = inline_css(),
        header = render_header(&dashboard.metadata),
        sections = sections,
        footer = render_footer(),
    )
}

fn render_header(metadata: &DashboardMetadata) -> String {
    let vehicle = metadata
        .selected_vehicle
        .as_deref()
        .map(|v| format!(r#" • <span>Vehicle: <strong>{}</strong></span>"#, html_escape(v)))
        .unwrap_or_default();

    format!(
        r#"<header>
    <h1>{title}</h1>
    <div class="meta">
        <span>Dataset: <code>{path}</code></span> •
        <span>{rows} rows, {columns} columns, {vehicles} vehicles</span> •
        <span>Generated: {generated}</span>{vehicle}
    </div>
</header>"#,
        title = html_escape(&metadata.title),
        path = html_escape(&metadata.data_path),
        rows = metadata.rows,
        columns = metadata.columns,
        vehicles = metadata.vehicles,
        generated = metadata.generated_at.format("%Y-%m-%d %H:%M UTC"),
        vehicle = vehicle,
    )
}

fn render_section(section: &Section) -> String {
    let header = section
        .header
        .as_deref()
        .map(|h| format!(r#"<p class="question">{}</p>"#, html_escape(h)))
        .unwrap_or_default();
    let chart = section.chart.as_ref().map(render_chart).unwrap_or_default();
    let tables: String = section.tables.iter().map(render_table).collect();

    format!(
        r#"
<section id="{id}">
    <h2>{title}</h2>
    {header}
    {chart}
    {tables}
</section>"#,
        id = html_escape(&section.id),
        title = html_escape(&section.title),
        header = header,
        chart = chart,
        tables = tables,
    )
}

fn render_table(table: &Table) -> String {
    if table.is_empty() {
        return format!(
            r#"<h3>{}</h3><p class="empty">No rows.</p>"#,
            html_escape(&table.caption)
        );
    }

    let head: String = table
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(c)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();

    format!(
        r#"<h3>{caption}</h3>
<table><thead><tr>{head}</tr></thead><tbody>{body}</tbody></table>"#,
        caption = html_escape(&table.caption),
        head = head,
        body = body,
    )
}

fn render_chart(chart: &Chart) -> String {
    let body = if chart.points.is_empty() {
        format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle" class="no-data">No data</text>"#,
            x = CHART_WIDTH / 2.0,
            y = CHART_HEIGHT / 2.0,
        )
    } else {
        match chart.kind {
            ChartKind::Bar => render_bars(chart, 0.2),
            ChartKind::Histogram => render_bars(chart, 0.0),
            ChartKind::Heatmap => render_heatmap(chart),
        }
    };

    format!(
        r#"<figure class="chart chart-{kind}">
    <figcaption>{title}</figcaption>
    <svg viewBox="0 0 {w} {h}" role="img" aria-label="{title}">
        {body}
        <text x="{xl_x}" y="{xl_y}" text-anchor="middle" class="axis-label">{x_label}</text>
        <text x="14" y="{yl_y}" text-anchor="middle" class="axis-label" transform="rotate(-90 14 {yl_y})">{y_label}</text>
    </svg>
</figure>"#,
        kind = kind_class(chart.kind),
        title = html_escape(&chart.title),
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        body = body,
        xl_x = MARGIN_LEFT + plot_width() / 2.0,
        xl_y = CHART_HEIGHT - 6.0,
        yl_y = MARGIN_TOP + plot_height() / 2.0,
        x_label = html_escape(&chart.x_label),
        y_label = html_escape(&chart.y_label),
    )
}

/// Bars scaled to the largest value; `gap` is the fraction of each slot left empty.
fn render_bars(chart: &Chart, gap: f64) -> String {
    let max = chart.max_value().max(1) as f64;
    let slot = plot_width() / chart.points.len() as f64;
    let bar_width = slot * (1.0 - gap);
    let baseline = MARGIN_TOP + plot_height();

    let mut svg = String::new();
    svg.push_str(&render_axes(chart.max_value()));

    for (i, point) in chart.points.iter().enumerate() {
        let height = point.value as f64 / max * plot_height();
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let label_x = MARGIN_LEFT + slot * (i as f64 + 0.5);

        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{label}: {value}</title></rect>"#,
            x = x,
            y = baseline - height,
            w = bar_width,
            h = height,
            fill = series_color(point.series.as_deref()),
            label = html_escape(&point.x),
            value = point.value,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" class="tick" transform="rotate(-40 {x:.1} {y:.1})">{label}</text>"#,
            x = label_x,
            y = baseline + 12.0,
            label = html_escape(&point.x),
        ));
    }

    svg
}

/// Grid of x by y categories; cell opacity is proportional to the value.
fn render_heatmap(chart: &Chart) -> String {
    let xs = distinct(chart.points.iter().map(|p| p.x.as_str()));
    let ys = distinct(chart.points.iter().map(|p| p.y.as_deref().unwrap_or("")));
    let max = chart.max_value().max(1) as f64;

    let cell_w = plot_width() / xs.len() as f64;
    let cell_h = plot_height() / ys.len() as f64;

    let mut svg = String::new();

    for point in &chart.points {
        let col = xs.iter().position(|x| *x == point.x).unwrap_or(0);
        let row = ys
            .iter()
            .position(|y| Some(*y) == point.y.as_deref())
            .unwrap_or(0);
        let x = MARGIN_LEFT + cell_w * col as f64;
        let y = MARGIN_TOP + cell_h * row as f64;

        svg.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="#3b528b" fill-opacity="{o:.2}"><title>{label}: {value}</title></rect>"##,
            x = x,
            y = y,
            w = cell_w,
            h = cell_h,
            o = 0.15 + 0.85 * point.value as f64 / max,
            label = html_escape(&point.x),
            value = point.value,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" class="cell">{value}</text>"#,
            x = x + cell_w / 2.0,
            y = y + cell_h / 2.0 + 4.0,
            value = point.value,
        ));
    }

    for (i, x) in xs.iter().enumerate() {
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" class="tick">{label}</text>"#,
            x = MARGIN_LEFT + cell_w * (i as f64 + 0.5),
            y = MARGIN_TOP + plot_height() + 16.0,
            label = html_escape(x),
        ));
    }
    for (i, y) in ys.iter().enumerate() {
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" class="tick">{label}</text>"#,
            x = MARGIN_LEFT - 6.0,
            y = MARGIN_TOP + cell_h * (i as f64 + 0.5),
            label = html_escape(y),
        ));
    }

    svg
}

fn render_axes(max: usize) -> String {
    let baseline = MARGIN_TOP + plot_height();
    format!(
        r#"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" class="axis"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" class="axis"/><text x="{lt}" y="{tt}" text-anchor="end" class="tick">{max}</text><text x="{lt}" y="{b}" text-anchor="end" class="tick">0</text>"#,
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = baseline,
        r = CHART_WIDTH - MARGIN_RIGHT,
        lt = MARGIN_LEFT - 6.0,
        tt = MARGIN_TOP + 4.0,
        max = max,
    )
}

fn plot_width() -> f64 {
    CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

fn series_color(series: Option<&str>) -> &'static str {
    match series {
        Some("Good") => "#16a34a",
        Some("Poor") => "#dc2626",
        Some(_) => "#8b5cf6",
        None => "#3b82f6",
    }
}

fn kind_class(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bar => "bar",
        ChartKind::Histogram => "histogram",
        ChartKind::Heatmap => "heatmap",
    }
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f9fafb; color: #111827; }
.container { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
header h1 { margin: 0 0 0.5rem; }
.meta { color: #6b7280; font-size: 0.875rem; }
section { background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.5rem; margin-top: 1.5rem; }
.question { color: #374151; font-style: italic; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1rem; font-size: 0.875rem; }
th, td { border-bottom: 1px solid #e5e7eb; padding: 0.35rem 0.5rem; text-align: left; }
th { background: #f3f4f6; }
.empty { color: #9ca3af; }
figure.chart { margin: 1rem 0; }
figcaption { font-weight: 600; font-size: 0.875rem; margin-bottom: 0.25rem; }
svg { width: 100%; height: auto; }
.axis { stroke: #9ca3af; stroke-width: 1; }
.tick { font-size: 10px; fill: #4b5563; }
.axis-label { font-size: 11px; fill: #374151; font-weight: 600; }
.cell { font-size: 11px; fill: #fff; }
.no-data { font-size: 14px; fill: #9ca3af; }
footer { text-align: center; color: #9ca3af; font-size: 0.75rem; margin-top: 2rem; }
"#
}

fn render_footer() -> String {
    format!(
        r#"<footer>
    <p>Generated by InspectBoard v{}</p>
</footer>"#,
        env!("CARGO_PKG_VERSION")
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPoint, InspectionCountMode};
    use chrono::Utc;

    fn chart(kind: ChartKind, points: Vec<ChartPoint>) -> Chart {
        Chart {
            kind,
            title: "Test chart".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            points,
        }
    }

    fn dashboard(sections: Vec<Section>) -> Dashboard {
        Dashboard {
            metadata: DashboardMetadata {
                title: "Inspection <Dashboard>".to_string(),
                data_path: "data.csv".to_string(),
                generated_at: Utc::now(),
                rows: 3,
                columns: 4,
                vehicles: 1,
                inspection_count_mode: InspectionCountMode::Distinct,
                selected_vehicle: Some("V&1".to_string()),
            },
            sections,
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_page_is_escaped_and_self_contained() {
        let html = generate_html_report(&dashboard(Vec::new()));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Inspection &lt;Dashboard&gt;</title>"));
        assert!(html.contains("V&amp;1"));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_bar_chart_draws_one_rect_per_point() {
        let svg = render_chart(&chart(
            ChartKind::Bar,
            vec![ChartPoint::bar("brake", 4), ChartPoint::bar("tire", 2)],
        ));

        assert!(svg.contains("chart-bar"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("<title>brake: 4</title>"));
    }

    #[test]
    fn test_coverage_series_colors() {
        let points = vec![
            ChartPoint {
                x: "brake".to_string(),
                y: None,
                series: Some("Good".to_string()),
                value: 3,
            },
            ChartPoint {
                x: "tire".to_string(),
                y: None,
                series: Some("Poor".to_string()),
                value: 1,
            },
        ];
        let svg = render_chart(&chart(ChartKind::Bar, points));

        assert!(svg.contains(series_color(Some("Good"))));
        assert!(svg.contains(series_color(Some("Poor"))));
    }

    #[test]
    fn test_heatmap_grid() {
        let point = |x: &str, y: &str, value| ChartPoint {
            x: x.to_string(),
            y: Some(y.to_string()),
            series: None,
            value,
        };
        let svg = render_chart(&chart(
            ChartKind::Heatmap,
            vec![point("brake", "Good", 4), point("tire", "Poor", 1)],
        ));

        assert!(svg.contains("chart-heatmap"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(">Good</text>"));
        assert!(svg.contains(">Poor</text>"));
        assert!(svg.contains(r#"fill-opacity="1.00""#));
    }

    #[test]
    fn test_empty_chart_shows_no_data() {
        let svg = render_chart(&chart(ChartKind::Heatmap, Vec::new()));
        assert!(svg.contains("No data"));
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn test_section_renders_tables() {
        let mut table = Table::new("Detections per part", &["Part detected", "Count"]);
        table.push_row(vec!["brake".to_string(), "4".to_string()]);

        let html = generate_html_report(&dashboard(vec![Section {
            id: "part-frequency".to_string(),
            title: "Frequency of Part Detected".to_string(),
            header: Some("Which parts?".to_string()),
            tables: vec![table, Table::new("Empty", &["A"])],
            chart: Some(chart(ChartKind::Histogram, vec![ChartPoint::bar("brake", 4)])),
        }]));

        assert!(html.contains(r#"<section id="part-frequency">"#));
        assert!(html.contains("<td>brake</td><td>4</td>"));
        assert!(html.contains("No rows."));
        assert!(html.contains("chart-histogram"));
    }
}
