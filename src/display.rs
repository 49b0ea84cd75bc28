use crate::report::{Chart, ChartKind, DashboardReport};
use crate::types::format_thousands;

const WIDTH: usize = 100;
const BAR_WIDTH: usize = 40;

/// Print the report: metric tiles first, then every chart as a text table
pub fn display_report(report: &DashboardReport) {
    println!("\n{}", "=".repeat(WIDTH));
    println!("                                  E-COMMERCE DASHBOARD");
    println!("                             {} .. {}", report.window.start, report.window.end);
    println!("{}", "=".repeat(WIDTH));

    let tiles = report.metric_tiles();
    for row in tiles.chunks(3) {
        let line: Vec<String> = row
            .iter()
            .map(|m| format!("{:<18} {:>12}", m.label, format_thousands(m.value)))
            .collect();
        println!("{}", line.join("   "));
    }

    for chart in report.charts() {
        display_chart(&chart);
    }

    println!("{}", "=".repeat(WIDTH));
}

pub fn display_chart(chart: &Chart) {
    println!("\n{}", chart.title.to_uppercase());
    println!("{}", "-".repeat(WIDTH));

    if chart.points.is_empty() {
        println!("No data");
        return;
    }

    // Horizontal bars put the category on the y axis
    let (label_axis, value_axis) = match chart.kind {
        ChartKind::HorizontalBar => (chart.y_label, chart.x_label),
        _ => (chart.x_label, chart.y_label),
    };

    println!("{:<32} {:>16}", label_axis, value_axis);

    let max = chart.points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    for (label, value) in &chart.points {
        let value_str = match chart.kind {
            ChartKind::Line => format!("{:.2}", value),
            _ => format_thousands(*value as u64),
        };
        println!("{:<32} {:>16}  {}", truncate(label, 32), value_str, bar(*value, max));
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "#".repeat(len)
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_string()
    } else {
        let cut: String = label.chars().take(width - 1).collect();
        format!("{}~", cut)
    }
}
