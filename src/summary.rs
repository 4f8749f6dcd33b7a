use crate::data::BomboData;
use crate::formatting::{
    format_currency, format_grouped, format_months, format_multiple, format_number,
    format_percentage, format_trend,
};
use crate::metrics::DashboardMetrics;
use chrono::{DateTime, Local};
use colored::Colorize;
use std::path::Path;

const COMPACT_MONTHS: usize = 6;

pub struct SummaryPaths<'a> {
    pub html: Option<&'a Path>,
    pub series: Option<&'a Path>,
    pub json: Option<&'a Path>,
}

pub struct SummaryContext<'a> {
    pub data: &'a BomboData,
    pub metrics: &'a DashboardMetrics,
    pub run_started_at: &'a DateTime<Local>,
    pub paths: SummaryPaths<'a>,
    pub full_output: bool,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_paths(&context.paths);
    println!();
    println!("{}", "Key Metrics".bold().bright_magenta());
    print_key_metrics(context);
    println!();
    println!("{}", "Monthly Series".bold().bright_magenta());
    let table_width = print_monthly_table(context);
    if table_width > 0 {
        let divider = "=".repeat(table_width);
        println!("{}", divider.bright_cyan());
    }
}

fn print_summary_header(context: &SummaryContext<'_>) {
    let company = &context.data.company;
    println!(
        "{}",
        format!("==================== {} Dashboard ====================", company.name)
            .bold()
            .bright_cyan()
    );
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    println!(
        "{} {} | {}",
        "Company".bright_yellow().bold(),
        format!("{} ({})", company.name, company.stage).bright_white(),
        format!("data as of {}", company.as_of).bright_white()
    );
}

fn print_summary_paths(paths: &SummaryPaths<'_>) {
    print_path_line("HTML Dashboard", paths.html, "not saved (use --save-html)");
    print_path_line("Monthly CSV", paths.series, "not saved (use --save-series)");
    print_path_line("Data JSON", paths.json, "not saved (use --save-json)");
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

/// Label/value pairs shown under "Key Metrics", in display order.
#[must_use]
pub fn key_metric_lines(data: &BomboData, metrics: &DashboardMetrics) -> Vec<(&'static str, String)> {
    let key = &data.key_metrics;
    let economics = &data.unit_economics;
    vec![
        (
            "Total users",
            format!(
                "{} ({})",
                format_number(Some(f64::from(key.total_users))),
                format_grouped(f64::from(key.total_users))
            ),
        ),
        (
            "Monthly active users",
            format_number(Some(f64::from(key.monthly_active_users))),
        ),
        ("Total GTV", format_currency(key.total_gtv)),
        (
            "Monthly GTV",
            format!(
                "{} ({} MoM)",
                format_currency(key.monthly_gtv),
                format_trend(metrics.latest_growth())
            ),
        ),
        ("Month-1 retention", format_percentage(key.retention_rate)),
        (
            "DAU / MAU",
            format_percentage(metrics.latest_stickiness().unwrap_or_default()),
        ),
        (
            "LTV:CAC",
            format_multiple(metrics.ltv_to_cac.unwrap_or_default()),
        ),
        ("CAC payback", format_months(economics.payback_months)),
    ]
}

fn print_key_metrics(context: &SummaryContext<'_>) {
    let lines = key_metric_lines(context.data, context.metrics);
    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in lines {
        println!(
            "{} {}",
            format!("{label:<label_width$}").bright_yellow(),
            value.bright_white().bold()
        );
    }
}

fn print_monthly_table(context: &SummaryContext<'_>) -> usize {
    let monthly = context.data.monthly;
    if monthly.is_empty() {
        let message = "No monthly data available.";
        println!("{}", message.bright_black());
        return message.len();
    }

    let header = format!(
        "{:<7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7}",
        "Month", "MAU", "DAU", "DAU/MAU", "New", "GTV", "GTV MoM"
    );
    let separator = "--------+---------+---------+---------+---------+---------+--------";
    let mut max_width = header.len().max(separator.len());
    println!("{}", header.bold().bright_white());
    println!("{}", separator.bright_black());

    let skip = if context.full_output {
        0
    } else {
        monthly.len().saturating_sub(COMPACT_MONTHS)
    };
    for (idx, point) in monthly.iter().enumerate().skip(skip) {
        let stickiness = context
            .metrics
            .stickiness
            .get(idx)
            .copied()
            .unwrap_or_default();
        let growth = context.metrics.gtv_growth.get(idx).copied().flatten();
        let line = format!(
            "{:<7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7}",
            point.month,
            format_number(Some(f64::from(point.mau))),
            format_number(Some(f64::from(point.dau))),
            format_percentage(stickiness),
            format_number(Some(f64::from(point.new_users))),
            format_currency(point.gtv),
            format_trend(growth)
        );
        max_width = max_width.max(line.len());
        println!("{}", line.bright_green());
    }
    if skip > 0 {
        let message = format!(
            "... {skip} earlier months (use --full-output to display all)."
        );
        max_width = max_width.max(message.len());
        println!("{}", message.bright_black());
    }

    max_width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bombo_data;

    #[test]
    fn key_metric_lines_are_formatted() {
        let data = bombo_data();
        let metrics = DashboardMetrics::from_data(data);
        let lines = key_metric_lines(data, &metrics);
        let lookup = |label: &str| {
            lines
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        assert_eq!(lookup("Total users"), "801K (801,492)");
        assert_eq!(lookup("Monthly active users"), "316K");
        assert_eq!(lookup("Total GTV"), "$70.0M");
        assert_eq!(lookup("Monthly GTV"), "$9.4M (+25.3% MoM)");
        assert_eq!(lookup("Month-1 retention"), "56.9%");
        assert_eq!(lookup("LTV:CAC"), "7.8x");
    }
}
