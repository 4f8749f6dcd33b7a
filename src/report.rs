use crate::charts::{Series, bar_chart, line_chart};
use crate::data::{BomboData, Cohort};
use crate::formatting::{
    format_currency, format_grouped, format_months, format_multiple, format_number,
    format_percentage, format_trend,
};
use crate::metrics::DashboardMetrics;
use crate::write_output_file;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use minify_html::{Cfg, minify};
use std::path::Path;
use tracing::info;

pub struct DownloadPaths<'a> {
    pub series: Option<&'a Path>,
    pub json: Option<&'a Path>,
}

pub struct DashboardContext<'a> {
    pub data: &'a BomboData,
    pub metrics: &'a DashboardMetrics,
    pub generated_at: &'a DateTime<Local>,
    pub downloads: DownloadPaths<'a>,
    pub output_path: &'a Path,
}

pub async fn save_html_report(
    output_path: &Path,
    context: &DashboardContext<'_>,
    minify_output: bool,
) -> Result<()> {
    let html = render_html(context, minify_output)?;
    write_output_file(output_path, html.as_bytes()).await?;
    info!(path = %output_path.display(), bytes = html.len(), "wrote dashboard");
    Ok(())
}

pub fn render_html(context: &DashboardContext<'_>, minify_output: bool) -> Result<String> {
    let page = render_dashboard(context).into_string();
    if !minify_output {
        return Ok(page);
    }
    let cfg = Cfg {
        keep_closing_tags: true,
        minify_css: true,
        ..Cfg::default()
    };
    String::from_utf8(minify(page.as_bytes(), &cfg)).context("minified dashboard is not UTF-8")
}

#[must_use]
pub fn render_dashboard(context: &DashboardContext<'_>) -> Markup {
    let data = context.data;
    let title = format!("{} Investor Dashboard - {}", data.company.name, data.company.as_of);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="color-scheme" content="light";
                link rel="preconnect" href=(CDN_FONTS_GOOGLEAPIS);
                link rel="preconnect" href=(CDN_FONTS_GSTATIC) crossorigin;
                link href=(CDN_FONTS_STYLESHEET) rel="stylesheet";
                style { (PreEscaped(DASHBOARD_STYLE)) }
            }
            body {
                div class="page" {
                    (render_hero(context))
                    (render_metric_cards(context))
                    (render_growth(context))
                    (render_unit_economics(context))
                    (render_segments(context))
                    (render_cohorts(data.cohorts, &context.metrics.retention_curve))
                    @for entry in data.sections {
                        section id=(entry.id) class="narrative" {
                            h2 { (entry.title) }
                            p { (entry.body) }
                        }
                    }
                    (render_footer(context))
                }
            }
        }
    }
}

fn render_hero(context: &DashboardContext<'_>) -> Markup {
    let company = &context.data.company;
    let generated_at = context
        .generated_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    html! {
        header id="hero" class="hero" {
            div class="hero-top" {
                div class="pill" { (company.stage) }
                div class="pill muted-pill" { "bombo-dash v" (env!("CARGO_PKG_VERSION")) }
            }
            h1 { (company.name) }
            p class="subtitle" { (company.tagline) }
            div class="meta" {
                div {
                    span class="label" { "Data as of" }
                    span class="value mono" { (company.as_of) }
                }
                div {
                    span class="label" { "Generated" }
                    span class="value mono" { (generated_at) }
                }
            }
        }
    }
}

fn metric_card(label: &str, value: &str, detail: Option<&str>, exact: &str) -> Markup {
    html! {
        div class="card" title=(exact) {
            div class="card-label" { (label) }
            div class="card-value" { (value) }
            @if let Some(detail) = detail {
                div class="card-detail" { (detail) }
            }
        }
    }
}

fn trend_class(trend: Option<f64>) -> &'static str {
    match trend {
        Some(value) if value >= 0.05 => "up",
        Some(value) if value <= -0.05 => "down",
        _ => "neutral",
    }
}

fn render_metric_cards(context: &DashboardContext<'_>) -> Markup {
    let key = &context.data.key_metrics;
    let growth = context.metrics.latest_growth();
    let stickiness = context.metrics.latest_stickiness().unwrap_or_default();
    html! {
        section id="metrics" class="cards" {
            (metric_card(
                "Total users",
                &format_number(Some(f64::from(key.total_users))),
                None,
                &format_grouped(f64::from(key.total_users)),
            ))
            (metric_card(
                "Monthly active users",
                &format_number(Some(f64::from(key.monthly_active_users))),
                None,
                &format_grouped(f64::from(key.monthly_active_users)),
            ))
            (metric_card(
                "Total GTV",
                &format_currency(key.total_gtv),
                None,
                &format_grouped(key.total_gtv),
            ))
            div class="card" title=(format_grouped(key.monthly_gtv)) {
                div class="card-label" { "Monthly GTV" }
                div class="card-value" { (format_currency(key.monthly_gtv)) }
                div class="card-detail" {
                    span class=(format!("trend {}", trend_class(growth))) { (format_trend(growth)) }
                    " MoM"
                }
            }
            (metric_card(
                "Month-1 retention",
                &format_percentage(key.retention_rate),
                Some("avg. across cohorts"),
                &format_grouped(key.retention_rate),
            ))
            (metric_card(
                "DAU / MAU",
                &format_percentage(stickiness),
                Some("latest month"),
                &format_grouped(stickiness),
            ))
            (metric_card(
                "Transactions",
                &format_number(Some(f64::from(key.total_transactions))),
                None,
                &format_grouped(f64::from(key.total_transactions)),
            ))
            (metric_card(
                "Avg. transaction",
                &format_currency(key.avg_transaction_value),
                None,
                &format_grouped(key.avg_transaction_value),
            ))
        }
    }
}

fn render_growth(context: &DashboardContext<'_>) -> Markup {
    let monthly = context.data.monthly;
    let labels: Vec<&str> = monthly.iter().map(|p| p.month).collect();
    let users = [
        Series {
            label: "MAU",
            class: "mau",
            values: monthly.iter().map(|p| f64::from(p.mau)).collect(),
        },
        Series {
            label: "DAU",
            class: "dau",
            values: monthly.iter().map(|p| f64::from(p.dau)).collect(),
        },
    ];
    let gtv: Vec<f64> = monthly.iter().map(|p| p.gtv).collect();
    let number_axis = |value: f64| format_number(Some(value));
    html! {
        section id="growth" class="panel" {
            div class="section-header" {
                h2 { "Growth" }
                div class="hint" { "Trailing twelve months" }
            }
            div class="chart-grid" {
                (line_chart("Active users", &labels, &users, &number_axis))
                (bar_chart("Gross transaction volume", &labels, &gtv, &format_currency))
            }
            div class="table-wrap" {
                table {
                    thead {
                        tr {
                            th { "Month" }
                            th { "MAU" }
                            th { "DAU" }
                            th { "DAU/MAU" }
                            th { "New users" }
                            th { "GTV" }
                            th { "GTV MoM" }
                        }
                    }
                    tbody {
                        @for (idx, point) in monthly.iter().enumerate() {
                            @let growth = context.metrics.gtv_growth.get(idx).copied().flatten();
                            tr {
                                td class="mono" { (point.month) }
                                td class="num" { (format_grouped(f64::from(point.mau))) }
                                td class="num" { (format_grouped(f64::from(point.dau))) }
                                td class="num" {
                                    (format_percentage(context.metrics.stickiness.get(idx).copied().unwrap_or_default()))
                                }
                                td class="num" { (format_grouped(f64::from(point.new_users))) }
                                td class="num" { (format_currency(point.gtv)) }
                                td {
                                    span class=(format!("trend {}", trend_class(growth))) { (format_trend(growth)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_unit_economics(context: &DashboardContext<'_>) -> Markup {
    let economics = &context.data.unit_economics;
    let ratio = context.metrics.ltv_to_cac.unwrap_or_default();
    html! {
        section id="unit-economics" class="panel" {
            div class="section-header" {
                h2 { "Unit Economics" }
            }
            div class="cards compact" {
                (metric_card("LTV", &format_currency(economics.ltv), None, &format_grouped(economics.ltv)))
                (metric_card("CAC", &format_currency(economics.cac), None, &format_grouped(economics.cac)))
                (metric_card("LTV:CAC", &format_multiple(ratio), None, &format_grouped(ratio)))
                (metric_card(
                    "Payback",
                    &format_months(economics.payback_months),
                    None,
                    &format_grouped(economics.payback_months),
                ))
                (metric_card(
                    "Gross margin",
                    &format_percentage(economics.gross_margin),
                    None,
                    &format_grouped(economics.gross_margin),
                ))
                (metric_card(
                    "Contribution margin",
                    &format_percentage(economics.contribution_margin),
                    None,
                    &format_grouped(economics.contribution_margin),
                ))
            }
        }
    }
}

fn render_segments(context: &DashboardContext<'_>) -> Markup {
    html! {
        section id="segments" class="panel" {
            div class="section-header" {
                h2 { "User Segments" }
            }
            div class="segment-list" {
                @for (segment, (_, share)) in context.data.segments.iter().zip(&context.metrics.segment_shares) {
                    div class="segment" {
                        div class="segment-head" {
                            span class="segment-name" { (segment.name) }
                            span class="num" { (format_grouped(f64::from(segment.users))) }
                        }
                        div class="meter" {
                            div class="meter-fill" style=(format!("width: {share:.1}%")) {}
                        }
                        div class="hint" { (format_percentage(*share)) " of users" }
                    }
                }
            }
        }
    }
}

fn render_cohorts(cohorts: &[Cohort], curve: &[f64]) -> Markup {
    html! {
        section id="cohorts" class="panel" {
            div class="section-header" {
                h2 { "Cohort Retention" }
                div class="hint" { "Share of each signup cohort still active, by months since signup" }
            }
            div class="table-wrap" {
                table class="heatmap" {
                    thead {
                        tr {
                            th { "Cohort" }
                            @for month in 0..curve.len() {
                                th { "M" (month) }
                            }
                        }
                    }
                    tbody {
                        @for cohort in cohorts {
                            tr {
                                td class="mono" { (cohort.label) }
                                @for month in 0..curve.len() {
                                    @match cohort.retention.get(month) {
                                        Some(&value) => {
                                            td class="num heat" style=(heat_style(value)) { (format_percentage(value)) }
                                        }
                                        None => {
                                            td class="num empty" {}
                                        }
                                    }
                                }
                            }
                        }
                    }
                    tfoot {
                        tr {
                            td { "Average" }
                            @for &value in curve {
                                td class="num" { (format_percentage(value)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn heat_style(retention: f64) -> String {
    let alpha = (retention / 100.0).clamp(0.0, 1.0) * 0.55 + 0.05;
    format!("background: rgba(61, 64, 91, {alpha:.2})")
}

fn render_footer(context: &DashboardContext<'_>) -> Markup {
    let items = [
        ("Monthly metrics CSV", context.downloads.series),
        ("Data table JSON", context.downloads.json),
    ];
    let any_saved = items.iter().any(|(_, path)| path.is_some());
    html! {
        footer id="footer" class="footer" {
            @if any_saved {
                div class="download-list" {
                    @for (label, path) in items {
                        @if let Some(path) = path {
                            div class="download-item" {
                                div class="download-label" { (label) }
                                @let full_display = path.to_string_lossy().into_owned();
                                @if let Some(rel) = relative_link(context.output_path, path) {
                                    a class="download-link" href=(rel) title=(full_display) { (rel) }
                                } @else {
                                    span class="download-path" title=(full_display) { (full_display) }
                                }
                            }
                        }
                    }
                }
            }
            div { "Figures are unaudited management data. Confidential; prepared for prospective investors." }
        }
    }
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

const CDN_FONTS_GOOGLEAPIS: &str = "https://fonts.googleapis.com";
const CDN_FONTS_GSTATIC: &str = "https://fonts.gstatic.com";
const CDN_FONTS_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=IBM+Plex+Mono:wght@400;500&family=Inter:wght@400;600;700&display=swap";

const DASHBOARD_STYLE: &str = r#"
:root {
  --ink: #14213d;
  --muted: #5c677d;
  --paper: #f4f6fa;
  --surface: #ffffff;
  --line: #dde3ec;
  --brand: #0f766e;
  --brand-soft: #99d5ce;
  --warm: #f59e0b;
  --up: #15803d;
  --down: #b91c1c;
  --radius: 14px;
}

* { box-sizing: border-box; }

body {
  margin: 0;
  background: var(--paper);
  color: var(--ink);
  font: 15px/1.5 "Inter", "Helvetica Neue", Arial, sans-serif;
}

.page { max-width: 1160px; margin: 0 auto; padding: 40px 20px 56px; }

h1, h2 { font-weight: 700; letter-spacing: -0.01em; }
h1 { font-size: 2.6rem; margin: 12px 0 4px; }
h2 { font-size: 1.35rem; margin: 0; }

.hero {
  padding: 28px 32px;
  border-radius: var(--radius);
  background: linear-gradient(135deg, var(--ink), var(--brand));
  color: #f8fafc;
}
.hero .subtitle { margin: 0 0 20px; opacity: 0.85; max-width: 640px; }
.hero-top, .meta { display: flex; flex-wrap: wrap; gap: 10px 28px; }
.pill {
  padding: 4px 12px;
  border-radius: 999px;
  background: rgba(255, 255, 255, 0.16);
  font-size: 12px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.06em;
}
.muted-pill { background: rgba(255, 255, 255, 0.08); }
.label { display: block; font-size: 11px; text-transform: uppercase; opacity: 0.7; }
.value { font-weight: 600; }
.mono, .num { font-family: "IBM Plex Mono", ui-monospace, monospace; }
.num { text-align: right; font-variant-numeric: tabular-nums; }

.cards {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(190px, 1fr));
  gap: 14px;
  margin: 24px 0;
}
.cards.compact { margin: 0; }
.card, .chart, .segment {
  background: var(--surface);
  border: 1px solid var(--line);
  border-radius: var(--radius);
  padding: 16px 18px;
}
.card-label { font-size: 12px; color: var(--muted); text-transform: uppercase; }
.card-value { font-size: 26px; font-weight: 700; margin-top: 4px; }
.card-detail, .hint { font-size: 13px; color: var(--muted); }

.panel, .narrative { margin: 36px 0; }
.section-header {
  display: flex;
  justify-content: space-between;
  align-items: baseline;
  margin-bottom: 14px;
}
.narrative p { max-width: 720px; color: #2b3650; }

.chart-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(400px, 1fr));
  gap: 14px;
  margin-bottom: 14px;
}
.chart { margin: 0; }
.chart figcaption { font-weight: 600; margin-bottom: 6px; }
.chart svg { width: 100%; height: auto; display: block; }
.grid line { stroke: var(--line); }
.axis { fill: var(--muted); font-size: 11px; }
.line { stroke-width: 2.5; }
.line.mau { stroke: var(--brand); }
.line.dau { stroke: var(--warm); }
.bar { fill: var(--brand-soft); }
.legend { display: flex; align-items: center; gap: 6px; font-size: 13px; }
.legend-label { margin-right: 12px; }
.x-labels .axis { font-size: 10px; }
.swatch { width: 10px; height: 10px; border-radius: 2px; }
.swatch.mau { background: var(--brand); }
.swatch.dau { background: var(--warm); }

.table-wrap {
  overflow-x: auto;
  background: var(--surface);
  border: 1px solid var(--line);
  border-radius: var(--radius);
}
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th {
  padding: 10px 14px;
  text-align: left;
  font-size: 11px;
  text-transform: uppercase;
  color: var(--muted);
  border-bottom: 2px solid var(--line);
}
td { padding: 9px 14px; border-bottom: 1px solid var(--line); }
tfoot td { font-weight: 700; border-bottom: 0; }
.heatmap .heat { color: #ffffff; }
.heatmap .empty { background: var(--paper); }

.trend { padding: 1px 8px; border-radius: 6px; font-size: 12px; font-weight: 600; }
.trend.up { color: var(--up); background: #dcfce7; }
.trend.down { color: var(--down); background: #fee2e2; }
.trend.neutral { color: var(--muted); background: var(--paper); }

.segment-list {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
  gap: 14px;
}
.segment-head { display: flex; justify-content: space-between; margin-bottom: 8px; }
.segment-name { font-weight: 600; }
.meter { height: 6px; border-radius: 3px; background: var(--paper); }
.meter-fill { height: 100%; border-radius: 3px; background: var(--brand); }

.footer { margin-top: 40px; font-size: 13px; color: var(--muted); }
.download-list { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 12px; }
.download-item {
  padding: 10px 14px;
  border: 1px dashed var(--line);
  border-radius: 10px;
  background: var(--surface);
}
.download-label { font-size: 11px; text-transform: uppercase; }
.download-link, .download-path { color: var(--brand); font-weight: 600; word-break: break-all; }

@media (max-width: 720px) {
  .page { padding: 24px 12px 40px; }
  .chart-grid { grid-template-columns: 1fr; }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bombo_data;
    use std::path::PathBuf;

    fn render(downloads: DownloadPaths<'_>, output: &Path) -> String {
        let data = bombo_data();
        let metrics = DashboardMetrics::from_data(data);
        let generated_at = Local::now();
        let context = DashboardContext {
            data,
            metrics: &metrics,
            generated_at: &generated_at,
            downloads,
            output_path: output,
        };
        render_dashboard(&context).into_string()
    }

    fn no_downloads() -> DownloadPaths<'static> {
        DownloadPaths {
            series: None,
            json: None,
        }
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let html = render(no_downloads(), Path::new("out/dashboard.html"));
        let mut ids = vec!["hero", "metrics", "growth", "unit-economics", "segments", "cohorts"];
        ids.extend(bombo_data().sections.iter().map(|s| s.id));
        ids.push("footer");

        let positions: Vec<usize> = ids
            .iter()
            .map(|id| {
                html.find(&format!("id=\"{id}\""))
                    .unwrap_or_else(|| panic!("missing section {id}"))
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn cards_use_formatted_metrics() {
        let html = render(no_downloads(), Path::new("out/dashboard.html"));
        for expected in ["801K", "316K", "$70.0M", "$9.4M", "+25.3%", "56.9%", "7.8x", "4.2 mo"] {
            assert!(html.contains(expected), "missing {expected}");
        }
        assert!(html.contains("title=\"801,492\""));
    }

    #[test]
    fn cohort_table_pads_unreached_months() {
        let html = render(no_downloads(), Path::new("out/dashboard.html"));
        assert_eq!(html.matches("class=\"num empty\"").count(), 15);
        assert!(html.contains("58.8%"));
    }

    #[test]
    fn downloads_link_only_siblings() {
        let series = PathBuf::from("out/monthly_metrics.csv");
        let json = PathBuf::from("elsewhere/bombo_data.json");
        let html = render(
            DownloadPaths {
                series: Some(&series),
                json: Some(&json),
            },
            Path::new("out/dashboard.html"),
        );
        assert!(html.contains("href=\"monthly_metrics.csv\""));
        assert!(!html.contains("href=\"bombo_data.json\""));
        assert!(html.contains("elsewhere/bombo_data.json"));
    }

    #[test]
    fn footer_omits_downloads_when_nothing_saved() {
        let html = render(no_downloads(), Path::new("out/dashboard.html"));
        assert!(!html.contains("class=\"download-list\""));
    }

    #[test]
    fn minified_page_keeps_content() {
        let data = bombo_data();
        let metrics = DashboardMetrics::from_data(data);
        let generated_at = Local::now();
        let context = DashboardContext {
            data,
            metrics: &metrics,
            generated_at: &generated_at,
            downloads: no_downloads(),
            output_path: Path::new("dashboard.html"),
        };
        let full = render_html(&context, false).expect("plain render");
        let small = render_html(&context, true).expect("minified render");
        assert!(small.len() < full.len());
        assert!(small.contains("$70.0M"));
        assert!(small.contains("Executive Summary"));
    }

    #[test]
    fn segment_names_use_segment_class() {
        let html = render(no_downloads(), Path::new("dashboard.html"));
        assert!(html.contains("<span class=\"segment-name\">"));
        assert!(!html.contains("class=\"lang\""));
    }

    #[test]
    fn stylesheet_covers_rendered_classes() {
        let html = render(no_downloads(), Path::new("dashboard.html"));
        let mut missing: Vec<&str> = html
            .split("class=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .flat_map(str::split_whitespace)
            .filter(|class| !DASHBOARD_STYLE.contains(&format!(".{class}")))
            .collect();
        missing.dedup();
        assert!(missing.is_empty(), "unstyled classes: {missing:?}");
        assert!(!DASHBOARD_STYLE.contains(".lang"));
    }

    #[test]
    fn trend_classes() {
        assert_eq!(trend_class(Some(25.3)), "up");
        assert_eq!(trend_class(Some(-9.8)), "down");
        assert_eq!(trend_class(Some(0.01)), "neutral");
        assert_eq!(trend_class(None), "neutral");
    }
}
