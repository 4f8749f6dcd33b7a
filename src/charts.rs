//! Inline SVG charts for the dashboard.

use maud::{Markup, html};

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 260.0;
const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 16.0;
const PAD_BOTTOM: f64 = 36.0;
const GRID_LINES: usize = 4;

pub struct Series<'a> {
    pub label: &'a str,
    pub class: &'a str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

struct Frame {
    plot_width: f64,
    plot_height: f64,
    max: f64,
}

impl Frame {
    fn new(max: f64) -> Self {
        Self {
            plot_width: CHART_WIDTH - PAD_LEFT - PAD_RIGHT,
            plot_height: CHART_HEIGHT - PAD_TOP - PAD_BOTTOM,
            max: if max.is_finite() && max > 0.0 { max } else { 1.0 },
        }
    }

    fn y(&self, value: f64) -> f64 {
        let ratio = (value.max(0.0) / self.max).min(1.0);
        PAD_TOP + self.plot_height * (1.0 - ratio)
    }

    const fn baseline(&self) -> f64 {
        PAD_TOP + self.plot_height
    }
}

/// Maps a series onto plot coordinates, spreading points evenly along x.
#[must_use]
pub fn scale_points(values: &[f64], max: f64) -> Vec<Point> {
    let frame = Frame::new(max);
    let step = if values.len() > 1 {
        frame.plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };
    values
        .iter()
        .enumerate()
        .map(|(idx, &value)| Point {
            x: PAD_LEFT + step * idx as f64,
            y: frame.y(value),
        })
        .collect()
}

fn series_max<'a>(series: impl IntoIterator<Item = &'a f64>) -> f64 {
    series
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

fn polyline_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn grid(frame: &Frame, axis_label: &dyn Fn(f64) -> String) -> Markup {
    html! {
        g class="grid" {
            @for step in 0..=GRID_LINES {
                @let value = frame.max * step as f64 / GRID_LINES as f64;
                @let y = frame.y(value);
                line x1=(PAD_LEFT) x2=(CHART_WIDTH - PAD_RIGHT) y1=(format!("{y:.1}")) y2=(format!("{y:.1}")) {}
                text class="axis" x=(PAD_LEFT - 8.0) y=(format!("{:.1}", y + 4.0)) text-anchor="end" {
                    (axis_label(value))
                }
            }
        }
    }
}

fn x_labels(labels: &[&str], points: &[Point]) -> Markup {
    html! {
        g class="x-labels" {
            @for (label, point) in labels.iter().zip(points) {
                text class="axis" x=(format!("{:.1}", point.x)) y=(CHART_HEIGHT - 12.0) text-anchor="middle" {
                    (short_month(label))
                }
            }
        }
    }
}

/// `2024-07` becomes `Jul`; anything else is shown as-is.
fn short_month(label: &str) -> &str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    label
        .split_once('-')
        .and_then(|(_, month)| month.parse::<usize>().ok())
        .and_then(|month| NAMES.get(month.wrapping_sub(1)))
        .copied()
        .unwrap_or(label)
}

/// Multi-series line chart; every series shares the same y scale.
pub fn line_chart(
    title: &str,
    labels: &[&str],
    series: &[Series<'_>],
    axis_label: &dyn Fn(f64) -> String,
) -> Markup {
    let max = series_max(series.iter().flat_map(|s| s.values.iter()));
    let frame = Frame::new(max);
    let label_points = scale_points(&vec![0.0; labels.len()], frame.max);
    html! {
        figure class="chart" {
            figcaption { (title) }
            svg viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")) role="img" aria-label=(title) {
                (grid(&frame, axis_label))
                @for s in series {
                    polyline class=(format!("line {}", s.class)) fill="none"
                        points=(polyline_points(&scale_points(&s.values, frame.max))) {}
                }
                (x_labels(labels, &label_points))
            }
            div class="legend" {
                @for s in series {
                    span class=(format!("swatch {}", s.class)) {}
                    span class="legend-label" { (s.label) }
                }
            }
        }
    }
}

pub fn bar_chart(
    title: &str,
    labels: &[&str],
    values: &[f64],
    value_label: &dyn Fn(f64) -> String,
) -> Markup {
    let frame = Frame::new(series_max(values));
    let slot = if values.is_empty() {
        0.0
    } else {
        frame.plot_width / values.len() as f64
    };
    let bar_width = slot * 0.64;
    html! {
        figure class="chart" {
            figcaption { (title) }
            svg viewBox=(format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")) role="img" aria-label=(title) {
                (grid(&frame, value_label))
                @for (idx, &value) in values.iter().enumerate() {
                    @let x = PAD_LEFT + slot * idx as f64 + (slot - bar_width) / 2.0;
                    @let y = frame.y(value);
                    rect class="bar" x=(format!("{x:.1}")) y=(format!("{y:.1}"))
                        width=(format!("{bar_width:.1}")) height=(format!("{:.1}", frame.baseline() - y)) {
                        title { (labels.get(idx).copied().unwrap_or("")) ": " (value_label(value)) }
                    }
                    text class="axis" x=(format!("{:.1}", x + bar_width / 2.0)) y=(CHART_HEIGHT - 12.0) text-anchor="middle" {
                        (short_month(labels.get(idx).copied().unwrap_or("")))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::format_currency;

    #[test]
    fn points_span_the_plot_area() {
        let points = scale_points(&[0.0, 50.0, 100.0], 100.0);
        assert_eq!(points.len(), 3);
        assert!((points[0].x - PAD_LEFT).abs() < 1e-9);
        assert!((points[2].x - (CHART_WIDTH - PAD_RIGHT)).abs() < 1e-9);
        assert!((points[0].y - (CHART_HEIGHT - PAD_BOTTOM)).abs() < 1e-9);
        assert!((points[2].y - PAD_TOP).abs() < 1e-9);
        assert!(points[1].y < points[0].y && points[1].y > points[2].y);
    }

    #[test]
    fn degenerate_inputs_stay_in_bounds() {
        let single = scale_points(&[5.0], 0.0);
        assert!((single[0].x - PAD_LEFT).abs() < 1e-9);
        let clamped = scale_points(&[-10.0, f64::INFINITY], 10.0);
        assert!(clamped.iter().all(|p| p.y >= PAD_TOP && p.y <= CHART_HEIGHT - PAD_BOTTOM));
    }

    #[test]
    fn month_labels_are_abbreviated() {
        assert_eq!(short_month("2024-07"), "Jul");
        assert_eq!(short_month("2025-12"), "Dec");
        assert_eq!(short_month("Q3"), "Q3");
        assert_eq!(short_month("2025-00"), "2025-00");
    }

    #[test]
    fn bar_chart_renders_one_rect_per_value() {
        let markup = bar_chart(
            "GTV",
            &["2025-05", "2025-06"],
            &[7_464_472.0, 9_352_983.0],
            &format_currency,
        )
        .into_string();
        assert_eq!(markup.matches("<rect").count(), 2);
        assert!(markup.contains("$9.4M"));
        assert!(markup.contains(">Jun<"));
    }

    #[test]
    fn line_chart_renders_each_series() {
        let series = [
            Series { label: "MAU", class: "mau", values: vec![1.0, 2.0, 3.0] },
            Series { label: "DAU", class: "dau", values: vec![0.5, 0.7, 0.9] },
        ];
        let markup = line_chart("Users", &["2025-04", "2025-05", "2025-06"], &series, &|v: f64| {
            format!("{v:.0}")
        })
        .into_string();
        assert_eq!(markup.matches("<polyline").count(), 2);
        assert!(markup.contains("line mau"));
        assert!(markup.contains("legend-label"));
    }
}
