//! Display formatting for dashboard metrics.
//!
//! Every formatter is total: missing or non-finite input degrades to a zero
//! rendering instead of failing, so a bad data point never breaks a page.
//! Rounding is half away from zero (`2_500` is `3K`), and nothing ever prints
//! as a negative zero.

const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

/// A magnitude scaled to its display unit and already rounded.
struct Scaled {
    magnitude: f64,
    decimals: usize,
    suffix: &'static str,
}

impl Scaled {
    fn new(magnitude: f64, small_decimals: usize) -> Self {
        let (divisor, decimals, suffix) = if magnitude >= MILLION {
            (MILLION, 1, "M")
        } else if magnitude >= THOUSAND {
            (THOUSAND, 0, "K")
        } else {
            (1.0, small_decimals, "")
        };
        Self {
            magnitude: round_half_away(magnitude / divisor, decimals),
            decimals,
            suffix,
        }
    }

    fn sign(&self, value: f64) -> &'static str {
        if value < 0.0 && self.magnitude > 0.0 { "-" } else { "" }
    }
}

/// Formats a dollar amount with an `M`/`K` abbreviation.
///
/// ```
/// use bombo_dash::formatting::format_currency;
///
/// assert_eq!(format_currency(70_045_672.0), "$70.0M");
/// assert_eq!(format_currency(48_250.0), "$48K");
/// assert_eq!(format_currency(43.12), "$43.12");
/// ```
#[must_use]
pub fn format_currency(value: f64) -> String {
    let value = finite_or_zero(value);
    let scaled = Scaled::new(value.abs(), 2);
    format!(
        "{}${:.*}{}",
        scaled.sign(value),
        scaled.decimals,
        scaled.magnitude,
        scaled.suffix
    )
}

/// Formats a plain count with an `M`/`K` abbreviation.
///
/// `None` and non-finite values render as `"0"`, the same as a real zero.
#[must_use]
pub fn format_number(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "0".to_string();
    };
    if value.abs() < THOUSAND {
        return format_grouped(value);
    }
    let scaled = Scaled::new(value.abs(), 0);
    format!(
        "{}{:.*}{}",
        scaled.sign(value),
        scaled.decimals,
        scaled.magnitude,
        scaled.suffix
    )
}

/// Formats a percentage point value with one decimal, e.g. `25.3%`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", round_half_away(finite_or_zero(value), 1))
}

/// Formats a signed month-over-month change; `-` when there is no prior value.
#[must_use]
pub fn format_trend(trend: Option<f64>) -> String {
    trend.filter(|v| v.is_finite()).map_or_else(
        || "-".to_string(),
        |value| format!("{:+.1}%", round_half_away(value, 1)),
    )
}

#[must_use]
pub fn format_multiple(value: f64) -> String {
    format!("{:.1}x", round_half_away(finite_or_zero(value), 1))
}

#[must_use]
pub fn format_months(value: f64) -> String {
    format!("{:.1} mo", round_half_away(finite_or_zero(value), 1))
}

/// Full-precision en-US rendering: `,` thousands separators and at most three
/// fraction digits with trailing zeros trimmed.
#[must_use]
pub fn format_grouped(value: f64) -> String {
    let value = finite_or_zero(value);
    let fixed = format!("{:.3}", round_half_away(value.abs(), 3));
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3 + 1);
    if value < 0.0 && (integer != "0" || !fraction.is_empty()) {
        out.push('-');
    }
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Rounds to `decimals` places with ties going away from zero. A result of
/// zero is always positive zero.
#[must_use]
pub fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
