//! Period-over-period trend computation and dashboard card formatting.
//!
//! A trend compares a metric's value in the current window against the
//! baseline window (the prior calendar day, see [`crate::period`]). The
//! percent change saturates at 100 when the baseline is zero rather than
//! reporting an infinite increase.

use serde::Serialize;

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Increase,
    Decrease,
    NoChange,
}

/// A computed trend: direction plus percent change (absolute value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub status: TrendStatus,
    pub percent: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the trend from a baseline value to a current value.
///
/// - both zero: no change, 0%.
/// - baseline zero, current non-zero: increase, saturated at 100%.
/// - otherwise: `round2((current - previous) / previous * 100)`, with the
///   percent reported as an absolute value and the sign carried by the
///   status.
pub fn trend(previous: f64, current: f64) -> Trend {
    if previous == 0.0 && current == 0.0 {
        return Trend {
            status: TrendStatus::NoChange,
            percent: 0.0,
        };
    }
    if previous == 0.0 {
        return Trend {
            status: TrendStatus::Increase,
            percent: 100.0,
        };
    }
    let percent = round2((current - previous) / previous * 100.0);
    let status = if percent > 0.0 {
        TrendStatus::Increase
    } else if percent < 0.0 {
        TrendStatus::Decrease
    } else {
        TrendStatus::NoChange
    };
    Trend {
        status,
        percent: percent.abs(),
    }
}

/// Format a metric value as a string with exactly two decimal places.
pub fn format_number(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a (round2) percent as a string with a trailing `%`, dropping
/// insignificant trailing zeros: `50%`, `12.5%`, `33.33%`.
pub fn format_percent(percent: f64) -> String {
    let mut s = format!("{percent:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s.push('%');
    s
}

/// One dashboard metric display unit. Cards are emitted as an ordered
/// array; the `label` is informational, the position is the contract.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardCard {
    pub label: String,
    /// Current value, formatted to two decimal places.
    pub number: String,
    pub status: TrendStatus,
    /// Percent change with a trailing `%`.
    pub percentage: String,
}

/// Build a card for a metric from its baseline and current values.
pub fn card(label: &str, previous: f64, current: f64) -> DashboardCard {
    let t = trend(previous, current);
    DashboardCard {
        label: label.to_string(),
        number: format_number(current),
        status: t.status,
        percentage: format_percent(t.percent),
    }
}
