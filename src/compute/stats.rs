// =============================================================================
// Series Statistics — percent change, year-over-year, trailing z-score
// =============================================================================
//
// All functions operate on a slice of values in ascending date order.
//
// Percent change over N periods:
//   null when fewer than N+1 points or the prior value is 0,
//   else (current − prev) / |prev| · 100.
//
// Z-score vs history:
//   last value against a trailing 60-point window, population mean and
//   standard deviation; zero deviation maps to z = 0; fewer than 5 points
//   in the window maps to null.
// =============================================================================

use crate::types::Frequency;

/// Trailing window used for the z-score history.
pub const Z_WINDOW: usize = 60;
/// Minimum points inside the window before a z-score is meaningful.
pub const Z_MIN_POINTS: usize = 5;

/// Percent change between the last value and the value `periods` back.
///
/// # Edge cases
/// - fewer than `periods + 1` values => `None`
/// - prior value exactly 0 => `None` (undefined base)
pub fn percent_change(values: &[f64], periods: usize) -> Option<f64> {
    if values.len() < periods + 1 {
        return None;
    }
    let current = values[values.len() - 1];
    let prev = values[values.len() - 1 - periods];
    if prev == 0.0 {
        return None;
    }
    Some((current - prev) / prev.abs() * 100.0)
}

/// Number of periods that make up one year at the given cadence.
pub fn yoy_periods(frequency: Frequency) -> usize {
    match frequency {
        Frequency::Monthly => 12,
        Frequency::Quarterly => 4,
        Frequency::Weekly => 52,
        Frequency::Daily => 252,
    }
}

/// Year-over-year percent change for a series at its native cadence.
pub fn yoy_change(values: &[f64], frequency: Frequency) -> Option<f64> {
    percent_change(values, yoy_periods(frequency))
}

/// Z-score of the last value against the trailing [`Z_WINDOW`] points.
///
/// # Edge cases
/// - fewer than [`Z_MIN_POINTS`] points in the window => `None`
/// - zero standard deviation => `Some(0.0)` (flat history is not stress)
pub fn z_score(values: &[f64]) -> Option<f64> {
    let window = if values.len() > Z_WINDOW {
        &values[values.len() - Z_WINDOW..]
    } else {
        values
    };

    let n = window.len();
    if n < Z_MIN_POINTS {
        return None;
    }

    let mean = window.iter().sum::<f64>() / n as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std = variance.sqrt();

    if std == 0.0 {
        return Some(0.0);
    }

    let last = window[n - 1];
    Some((last - mean) / std)
}
