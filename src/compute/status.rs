// =============================================================================
// Status Classification — z-score thresholds and composite banding
// =============================================================================
//
// Threshold ladder for a score s (optionally inverted, meaning evaluate -s):
//   s >= 2.0  => CRITICAL
//   s >= 1.0  => WARNING
//   s >= 0.5  => ELEVATED
//   otherwise => NORMAL
//   null/NaN  => UNKNOWN
//
// Inversion is used for series where *higher* raw values are good (employment
// levels, consumption, sentiment, retail sales, money velocity).
// =============================================================================

use crate::types::Status;

/// Classify a score against the stress thresholds.
pub fn classify(score: Option<f64>, inverted: bool) -> Status {
    let s = match score {
        Some(v) if v.is_finite() => {
            if inverted {
                -v
            } else {
                v
            }
        }
        _ => return Status::Unknown,
    };

    if s >= 2.0 {
        Status::Critical
    } else if s >= 1.0 {
        Status::Warning
    } else if s >= 0.5 {
        Status::Elevated
    } else {
        Status::Normal
    }
}

/// Banded interpretation of the composite score for the dashboard headline.
pub fn interpret_composite(score: f64) -> &'static str {
    if score >= 75.0 {
        "Critical: broad-based stress across the chain; multiple links flashing red."
    } else if score >= 50.0 {
        "Warning: stress is building in several links; conditions deteriorating."
    } else if score >= 25.0 {
        "Elevated: early stress signals in at least one link; worth watching."
    } else {
        "Normal: hiring and credit conditions near their historical baseline."
    }
}
