// =============================================================================
// Chain Links, Derived Indicators, and the Composite Index
// =============================================================================
//
// The indicator tree has three tiers:
//   1. Per-series z-scores against their trailing history.
//   2. Five chain links, each a signed mean of member z-scores.
//   3. One composite 0-100 score from the mapped link statuses.
//
// Plus two derived indicators that combine series across links:
//   - ghost_gdp:             productivity YoY minus real-wage YoY
//   - displacement_velocity: white-collar unemployment momentum relative to
//                            the overall unemployment rate's momentum
//
// Everything here is deterministic: same inputs, byte-identical outputs.
// =============================================================================

use std::collections::BTreeMap;

use crate::compute::stats::{percent_change, yoy_change, z_score};
use crate::compute::status::{classify, interpret_composite};
use crate::types::{Composite, DerivedIndicator, FredRaw, IndicatorScore, LinkResult};

/// Member series of each chain link, with its inversion flag, in evaluation
/// order. Inverted members are series where higher raw values are good.
const LINK_DEFS: [(&str, &[(&str, bool)]); 5] = [
    (
        "displacement",
        &[
            ("LNU04032239", false),
            ("LNU04032237", false),
            ("CES6054000001", true),
        ],
    ),
    (
        "spending",
        &[("PCEC96", true), ("UMCSENT", true), ("RSAFS", true)],
    ),
    ("ghost_gdp", &[("M2V", true)]),
    (
        "credit_stress",
        &[
            ("BAMLH0A0HYM2", false),
            ("BAMLH0A3HYC", false),
            ("DRCLACBS", false),
        ],
    ),
    ("mortgage_stress", &[("DRSFRMACBS", false)]),
];

/// Compute the full indicator tree from one FRED snapshot.
pub fn compute_all(
    fred: &FredRaw,
) -> (
    BTreeMap<String, DerivedIndicator>,
    BTreeMap<String, LinkResult>,
    Composite,
) {
    let links = link_results(fred);
    let composite = composite_index(&links);

    let mut derived = BTreeMap::new();
    let ghost = ghost_gdp(fred);
    let velocity = displacement_velocity(fred);
    derived.insert(ghost.name.clone(), ghost);
    derived.insert(velocity.name.clone(), velocity);

    (derived, links, composite)
}

/// Z-score of a series by id, or `None` when the series is missing or too
/// short.
fn series_z(fred: &FredRaw, id: &str) -> Option<f64> {
    let series = fred.series(id)?;
    z_score(&series.values())
}

/// Evaluate all five chain links.
pub fn link_results(fred: &FredRaw) -> BTreeMap<String, LinkResult> {
    let mut out = BTreeMap::new();

    for (name, members) in LINK_DEFS {
        let mut indicators = BTreeMap::new();
        let mut signed = Vec::with_capacity(members.len());

        for (id, inverted) in members {
            let z = series_z(fred, id);
            indicators.insert(
                (*id).to_string(),
                IndicatorScore {
                    z,
                    status: classify(z, *inverted),
                },
            );
            // Missing members drop out of the link mean entirely.
            if let Some(z) = z {
                signed.push(if *inverted { -z } else { z });
            }
        }

        let link_z = if signed.is_empty() {
            None
        } else {
            Some(signed.iter().sum::<f64>() / signed.len() as f64)
        };

        out.insert(
            name.to_string(),
            LinkResult {
                name: name.to_string(),
                status: classify(link_z, false),
                z: link_z,
                indicators,
            },
        );
    }

    out
}

/// Ghost GDP: productivity growing while real wages are not.
///
/// value = productivity YoY − real-wage YoY, both quarterly. The status is
/// classified on value/2 so a two-percentage-point gap sits at one sigma.
pub fn ghost_gdp(fred: &FredRaw) -> DerivedIndicator {
    let productivity_yoy = fred
        .series("OPHNFB")
        .and_then(|s| yoy_change(&s.values(), s.meta.frequency));
    let real_wage_yoy = fred
        .series("LES1252881600Q")
        .and_then(|s| yoy_change(&s.values(), s.meta.frequency));

    let value = match (productivity_yoy, real_wage_yoy) {
        (Some(p), Some(w)) => Some(p - w),
        _ => None,
    };

    let mut components = BTreeMap::new();
    components.insert("productivity_yoy".to_string(), productivity_yoy);
    components.insert("real_wage_yoy".to_string(), real_wage_yoy);

    DerivedIndicator {
        name: "ghost_gdp".to_string(),
        description: "Gap between labor productivity growth and real wage growth (YoY, pp)"
            .to_string(),
        value,
        components,
        status: classify(value.map(|v| v / 2.0), false),
    }
}

/// Displacement velocity: how fast white-collar unemployment is moving
/// relative to the overall unemployment rate.
///
/// value = mean of the 3-period percent changes of the two white-collar
/// unemployment series, divided by |3-period change of UNRATE|. Null when
/// either numerator is unavailable or the denominator is zero. Classified on
/// value − 1 so parity with the broad rate reads as baseline.
pub fn displacement_velocity(fred: &FredRaw) -> DerivedIndicator {
    let mgmt = fred
        .series("LNU04032239")
        .and_then(|s| percent_change(&s.values(), 3));
    let professional = fred
        .series("LNU04032237")
        .and_then(|s| percent_change(&s.values(), 3));
    let overall = fred
        .series("UNRATE")
        .and_then(|s| percent_change(&s.values(), 3));

    let value = match (mgmt, professional, overall) {
        (Some(m), Some(p), Some(o)) if o != 0.0 => Some((m + p) / 2.0 / o.abs()),
        _ => None,
    };

    let mut components = BTreeMap::new();
    components.insert("management_pct_change".to_string(), mgmt);
    components.insert("professional_pct_change".to_string(), professional);
    components.insert("overall_unemployment_pct_change".to_string(), overall);

    DerivedIndicator {
        name: "displacement_velocity".to_string(),
        description: "White-collar unemployment momentum relative to overall unemployment"
            .to_string(),
        value,
        components,
        status: classify(value.map(|v| v - 1.0), false),
    }
}

/// Fold the five link statuses into the composite 0-100 score.
pub fn composite_index(links: &BTreeMap<String, LinkResult>) -> Composite {
    let mut histogram: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0.0;

    for link in links.values() {
        total += link.status.score();
        *histogram.entry(link.status.to_string()).or_insert(0) += 1;
    }

    let mean = if links.is_empty() {
        0.0
    } else {
        total / links.len() as f64
    };
    let score = (mean * 10.0).round() / 10.0;

    Composite {
        score,
        scale: "0 (calm) to 100 (systemic stress)".to_string(),
        histogram,
        interpretation: interpret_composite(score).to_string(),
    }
}
