// =============================================================================
// Series Catalog — the closed set of tracked upstream series
// =============================================================================
//
// Every FRED series the pipeline fetches is declared here, grouped by the
// chain link it is stored under. The catalog is static configuration: ids,
// display names, cadence, and units never change at runtime.
// =============================================================================

use crate::types::{Frequency, SeriesMeta};

/// One catalog entry: where the series lives and how to describe it.
#[derive(Debug, Clone, Copy)]
pub struct SeriesSpec {
    pub id: &'static str,
    pub link: &'static str,
    pub name: &'static str,
    pub frequency: Frequency,
    pub unit: &'static str,
    pub note: Option<&'static str>,
}

impl SeriesSpec {
    pub fn meta(&self) -> SeriesMeta {
        SeriesMeta {
            name: self.name.to_string(),
            frequency: self.frequency,
            unit: self.unit.to_string(),
            note: self.note.map(str::to_string),
        }
    }
}

/// Chain links in evaluation order. `context` holds series that feed derived
/// indicators and the dashboard but no link composite.
pub const LINK_NAMES: [&str; 6] = [
    "displacement",
    "spending",
    "ghost_gdp",
    "credit_stress",
    "mortgage_stress",
    "context",
];

/// The full fetch set, grouped by link.
pub const FRED_SERIES: &[SeriesSpec] = &[
    // ── Displacement ────────────────────────────────────────────────────
    SeriesSpec {
        id: "LNU04032239",
        link: "displacement",
        name: "Unemployed: Management, Business, and Financial Operations",
        frequency: Frequency::Monthly,
        unit: "Thousands of Persons",
        note: Some("Not seasonally adjusted"),
    },
    SeriesSpec {
        id: "LNU04032237",
        link: "displacement",
        name: "Unemployed: Professional and Related Occupations",
        frequency: Frequency::Monthly,
        unit: "Thousands of Persons",
        note: Some("Not seasonally adjusted"),
    },
    SeriesSpec {
        id: "CES6054000001",
        link: "displacement",
        name: "All Employees: Professional, Scientific, and Technical Services",
        frequency: Frequency::Monthly,
        unit: "Thousands of Persons",
        note: None,
    },
    SeriesSpec {
        id: "UNRATE",
        link: "displacement",
        name: "Unemployment Rate",
        frequency: Frequency::Monthly,
        unit: "Percent",
        note: None,
    },
    // ── Spending ────────────────────────────────────────────────────────
    SeriesSpec {
        id: "PCEC96",
        link: "spending",
        name: "Real Personal Consumption Expenditures",
        frequency: Frequency::Monthly,
        unit: "Billions of Chained 2017 Dollars",
        note: None,
    },
    SeriesSpec {
        id: "UMCSENT",
        link: "spending",
        name: "University of Michigan: Consumer Sentiment",
        frequency: Frequency::Monthly,
        unit: "Index 1966:Q1=100",
        note: None,
    },
    SeriesSpec {
        id: "RSAFS",
        link: "spending",
        name: "Advance Retail Sales: Retail Trade and Food Services",
        frequency: Frequency::Monthly,
        unit: "Millions of Dollars",
        note: None,
    },
    // ── Ghost GDP ───────────────────────────────────────────────────────
    SeriesSpec {
        id: "OPHNFB",
        link: "ghost_gdp",
        name: "Nonfarm Business Sector: Labor Productivity",
        frequency: Frequency::Quarterly,
        unit: "Index 2017=100",
        note: None,
    },
    SeriesSpec {
        id: "LES1252881600Q",
        link: "ghost_gdp",
        name: "Median Usual Weekly Real Earnings: Full-Time Workers",
        frequency: Frequency::Quarterly,
        unit: "1982-84 CPI Adjusted Dollars",
        note: None,
    },
    SeriesSpec {
        id: "M2V",
        link: "ghost_gdp",
        name: "Velocity of M2 Money Stock",
        frequency: Frequency::Quarterly,
        unit: "Ratio",
        note: None,
    },
    // ── Credit stress ───────────────────────────────────────────────────
    SeriesSpec {
        id: "BAMLH0A0HYM2",
        link: "credit_stress",
        name: "ICE BofA US High Yield Index Option-Adjusted Spread",
        frequency: Frequency::Daily,
        unit: "Percent",
        note: None,
    },
    SeriesSpec {
        id: "BAMLH0A3HYC",
        link: "credit_stress",
        name: "ICE BofA CCC & Lower US High Yield Index Option-Adjusted Spread",
        frequency: Frequency::Daily,
        unit: "Percent",
        note: None,
    },
    SeriesSpec {
        id: "DRCLACBS",
        link: "credit_stress",
        name: "Delinquency Rate on Consumer Loans, All Commercial Banks",
        frequency: Frequency::Quarterly,
        unit: "Percent",
        note: None,
    },
    // ── Mortgage stress ─────────────────────────────────────────────────
    SeriesSpec {
        id: "DRSFRMACBS",
        link: "mortgage_stress",
        name: "Delinquency Rate on Single-Family Residential Mortgages",
        frequency: Frequency::Quarterly,
        unit: "Percent",
        note: None,
    },
    // ── Context ─────────────────────────────────────────────────────────
    SeriesSpec {
        id: "BABATOTALSAUS",
        link: "context",
        name: "Business Applications: Total for All NAICS",
        frequency: Frequency::Monthly,
        unit: "Number",
        note: None,
    },
    SeriesSpec {
        id: "USCONS",
        link: "context",
        name: "All Employees: Construction",
        frequency: Frequency::Monthly,
        unit: "Thousands of Persons",
        note: None,
    },
    SeriesSpec {
        id: "JTSJOL",
        link: "context",
        name: "Job Openings: Total Nonfarm",
        frequency: Frequency::Monthly,
        unit: "Thousands",
        note: None,
    },
];

/// Indeed sectors tracked in the by-sector postings feed.
pub const TARGET_SECTORS: [&str; 5] = [
    "Software Development",
    "Marketing",
    "Media & Communications",
    "Banking & Finance",
    "Accounting",
];

/// Look up a catalog entry by FRED series id.
pub fn spec_for(id: &str) -> Option<&'static SeriesSpec> {
    FRED_SERIES.iter().find(|s| s.id == id)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_seventeen_series() {
        assert_eq!(FRED_SERIES.len(), 17);
    }

    #[test]
    fn every_series_belongs_to_a_known_link() {
        for spec in FRED_SERIES {
            assert!(
                LINK_NAMES.contains(&spec.link),
                "{} assigned to unknown link {}",
                spec.id,
                spec.link
            );
        }
    }

    #[test]
    fn series_ids_are_unique() {
        for (i, a) in FRED_SERIES.iter().enumerate() {
            for b in &FRED_SERIES[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate catalog id {}", a.id);
            }
        }
    }

    #[test]
    fn spec_lookup() {
        assert_eq!(spec_for("UNRATE").unwrap().link, "displacement");
        assert!(spec_for("NOPE").is_none());
    }

    #[test]
    fn sector_names_contain_no_commas() {
        // The postings CSV is parsed with a naive comma split; the sector
        // filter only works while the tracked display names stay comma-free.
        for sector in TARGET_SECTORS {
            assert!(!sector.contains(','), "{sector} would break the CSV parser");
        }
    }
}
