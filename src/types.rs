// =============================================================================
// Shared types used across the stress-index pipeline
// =============================================================================
//
// Everything that crosses a subsystem boundary lives here: raw observations,
// fetched series, the computed indicator tree, and the run bookkeeping that
// backs the observability endpoints.  All types serialise with serde; maps use
// BTreeMap so that repeated runs over the same inputs produce byte-identical
// JSON.
// =============================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Observations & series
// =============================================================================

/// A single dated data point. The value is always finite — fetchers filter
/// out missing and non-numeric upstream entries before constructing these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Native reporting cadence of an upstream series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
        }
    }
}

/// Static descriptive metadata for a series (name, cadence, unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub name: String,
    pub frequency: Frequency,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One fetched time series: metadata plus its ordered observations.
///
/// Invariant: `observations` is strictly ascending by date, `latest` is the
/// last observation iff the list is non-empty, and `count` equals the list
/// length. Use [`Series::new`] which enforces all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    #[serde(flatten)]
    pub meta: SeriesMeta,
    pub observations: Vec<Observation>,
    pub latest: Option<Observation>,
    pub count: usize,
}

impl Series {
    /// Build a series from raw observations: sorts by date, drops duplicate
    /// dates (keeping the later entry), and fills `latest`/`count`.
    pub fn new(id: impl Into<String>, meta: SeriesMeta, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        observations.dedup_by(|next, prev| {
            if next.date == prev.date {
                // Keep the later entry in input order.
                prev.value = next.value;
                true
            } else {
                false
            }
        });

        let latest = observations.last().copied();
        let count = observations.len();
        Self {
            id: id.into(),
            meta,
            observations,
            latest,
            count,
        }
    }

    /// Raw values in date order, for the computation layer.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }
}

// =============================================================================
// Raw snapshots
// =============================================================================

/// All FRED series fetched in one refresh, grouped by chain link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FredRaw {
    /// RFC 3339 timestamp of the fetch.
    pub fetched_at: String,
    /// link name -> series id -> series.
    pub links: BTreeMap<String, BTreeMap<String, Series>>,
}

impl FredRaw {
    /// Look up a series by id across all links.
    pub fn series(&self, id: &str) -> Option<&Series> {
        self.links.values().find_map(|group| group.get(id))
    }
}

/// The Indeed job-postings snapshot: one national aggregate plus the tracked
/// sectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndeedRaw {
    pub fetched_at: String,
    pub source: String,
    pub attribution: String,
    pub aggregate: Series,
    /// sector display name -> series.
    pub sectors: BTreeMap<String, Series>,
}

// =============================================================================
// Computed indicators
// =============================================================================

/// Stress classification for a score or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Normal,
    Elevated,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Contribution of this status to the composite index.
    pub fn score(self) -> f64 {
        match self {
            Self::Normal => 0.0,
            Self::Elevated => 25.0,
            Self::Warning => 50.0,
            Self::Critical => 100.0,
            Self::Unknown => 0.0,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Elevated => write!(f, "elevated"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Z-score and classification for a single indicator inside a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub z: Option<f64>,
    pub status: Status,
}

/// One chain link's computed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResult {
    pub name: String,
    pub status: Status,
    /// Composite z for the link; null when every member indicator is missing.
    pub z: Option<f64>,
    /// series id -> per-indicator score.
    pub indicators: BTreeMap<String, IndicatorScore>,
}

/// A named derived indicator (ghost GDP, displacement velocity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedIndicator {
    pub name: String,
    pub description: String,
    pub value: Option<f64>,
    /// Inputs that produced `value`, for dashboard display.
    pub components: BTreeMap<String, Option<f64>>,
    pub status: Status,
}

/// The 0–100 composite stress score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composite {
    pub score: f64,
    pub scale: String,
    /// status name -> number of links currently at that status.
    pub histogram: BTreeMap<String, usize>,
    pub interpretation: String,
}

// =============================================================================
// Published indicators snapshot
// =============================================================================

/// Freshness of one upstream source in the published snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFreshness {
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    pub fred: SourceFreshness,
    pub indeed: SourceFreshness,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackCounts {
    pub fred_series: u32,
    pub indeed: u32,
}

/// What fired the refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Cron,
    Manual,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cron => write!(f, "cron"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Provenance attached to every published indicators snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub version: String,
    pub trigger: Trigger,
    pub run_id: String,
    pub source_status: SourceStatus,
    pub fallback_counts: FallbackCounts,
    pub warnings: Vec<String>,
}

/// The top-level payload served from `/api/indicators`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorsSnapshot {
    pub generated_at: String,
    pub fred_fetched_at: String,
    pub indeed_fetched_at: String,
    pub composite: Composite,
    pub derived: BTreeMap<String, DerivedIndicator>,
    pub links: BTreeMap<String, LinkResult>,
    pub pipeline: PipelineMeta,
}

// =============================================================================
// Run bookkeeping
// =============================================================================

/// One entry in the bounded run log (most-recent-first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub at: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub trigger: Trigger,
    pub run_id: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<usize>,
}
