// =============================================================================
// Refresh Orchestrator — one full fetch/compute/publish cycle
// =============================================================================
//
// `run` is the single entry point for both the cron schedule and the manual
// endpoint. The shape of a run:
//
//   record attempt -> acquire lock -> fetch FRED fan-out (fallbacks) ->
//   fetch Indeed (fallback) -> compute -> publish -> success metadata
//
// Failed runs never clobber the previously published version: publication is
// the last step, and the failure path only touches error metadata and the
// run log. Lock contention is a skip, not a failure.
// =============================================================================

use std::time::Instant;

use anyhow::{bail, Result};
use chrono::{Months, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::catalog::{SeriesSpec, FRED_SERIES};
use crate::compute::compute_all;
use crate::fetch::fred::SeriesClient;
use crate::fetch::indeed::{PostingsClient, PostingsData};
use crate::pipeline::publish::{publish, resolve_latest, version_string};
use crate::store::lock::{self, AcquireOutcome};
use crate::store::{
    SnapshotKind, SnapshotStore, SnapshotStoreExt, KEY_META_CONSECUTIVE_FAILURES,
    KEY_META_LAST_ATTEMPT, KEY_META_LAST_DURATION_MS, KEY_META_LAST_ERROR,
    KEY_META_LAST_SUCCESS, KEY_META_LAST_UPDATED, KEY_META_RUN_LOG,
};
use crate::types::{
    FallbackCounts, FredRaw, Frequency, IndeedRaw, IndicatorsSnapshot, Observation, PipelineMeta,
    RunLogEntry, Series, SeriesMeta, SourceFreshness, SourceStatus, Trigger,
};

/// Run log retention.
const RUN_LOG_LIMIT: usize = 50;
/// How far back each FRED fetch reaches.
const LOOKBACK_MONTHS: u32 = 60;

/// Final disposition of one refresh run.
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        run_id: String,
        version: String,
        generated_at: String,
        warnings: Vec<String>,
    },
    Skipped {
        run_id: String,
        reason: String,
    },
    Failed {
        run_id: String,
        error: String,
    },
}

/// Execute one refresh. Never panics and never leaves the lock held.
pub async fn run(state: &AppState, trigger: Trigger) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let run_id_str = run_id.to_string();
    let started = Instant::now();
    let store = state.store.as_ref();

    info!(run_id = %run_id_str, %trigger, "refresh starting");

    // Recorded before lock acquisition: attempts without success are visible.
    if let Err(e) = store
        .put_string(KEY_META_LAST_ATTEMPT, &Utc::now().to_rfc3339())
        .await
    {
        warn!(error = %e, "failed to record last_attempt");
    }

    match lock::acquire(store, &run_id_str).await {
        Ok(AcquireOutcome::Acquired) => {}
        Ok(AcquireOutcome::Rejected(reason)) => {
            info!(run_id = %run_id_str, %reason, "refresh skipped");
            let entry = RunLogEntry {
                at: Utc::now().to_rfc3339(),
                ok: false,
                skipped: Some(true),
                reason: Some(reason.clone()),
                error: None,
                trigger,
                run_id: run_id_str.clone(),
                duration_ms: started.elapsed().as_millis() as u64,
                version: None,
                warnings: None,
            };
            append_run_log(store, entry).await;
            return RunOutcome::Skipped {
                run_id: run_id_str,
                reason,
            };
        }
        Err(e) => {
            let error = format!("lock acquisition failed: {e:#}");
            error!(run_id = %run_id_str, %error, "refresh aborted");
            record_failure(store, &error, started.elapsed().as_millis() as u64).await;
            let entry = RunLogEntry {
                at: Utc::now().to_rfc3339(),
                ok: false,
                skipped: None,
                reason: None,
                error: Some(error.clone()),
                trigger,
                run_id: run_id_str.clone(),
                duration_ms: started.elapsed().as_millis() as u64,
                version: None,
                warnings: None,
            };
            append_run_log(store, entry).await;
            return RunOutcome::Failed {
                run_id: run_id_str,
                error,
            };
        }
    }

    let result = execute(state, trigger, &run_id).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(published) => {
            record_success(store, &published.generated_at, duration_ms).await;
            let entry = RunLogEntry {
                at: Utc::now().to_rfc3339(),
                ok: true,
                skipped: None,
                reason: None,
                error: None,
                trigger,
                run_id: run_id_str.clone(),
                duration_ms,
                version: Some(published.version.clone()),
                warnings: Some(published.warnings.len()),
            };
            append_run_log(store, entry).await;
            info!(
                run_id = %run_id_str,
                version = %published.version,
                warnings = published.warnings.len(),
                duration_ms,
                "refresh completed"
            );
            RunOutcome::Completed {
                run_id: run_id_str.clone(),
                version: published.version,
                generated_at: published.generated_at,
                warnings: published.warnings,
            }
        }
        Err(e) => {
            let error = format!("{e:#}");
            error!(run_id = %run_id_str, %error, duration_ms, "refresh failed");
            record_failure(store, &error, duration_ms).await;
            let entry = RunLogEntry {
                at: Utc::now().to_rfc3339(),
                ok: false,
                skipped: None,
                reason: None,
                error: Some(error.clone()),
                trigger,
                run_id: run_id_str.clone(),
                duration_ms,
                version: None,
                warnings: None,
            };
            append_run_log(store, entry).await;
            RunOutcome::Failed {
                run_id: run_id_str.clone(),
                error,
            }
        }
    };

    lock::release(store, &run_id_str).await;
    outcome
}

/// What a successful `execute` hands back for bookkeeping.
struct Published {
    version: String,
    generated_at: String,
    warnings: Vec<String>,
}

async fn execute(state: &AppState, trigger: Trigger, run_id: &Uuid) -> Result<Published> {
    let settings = &state.settings;
    let store = state.store.as_ref();

    if settings.fred_api_key.trim().is_empty() {
        bail!("configuration error: FRED_API_KEY is not set");
    }

    let observation_start = lookback_start(Utc::now().date_naive());

    // Previous snapshots back the per-series and whole-source fallbacks.
    let prev_fred = read_previous::<FredRaw>(store, SnapshotKind::FredRaw).await;
    let prev_indeed = read_previous::<IndeedRaw>(store, SnapshotKind::IndeedRaw).await;

    // ── FRED fan-out ────────────────────────────────────────────────────
    let series_client = SeriesClient::new(
        state.http.clone(),
        settings.fred_base_url.clone(),
        settings.fred_api_key.clone(),
    );
    let fetches = FRED_SERIES.iter().map(|spec| {
        let client = series_client.clone();
        async move { (spec, client.fetch(spec.id, observation_start).await) }
    });
    let results = futures_util::future::join_all(fetches).await;

    let merged = merge_fred_results(results, prev_fred.as_ref());
    if !merged.missing.is_empty() {
        bail!(
            "missing series with no fallback: {}",
            merged.missing.join(", ")
        );
    }
    let mut warnings = merged.warnings;
    let fred_raw = FredRaw {
        fetched_at: Utc::now().to_rfc3339(),
        links: merged.links,
    };

    // ── Indeed (whole-source fallback) ──────────────────────────────────
    let postings_client = PostingsClient::new(
        state.http.clone(),
        settings.indeed_aggregate_url.clone(),
        settings.indeed_sector_url.clone(),
    );
    let (indeed_raw, indeed_fallback) = match postings_client.fetch().await {
        Ok(data) => (build_indeed_raw(data, &Utc::now().to_rfc3339()), false),
        Err(e) => match prev_indeed {
            Some(prev) => {
                warn!(error = %format!("{e:#}"), "Indeed fetch failed, reusing previous snapshot");
                warnings.push(format!("Indeed fetch failed; serving previous snapshot: {e:#}"));
                (prev, true)
            }
            None => {
                return Err(e.context("Indeed fetch failed with no previous snapshot"));
            }
        },
    };

    // ── Compute & publish ───────────────────────────────────────────────
    let (derived, links, composite) = compute_all(&fred_raw);

    let now = Utc::now();
    let generated_at = now.to_rfc3339();
    let version = version_string(now.timestamp_millis(), run_id);

    let snapshot = IndicatorsSnapshot {
        generated_at: generated_at.clone(),
        fred_fetched_at: fred_raw.fetched_at.clone(),
        indeed_fetched_at: indeed_raw.fetched_at.clone(),
        composite,
        derived,
        links,
        pipeline: PipelineMeta {
            version: version.clone(),
            trigger,
            run_id: run_id.to_string(),
            source_status: SourceStatus {
                fred: if merged.fallback_count > 0 {
                    SourceFreshness::Stale
                } else {
                    SourceFreshness::Fresh
                },
                indeed: if indeed_fallback {
                    SourceFreshness::Stale
                } else {
                    SourceFreshness::Fresh
                },
            },
            fallback_counts: FallbackCounts {
                fred_series: merged.fallback_count,
                indeed: u32::from(indeed_fallback),
            },
            warnings: warnings.clone(),
        },
    };

    publish(store, &version, &snapshot, &fred_raw, &indeed_raw).await?;

    Ok(Published {
        version,
        generated_at,
        warnings,
    })
}

/// First observation date: five years back from `today`, clamped by month.
fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Months::new(LOOKBACK_MONTHS)
}

async fn read_previous<T: serde::de::DeserializeOwned + Send>(
    store: &dyn SnapshotStore,
    kind: SnapshotKind,
) -> Option<T> {
    match resolve_latest(store, kind).await {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "previous snapshot is unreadable");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(kind = kind.as_str(), error = %e, "failed to read previous snapshot");
            None
        }
    }
}

/// Outcome of folding the FRED fan-out into link groups.
struct MergedFred {
    links: std::collections::BTreeMap<String, std::collections::BTreeMap<String, Series>>,
    fallback_count: u32,
    warnings: Vec<String>,
    missing: Vec<String>,
}

/// Attach each fetch result to its link, falling back to the previous
/// snapshot per series. A series that fails with no previous copy is a
/// critical miss.
fn merge_fred_results(
    results: Vec<(&'static SeriesSpec, Result<Vec<Observation>>)>,
    previous: Option<&FredRaw>,
) -> MergedFred {
    let mut merged = MergedFred {
        links: std::collections::BTreeMap::new(),
        fallback_count: 0,
        warnings: Vec::new(),
        missing: Vec::new(),
    };

    for (spec, result) in results {
        match result {
            Ok(observations) => {
                merged
                    .links
                    .entry(spec.link.to_string())
                    .or_default()
                    .insert(
                        spec.id.to_string(),
                        Series::new(spec.id, spec.meta(), observations),
                    );
            }
            Err(e) => match previous.and_then(|prev| prev.series(spec.id)) {
                Some(prior) => {
                    warn!(series = spec.id, error = %format!("{e:#}"), "series fetch failed, using previous snapshot");
                    merged
                        .links
                        .entry(spec.link.to_string())
                        .or_default()
                        .insert(spec.id.to_string(), prior.clone());
                    merged.fallback_count += 1;
                    merged
                        .warnings
                        .push(format!("FRED {} fallback to previous snapshot", spec.id));
                }
                None => {
                    merged.missing.push(format!("{} ({e:#})", spec.id));
                }
            },
        }
    }

    merged
}

/// Project parsed postings data into the published snapshot shape.
fn build_indeed_raw(data: PostingsData, fetched_at: &str) -> IndeedRaw {
    let aggregate_meta = SeriesMeta {
        name: "US Job Postings Index".to_string(),
        frequency: Frequency::Daily,
        unit: "Index, Feb 1 2020 = 100".to_string(),
        note: Some("Seasonally adjusted where available".to_string()),
    };
    let aggregate = Series::new("aggregate", aggregate_meta, data.aggregate);

    let sectors = data
        .sectors
        .into_iter()
        .map(|(name, observations)| {
            let meta = SeriesMeta {
                name: format!("{name} Job Postings Index"),
                frequency: Frequency::Daily,
                unit: "Index, Feb 1 2020 = 100".to_string(),
                note: None,
            };
            let series = Series::new(name.clone(), meta, observations);
            (name, series)
        })
        .collect();

    IndeedRaw {
        fetched_at: fetched_at.to_string(),
        source: "Indeed Hiring Lab".to_string(),
        attribution: "Job postings data from Indeed Hiring Lab".to_string(),
        aggregate,
        sectors,
    }
}

// =============================================================================
// Metadata & run log bookkeeping
// =============================================================================

async fn record_success(store: &dyn SnapshotStore, generated_at: &str, duration_ms: u64) {
    let writes = [
        (KEY_META_LAST_UPDATED, generated_at.to_string()),
        (KEY_META_LAST_SUCCESS, generated_at.to_string()),
        (KEY_META_LAST_ERROR, String::new()),
        (KEY_META_CONSECUTIVE_FAILURES, "0".to_string()),
        (KEY_META_LAST_DURATION_MS, duration_ms.to_string()),
    ];
    for (key, value) in writes {
        if let Err(e) = store.put_string(key, &value).await {
            warn!(key, error = %e, "failed to record success metadata");
        }
    }
}

async fn record_failure(store: &dyn SnapshotStore, error_text: &str, duration_ms: u64) {
    let failures = match store.get_string(KEY_META_CONSECUTIVE_FAILURES).await {
        Ok(Some(raw)) => raw.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
    .saturating_add(1);

    let writes = [
        (KEY_META_LAST_ERROR, error_text.to_string()),
        (KEY_META_CONSECUTIVE_FAILURES, failures.to_string()),
        (KEY_META_LAST_DURATION_MS, duration_ms.to_string()),
    ];
    for (key, value) in writes {
        if let Err(e) = store.put_string(key, &value).await {
            warn!(key, error = %e, "failed to record failure metadata");
        }
    }
}

/// Prepend `entry` and keep the log bounded, most-recent-first.
fn push_run_entry(mut log: Vec<RunLogEntry>, entry: RunLogEntry) -> Vec<RunLogEntry> {
    log.insert(0, entry);
    log.truncate(RUN_LOG_LIMIT);
    log
}

async fn append_run_log(store: &dyn SnapshotStore, entry: RunLogEntry) {
    let log = match store.get_json::<Vec<RunLogEntry>>(KEY_META_RUN_LOG).await {
        Ok(Some(log)) => log,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "run log unreadable, starting fresh");
            Vec::new()
        }
    };
    let log = push_run_entry(log, entry);
    if let Err(e) = store.put_json(KEY_META_RUN_LOG, &log, None).await {
        warn!(error = %e, "failed to append run log entry");
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::spec_for;
    use crate::settings::Settings;
    use crate::store::lock::{acquire, AcquireOutcome};
    use crate::store::{MemoryStore, KEY_LATEST_VERSION};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn obs(date: &str, value: f64) -> Observation {
        Observation {
            date: date.parse().unwrap(),
            value,
        }
    }

    fn prev_fred_with(id: &str) -> FredRaw {
        let spec = spec_for(id).unwrap();
        let mut links: BTreeMap<String, BTreeMap<String, Series>> = BTreeMap::new();
        links.entry(spec.link.to_string()).or_default().insert(
            id.to_string(),
            Series::new(id, spec.meta(), vec![obs("2024-01-01", 70.0)]),
        );
        FredRaw {
            fetched_at: "2024-12-01T00:00:00Z".into(),
            links,
        }
    }

    fn all_ok_results() -> Vec<(&'static SeriesSpec, Result<Vec<Observation>>)> {
        FRED_SERIES
            .iter()
            .map(|spec| (spec, Ok(vec![obs("2024-01-01", 5.0)])))
            .collect()
    }

    // ---- merge_fred_results ----------------------------------------------

    #[test]
    fn merge_all_success() {
        let merged = merge_fred_results(all_ok_results(), None);
        assert!(merged.missing.is_empty());
        assert!(merged.warnings.is_empty());
        assert_eq!(merged.fallback_count, 0);
        let total: usize = merged.links.values().map(|g| g.len()).sum();
        assert_eq!(total, FRED_SERIES.len());
        assert!(merged.links.contains_key("displacement"));
        assert!(merged.links.contains_key("context"));
    }

    #[test]
    fn merge_failure_with_fallback() {
        let mut results = all_ok_results();
        let idx = results.iter().position(|(s, _)| s.id == "UMCSENT").unwrap();
        results[idx].1 = Err(anyhow::anyhow!("HTTP 500"));

        let prev = prev_fred_with("UMCSENT");
        let merged = merge_fred_results(results, Some(&prev));

        assert!(merged.missing.is_empty());
        assert_eq!(merged.fallback_count, 1);
        assert_eq!(
            merged.warnings,
            vec!["FRED UMCSENT fallback to previous snapshot".to_string()]
        );
        // The fallback series carries the previous snapshot's data.
        let copied = &merged.links["spending"]["UMCSENT"];
        assert_eq!(copied.latest.unwrap().value, 70.0);
    }

    #[test]
    fn merge_failure_without_fallback_is_critical() {
        let mut results = all_ok_results();
        let idx = results.iter().position(|(s, _)| s.id == "UMCSENT").unwrap();
        results[idx].1 = Err(anyhow::anyhow!("HTTP 500"));

        let merged = merge_fred_results(results, None);
        assert_eq!(merged.missing.len(), 1);
        assert!(merged.missing[0].starts_with("UMCSENT"));
        assert_eq!(merged.fallback_count, 0);
    }

    // ---- run log ---------------------------------------------------------

    fn log_entry(run_id: &str) -> RunLogEntry {
        RunLogEntry {
            at: "2025-01-01T00:00:00Z".into(),
            ok: true,
            skipped: None,
            reason: None,
            error: None,
            trigger: Trigger::Cron,
            run_id: run_id.into(),
            duration_ms: 10,
            version: None,
            warnings: Some(0),
        }
    }

    #[test]
    fn run_log_is_most_recent_first_and_bounded() {
        let mut log = Vec::new();
        for i in 0..60 {
            log = push_run_entry(log, log_entry(&format!("run-{i}")));
        }
        assert_eq!(log.len(), RUN_LOG_LIMIT);
        assert_eq!(log[0].run_id, "run-59");
        assert_eq!(log[RUN_LOG_LIMIT - 1].run_id, "run-10");
    }

    // ---- lookback --------------------------------------------------------

    #[test]
    fn lookback_is_five_years() {
        let start = lookback_start("2025-06-15".parse().unwrap());
        assert_eq!(start.to_string(), "2020-06-15");
        // Month-end clamping instead of invalid dates.
        let clamped = lookback_start("2024-02-29".parse().unwrap());
        assert_eq!(clamped.to_string(), "2019-02-28");
    }

    // ---- metadata --------------------------------------------------------

    #[tokio::test]
    async fn failure_metadata_increments_consecutive_failures() {
        let store = MemoryStore::new();
        record_failure(&store, "boom", 5).await;
        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "1"
        );
        record_failure(&store, "boom again", 5).await;
        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "2"
        );
        assert_eq!(
            store.get_string(KEY_META_LAST_ERROR).await.unwrap().unwrap(),
            "boom again"
        );
    }

    #[tokio::test]
    async fn success_metadata_resets_failures() {
        let store = MemoryStore::new();
        record_failure(&store, "boom", 5).await;
        record_success(&store, "2025-01-01T00:00:00+00:00", 7).await;

        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "0"
        );
        assert_eq!(
            store.get_string(KEY_META_LAST_ERROR).await.unwrap().unwrap(),
            ""
        );
        assert_eq!(
            store
                .get_string(KEY_META_LAST_SUCCESS)
                .await
                .unwrap()
                .unwrap(),
            "2025-01-01T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn invalid_failure_counter_restarts_from_zero() {
        let store = MemoryStore::new();
        store
            .put_string(KEY_META_CONSECUTIVE_FAILURES, "garbage")
            .await
            .unwrap();
        record_failure(&store, "boom", 5).await;
        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "1"
        );
    }

    // ---- run() paths that never reach the network ------------------------

    fn test_state(store: Arc<MemoryStore>, api_key: &str) -> AppState {
        let settings = Settings {
            fred_api_key: api_key.into(),
            ..Settings::default()
        };
        AppState::new(settings, store)
    }

    #[tokio::test]
    async fn contended_run_is_skipped_and_logged() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            acquire(store.as_ref(), "other-run").await.unwrap(),
            AcquireOutcome::Acquired
        ));

        let state = test_state(store.clone(), "test-key");
        let outcome = run(&state, Trigger::Manual).await;
        match outcome {
            RunOutcome::Skipped { reason, .. } => {
                assert_eq!(reason, "refresh locked by other-run");
            }
            other => panic!("expected skip, got {other:?}"),
        }

        let log: Vec<RunLogEntry> = store
            .get_json(KEY_META_RUN_LOG)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].skipped, Some(true));
        assert!(!log[0].ok);

        // Skipped runs leave everything but last_attempt and the log alone.
        assert!(store
            .get_string(KEY_META_LAST_ATTEMPT)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_string(KEY_META_CONSECUTIVE_FAILURES)
            .await
            .unwrap()
            .is_none());
        assert!(store.get_string(KEY_LATEST_VERSION).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_api_key_fails_fast_without_publishing() {
        let store = Arc::new(MemoryStore::new());
        let state = test_state(store.clone(), "");

        let outcome = run(&state, Trigger::Cron).await;
        match outcome {
            RunOutcome::Failed { error, .. } => {
                assert!(error.contains("FRED_API_KEY"));
            }
            other => panic!("expected failure, got {other:?}"),
        }

        assert!(store.get_string(KEY_LATEST_VERSION).await.unwrap().is_none());
        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "1"
        );
        let log: Vec<RunLogEntry> = store.get_json(KEY_META_RUN_LOG).await.unwrap().unwrap();
        assert!(!log[0].ok);
        assert!(log[0].error.as_deref().unwrap().contains("FRED_API_KEY"));

        // The lock was released: a second failing run is not a skip.
        let outcome = run(&state, Trigger::Cron).await;
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
        assert_eq!(
            store
                .get_string(KEY_META_CONSECUTIVE_FAILURES)
                .await
                .unwrap()
                .unwrap(),
            "2"
        );
    }

    #[tokio::test]
    async fn build_indeed_raw_shapes_series() {
        let mut sectors = BTreeMap::new();
        sectors.insert(
            "Accounting".to_string(),
            vec![obs("2024-01-02", 95.0), obs("2024-01-01", 94.0)],
        );
        let data = PostingsData {
            aggregate: vec![obs("2024-01-01", 100.0)],
            sectors,
        };
        let raw = build_indeed_raw(data, "2025-01-01T00:00:00Z");

        assert_eq!(raw.source, "Indeed Hiring Lab");
        assert_eq!(raw.aggregate.count, 1);
        let accounting = &raw.sectors["Accounting"];
        // Series construction re-sorts whatever the parser produced.
        assert_eq!(accounting.observations[0].value, 94.0);
        assert_eq!(accounting.latest.unwrap().value, 95.0);
    }
}
