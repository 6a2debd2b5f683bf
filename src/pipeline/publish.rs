// =============================================================================
// Versioned Publication — three payloads, one pointer flip
// =============================================================================
//
// Publication order is the consistency mechanism: all three per-version
// payloads are written (concurrently) before `latest:version` is flipped,
// and the legacy direct keys are overwritten only after the flip. A reader
// that resolves a version therefore always finds its full payload triple; a
// reader racing the flip sees the previous coherent version.
// =============================================================================

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

use crate::store::{
    legacy_key, snap_key, SnapshotKind, SnapshotStore, SnapshotStoreExt, KEY_LATEST_VERSION,
};
use crate::types::{FredRaw, IndeedRaw, IndicatorsSnapshot};

/// Publication version: `<unix-millis>-<first-8-of-run-id>`.
pub fn version_string(now_ms: i64, run_id: &Uuid) -> String {
    let id = run_id.simple().to_string();
    format!("{}-{}", now_ms, &id[..8])
}

/// Write one version's payloads and make it the published one.
pub async fn publish(
    store: &dyn SnapshotStore,
    version: &str,
    indicators: &IndicatorsSnapshot,
    fred: &FredRaw,
    indeed: &IndeedRaw,
) -> Result<()> {
    let indicators_bytes = serde_json::to_vec(indicators).context("serialise indicators")?;
    let fred_bytes = serde_json::to_vec(fred).context("serialise fred_raw")?;
    let indeed_bytes = serde_json::to_vec(indeed).context("serialise indeed_raw")?;

    // Phase 1: all three per-version payloads, concurrently.
    let indicators_key = snap_key(version, SnapshotKind::Indicators);
    let fred_key = snap_key(version, SnapshotKind::FredRaw);
    let indeed_key = snap_key(version, SnapshotKind::IndeedRaw);
    let (a, b, c) = tokio::join!(
        store.put(&indicators_key, indicators_bytes.clone(), None),
        store.put(&fred_key, fred_bytes.clone(), None),
        store.put(&indeed_key, indeed_bytes.clone(), None),
    );
    a.context("write versioned indicators")?;
    b.context("write versioned fred_raw")?;
    c.context("write versioned indeed_raw")?;

    // Phase 2: the pointer flip makes the new version visible.
    store
        .put_string(KEY_LATEST_VERSION, version)
        .await
        .context("flip latest:version")?;

    // Phase 3: legacy direct keys for older dashboard builds.
    let legacy_indicators_key = legacy_key(SnapshotKind::Indicators);
    let legacy_fred_key = legacy_key(SnapshotKind::FredRaw);
    let legacy_indeed_key = legacy_key(SnapshotKind::IndeedRaw);
    let (a, b, c) = tokio::join!(
        store.put(&legacy_indicators_key, indicators_bytes, None),
        store.put(&legacy_fred_key, fred_bytes, None),
        store.put(&legacy_indeed_key, indeed_bytes, None),
    );
    a.context("write legacy indicators")?;
    b.context("write legacy fred_raw")?;
    c.context("write legacy indeed_raw")?;

    info!(version, "snapshot published");
    Ok(())
}

/// Resolve the currently published payload of one kind.
///
/// Pointer first, then the per-version key; the legacy direct key is only
/// consulted when the pointer itself is missing.
pub async fn resolve_latest(
    store: &dyn SnapshotStore,
    kind: SnapshotKind,
) -> Result<Option<Vec<u8>>> {
    match store.get_string(KEY_LATEST_VERSION).await? {
        Some(version) => store.get(&snap_key(&version, kind)).await,
        None => store.get(&legacy_key(kind)).await,
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::*;
    use std::collections::BTreeMap;

    fn sample_indicators(version: &str) -> IndicatorsSnapshot {
        IndicatorsSnapshot {
            generated_at: "2025-01-01T00:00:00Z".into(),
            fred_fetched_at: "2025-01-01T00:00:00Z".into(),
            indeed_fetched_at: "2025-01-01T00:00:00Z".into(),
            composite: Composite {
                score: 0.0,
                scale: "0 (calm) to 100 (systemic stress)".into(),
                histogram: BTreeMap::new(),
                interpretation: "Normal".into(),
            },
            derived: BTreeMap::new(),
            links: BTreeMap::new(),
            pipeline: PipelineMeta {
                version: version.into(),
                trigger: Trigger::Manual,
                run_id: "r".into(),
                source_status: SourceStatus {
                    fred: SourceFreshness::Fresh,
                    indeed: SourceFreshness::Fresh,
                },
                fallback_counts: FallbackCounts::default(),
                warnings: vec![],
            },
        }
    }

    fn sample_fred() -> FredRaw {
        FredRaw {
            fetched_at: "2025-01-01T00:00:00Z".into(),
            links: BTreeMap::new(),
        }
    }

    fn sample_indeed() -> IndeedRaw {
        let meta = SeriesMeta {
            name: "US Job Postings".into(),
            frequency: Frequency::Daily,
            unit: "Index Feb 2020 = 100".into(),
            note: None,
        };
        IndeedRaw {
            fetched_at: "2025-01-01T00:00:00Z".into(),
            source: "Indeed Hiring Lab".into(),
            attribution: "Indeed Hiring Lab Job Postings Index".into(),
            aggregate: Series::new(
                "aggregate",
                meta,
                vec![Observation {
                    date: "2024-01-01".parse().unwrap(),
                    value: 100.0,
                }],
            ),
            sectors: BTreeMap::new(),
        }
    }

    #[test]
    fn version_string_format() {
        let run_id = Uuid::new_v4();
        let v = version_string(1_700_000_000_000, &run_id);
        let (millis, short) = v.split_once('-').unwrap();
        assert_eq!(millis, "1700000000000");
        assert_eq!(short.len(), 8);
        assert!(run_id.simple().to_string().starts_with(short));
    }

    #[tokio::test]
    async fn publish_then_resolve_roundtrip() {
        let store = MemoryStore::new();
        let version = "1700000000000-abcd1234";
        publish(
            &store,
            version,
            &sample_indicators(version),
            &sample_fred(),
            &sample_indeed(),
        )
        .await
        .unwrap();

        // All three versioned payloads exist.
        for kind in [SnapshotKind::Indicators, SnapshotKind::FredRaw, SnapshotKind::IndeedRaw] {
            assert!(store.get(&snap_key(version, kind)).await.unwrap().is_some());
        }

        // Pointer resolves to the new payload.
        let bytes = resolve_latest(&store, SnapshotKind::Indicators)
            .await
            .unwrap()
            .unwrap();
        let snapshot: IndicatorsSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot.pipeline.version, version);

        // Legacy keys were written too.
        assert!(store
            .get(&legacy_key(SnapshotKind::Indicators))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn second_publish_supersedes_the_first() {
        let store = MemoryStore::new();
        publish(&store, "1-aaaaaaaa", &sample_indicators("1-aaaaaaaa"), &sample_fred(), &sample_indeed())
            .await
            .unwrap();
        publish(&store, "2-bbbbbbbb", &sample_indicators("2-bbbbbbbb"), &sample_fred(), &sample_indeed())
            .await
            .unwrap();

        let bytes = resolve_latest(&store, SnapshotKind::Indicators)
            .await
            .unwrap()
            .unwrap();
        let snapshot: IndicatorsSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot.pipeline.version, "2-bbbbbbbb");

        // The superseded payload is still addressable by version.
        assert!(store
            .get(&snap_key("1-aaaaaaaa", SnapshotKind::Indicators))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn missing_pointer_falls_back_to_legacy_keys() {
        let store = MemoryStore::new();
        store
            .put(&legacy_key(SnapshotKind::Indicators), b"{\"legacy\":true}".to_vec(), None)
            .await
            .unwrap();

        let bytes = resolve_latest(&store, SnapshotKind::Indicators)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bytes, b"{\"legacy\":true}");
    }

    #[tokio::test]
    async fn nothing_published_resolves_to_none() {
        let store = MemoryStore::new();
        assert!(resolve_latest(&store, SnapshotKind::FredRaw)
            .await
            .unwrap()
            .is_none());
    }
}
