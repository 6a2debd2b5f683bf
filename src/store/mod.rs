// =============================================================================
// Snapshot Store — key-value persistence behind the pipeline
// =============================================================================
//
// The pipeline needs nothing fancier than atomic per-key writes with an
// optional TTL; there are no multi-key transactions. `SnapshotStore` is the
// seam, `MemoryStore` the default backing (a guarded HashMap with lazy
// expiry). Publication-order guarantees live in the pipeline layer, not here.
// =============================================================================

pub mod lock;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

// =============================================================================
// Key layout
// =============================================================================

/// Publication pointer: the version readers should resolve.
pub const KEY_LATEST_VERSION: &str = "latest:version";
/// Advisory refresh lock.
pub const KEY_LOCK_REFRESH: &str = "lock:refresh";

pub const KEY_META_LAST_UPDATED: &str = "meta:last_updated";
pub const KEY_META_LAST_ATTEMPT: &str = "meta:last_attempt";
pub const KEY_META_LAST_SUCCESS: &str = "meta:last_success";
pub const KEY_META_LAST_ERROR: &str = "meta:last_error";
pub const KEY_META_CONSECUTIVE_FAILURES: &str = "meta:consecutive_failures";
pub const KEY_META_LAST_DURATION_MS: &str = "meta:last_duration_ms";
pub const KEY_META_RUN_LOG: &str = "meta:run_log";

/// The three payload kinds published per version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Indicators,
    FredRaw,
    IndeedRaw,
}

impl SnapshotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indicators => "indicators",
            Self::FredRaw => "fred_raw",
            Self::IndeedRaw => "indeed_raw",
        }
    }
}

/// Per-version payload key: `snap:<version>:<kind>`.
pub fn snap_key(version: &str, kind: SnapshotKind) -> String {
    format!("snap:{}:{}", version, kind.as_str())
}

/// Legacy direct key: `latest:<kind>` (kept for older dashboard builds).
pub fn legacy_key(kind: SnapshotKind) -> String {
    format!("latest:{}", kind.as_str())
}

// =============================================================================
// Store trait
// =============================================================================

/// Byte-valued key-value store with per-key atomic writes and optional TTL.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// JSON and string conveniences layered over the byte interface.
#[async_trait]
pub trait SnapshotStoreExt: SnapshotStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(
                String::from_utf8(bytes).with_context(|| format!("key {key} is not UTF-8"))?,
            )),
            None => Ok(None),
        }
    }

    async fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, value.as_bytes().to_vec(), None).await
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("key {key} holds malformed JSON"))?,
            )),
            None => Ok(None),
        }
    }

    async fn put_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(value).context("failed to serialise value")?;
        self.put(key, bytes, ttl).await
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStoreExt for S {}

// =============================================================================
// In-memory implementation
// =============================================================================

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Process-local store. Every operation takes the write guard so expired
/// entries can be purged on read.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.expired(now)) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.put("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), b"v");

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ttl_expiry_is_lazy_but_effective() {
        let store = MemoryStore::new();
        store
            .put("k", b"v".to_vec(), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_helpers_roundtrip() {
        let store = MemoryStore::new();
        let value = serde_json::json!({"a": 1, "b": [1, 2, 3]});
        store.put_json("j", &value, None).await.unwrap();
        let read: serde_json::Value = store.get_json("j").await.unwrap().unwrap();
        assert_eq!(read, value);
    }

    #[tokio::test]
    async fn string_helpers_roundtrip() {
        let store = MemoryStore::new();
        store.put_string("s", "hello").await.unwrap();
        assert_eq!(store.get_string("s").await.unwrap().unwrap(), "hello");
    }

    #[test]
    fn key_builders() {
        assert_eq!(
            snap_key("1700000000000-abcd1234", SnapshotKind::Indicators),
            "snap:1700000000000-abcd1234:indicators"
        );
        assert_eq!(legacy_key(SnapshotKind::FredRaw), "latest:fred_raw");
    }
}
