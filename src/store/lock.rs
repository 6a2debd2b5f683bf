// =============================================================================
// Refresh Lock — advisory single-writer lock in the snapshot store
// =============================================================================
//
// At most one refresh may run at a time, across cron and manual triggers.
// The lock is a JSON value under `lock:refresh` with a 15-minute TTL; the TTL
// guarantees forward progress if a refresh crashes without releasing. After
// writing, the acquirer re-reads and verifies ownership, since the store
// contract is only per-key atomicity.
// =============================================================================

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{SnapshotStore, SnapshotStoreExt, KEY_LOCK_REFRESH};

/// Lock lifetime. Also the backstop on total refresh time.
pub const LOCK_TTL: Duration = Duration::from_secs(15 * 60);

/// The persisted lock value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshLock {
    pub owner: String,
    pub acquired_at: String,
    pub expires_at_ms: i64,
}

/// Result of an acquisition attempt. `Rejected` is not an error: the caller
/// skips the run and reports the reason.
#[derive(Debug)]
pub enum AcquireOutcome {
    Acquired,
    Rejected(String),
}

/// Try to take the refresh lock for `owner`.
pub async fn acquire(store: &dyn SnapshotStore, owner: &str) -> Result<AcquireOutcome> {
    let now_ms = Utc::now().timestamp_millis();

    if let Some(existing) = store.get_json::<RefreshLock>(KEY_LOCK_REFRESH).await? {
        if existing.expires_at_ms > now_ms {
            return Ok(AcquireOutcome::Rejected(format!(
                "refresh locked by {}",
                existing.owner
            )));
        }
        debug!(owner = %existing.owner, "stale refresh lock found, replacing");
    }

    let lock = RefreshLock {
        owner: owner.to_string(),
        acquired_at: Utc::now().to_rfc3339(),
        expires_at_ms: now_ms + LOCK_TTL.as_millis() as i64,
    };
    store
        .put_json(KEY_LOCK_REFRESH, &lock, Some(LOCK_TTL))
        .await?;

    // Verify ownership after the write; a concurrent acquirer may have won.
    match store.get_json::<RefreshLock>(KEY_LOCK_REFRESH).await? {
        Some(current) if current.owner == owner => Ok(AcquireOutcome::Acquired),
        _ => Ok(AcquireOutcome::Rejected("lock verification failed".into())),
    }
}

/// Release the lock if `owner` still holds it. Best-effort: a lost or
/// expired lock is left alone.
pub async fn release(store: &dyn SnapshotStore, owner: &str) {
    let current = match store.get_json::<RefreshLock>(KEY_LOCK_REFRESH).await {
        Ok(current) => current,
        Err(e) => {
            warn!(error = %e, "failed to read refresh lock during release");
            return;
        }
    };

    match current {
        Some(lock) if lock.owner == owner => {
            if let Err(e) = store.delete(KEY_LOCK_REFRESH).await {
                warn!(error = %e, "failed to delete refresh lock");
            }
        }
        _ => {} // Not ours anymore; leave it.
    }
}
