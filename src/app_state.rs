// =============================================================================
// Central Application State
// =============================================================================
//
// The handle shared by the API handlers, the cron job, and the orchestrator.
// All mutable state lives behind the snapshot store; this struct only ties
// together the configuration, the store, and the outbound HTTP client.
// =============================================================================

use std::sync::Arc;

use crate::fetch::http::HttpClient;
use crate::settings::Settings;
use crate::store::SnapshotStore;

/// Shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn SnapshotStore>,
    pub http: HttpClient,
    /// Instant the service was started, for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            settings,
            store,
            http: HttpClient::new(),
            start_time: std::time::Instant::now(),
        }
    }
}
