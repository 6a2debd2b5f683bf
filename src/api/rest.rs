// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// The read side of the pipeline. Snapshot endpoints serve the stored bytes of
// the currently published version; `/api/health` and `/api/runs` expose the
// refresh bookkeeping; `POST /api/refresh` triggers a manual run behind a
// bearer token. Unknown `/api/` paths get a JSON 404; everything else is
// delegated to the static dashboard directory.
//
// All JSON responses are cacheable for 60 seconds — the data changes every
// six hours, the dashboard polls every minute.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::api::auth::authorize_refresh;
use crate::app_state::AppState;
use crate::pipeline::publish::resolve_latest;
use crate::pipeline::refresh::{run, RunOutcome};
use crate::store::{
    SnapshotKind, SnapshotStoreExt, KEY_LATEST_VERSION, KEY_META_CONSECUTIVE_FAILURES,
    KEY_META_LAST_ATTEMPT, KEY_META_LAST_DURATION_MS, KEY_META_LAST_ERROR,
    KEY_META_LAST_SUCCESS, KEY_META_LAST_UPDATED, KEY_META_RUN_LOG,
};
use crate::types::{RunLogEntry, Trigger};

/// Published data older than this renders the service unhealthy.
const STALE_AFTER_MINUTES: f64 = 720.0;
/// Consecutive failures at or above this render the service unhealthy.
const FAILURE_THRESHOLD: u32 = 3;

// =============================================================================
// Router construction
// =============================================================================

/// Build the API router with CORS, the JSON 404 for unknown `/api/` paths,
/// and static-asset fallback for everything else.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.settings.static_dir.clone();

    Router::new()
        .route("/api/health", get(health))
        .route("/api/indicators", get(indicators))
        .route("/api/fred_raw", get(fred_raw))
        .route("/api/indeed_raw", get(indeed_raw))
        .route("/api/runs", get(runs))
        .route("/api/refresh", post(refresh))
        .route("/api/*rest", any(api_not_found))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Response helpers
// =============================================================================

fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    json_bytes_response(status, body.to_string().into_bytes())
}

/// Serve pre-serialised JSON (snapshot payloads come straight from the store).
fn json_bytes_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=60"),
        ],
        body,
    )
        .into_response()
}

// =============================================================================
// Health
// =============================================================================

/// Age of the last success in minutes, and the resulting health flag.
fn evaluate_health(
    last_success: Option<&str>,
    consecutive_failures: u32,
    now: DateTime<Utc>,
) -> (Option<f64>, bool) {
    let age_minutes = last_success
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| (now - ts.with_timezone(&Utc)).num_seconds() as f64 / 60.0);

    let fresh_enough = age_minutes.map_or(true, |age| age < STALE_AFTER_MINUTES);
    let healthy = last_success.is_some() && fresh_enough && consecutive_failures < FAILURE_THRESHOLD;
    (age_minutes, healthy)
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let store = state.store.as_ref();

    let last_updated = store.get_string(KEY_META_LAST_UPDATED).await.ok().flatten();
    let last_attempt = store.get_string(KEY_META_LAST_ATTEMPT).await.ok().flatten();
    let last_success = store.get_string(KEY_META_LAST_SUCCESS).await.ok().flatten();
    let last_error = store.get_string(KEY_META_LAST_ERROR).await.ok().flatten();
    let version = store.get_string(KEY_LATEST_VERSION).await.ok().flatten();
    let last_duration_ms = store
        .get_string(KEY_META_LAST_DURATION_MS)
        .await
        .ok()
        .flatten()
        .and_then(|raw| raw.parse::<u64>().ok());
    let consecutive_failures = store
        .get_string(KEY_META_CONSECUTIVE_FAILURES)
        .await
        .ok()
        .flatten()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(0);

    let (age_minutes, healthy) =
        evaluate_health(last_success.as_deref(), consecutive_failures, Utc::now());

    // Health is always a 200; the flag lives in the body.
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "healthy": healthy,
            "service": env!("CARGO_PKG_NAME"),
            "uptime_s": state.start_time.elapsed().as_secs(),
            "last_updated": last_updated,
            "last_attempt": last_attempt,
            "last_success": last_success,
            "last_error": last_error,
            "consecutive_failures": consecutive_failures,
            "version": version,
            "last_duration_ms": last_duration_ms,
            "age_minutes": age_minutes,
        }),
    )
}

// =============================================================================
// Snapshot reads
// =============================================================================

async fn serve_snapshot(state: &AppState, kind: SnapshotKind) -> Response {
    match resolve_latest(state.store.as_ref(), kind).await {
        Ok(Some(bytes)) => json_bytes_response(StatusCode::OK, bytes),
        Ok(None) => json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({"error": "No data yet."}),
        ),
        Err(e) => {
            error!(kind = kind.as_str(), error = %e, "snapshot read failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": "snapshot read failed"}),
            )
        }
    }
}

async fn indicators(State(state): State<Arc<AppState>>) -> Response {
    serve_snapshot(&state, SnapshotKind::Indicators).await
}

async fn fred_raw(State(state): State<Arc<AppState>>) -> Response {
    serve_snapshot(&state, SnapshotKind::FredRaw).await
}

async fn indeed_raw(State(state): State<Arc<AppState>>) -> Response {
    serve_snapshot(&state, SnapshotKind::IndeedRaw).await
}

// =============================================================================
// Run history
// =============================================================================

async fn runs(State(state): State<Arc<AppState>>) -> Response {
    let log = match state
        .store
        .get_json::<Vec<RunLogEntry>>(KEY_META_RUN_LOG)
        .await
    {
        Ok(Some(log)) => log,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "run log unreadable");
            Vec::new()
        }
    };

    json_response(
        StatusCode::OK,
        serde_json::json!({"ok": true, "runs": log}),
    )
}

// =============================================================================
// Manual refresh
// =============================================================================

async fn refresh(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !authorize_refresh(&headers, &state.settings.refresh_token) {
        return json_response(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "unauthorized"}),
        );
    }

    match run(&state, Trigger::Manual).await {
        RunOutcome::Completed {
            run_id,
            version,
            generated_at,
            warnings,
        } => json_response(
            StatusCode::OK,
            serde_json::json!({
                "ok": true,
                "generated_at": generated_at,
                "version": version,
                "warnings": warnings,
                "run_id": run_id,
            }),
        ),
        RunOutcome::Skipped { reason, .. } => json_response(
            StatusCode::CONFLICT,
            serde_json::json!({"error": "refresh_locked", "reason": reason}),
        ),
        RunOutcome::Failed { error, .. } => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": error}),
        ),
    }
}

// =============================================================================
// Fallbacks
// =============================================================================

async fn api_not_found() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        serde_json::json!({"error": "not_found"}),
    )
}
