// =============================================================================
// Stress Index — Main Entry Point
// =============================================================================
//
// A scheduled macroeconomic pipeline: every six hours (or on demand via the
// authenticated refresh endpoint) it pulls FRED series and Indeed postings
// feeds, computes the chain-link stress indicators and composite score, and
// publishes a versioned snapshot that the read API serves to the dashboard.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod catalog;
mod compute;
mod fetch;
mod pipeline;
mod scheduler;
mod settings;
mod store;
mod types;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::pipeline::publish::resolve_latest;
use crate::settings::Settings;
use crate::store::{MemoryStore, SnapshotKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Stress Index Pipeline — Starting Up              ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    if settings.fred_api_key.is_empty() {
        warn!("FRED_API_KEY is not set — refreshes will fail until it is configured");
    }
    if settings.refresh_token.is_empty() {
        warn!("REFRESH_TOKEN is not set — the manual refresh endpoint will reject all callers");
    }

    // ── 2. Build shared state ────────────────────────────────────────────
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(settings.clone(), store));

    match resolve_latest(state.store.as_ref(), SnapshotKind::Indicators).await {
        Ok(Some(_)) => info!("published snapshot found on startup"),
        _ => info!("no published snapshot yet — first refresh will create one"),
    }

    // ── 3. Start the refresh scheduler ───────────────────────────────────
    let _scheduler = scheduler::start(state.clone()).await?;

    // ── 4. Start the API server ──────────────────────────────────────────
    let bind_addr = settings.bind_addr.clone();
    let api_state = state.clone();
    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping");

    info!("Stress Index Pipeline shut down complete.");
    Ok(())
}
