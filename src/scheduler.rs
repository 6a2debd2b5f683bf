// =============================================================================
// Refresh Scheduler — cron cadence for the pipeline
// =============================================================================
//
// One job: run the refresh at minute 0 of every sixth hour, UTC. Manual
// refreshes share the same orchestrator and are serialised against cron runs
// by the refresh lock, so an overlap degrades to a logged skip.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::pipeline::refresh::{run, RunOutcome};
use crate::types::Trigger;

/// Every 6 hours on the hour, UTC (seconds-resolution cron).
pub const REFRESH_SCHEDULE: &str = "0 0 */6 * * *";

/// Start the scheduler and register the refresh job.
pub async fn start(state: Arc<AppState>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("failed to create job scheduler")?;

    let job = Job::new_async(REFRESH_SCHEDULE, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            match run(&state, Trigger::Cron).await {
                RunOutcome::Completed { version, .. } => {
                    info!(%version, "scheduled refresh completed");
                }
                RunOutcome::Skipped { reason, .. } => {
                    info!(%reason, "scheduled refresh skipped");
                }
                RunOutcome::Failed { error: e, .. } => {
                    error!(error = %e, "scheduled refresh failed");
                }
            }
        })
    })
    .context("invalid refresh cron expression")?;

    scheduler.add(job).await.context("failed to add refresh job")?;
    scheduler.start().await.context("failed to start scheduler")?;

    info!(schedule = REFRESH_SCHEDULE, "refresh scheduler started");
    Ok(scheduler)
}
