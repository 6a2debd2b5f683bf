// =============================================================================
// HTTP Client with Retry — bounded attempts, capped backoff with jitter
// =============================================================================
//
// Retry policy:
//   - Per-attempt timeout (default 12 000 ms); a timed-out attempt is
//     cancelled and counts as one attempt.
//   - 3 attempts total by default.
//   - Retryable: any transport error, plus HTTP 408, 425, 429, and 5xx.
//     Every other non-2xx status is terminal.
//   - Backoff before attempt N+1: min(2500, 300 * 2^(N-1) + U[0,120)) ms.
//
// Final errors always carry the caller-supplied label so upstream failures
// are attributable in the run log.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

/// Backoff cap in milliseconds.
const BACKOFF_CAP_MS: u64 = 2_500;
/// Base delay before the second attempt.
const BACKOFF_BASE_MS: u64 = 300;
/// Exclusive upper bound of the jitter added to each backoff.
const BACKOFF_JITTER_MS: u64 = 120;
/// How much response body to keep in error messages.
const ERROR_BODY_SNIPPET: usize = 200;

/// Per-call fetch policy.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    pub timeout_ms: u64,
    pub attempts: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 12_000,
            attempts: 3,
        }
    }
}

/// Why a single attempt failed.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("HTTP {status}: {snippet}")]
    Status { status: StatusCode, snippet: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl AttemptError {
    fn retryable(&self) -> bool {
        match self {
            // Network, DNS, timeout, cancelled body reads: always retry.
            Self::Transport(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error()
                    || matches!(
                        *status,
                        StatusCode::REQUEST_TIMEOUT
                            | StatusCode::TOO_EARLY
                            | StatusCode::TOO_MANY_REQUESTS
                    )
            }
        }
    }
}

/// Delay before attempt `failed + 1`, given `failed` attempts so far.
fn backoff_ms(failed: u32, jitter_ms: u64) -> u64 {
    let base = BACKOFF_BASE_MS.saturating_mul(1u64 << (failed.saturating_sub(1)).min(16));
    base.saturating_add(jitter_ms).min(BACKOFF_CAP_MS)
}

/// Outbound HTTP client shared by all fetchers.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        // Timeouts are per-request (from the policy), not client-wide.
        let client = reqwest::Client::builder()
            .user_agent(concat!("stress-index/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client");
        Self { client }
    }

    /// GET `url` and return the body on 2xx, retrying per `policy`.
    pub async fn fetch_text(&self, url: &str, label: &str, policy: FetchPolicy) -> Result<String> {
        let attempts = policy.attempts.max(1);
        let mut last_err: Option<AttemptError> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let jitter = rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
                let delay = backoff_ms(attempt - 1, jitter);
                debug!(label, attempt, delay_ms = delay, "backing off before retry");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.attempt(url, policy.timeout_ms).await {
                Ok(body) => {
                    if attempt > 1 {
                        debug!(label, attempt, "fetch recovered after retry");
                    }
                    return Ok(body);
                }
                Err(e) => {
                    let retryable = e.retryable();
                    warn!(label, attempt, retryable, error = %e, "fetch attempt failed");
                    if !retryable {
                        return Err(anyhow::Error::new(e).context(format!("{label}: request failed")));
                    }
                    last_err = Some(e);
                }
            }
        }

        let e = last_err.expect("at least one attempt always runs");
        Err(anyhow::Error::new(e)
            .context(format!("{label}: request failed after {attempts} attempts")))
    }

    async fn attempt(&self, url: &str, timeout_ms: u64) -> std::result::Result<String, AttemptError> {
        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.text().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(ERROR_BODY_SNIPPET).collect();
        Err(AttemptError::Status { status, snippet })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish()
    }
}
