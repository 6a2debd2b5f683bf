// =============================================================================
// Settings — process-wide configuration read from the environment
// =============================================================================
//
// Everything is read once at startup. `FRED_API_KEY` may be absent at boot
// (the service still serves whatever was last published) but any refresh will
// fail fast without it. `REFRESH_TOKEN` unset means the manual refresh
// endpoint rejects all callers.
// =============================================================================

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const DEFAULT_INDEED_AGGREGATE_URL: &str =
    "https://raw.githubusercontent.com/hiring-lab/data/master/US/aggregate_job_postings_US.csv";
const DEFAULT_INDEED_SECTOR_URL: &str =
    "https://raw.githubusercontent.com/hiring-lab/data/master/US/job_postings_by_sector_US.csv";

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub static_dir: String,
    /// FRED API key; empty means refreshes abort before any fetch.
    pub fred_api_key: String,
    /// Shared secret for `POST /api/refresh`; empty rejects all callers.
    pub refresh_token: String,
    pub fred_base_url: String,
    pub indeed_aggregate_url: String,
    pub indeed_sector_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            static_dir: DEFAULT_STATIC_DIR.into(),
            fred_api_key: String::new(),
            refresh_token: String::new(),
            fred_base_url: DEFAULT_FRED_BASE_URL.into(),
            indeed_aggregate_url: DEFAULT_INDEED_AGGREGATE_URL.into(),
            indeed_sector_url: DEFAULT_INDEED_SECTOR_URL.into(),
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_or("STRESS_BIND_ADDR", &defaults.bind_addr),
            static_dir: env_or("STRESS_STATIC_DIR", &defaults.static_dir),
            fred_api_key: env_or("FRED_API_KEY", ""),
            refresh_token: env_or("REFRESH_TOKEN", ""),
            fred_base_url: env_or("FRED_BASE_URL", &defaults.fred_base_url),
            indeed_aggregate_url: env_or("INDEED_AGGREGATE_URL", &defaults.indeed_aggregate_url),
            indeed_sector_url: env_or("INDEED_SECTOR_URL", &defaults.indeed_sector_url),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
