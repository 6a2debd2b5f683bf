// =============================================================================
// FRED Series Fetcher — observations for one series id
// =============================================================================
//
// GET {base}/fred/series/observations with series_id, api_key,
// file_type=json, sort_order=asc, observation_start. The response is parsed
// defensively: unknown fields ignored, entries with an empty or "." value
// (FRED's missing-data marker) dropped, non-finite values dropped. A series
// with nothing left after filtering is an error, never an empty publish.
// =============================================================================

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::fetch::http::{FetchPolicy, HttpClient};
use crate::types::Observation;

#[derive(Debug, Error)]
pub enum SeriesParseError {
    #[error("empty-series: no usable observations after filtering")]
    Empty,
    #[error("malformed observations payload: {0}")]
    Malformed(String),
}

/// Client for the FRED observations endpoint.
#[derive(Clone)]
pub struct SeriesClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl SeriesClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch one series' observations from `observation_start` onward.
    pub async fn fetch(
        &self,
        series_id: &str,
        observation_start: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", &observation_start.to_string()),
            ],
        )
        .with_context(|| format!("invalid FRED url for {series_id}"))?;

        let label = format!("FRED {series_id}");
        let body = self
            .http
            .fetch_text(url.as_str(), &label, FetchPolicy::default())
            .await?;

        let observations = parse_observations(&body).with_context(|| label.clone())?;
        debug!(series_id, count = observations.len(), "FRED series fetched");
        Ok(observations)
    }
}

impl std::fmt::Debug for SeriesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Project the raw JSON body into filtered observations.
pub fn parse_observations(body: &str) -> std::result::Result<Vec<Observation>, SeriesParseError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SeriesParseError::Malformed(e.to_string()))?;

    let entries = value["observations"]
        .as_array()
        .ok_or_else(|| SeriesParseError::Malformed("missing observations array".into()))?;

    let mut observations = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(date) = entry["date"].as_str().and_then(|d| d.parse::<NaiveDate>().ok()) else {
            continue;
        };

        // FRED encodes missing values as "." (or occasionally empty).
        let raw = match &entry["value"] {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if raw.is_empty() || raw == "." {
            continue;
        }

        let Ok(value) = raw.parse::<f64>() else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }

        observations.push(Observation { date, value });
    }

    if observations.is_empty() {
        return Err(SeriesParseError::Empty);
    }
    Ok(observations)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_observations() {
        let body = r#"{
            "realtime_start": "2025-01-01",
            "observations": [
                {"date": "2024-01-01", "value": "4.1"},
                {"date": "2024-02-01", "value": "4.2"}
            ]
        }"#;
        let obs = parse_observations(body).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].date.to_string(), "2024-01-01");
        assert!((obs[1].value - 4.2).abs() < 1e-12);
    }

    #[test]
    fn filters_missing_value_markers() {
        let body = r#"{"observations": [
            {"date": "2024-01-01", "value": "."},
            {"date": "2024-02-01", "value": ""},
            {"date": "2024-03-01", "value": "5.0"},
            {"date": "2024-04-01", "value": "NaN"},
            {"date": "not-a-date", "value": "6.0"}
        ]}"#;
        let obs = parse_observations(body).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].value, 5.0);
    }

    #[test]
    fn all_missing_is_empty_series() {
        let body = r#"{"observations": [
            {"date": "2024-01-01", "value": "."},
            {"date": "2024-02-01", "value": "."}
        ]}"#;
        let err = parse_observations(body).unwrap_err();
        assert!(matches!(err, SeriesParseError::Empty));
        assert!(err.to_string().starts_with("empty-series"));
    }

    #[test]
    fn numeric_values_are_accepted() {
        let body = r#"{"observations": [{"date": "2024-01-01", "value": 3.5}]}"#;
        let obs = parse_observations(body).unwrap();
        assert_eq!(obs[0].value, 3.5);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            parse_observations("not json"),
            Err(SeriesParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_observations(r#"{"observations": 7}"#),
            Err(SeriesParseError::Malformed(_))
        ));
    }
}
