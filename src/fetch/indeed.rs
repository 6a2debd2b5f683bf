// =============================================================================
// Indeed Postings Fetcher — aggregate and by-sector CSV feeds
// =============================================================================
//
// Two fixed CSV endpoints from the Hiring Lab data repository, fetched as a
// concurrent pair. Parsing is a naive comma split indexed by the header row;
// these datasets contain no quoted commas, and any row whose column count
// disagrees with the header is silently skipped.
//
// Aggregate rows: value is the first non-empty of the seasonally adjusted
// column, then the raw index column. Sector rows: only the tracked
// display_name values with variable == "total postings". Both containers are
// trimmed to the trailing 730 observations.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::TARGET_SECTORS;
use crate::fetch::http::{FetchPolicy, HttpClient};
use crate::types::Observation;

/// Keep at most this many trailing observations per postings series.
pub const MAX_POSTINGS_POINTS: usize = 730;

const COL_DATE: &str = "date";
const COL_INDEX_SA: &str = "indeed_job_postings_index_SA";
const COL_INDEX: &str = "indeed_job_postings_index";
const COL_DISPLAY_NAME: &str = "display_name";
const COL_VARIABLE: &str = "variable";
const VARIABLE_TOTAL: &str = "total postings";

/// Parsed output of one postings fetch.
#[derive(Debug)]
pub struct PostingsData {
    pub aggregate: Vec<Observation>,
    pub sectors: BTreeMap<String, Vec<Observation>>,
}

/// Client for the two postings CSV feeds.
#[derive(Debug, Clone)]
pub struct PostingsClient {
    http: HttpClient,
    aggregate_url: String,
    sector_url: String,
}

impl PostingsClient {
    pub fn new(
        http: HttpClient,
        aggregate_url: impl Into<String>,
        sector_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            aggregate_url: aggregate_url.into(),
            sector_url: sector_url.into(),
        }
    }

    /// Fetch both feeds concurrently and parse them.
    pub async fn fetch(&self) -> Result<PostingsData> {
        let (aggregate_body, sector_body) = tokio::join!(
            self.http
                .fetch_text(&self.aggregate_url, "Indeed aggregate", FetchPolicy::default()),
            self.http
                .fetch_text(&self.sector_url, "Indeed sectors", FetchPolicy::default()),
        );

        let aggregate = parse_aggregate(&aggregate_body?).context("Indeed aggregate")?;
        let sectors = parse_sectors(&sector_body?).context("Indeed sectors")?;

        debug!(
            aggregate_points = aggregate.len(),
            sectors = sectors.len(),
            "Indeed postings fetched"
        );
        Ok(PostingsData { aggregate, sectors })
    }
}

/// Header-indexed view over a naively split CSV.
struct CsvTable<'a> {
    header: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

fn split_csv(body: &str) -> Option<CsvTable<'_>> {
    let mut lines = body.lines().map(|l| l.trim_end_matches('\r'));
    let header: Vec<&str> = lines.next()?.split(',').collect();
    let width = header.len();

    let rows = lines
        .filter(|l| !l.is_empty())
        .map(|l| l.split(',').collect::<Vec<_>>())
        // Width mismatch means the naive split mangled the row; drop it.
        .filter(|cols| cols.len() == width)
        .collect();

    Some(CsvTable { header, rows })
}

impl<'a> CsvTable<'a> {
    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| *h == name)
    }
}

fn parse_point(date: &str, value: &str) -> Option<Observation> {
    let date = date.parse::<NaiveDate>().ok()?;
    let value = value.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(Observation { date, value })
}

/// Sort ascending and keep the trailing [`MAX_POSTINGS_POINTS`].
fn trim_tail(mut observations: Vec<Observation>) -> Vec<Observation> {
    observations.sort_by_key(|o| o.date);
    if observations.len() > MAX_POSTINGS_POINTS {
        observations.drain(..observations.len() - MAX_POSTINGS_POINTS);
    }
    observations
}

/// Parse the national aggregate feed.
pub fn parse_aggregate(body: &str) -> Result<Vec<Observation>> {
    let Some(table) = split_csv(body) else {
        bail!("empty-aggregate: feed body has no header row");
    };
    let date_col = table
        .column(COL_DATE)
        .context("aggregate feed is missing the date column")?;
    let sa_col = table.column(COL_INDEX_SA);
    let raw_col = table.column(COL_INDEX);

    let mut observations = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        // Prefer the seasonally adjusted column when it has a value.
        let value = [sa_col, raw_col]
            .into_iter()
            .flatten()
            .map(|idx| row[idx].trim())
            .find(|v| !v.is_empty());
        let Some(value) = value else { continue };
        if let Some(point) = parse_point(row[date_col], value) {
            observations.push(point);
        }
    }

    if observations.is_empty() {
        bail!("empty-aggregate: no usable rows in the postings feed");
    }
    Ok(trim_tail(observations))
}

/// Parse the by-sector feed, keeping only the tracked sectors.
pub fn parse_sectors(body: &str) -> Result<BTreeMap<String, Vec<Observation>>> {
    let Some(table) = split_csv(body) else {
        bail!("empty-sectors: feed body has no header row");
    };
    let date_col = table
        .column(COL_DATE)
        .context("sector feed is missing the date column")?;
    let name_col = table
        .column(COL_DISPLAY_NAME)
        .context("sector feed is missing the display_name column")?;
    let variable_col = table
        .column(COL_VARIABLE)
        .context("sector feed is missing the variable column")?;
    let value_col = table
        .column(COL_INDEX)
        .context("sector feed is missing the index column")?;

    let mut sectors: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for row in &table.rows {
        let name = row[name_col].trim();
        if !TARGET_SECTORS.contains(&name) || row[variable_col].trim() != VARIABLE_TOTAL {
            continue;
        }
        if let Some(point) = parse_point(row[date_col], row[value_col]) {
            sectors.entry(name.to_string()).or_default().push(point);
        }
    }

    if sectors.is_empty() {
        bail!("empty-sectors: no tracked sectors in the postings feed");
    }

    Ok(sectors
        .into_iter()
        .map(|(name, observations)| (name, trim_tail(observations)))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_prefers_seasonally_adjusted() {
        let csv = "date,indeed_job_postings_index_SA,indeed_job_postings_index\n\
                   2024-01-01,101.5,100.0\n\
                   2024-01-02,,99.0\n\
                   2024-01-03,102.0,98.0\n";
        let obs = parse_aggregate(csv).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].value, 101.5);
        assert_eq!(obs[1].value, 99.0); // SA empty, falls back to raw
        assert_eq!(obs[2].value, 102.0);
    }

    #[test]
    fn aggregate_skips_width_mismatched_rows() {
        let csv = "date,indeed_job_postings_index_SA,indeed_job_postings_index\n\
                   2024-01-01,101.5,100.0\n\
                   2024-01-02,oops,extra,columns\n\
                   2024-01-03,102.0,98.0\n";
        let obs = parse_aggregate(csv).unwrap();
        assert_eq!(obs.len(), 2);
    }

    #[test]
    fn aggregate_with_no_usable_rows_fails() {
        let csv = "date,indeed_job_postings_index_SA,indeed_job_postings_index\n\
                   2024-01-01,,\n";
        let err = parse_aggregate(csv).unwrap_err();
        assert!(err.to_string().contains("empty-aggregate"));
    }

    #[test]
    fn aggregate_trims_to_trailing_window() {
        let mut csv = String::from("date,indeed_job_postings_index_SA,indeed_job_postings_index\n");
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        for i in 0..800 {
            let date = start + chrono::Days::new(i);
            csv.push_str(&format!("{date},{},{}\n", 100 + i, 100 + i));
        }
        let obs = parse_aggregate(&csv).unwrap();
        assert_eq!(obs.len(), MAX_POSTINGS_POINTS);
        // The oldest rows were trimmed, not the newest.
        assert_eq!(obs.last().unwrap().value, 899.0);
    }

    #[test]
    fn sectors_filters_name_and_variable() {
        let csv = "date,display_name,variable,indeed_job_postings_index\n\
                   2024-01-01,Software Development,total postings,120.0\n\
                   2024-01-01,Software Development,new postings,50.0\n\
                   2024-01-01,Forestry,total postings,80.0\n\
                   2024-01-02,Accounting,total postings,95.5\n";
        let sectors = parse_sectors(csv).unwrap();
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors["Software Development"].len(), 1);
        assert_eq!(sectors["Software Development"][0].value, 120.0);
        assert_eq!(sectors["Accounting"][0].value, 95.5);
        assert!(!sectors.contains_key("Forestry"));
    }

    #[test]
    fn sectors_with_no_tracked_rows_fails() {
        let csv = "date,display_name,variable,indeed_job_postings_index\n\
                   2024-01-01,Forestry,total postings,80.0\n";
        let err = parse_sectors(csv).unwrap_err();
        assert!(err.to_string().contains("empty-sectors"));
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let csv = "date,indeed_job_postings_index_SA,indeed_job_postings_index\r\n\
                   2024-01-01,101.5,100.0\r\n";
        let obs = parse_aggregate(csv).unwrap();
        assert_eq!(obs.len(), 1);
    }
}
