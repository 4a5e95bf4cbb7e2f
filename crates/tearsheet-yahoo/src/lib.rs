#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tearsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance price provider.
//!
//! This crate provides a Yahoo Finance provider that implements the
//! [`DataProvider`] and [`PriceDataProvider`] traits from `tearsheet-core`.
//!
//! # Example
//!
//! ```no_run
//! use tearsheet_core::{ChartRange, PriceDataProvider, Ticker};
//! use tearsheet_yahoo::YahooProvider;
//!
//! # async fn example() -> tearsheet_core::Result<()> {
//! let provider = YahooProvider::new()?;
//! let df = provider.fetch_closes(&Ticker::new("AAPL"), ChartRange::OneYear).await?;
//! println!("Fetched {} rows", df.height());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use polars::prelude::*;
use reqwest::Url;
use serde::Deserialize;
use tearsheet_core::{
    ChartRange, DataError, DataProvider, PriceDataProvider, Result, Ticker,
};
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance chart API base URL.
pub const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`] and [`PriceDataProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    ///
    /// # Errors
    /// Returns [`DataError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: CHART_API_URL.to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Use a different chart API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = rate_limit.as_millis() as u64;
        self
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the chart API URL for a ticker and range.
    ///
    /// Yahoo spells share classes with a hyphen (`BRK-B`). The ticker is pushed as
    /// one percent-encoded path segment, so user text cannot reach the query.
    fn build_chart_url(&self, ticker: &Ticker, range: ChartRange) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DataError::Config(format!("Invalid chart URL {}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| DataError::Config(format!("Chart URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(&ticker.normalized('-'));
        url.query_pairs_mut()
            .append_pair("range", range.as_str())
            .append_pair("interval", range.interval())
            .append_pair("includePrePost", "false");

        Ok(url)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance chart API for closing prices"
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_closes(&self, ticker: &Ticker, range: ChartRange) -> Result<DataFrame> {
        if ticker.is_empty() {
            return Err(DataError::InvalidParameter("Empty ticker".to_string()));
        }

        // Apply rate limiting
        self.apply_rate_limit().await;

        let url = self.build_chart_url(ticker, range)?;
        debug!("Fetching closes: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(ticker.to_string()));
        }

        if !response.status().is_success() {
            return Err(DataError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        parse_chart_response(ticker, chart_response)
    }
}

/// Parse Yahoo Finance chart response into a DataFrame.
fn parse_chart_response(ticker: &Ticker, response: ChartResponse) -> Result<DataFrame> {
    // Check for API-level errors
    if let Some(error) = response.chart.error {
        if error.code == "Not Found" {
            return Err(DataError::SymbolNotFound(ticker.to_string()));
        }
        return Err(DataError::Other(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| DataError::SymbolNotFound(ticker.to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();

    if timestamps.is_empty() {
        return Err(DataError::DataNotAvailable(format!(
            "No prices for {ticker}"
        )));
    }

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::Parse("Missing quote data".to_string()))?
        .close;

    if closes.len() != timestamps.len() {
        return Err(DataError::Parse(format!(
            "Got {} closes for {} timestamps",
            closes.len(),
            timestamps.len()
        )));
    }

    let millis: Vec<i64> = timestamps.iter().map(|&ts| ts * 1000).collect();

    let timestamp_col = Column::new("timestamp".into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(|e| DataError::Other(e.to_string()))?;

    DataFrame::new(vec![timestamp_col, Column::new("close".into(), closes)])
        .map_err(|e| DataError::Other(e.to_string()))
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    result: Option<Vec<ChartData>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<DataFrame> {
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        parse_chart_response(&Ticker::new("AAPL"), response)
    }

    #[test]
    fn test_build_chart_url() {
        let provider = YahooProvider::new().unwrap();
        let url = provider
            .build_chart_url(&Ticker::new("brk.b"), ChartRange::FiveYears)
            .unwrap();

        assert_eq!(
            url.as_str(),
            format!("{CHART_API_URL}/BRK-B?range=5y&interval=1wk&includePrePost=false")
        );
    }

    #[test]
    fn test_build_chart_url_encodes_ticker() {
        let provider = YahooProvider::new().unwrap();
        let url = provider
            .build_chart_url(&Ticker::new("aapl#x?range=1d/y"), ChartRange::OneYear)
            .unwrap();

        assert_eq!(url.path(), "/v8/finance/chart/AAPL%23X%3FRANGE=1D%2FY");
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("range=1y&interval=1d&includePrePost=false"));
    }

    #[test]
    fn test_provider_info() {
        let provider = YahooProvider::new().unwrap();
        assert_eq!(provider.name(), "Yahoo Finance");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_parse_chart_response() {
        let df = parse(
            r#"{"chart": {"result": [{
                "timestamp": [1719840600, 1719927000, 1720013400],
                "indicators": {"quote": [{"close": [216.75, null, 221.55]}]}
            }], "error": null}}"#,
        )
        .unwrap();

        assert_eq!(df.height(), 3);
        assert!(matches!(
            df.column("timestamp").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, _)
        ));
        let closes = df.column("close").unwrap().f64().unwrap();
        assert_eq!(closes.get(0), Some(216.75));
        assert_eq!(closes.get(1), None);
    }

    #[test]
    fn test_parse_api_not_found() {
        let result = parse(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        );
        assert!(matches!(result, Err(DataError::SymbolNotFound(_))));
    }

    #[test]
    fn test_parse_mismatched_lengths() {
        let result = parse(
            r#"{"chart": {"result": [{
                "timestamp": [1719840600, 1719927000],
                "indicators": {"quote": [{"close": [216.75]}]}
            }]}}"#,
        );
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[test]
    fn test_parse_empty_timestamps() {
        let result = parse(
            r#"{"chart": {"result": [{"indicators": {"quote": [{"close": []}]}}]}}"#,
        );
        assert!(matches!(result, Err(DataError::DataNotAvailable(_))));
    }
}
