#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tearsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR data provider.
//!
//! This crate provides access to the two SEC endpoints the dashboard needs:
//!
//! - The ticker to CIK (Central Index Key) table
//! - Single-concept XBRL facts from the `companyconcept` API
//!
//! # Example
//!
//! ```no_run
//! use tearsheet_core::{Cik, FilingFactsProvider, SymbolTableProvider, Ticker};
//! use tearsheet_edgar::EdgarProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)")?;
//!
//!     let table = provider.fetch_symbol_table().await?;
//!     if let Some(cik) = table.lookup(&Ticker::new("AAPL")) {
//!         let facts = provider.fetch_concept(cik, "us-gaap", "NetIncomeLoss").await?;
//!         println!("{} net income facts for CIK {}", facts.len(), cik);
//!     }
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tearsheet_core::{
    Cik, ConceptFact, DataError, DataProvider, FilingFactsProvider, Result, SymbolSource,
    SymbolTable, SymbolTableProvider,
};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// SEC EDGAR API base URL
pub const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Unit the dashboard reads facts in.
const USD: &str = "USD";

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// SEC EDGAR data provider.
///
/// Implements [`SymbolTableProvider`] and [`FilingFactsProvider`]. Requests are
/// spaced per SEC requirements (max 10 requests/second).
#[derive(Debug)]
pub struct EdgarProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    symbol_source: SymbolSource,
}

impl EdgarProvider {
    /// Create a new EDGAR provider with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns [`DataError::Network`] if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use tearsheet_edgar::EdgarProvider;
    ///
    /// let provider = EdgarProvider::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    /// Create a new EDGAR provider with a custom HTTP client.
    ///
    /// The client is expected to carry an identifying user agent already.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            base_url: EDGAR_BASE_URL.to_string(),
            symbol_source: SymbolSource::default(),
        }
    }

    /// Use a different base URL for the XBRL API.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different symbol table source.
    #[must_use]
    pub fn with_symbol_source(mut self, source: SymbolSource) -> Self {
        self.symbol_source = source;
        self
    }

    /// Use a different minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// The configured symbol table source.
    #[must_use]
    pub const fn symbol_source(&self) -> &SymbolSource {
        &self.symbol_source
    }

    /// Build the `companyconcept` URL for one concept of one filer.
    fn concept_url(&self, cik: &Cik, taxonomy: &str, tag: &str) -> String {
        format!(
            "{}/api/xbrl/companyconcept/CIK{}/{}/{}.json",
            self.base_url, cik, taxonomy, tag
        )
    }

    /// Issue a rate-limited GET and return the body of a successful response.
    async fn get_text(&self, url: &str) -> Result<String> {
        self.rate_limiter.lock().await.wait().await;

        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: "SEC EDGAR".to_string(),
                retry_after: Some(Duration::from_secs(10)),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::DataNotAvailable(format!("Nothing published at {url}")));
        }

        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))
    }
}

impl DataProvider for EdgarProvider {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR provider for ticker lookup and XBRL facts from 10-K and 10-Q filings"
    }
}

#[async_trait]
impl SymbolTableProvider for EdgarProvider {
    async fn fetch_symbol_table(&self) -> Result<SymbolTable> {
        debug!(
            url = %self.symbol_source.url,
            format = %self.symbol_source.format,
            "Fetching symbol table"
        );
        let body = self.get_text(&self.symbol_source.url).await?;
        let table = SymbolTable::parse(self.symbol_source.format, &body)?;
        debug!(entries = table.len(), "Parsed symbol table");
        Ok(table)
    }
}

#[async_trait]
impl FilingFactsProvider for EdgarProvider {
    async fn fetch_concept(
        &self,
        cik: &Cik,
        taxonomy: &str,
        tag: &str,
    ) -> Result<Vec<ConceptFact>> {
        let url = self.concept_url(cik, taxonomy, tag);
        let body = self.get_text(&url).await?;
        parse_concept_response(&body, tag)
    }
}

/// Extract the USD facts from a `companyconcept` payload.
fn parse_concept_response(body: &str, tag: &str) -> Result<Vec<ConceptFact>> {
    let mut concept: CompanyConceptResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Failed to parse company concept {tag}: {e}")))?;

    concept
        .units
        .remove(USD)
        .ok_or_else(|| DataError::DataNotAvailable(format!("No {USD} facts reported for {tag}")))
}

// =============================================================================
// SEC API Response Types
// =============================================================================

/// Response from the SEC EDGAR Company Concept API.
///
/// `{ "cik": .., "taxonomy": .., "tag": .., "units": { "USD": [ {end, val, form, fy, fp, ..} ] } }`
#[derive(Debug, Deserialize)]
struct CompanyConceptResponse {
    /// Facts grouped by unit of measure
    #[serde(default)]
    units: HashMap<String, Vec<ConceptFact>>,
}

// =============================================================================
// Tests
// =============================================================================
