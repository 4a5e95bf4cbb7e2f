//! The "Analyze" flow: price chart, CIK resolution, metrics and net income.

use std::fmt;
use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use tearsheet_core::{
    ChartRange, Cik, FilingFactsProvider, NetIncomeFact, PriceDataProvider, Result,
    SymbolTableProvider, Ticker,
};

use crate::aggregator::{AggregatorConfig, MetricsAggregator, MetricsReport};
use crate::resolver::IdentifierResolver;

/// Wires a price provider, a symbol table and a filings source into one flow.
///
/// Each call to [`Dashboard::analyze`] runs its requests strictly one after the
/// other and keeps no state between calls.
///
/// # Example
///
/// ```rust,ignore
/// use tearsheet::{ChartRange, Config, Dashboard};
///
/// let dashboard = Dashboard::from_config(&Config::default())?;
/// let analysis = dashboard.analyze("msft", ChartRange::SixMonths).await;
/// ```
pub struct Dashboard {
    prices: Arc<dyn PriceDataProvider>,
    resolver: IdentifierResolver,
    aggregator: MetricsAggregator,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("prices", &self.prices.name())
            .field("resolver", &self.resolver)
            .field("aggregator", &self.aggregator)
            .finish()
    }
}

impl Dashboard {
    /// Creates a dashboard from explicit providers.
    #[must_use]
    pub fn new(
        prices: Arc<dyn PriceDataProvider>,
        symbols: Arc<dyn SymbolTableProvider>,
        facts: Arc<dyn FilingFactsProvider>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            prices,
            resolver: IdentifierResolver::new(symbols),
            aggregator: MetricsAggregator::new(facts, config),
        }
    }

    /// Creates a dashboard backed by Yahoo Finance and SEC EDGAR.
    ///
    /// # Errors
    /// Returns [`DataError::Config`](tearsheet_core::DataError::Config) if the
    /// configuration is invalid, or [`DataError::Network`](tearsheet_core::DataError::Network)
    /// if an HTTP client cannot be built.
    #[cfg(all(feature = "yahoo", feature = "edgar"))]
    pub fn from_config(config: &crate::Config) -> Result<Self> {
        config.validate()?;

        let edgar = Arc::new(
            tearsheet_edgar::EdgarProvider::new(&config.user_agent)?
                .with_base_url(config.edgar_base_url.as_str())
                .with_symbol_source(config.symbol_source.clone()),
        );
        let yahoo =
            tearsheet_yahoo::YahooProvider::new()?.with_base_url(config.chart_base_url.as_str());

        Ok(Self::new(
            Arc::new(yahoo),
            edgar.clone(),
            edgar,
            config.aggregator.clone(),
        ))
    }

    /// The metrics aggregator.
    #[must_use]
    pub const fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }

    /// Runs the full flow for one ticker.
    ///
    /// Never fails; every problem is recorded on the returned [`Analysis`]. If the
    /// ticker has no CIK the filings source is never contacted.
    pub async fn analyze(&self, raw_ticker: &str, range: ChartRange) -> Analysis {
        let ticker = Ticker::new(raw_ticker);
        info!(%ticker, %range, "Analyzing");

        let price = self.prices.fetch_closes(&ticker, range).await;
        if let Err(e) = &price {
            warn!(%ticker, error = %e, "Price chart unavailable");
        }

        let filings = match self.resolver.resolve(ticker.as_str()).await {
            None => Filings::NotFound,
            Some(cik) => {
                let metrics = self.aggregator.aggregate(&cik).await;
                let net_income = self.aggregator.latest_net_income(&cik).await;
                if let Err(e) = &net_income {
                    warn!(%cik, error = %e, "Net income unavailable");
                }
                Filings::Found {
                    cik,
                    metrics,
                    net_income,
                }
            }
        };

        let analysis = Analysis {
            ticker,
            range,
            price,
            filings,
        };
        debug!(notices = analysis.notices().len(), "Analysis complete");
        analysis
    }
}

/// What the filings half of the flow produced.
#[derive(Debug)]
pub enum Filings {
    /// The ticker did not resolve to a CIK; nothing else was fetched.
    NotFound,
    /// The ticker resolved and the filings were queried.
    Found {
        /// Resolved filer identifier.
        cik: Cik,
        /// Per-concept outcomes and the merged table.
        metrics: MetricsReport,
        /// Most recent net income fact, if any.
        net_income: Result<Option<NetIncomeFact>>,
    },
}

/// Everything one "Analyze" action produced.
#[derive(Debug)]
pub struct Analysis {
    /// Normalized ticker.
    pub ticker: Ticker,
    /// Requested chart range.
    pub range: ChartRange,
    /// Closing prices (`timestamp`, `close`), or why they are missing.
    pub price: Result<DataFrame>,
    /// Filings outcome.
    pub filings: Filings,
}

impl Analysis {
    /// Resolved CIK, if any.
    #[must_use]
    pub const fn cik(&self) -> Option<&Cik> {
        match &self.filings {
            Filings::Found { cik, .. } => Some(cik),
            Filings::NotFound => None,
        }
    }

    /// Merged metrics, if the ticker resolved.
    #[must_use]
    pub const fn metrics(&self) -> Option<&MetricsReport> {
        match &self.filings {
            Filings::Found { metrics, .. } => Some(metrics),
            Filings::NotFound => None,
        }
    }

    /// The latest net income fact, if the ticker resolved and one was found.
    #[must_use]
    pub fn net_income(&self) -> Option<&NetIncomeFact> {
        match &self.filings {
            Filings::Found {
                net_income: Ok(Some(fact)),
                ..
            } => Some(fact),
            _ => None,
        }
    }

    /// User-facing messages, in display order: the price notice, then the filings
    /// notices.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.price_notice()
            .into_iter()
            .chain(self.filing_notices())
            .collect()
    }

    /// The error shown in place of the chart, if prices failed.
    #[must_use]
    pub fn price_notice(&self) -> Option<Notice> {
        self.price
            .as_ref()
            .err()
            .map(|e| Notice::error(format!("Failed to fetch price data: {e}")))
    }

    /// Messages about the filings half of the flow: the metrics notices, then the
    /// net income notice.
    #[must_use]
    pub fn filing_notices(&self) -> Vec<Notice> {
        let mut notices = self.metrics_notices();
        notices.extend(self.net_income_notice());
        notices
    }

    /// Messages shown with the metrics table: CIK not found, failed concepts, and
    /// an empty table.
    #[must_use]
    pub fn metrics_notices(&self) -> Vec<Notice> {
        let metrics = match &self.filings {
            Filings::NotFound => {
                return vec![Notice::warning(
                    "CIK not found for this ticker. Please try another.",
                )];
            }
            Filings::Found { metrics, .. } => metrics,
        };

        let mut notices: Vec<Notice> = metrics
            .failures()
            .map(|(concept, e)| Notice::warning(format!("Could not load {}: {e}", concept.label)))
            .collect();
        if metrics.is_empty() {
            notices.push(Notice::warning("No financial data available for display."));
        }
        notices
    }

    /// The message shown in place of the net income fact, if it is missing.
    #[must_use]
    pub fn net_income_notice(&self) -> Option<Notice> {
        match &self.filings {
            Filings::Found {
                net_income: Ok(None),
                ..
            } => Some(Notice::warning("No 10-K or 10-Q net income filings found.")),
            Filings::Found {
                net_income: Err(e), ..
            } => Some(Notice::error(format!("Failed to fetch SEC data: {e}"))),
            _ => None,
        }
    }
}

/// How prominently a [`Notice`] is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something is missing but the rest of the page is usable.
    Warning,
    /// A whole section failed.
    Error,
}

impl Severity {
    /// Lowercase name, used as a CSS class.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub severity: Severity,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// An error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str(), self.message)
    }
}
