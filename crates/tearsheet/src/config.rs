//! Runtime configuration.
//!
//! [`Config`] is built once at startup and passed explicitly to
//! [`Dashboard::from_config`](crate::Dashboard::from_config); nothing reads the
//! environment after that.

use std::fmt;

use tearsheet_core::{DataError, Result, SymbolSource, SymbolTableFormat};

use crate::aggregator::AggregatorConfig;

/// Default identifying user agent for SEC requests.
pub const DEFAULT_USER_AGENT: &str = "Tearsheet/0.1 (contact@example.com)";

/// Default SEC XBRL API base URL.
pub const DEFAULT_EDGAR_URL: &str = "https://data.sec.gov";

/// Default Yahoo chart API base URL.
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Environment keys read by [`Config::from_env`].
pub mod keys {
    /// User agent sent to SEC.
    pub const USER_AGENT: &str = "TEARSHEET_USER_AGENT";
    /// SEC XBRL API base URL.
    pub const EDGAR_URL: &str = "TEARSHEET_EDGAR_URL";
    /// Symbol table URL.
    pub const SYMBOL_URL: &str = "TEARSHEET_SYMBOL_URL";
    /// Symbol table format (`json` or `pipe`).
    pub const SYMBOL_FORMAT: &str = "TEARSHEET_SYMBOL_FORMAT";
    /// Chart API base URL.
    pub const CHART_URL: &str = "TEARSHEET_CHART_URL";
    /// Secret key for the language-model integration.
    pub const API_KEY: &str = "OPENAI_API_KEY";
}

/// A secret API key. `Debug` and `Display` never print it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Dashboard configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// User agent sent to SEC; must identify the caller.
    pub user_agent: String,
    /// SEC XBRL API base URL.
    pub edgar_base_url: String,
    /// Where the ticker to CIK table comes from.
    pub symbol_source: SymbolSource,
    /// Chart API base URL.
    pub chart_base_url: String,
    /// Key for the language-model integration. Loaded and carried, not used by the
    /// analyze flow.
    pub api_key: Option<ApiKey>,
    /// Concepts and filters for the metrics table.
    pub aggregator: AggregatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            edgar_base_url: DEFAULT_EDGAR_URL.to_string(),
            symbol_source: SymbolSource::default(),
            chart_base_url: DEFAULT_CHART_URL.to_string(),
            api_key: None,
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// Returns [`DataError::Config`] if a value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// Returns [`DataError::Config`] if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(user_agent) = get(keys::USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Some(url) = get(keys::EDGAR_URL) {
            config.edgar_base_url = url;
        }
        if let Some(url) = get(keys::SYMBOL_URL) {
            config.symbol_source.url = url;
        }
        if let Some(format) = get(keys::SYMBOL_FORMAT) {
            config.symbol_source.format = format.parse::<SymbolTableFormat>()?;
        }
        if let Some(url) = get(keys::CHART_URL) {
            config.chart_base_url = url;
        }
        config.api_key = get(keys::API_KEY).map(ApiKey::new);

        config.validate()?;
        Ok(config)
    }

    /// Checks values that cannot be caught by parsing alone.
    ///
    /// # Errors
    /// Returns [`DataError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(DataError::Config("user agent must not be empty".to_string()));
        }
        for (name, url) in [
            ("EDGAR URL", &self.edgar_base_url),
            ("symbol table URL", &self.symbol_source.url),
            ("chart URL", &self.chart_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DataError::Config(format!("{name} is not an http(s) URL: {url}")));
            }
        }
        if self.aggregator.table_rows == 0 {
            return Err(DataError::Config("table rows must be at least 1".to_string()));
        }
        Ok(())
    }
}
