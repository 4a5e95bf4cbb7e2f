//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when resolving tickers, fetching prices or filing facts, and parsing responses.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// A provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code returned.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested ticker was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider has no data of the requested kind.
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
