//! Ticker to CIK resolution.

use std::sync::Arc;

use tracing::{debug, warn};

use tearsheet_core::{Cik, DataError, Result, SymbolTableProvider, Ticker};

/// Resolves tickers through a symbol table provider.
///
/// The table is downloaded on every lookup. Only the first listing of a ticker in
/// the table counts.
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    symbols: Arc<dyn SymbolTableProvider>,
}

impl IdentifierResolver {
    /// Creates a resolver over `symbols`.
    #[must_use]
    pub fn new(symbols: Arc<dyn SymbolTableProvider>) -> Self {
        Self { symbols }
    }

    /// Looks up `ticker`, reporting why it could not be resolved.
    ///
    /// Matching ignores case and surrounding whitespace, and treats `.` and `-`
    /// share class separators as equal.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] for a blank ticker,
    /// [`DataError::SymbolNotFound`] if the table has no entry, or whatever the
    /// provider failed with.
    pub async fn try_resolve(&self, ticker: &str) -> Result<Cik> {
        let ticker = Ticker::new(ticker);
        if ticker.is_empty() {
            return Err(DataError::InvalidParameter("Empty ticker".to_string()));
        }

        let table = self.symbols.fetch_symbol_table().await?;
        debug!(entries = table.len(), "Fetched symbol table");

        table
            .lookup(&ticker)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(ticker.to_string()))
    }

    /// Looks up `ticker`, collapsing every failure into `None`.
    pub async fn resolve(&self, ticker: &str) -> Option<Cik> {
        match self.try_resolve(ticker).await {
            Ok(cik) => {
                debug!(ticker, %cik, "Resolved ticker");
                Some(cik)
            }
            Err(e) => {
                warn!(ticker, error = %e, provider = self.symbols.name(), "Could not resolve ticker");
                None
            }
        }
    }
}
