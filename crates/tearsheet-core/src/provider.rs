//! Provider traits for fetching market and filing data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`PriceDataProvider`] - Closing prices for the chart
//! - [`SymbolTableProvider`] - Ticker to CIK tables
//! - [`FilingFactsProvider`] - XBRL facts for one concept of one filer

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::Result,
    range::ChartRange,
    symbols::SymbolTable,
    types::{Cik, ConceptFact, Ticker},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for closing-price series.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches closing prices for a ticker over a chart range.
    ///
    /// Returns a DataFrame with columns: timestamp (datetime, ms), close (nullable f64),
    /// oldest first.
    async fn fetch_closes(&self, ticker: &Ticker, range: ChartRange) -> Result<DataFrame>;
}

/// Provider for the ticker to CIK mapping table.
#[async_trait]
pub trait SymbolTableProvider: DataProvider {
    /// Fetches the full symbol table.
    ///
    /// Implementations fetch fresh on every call; nothing is cached.
    async fn fetch_symbol_table(&self) -> Result<SymbolTable>;
}

/// Provider for XBRL concept facts.
#[async_trait]
pub trait FilingFactsProvider: DataProvider {
    /// Fetches every USD-denominated fact reported for one concept of one filer.
    ///
    /// # Arguments
    ///
    /// * `cik` - The filer
    /// * `taxonomy` - XBRL namespace, e.g. `us-gaap`
    /// * `tag` - Concept tag, e.g. `NetIncomeLoss`
    async fn fetch_concept(&self, cik: &Cik, taxonomy: &str, tag: &str)
    -> Result<Vec<ConceptFact>>;
}
