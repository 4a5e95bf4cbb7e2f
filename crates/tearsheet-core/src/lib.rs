#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tearsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the tearsheet dashboard.
//!
//! This crate provides the foundational abstractions shared by every provider:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Closing-price series for charts
//! - [`SymbolTableProvider`](provider::SymbolTableProvider) - Ticker to CIK tables
//! - [`FilingFactsProvider`](provider::FilingFactsProvider) - XBRL concept facts
//! - [`MetricsTable`](table::MetricsTable) - Outer merge of concept series by period end

/// Error types for data operations.
pub mod error;
/// Provider traits for fetching prices, symbol tables and filing facts.
pub mod provider;
/// Chart range definitions.
pub mod range;
/// Ticker to CIK symbol tables.
pub mod symbols;
/// Merged metrics table.
pub mod table;
/// Core data types (Ticker, Cik, ConceptFact, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use provider::{DataProvider, FilingFactsProvider, PriceDataProvider, SymbolTableProvider};
pub use range::ChartRange;
pub use symbols::{SymbolSource, SymbolTable, SymbolTableFormat};
pub use table::{MetricsRow, MetricsTable, QUARTER_END_COLUMN};
pub use types::{Cik, ConceptFact, ConceptSeries, FormFilter, NetIncomeFact, SeriesPoint, Ticker};
