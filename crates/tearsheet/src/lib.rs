#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tearsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Ticker resolution, metrics aggregation and dashboard orchestration.
//!
//! This crate re-exports the core types and provider implementations and adds the
//! three pieces that turn them into a dashboard:
//!
//! - [`IdentifierResolver`] - ticker to CIK, collapsing every failure to "not found"
//! - [`MetricsAggregator`] - per-concept fetch, filter, trim and merge
//! - [`Dashboard`] - the sequential "Analyze" flow producing an [`Analysis`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tearsheet::{ChartRange, Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> tearsheet::Result<()> {
//!     let dashboard = Dashboard::from_config(&Config::from_env()?)?;
//!     let analysis = dashboard.analyze("AAPL", ChartRange::OneYear).await;
//!
//!     for notice in analysis.notices() {
//!         println!("{notice}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use tearsheet_core::*;

// Providers
#[cfg(feature = "edgar")]
pub use tearsheet_edgar::EdgarProvider;
#[cfg(feature = "yahoo")]
pub use tearsheet_yahoo::YahooProvider;

pub mod aggregator;
pub mod config;
mod dashboard;
mod resolver;

pub use aggregator::{AggregatorConfig, Concept, ConceptReport, MetricsAggregator, MetricsReport};
pub use config::{ApiKey, Config};
pub use dashboard::{Analysis, Dashboard, Filings, Notice, Severity};
pub use resolver::IdentifierResolver;
