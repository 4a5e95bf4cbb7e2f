//! Core data types for tickers, filer identifiers and filing facts.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Ticker`] - Exchange symbol typed by the user
//! - [`Cik`] - SEC Central Index Key, the filer identifier
//! - [`ConceptFact`] - Raw XBRL fact as returned by the filings API
//! - [`FormFilter`] - Which filing forms a fact may come from
//! - [`ConceptSeries`] - Most recent values of one concept
//! - [`NetIncomeFact`] - Single most recent net income figure

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;
use crate::table::date_column;

/// A trading symbol/ticker.
///
/// Tickers are trimmed and uppercased on creation. Punctuation is kept as typed;
/// use [`Ticker::normalized`] to match against a symbol table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ticker is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the ticker with every class separator (`-` or `.`) replaced by `separator`.
    ///
    /// `BRK-A`, `brk.a` and `BRK.A` all normalize to the same key for a given separator.
    #[must_use]
    pub fn normalized(&self, separator: char) -> String {
        self.0
            .chars()
            .map(|c| if c == '-' || c == '.' { separator } else { c })
            .collect()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key, zero-padded to ten digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cik(String);

impl Cik {
    /// Width of a padded CIK.
    pub const WIDTH: usize = 10;

    /// Creates a CIK from its numeric form.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the number has more than ten digits.
    pub fn from_number(n: u64) -> Result<Self, DataError> {
        let digits = n.to_string();
        if digits.len() > Self::WIDTH {
            return Err(DataError::Parse(format!("CIK {n} exceeds {} digits", Self::WIDTH)));
        }
        Ok(Self(format!("{digits:0>10}")))
    }

    /// Returns the padded CIK as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cik {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > Self::WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::Parse(format!("Invalid CIK: {s:?}")));
        }
        Ok(Self(format!("{s:0>10}")))
    }
}

/// A single XBRL fact as returned by the filings API.
///
/// Only the fields the dashboard reads are kept. `end` stays a string until the
/// aggregator parses it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptFact {
    /// Period start date, `YYYY-MM-DD`. Absent for point-in-time facts.
    #[serde(default)]
    pub start: Option<String>,
    /// Period end date, `YYYY-MM-DD`.
    pub end: String,
    /// Reported value.
    pub val: f64,
    /// Filing form, e.g. `10-Q`.
    #[serde(default)]
    pub form: Option<String>,
    /// Fiscal year.
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period, e.g. `Q2` or `FY`.
    #[serde(default)]
    pub fp: Option<String>,
    /// Date the filing was made.
    #[serde(default)]
    pub filed: Option<String>,
}

impl ConceptFact {
    /// Creates a fact with the given end date, value and form.
    #[must_use]
    pub fn new(end: impl Into<String>, val: f64, form: impl Into<String>) -> Self {
        Self {
            start: None,
            end: end.into(),
            val,
            form: Some(form.into()),
            fy: None,
            fp: None,
            filed: None,
        }
    }

    /// Sets the fiscal year and period.
    #[must_use]
    pub fn with_fiscal(mut self, fy: i32, fp: impl Into<String>) -> Self {
        self.fy = Some(fy);
        self.fp = Some(fp.into());
        self
    }

    /// Sets the period start date.
    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Sets the filing date.
    #[must_use]
    pub fn with_filed(mut self, filed: impl Into<String>) -> Self {
        self.filed = Some(filed.into());
        self
    }

    /// Parses the period end date.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if `end` is not a `YYYY-MM-DD` date.
    pub fn end_date(&self) -> Result<NaiveDate, DataError> {
        NaiveDate::parse_from_str(&self.end, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid period end {:?}: {}", self.end, e)))
    }
}

/// Filing forms a fact may be drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormFilter {
    /// Quarterly reports only (`10-Q`).
    #[default]
    Quarterly,
    /// Quarterly or annual reports (`10-Q`, `10-K`).
    QuarterlyOrAnnual,
}

impl FormFilter {
    /// The form codes this filter accepts.
    #[must_use]
    pub const fn forms(&self) -> &'static [&'static str] {
        match self {
            Self::Quarterly => &["10-Q"],
            Self::QuarterlyOrAnnual => &["10-K", "10-Q"],
        }
    }

    /// Returns true if a fact with this form passes the filter.
    ///
    /// Facts without a form never pass.
    #[must_use]
    pub fn accepts(&self, form: Option<&str>) -> bool {
        form.is_some_and(|f| self.forms().contains(&f))
    }
}

/// One `(period end, value)` pair of a concept series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Period end date.
    pub end: NaiveDate,
    /// Reported value.
    pub value: f64,
}

/// Most recent values of one financial concept, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptSeries {
    /// Human label shown as the column header.
    pub label: String,
    /// XBRL tag the values came from.
    pub tag: String,
    /// Points sorted by end date, descending.
    pub points: Vec<SeriesPoint>,
}

impl ConceptSeries {
    /// Creates a series, sorting the points newest first.
    #[must_use]
    pub fn new(label: impl Into<String>, tag: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by(|a, b| b.end.cmp(&a.end));
        Self {
            label: label.into(),
            tag: tag.into(),
            points,
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The newest point, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }
}

/// The single most recent net income fact across the accepted forms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetIncomeFact {
    /// Filing form, e.g. `10-K`.
    pub form: String,
    /// Fiscal year.
    pub fiscal_year: Option<i32>,
    /// Fiscal period, e.g. `FY` or `Q3`.
    pub fiscal_period: Option<String>,
    /// Period end date.
    pub end: NaiveDate,
    /// Net income in USD.
    pub value: f64,
}

impl NetIncomeFact {
    /// Renders the fact as a one-row DataFrame.
    ///
    /// Columns: `Filing`, `Year`, `Period`, `End Date`, `Net Income ($USD)`.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if the frame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame, DataError> {
        let end = date_column("End Date", &[self.end])?;
        DataFrame::new(vec![
            Column::new("Filing".into(), [self.form.as_str()]),
            Column::new("Year".into(), [self.fiscal_year]),
            Column::new("Period".into(), [self.fiscal_period.as_deref()]),
            end,
            Column::new("Net Income ($USD)".into(), [self.value]),
        ])
        .map_err(|e| DataError::Other(e.to_string()))
    }
}
