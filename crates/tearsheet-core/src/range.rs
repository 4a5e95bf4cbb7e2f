//! Chart range definitions.
//!
//! This module defines [`ChartRange`], the lookback window offered by the
//! dashboard's range selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Lookback window for the price chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartRange {
    /// One trading day.
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    /// Five trading days.
    #[serde(rename = "5d")]
    FiveDays,
    /// One month.
    #[serde(rename = "1mo")]
    OneMonth,
    /// Six months.
    #[serde(rename = "6mo")]
    SixMonths,
    /// One year.
    #[serde(rename = "1y")]
    OneYear,
    /// Five years.
    #[serde(rename = "5y")]
    FiveYears,
    /// Ten years.
    #[serde(rename = "10y")]
    TenYears,
}

impl ChartRange {
    /// All ranges in selector order.
    pub const ALL: [Self; 7] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
        Self::TenYears,
    ];

    /// The provider-facing range code (e.g. `"6mo"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
        }
    }

    /// Sampling interval used when charting this range.
    ///
    /// Short ranges are sampled intraday so the chart has more than a point or two.
    #[must_use]
    pub const fn interval(&self) -> &'static str {
        match self {
            Self::OneDay => "5m",
            Self::FiveDays => "30m",
            Self::OneMonth | Self::SixMonths | Self::OneYear => "1d",
            Self::FiveYears => "1wk",
            Self::TenYears => "1mo",
        }
    }

    /// Returns true if the range is sampled at intraday resolution.
    #[must_use]
    pub const fn is_intraday(&self) -> bool {
        matches!(self, Self::OneDay | Self::FiveDays)
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartRange {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::InvalidParameter(format!("Unknown chart range: {s}")))
    }
}
