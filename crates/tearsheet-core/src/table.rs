//! Outer merge of concept series keyed by period end date.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DataError, Result};
use crate::types::ConceptSeries;

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Header of the date column in [`MetricsTable::to_dataframe`].
pub const QUARTER_END_COLUMN: &str = "Quarter End";

/// One row of a [`MetricsTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    /// Period end date shared by every cell in the row.
    pub end: NaiveDate,
    /// One cell per table column; `None` where that concept has no value for `end`.
    pub values: Vec<Option<f64>>,
}

/// Several concept series merged on period end date.
///
/// Rows are sorted newest first. Columns keep the order the series were merged
/// in. Concepts need not share dates, so missing cells are expected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    labels: Vec<String>,
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Outer-joins `series` on period end date.
    ///
    /// Each series becomes one column, even if it has no points.
    #[must_use]
    pub fn merge<'a>(series: impl IntoIterator<Item = &'a ConceptSeries>) -> Self {
        let series: Vec<&ConceptSeries> = series.into_iter().collect();
        let width = series.len();

        let mut by_end: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (col, s) in series.iter().enumerate() {
            for point in &s.points {
                let cells = by_end.entry(point.end).or_insert_with(|| vec![None; width]);
                // First value wins if a series repeats a date.
                if cells[col].is_none() {
                    cells[col] = Some(point.value);
                }
            }
        }

        let rows = by_end
            .into_iter()
            .rev()
            .map(|(end, values)| MetricsRow { end, values })
            .collect();

        Self {
            labels: series.iter().map(|s| s.label.clone()).collect(),
            rows,
        }
    }

    /// Column labels, in merge order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Rows, newest first.
    #[must_use]
    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Cells of the column called `label`, newest first.
    #[must_use]
    pub fn column(&self, label: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// The cell for `label` at period end `end`.
    #[must_use]
    pub fn value(&self, end: NaiveDate, label: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.rows.iter().find(|r| r.end == end)?.values[idx]
    }

    /// Renders the table as a DataFrame with a `Quarter End` column followed by one
    /// column per label.
    ///
    /// # Errors
    /// Returns [`DataError::Other`] if the frame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let ends: Vec<NaiveDate> = self.rows.iter().map(|r| r.end).collect();
        let mut columns = Vec::with_capacity(self.labels.len() + 1);
        columns.push(date_column(QUARTER_END_COLUMN, &ends)?);

        for (idx, label) in self.labels.iter().enumerate() {
            let cells: Vec<Option<f64>> = self.rows.iter().map(|r| r.values[idx]).collect();
            columns.push(Column::new(label.as_str().into(), cells));
        }

        DataFrame::new(columns).map_err(|e| DataError::Other(e.to_string()))
    }
}

/// Builds a polars `Date` column from calendar dates.
pub(crate) fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates
        .iter()
        .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();

    Column::new(name.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Other(e.to_string()))
}
