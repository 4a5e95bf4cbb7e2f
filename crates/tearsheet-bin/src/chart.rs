//! Closing prices read out of the provider's frame.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use tearsheet::{ChartRange, DataError, Result};

/// One plotted close.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PricePoint {
    pub(crate) at: DateTime<Utc>,
    pub(crate) close: f64,
}

/// Reads `(timestamp, close)` pairs, skipping rows with a missing close.
pub(crate) fn price_points(df: &DataFrame) -> Result<Vec<PricePoint>> {
    let millis = df
        .column("timestamp")
        .and_then(|c| c.cast(&DataType::Int64))
        .map_err(|e| DataError::Parse(e.to_string()))?;
    let millis = millis.i64().map_err(|e| DataError::Parse(e.to_string()))?;
    let closes = df
        .column("close")
        .and_then(|c| c.f64())
        .map_err(|e| DataError::Parse(e.to_string()))?;

    Ok(millis
        .into_iter()
        .zip(closes)
        .filter_map(|(ms, close)| {
            Some(PricePoint {
                at: DateTime::from_timestamp_millis(ms?)?,
                close: close?,
            })
        })
        .collect())
}

/// Formats a point's time for the given range.
pub(crate) fn format_time(at: &DateTime<Utc>, range: ChartRange) -> String {
    if range.is_intraday() {
        at.format("%Y-%m-%d %H:%M").to_string()
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// Lowest and highest close.
pub(crate) fn bounds(points: &[PricePoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.close).fold(None, |acc, c| match acc {
        None => Some((c, c)),
        Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        let ts = Column::new("timestamp".into(), vec![1_719_840_600_000_i64, 1_719_927_000_000, 1_720_013_400_000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        DataFrame::new(vec![ts, Column::new("close".into(), vec![Some(216.75), None, Some(221.55)])])
            .unwrap()
    }

    #[test]
    fn test_price_points_skip_nulls() {
        let points = price_points(&frame()).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 216.75);
        assert_eq!(format_time(&points[0].at, ChartRange::OneYear), "2024-07-01");
        assert_eq!(format_time(&points[0].at, ChartRange::OneDay), "2024-07-01 13:30");
        assert_eq!(bounds(&points), Some((216.75, 221.55)));
    }

    #[test]
    fn test_missing_column() {
        let df = DataFrame::new(vec![Column::new("close".into(), vec![1.0])]).unwrap();
        assert!(matches!(price_points(&df), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_bounds_empty() {
        assert_eq!(bounds(&[]), None);
    }
}
