//! Terminal output for the `analyze` command.

use std::fmt::Write;

use tearsheet::{Analysis, Notice};

use super::{METRICS_HEADING, NET_INCOME_HEADING};
use crate::chart::{self, PricePoint};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;

/// Renders an analysis as plain text.
pub(crate) fn analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})\n", analysis.ticker, analysis.range);

    match &analysis.price {
        Ok(df) => match chart::price_points(df) {
            Ok(points) => price_summary(&mut out, &points, analysis),
            Err(e) => notice(&mut out, &Notice::error(format!("Failed to read price data: {e}"))),
        },
        Err(_) => {
            if let Some(n) = analysis.price_notice() {
                notice(&mut out, &n);
            }
        }
    }

    let _ = writeln!(out, "\n{METRICS_HEADING}");
    if let Some(metrics) = analysis.metrics().filter(|m| !m.is_empty()) {
        match metrics.table.to_dataframe() {
            Ok(df) => {
                let _ = writeln!(out, "{df}");
            }
            Err(e) => notice(&mut out, &Notice::error(e.to_string())),
        }
    }
    for n in analysis.metrics_notices() {
        notice(&mut out, &n);
    }

    if analysis.cik().is_some() {
        let _ = writeln!(out, "\n{NET_INCOME_HEADING}");
        if let Some(fact) = analysis.net_income() {
            match fact.to_dataframe() {
                Ok(df) => {
                    let _ = writeln!(out, "{df}");
                }
                Err(e) => notice(&mut out, &Notice::error(e.to_string())),
            }
        }
        if let Some(n) = analysis.net_income_notice() {
            notice(&mut out, &n);
        }
    }

    out
}

fn notice(out: &mut String, notice: &Notice) {
    let _ = writeln!(out, "{notice}");
}

fn price_summary(out: &mut String, points: &[PricePoint], analysis: &Analysis) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        notice(out, &Notice::warning("No prices to chart."));
        return;
    };
    let _ = writeln!(out, "{}", sparkline(points));
    let _ = writeln!(
        out,
        "{:.2} ({}) -> {:.2} ({})",
        first.close,
        chart::format_time(&first.at, analysis.range),
        last.close,
        chart::format_time(&last.at, analysis.range)
    );
}

/// Draws closes as a row of block characters, sampled down to a fixed width.
fn sparkline(points: &[PricePoint]) -> String {
    let Some((lo, hi)) = chart::bounds(points) else {
        return String::new();
    };
    let width = points.len().min(SPARK_WIDTH);
    let top = SPARK_LEVELS.len() - 1;

    (0..width)
        .map(|i| {
            let idx = if width > 1 {
                i * (points.len() - 1) / (width - 1)
            } else {
                0
            };
            let level = if hi > lo {
                ((points[idx].close - lo) / (hi - lo) * top as f64).round() as usize
            } else {
                top / 2
            };
            SPARK_LEVELS[level.min(top)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tearsheet::{ChartRange, DataError, Filings, MetricsReport, Ticker};

    fn point(close: f64) -> PricePoint {
        PricePoint {
            at: DateTime::from_timestamp(1_719_840_600, 0).unwrap(),
            close,
        }
    }

    #[test]
    fn test_sparkline() {
        let line = sparkline(&[point(1.0), point(5.0), point(9.0)]);
        assert_eq!(line, "▁▅█");

        let long: Vec<_> = (0..500).map(|i| point(f64::from(i))).collect();
        let line = sparkline(&long);
        assert_eq!(line.chars().count(), SPARK_WIDTH);
        assert!(line.starts_with('▁'));
        assert!(line.ends_with('█'));

        assert_eq!(sparkline(&[point(3.0), point(3.0)]), "▄▄");
    }

    #[test]
    fn test_analysis_without_data() {
        let analysis = Analysis {
            ticker: Ticker::new("zzzz"),
            range: ChartRange::FiveDays,
            price: Err(DataError::SymbolNotFound("ZZZZ".to_string())),
            filings: Filings::Found {
                cik: "1".parse().unwrap(),
                metrics: MetricsReport::new(Vec::new()),
                net_income: Ok(None),
            },
        };

        let text = super::analysis(&analysis);

        assert!(text.starts_with("ZZZZ (5d)"));
        assert!(text.contains("error: Failed to fetch price data"));
        assert!(text.contains(METRICS_HEADING));
        assert!(text.contains("warning: No financial data available for display."));
        let heading = text.find(NET_INCOME_HEADING).unwrap();
        let absent = text.find("warning: No 10-K or 10-Q net income filings found.").unwrap();
        assert!(heading < absent);
    }
}
