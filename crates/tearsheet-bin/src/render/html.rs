//! The dashboard page.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tearsheet::{Analysis, ChartRange, MetricsTable, NetIncomeFact, Notice, QUARTER_END_COLUMN};

use super::{METRICS_HEADING, NET_INCOME_HEADING, format_amount};
use crate::chart::{self, PricePoint};

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 260.0;
const CHART_PADDING: f64 = 40.0;

const STYLE: &str = "\
body { font-family: -apple-system, Helvetica, Arial, sans-serif; max-width: 960px; margin: 2rem auto; color: #000; background: #fff; }
h1 { font-weight: 700; letter-spacing: -0.02em; }
form { display: flex; gap: 1rem; align-items: end; margin-bottom: 1.5rem; }
label { display: flex; flex-direction: column; font-size: 0.85rem; }
input, select { padding: 0.3rem; border: 1px solid #000; border-radius: 0; }
button { background-color: #000; color: #fff; border-radius: 0; border: none; padding: 0.4rem 1rem; }
table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
th, td { border-bottom: 1px solid #ddd; padding: 0.3rem 0.5rem; text-align: right; }
th:first-child, td:first-child { text-align: left; }
.notice { padding: 0.5rem 0.75rem; margin: 0.5rem 0; }
.notice.warning { background: #fff8e1; }
.notice.error { background: #fdecea; }
svg text { font-size: 11px; fill: #555; }
";

/// Renders the full page: the form, then the analysis if there is one.
pub(crate) fn page(ticker: &str, range: ChartRange, analysis: Option<&Analysis>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Tearsheet</title>\n");
    let _ = writeln!(out, "<style>\n{STYLE}</style>\n</head>\n<body>");
    out.push_str("<h1>Tearsheet</h1>\n");
    out.push_str("<p><strong>A minimalist dashboard for deep company analysis.</strong></p>\n");

    form(&mut out, ticker, range);

    if let Some(analysis) = analysis {
        body(&mut out, analysis);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn form(out: &mut String, ticker: &str, range: ChartRange) {
    out.push_str("<form method=\"get\" action=\"/\">\n");
    let _ = writeln!(
        out,
        "<label>Ticker Symbol<input type=\"text\" name=\"ticker\" value=\"{}\" title=\"Enter a US stock ticker, like AAPL or TSLA\"></label>",
        encode_double_quoted_attribute(ticker)
    );
    out.push_str("<label>Chart Range<select name=\"range\">");
    for option in ChartRange::ALL {
        let selected = if option == range { " selected" } else { "" };
        let _ = write!(out, "<option value=\"{option}\"{selected}>{option}</option>");
    }
    out.push_str("</select></label>\n");
    out.push_str("<button type=\"submit\" name=\"analyze\" value=\"1\">Analyze</button>\n</form>\n");
}

fn body(out: &mut String, analysis: &Analysis) {
    let _ = writeln!(out, "<h2>{}</h2>", encode_text(analysis.ticker.as_str()));
    match &analysis.price {
        Ok(df) => match chart::price_points(df) {
            Ok(points) if !points.is_empty() => out.push_str(&svg_chart(&points, analysis.range)),
            Ok(_) => notice(out, &Notice::warning("No prices to chart.")),
            Err(e) => notice(out, &Notice::error(format!("Failed to read price data: {e}"))),
        },
        Err(_) => analysis.price_notice().iter().for_each(|n| notice(out, n)),
    }

    let _ = writeln!(out, "<h3>{METRICS_HEADING}</h3>");
    if let Some(metrics) = analysis.metrics().filter(|m| !m.is_empty()) {
        metrics_table(out, &metrics.table);
    }
    for n in analysis.metrics_notices() {
        notice(out, &n);
    }

    if analysis.cik().is_some() {
        let _ = writeln!(out, "<h3>{NET_INCOME_HEADING}</h3>");
        if let Some(fact) = analysis.net_income() {
            net_income_table(out, fact);
        }
        if let Some(n) = analysis.net_income_notice() {
            notice(out, &n);
        }
    }
}

fn notice(out: &mut String, notice: &Notice) {
    let _ = writeln!(
        out,
        "<div class=\"notice {}\">{}</div>",
        notice.severity.as_str(),
        encode_text(&notice.message)
    );
}

fn metrics_table(out: &mut String, table: &MetricsTable) {
    let _ = write!(out, "<table>\n<thead><tr><th>{QUARTER_END_COLUMN}</th>");
    for label in table.labels() {
        let _ = write!(out, "<th>{}</th>", encode_text(label));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in table.rows() {
        let _ = write!(out, "<tr><td>{}</td>", row.end.format("%Y-%m-%d"));
        for value in &row.values {
            let cell = value.map(format_amount).unwrap_or_default();
            let _ = write!(out, "<td>{cell}</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn net_income_table(out: &mut String, fact: &NetIncomeFact) {
    out.push_str("<table>\n<thead><tr><th>Filing</th><th>Year</th><th>Period</th><th>End Date</th><th>Net Income ($USD)</th></tr></thead>\n");
    let _ = writeln!(
        out,
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n</table>",
        encode_text(&fact.form),
        fact.fiscal_year.map(|y| y.to_string()).unwrap_or_default(),
        encode_text(fact.fiscal_period.as_deref().unwrap_or_default()),
        fact.end.format("%Y-%m-%d"),
        format_amount(fact.value)
    );
}

/// Draws closes as an SVG polyline with the price range and time span labelled.
fn svg_chart(points: &[PricePoint], range: ChartRange) -> String {
    let Some((lo, hi)) = chart::bounds(points) else {
        return String::new();
    };
    let span = if hi > lo { hi - lo } else { 1.0 };
    let plot_w = CHART_WIDTH - 2.0 * CHART_PADDING;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PADDING;
    let step = if points.len() > 1 {
        plot_w / (points.len() - 1) as f64
    } else {
        0.0
    };

    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = CHART_PADDING + step * i as f64;
            let y = if hi > lo {
                CHART_PADDING + plot_h * (hi - p.close) / span
            } else {
                CHART_PADDING + plot_h / 2.0
            };
            format!("{x:.1},{y:.1}")
        })
        .collect();

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg class=\"chart\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" width=\"100%\" role=\"img\" aria-label=\"Closing prices\">"
    );
    let _ = writeln!(
        svg,
        "<polyline fill=\"none\" stroke=\"#000\" stroke-width=\"1.5\" points=\"{}\"/>",
        coords.join(" ")
    );
    let left = CHART_PADDING;
    let right = CHART_WIDTH - CHART_PADDING;
    let bottom = CHART_HEIGHT - CHART_PADDING / 3.0;
    let _ = writeln!(svg, "<text x=\"{left}\" y=\"{:.1}\">{hi:.2}</text>", CHART_PADDING - 8.0);
    let _ = writeln!(
        svg,
        "<text x=\"{left}\" y=\"{:.1}\">{lo:.2}</text>",
        CHART_HEIGHT - CHART_PADDING + 16.0
    );
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let _ = writeln!(
            svg,
            "<text x=\"{right}\" y=\"{bottom:.1}\" text-anchor=\"end\">{} to {}</text>",
            chart::format_time(&first.at, range),
            chart::format_time(&last.at, range)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use tearsheet::{ConceptSeries, DataError, Filings, MetricsReport, SeriesPoint, Ticker};

    fn point(secs: i64, close: f64) -> PricePoint {
        PricePoint {
            at: DateTime::from_timestamp(secs, 0).unwrap(),
            close,
        }
    }

    fn analysis(filings: Filings) -> Analysis {
        Analysis {
            ticker: Ticker::new("<b>x</b>"),
            range: ChartRange::OneDay,
            price: Err(DataError::SymbolNotFound("<b>x</b>".to_string())),
            filings,
        }
    }

    #[test]
    fn test_form_defaults_and_escaping() {
        let html = page("\"><script>", ChartRange::FiveYears, None);

        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("<option value=\"5y\" selected>5y</option>"));
        assert!(html.contains("name=\"analyze\""));
        assert!(!html.contains(METRICS_HEADING));
    }

    #[test]
    fn test_not_found_renders_notices_only() {
        let html = page("x", ChartRange::OneDay, Some(&analysis(Filings::NotFound)));

        assert!(html.contains("CIK not found for this ticker. Please try another."));
        assert!(html.contains("Failed to fetch price data"));
        assert!(html.contains("&lt;B&gt;X&lt;/B&gt;"));
        assert!(!html.contains("<table>"));
        assert!(!html.contains(NET_INCOME_HEADING));
    }

    #[test]
    fn test_empty_metrics_have_no_table() {
        let filings = Filings::Found {
            cik: "320193".parse().unwrap(),
            metrics: MetricsReport::new(Vec::new()),
            net_income: Ok(None),
        };
        let html = page("x", ChartRange::OneDay, Some(&analysis(filings)));

        assert!(html.contains("No financial data available for display."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_net_income_section_holds_its_notice() {
        let filings = Filings::Found {
            cik: "320193".parse().unwrap(),
            metrics: MetricsReport::new(Vec::new()),
            net_income: Err(DataError::Status {
                status: 500,
                url: "https://data.sec.gov/x".to_string(),
            }),
        };
        let html = page("x", ChartRange::OneDay, Some(&analysis(filings)));

        let heading = html.find(NET_INCOME_HEADING).unwrap();
        let failure = html.find("Failed to fetch SEC data").unwrap();
        let empty_table = html.find("No financial data available for display.").unwrap();
        assert!(empty_table < heading);
        assert!(heading < failure);
    }

    #[test]
    fn test_metrics_table() {
        let series = ConceptSeries::new(
            "Revenue",
            "Revenues",
            vec![SeriesPoint {
                end: NaiveDate::from_ymd_opt(2024, 6, 29).unwrap(),
                value: 85_777_000_000.0,
            }],
        );
        let mut out = String::new();
        metrics_table(&mut out, &MetricsTable::merge([&series]));

        assert!(out.contains("<th>Quarter End</th><th>Revenue</th>"));
        assert!(out.contains("<td>2024-06-29</td><td>85,777,000,000</td>"));
    }

    #[test]
    fn test_svg_chart() {
        let svg = svg_chart(
            &[point(1_719_840_600, 10.0), point(1_719_927_000, 20.0)],
            ChartRange::OneYear,
        );

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("points=\"40.0,220.0 680.0,40.0\""));
        assert!(svg.contains("2024-07-01 to 2024-07-02"));
    }

    #[test]
    fn test_svg_chart_flat_line() {
        let svg = svg_chart(&[point(0, 5.0)], ChartRange::OneDay);
        assert!(svg.contains("points=\"40.0,130.0\""));
    }
}
