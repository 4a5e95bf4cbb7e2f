//! Renderers for an [`Analysis`](tearsheet::Analysis).

pub(crate) mod html;
pub(crate) mod text;

/// Heading above the metrics table.
pub(crate) const METRICS_HEADING: &str = "Key Financial Metrics (from 10-Q filings)";

/// Heading above the net income fact.
pub(crate) const NET_INCOME_HEADING: &str = "Most Recent Net Income";

/// Formats a dollar amount with thousands separators.
///
/// Whole numbers print without decimals.
pub(crate) fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    let (sign, unsigned) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (whole, frac) = unsigned.split_once('.').map_or((unsigned, None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
