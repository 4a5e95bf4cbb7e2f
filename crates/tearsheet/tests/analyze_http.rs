//! End-to-end tests of the analyze flow against mocked SEC and Yahoo endpoints.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use tearsheet::aggregator::TRACKED_CONCEPTS;
use tearsheet::{
    AggregatorConfig, ChartRange, Dashboard, EdgarProvider, Filings, Notice, Severity,
    SymbolSource, SymbolTableFormat, YahooProvider,
};

const TICKERS: &str = r#"{
    "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
    "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"}
}"#;

const CHART: &str = r#"{"chart": {"result": [{
    "timestamp": [1719840600, 1719927000, 1720013400],
    "indicators": {"quote": [{"close": [216.75, 220.27, 221.55]}]}
}], "error": null}}"#;

fn concept_body(tag: &str) -> String {
    format!(
        r#"{{
            "cik": 320193, "taxonomy": "us-gaap", "tag": "{tag}",
            "units": {{"USD": [
                {{"end": "2023-12-30", "val": 33916000000, "form": "10-Q", "fy": 2024, "fp": "Q1", "filed": "2024-02-02"}},
                {{"end": "2024-03-30", "val": 23636000000, "form": "10-Q", "fy": 2024, "fp": "Q2", "filed": "2024-05-03"}},
                {{"end": "2024-06-29", "val": 21448000000, "form": "10-Q", "fy": 2024, "fp": "Q3", "filed": "2024-08-02"}},
                {{"end": "2023-07-01", "val": 19881000000, "form": "10-Q", "fy": 2023, "fp": "Q3", "filed": "2023-08-04"}},
                {{"end": "2023-04-01", "val": 24160000000, "form": "10-Q", "fy": 2023, "fp": "Q2", "filed": "2023-05-05"}},
                {{"end": "2022-12-31", "val": 29998000000, "form": "10-Q", "fy": 2023, "fp": "Q1", "filed": "2023-02-03"}},
                {{"end": "2024-09-28", "val": 93736000000, "form": "10-K", "fy": 2024, "fp": "FY", "filed": "2024-11-01"}},
                {{"end": "2024-12-28", "val": 36330000000, "form": "8-K", "filed": "2025-01-30"}}
            ]}}
        }}"#
    )
}

fn dashboard(server: &MockServer) -> Dashboard {
    let edgar = Arc::new(
        EdgarProvider::new("Tearsheet-Test/0.1 (test@example.com)")
            .unwrap()
            .with_base_url(server.base_url())
            .with_symbol_source(SymbolSource::new(
                server.url("/files/company_tickers.json"),
                SymbolTableFormat::Json,
            ))
            .with_rate_limit(Duration::ZERO),
    );
    let yahoo = YahooProvider::new()
        .unwrap()
        .with_base_url(server.url("/v8/finance/chart"))
        .with_rate_limit(Duration::ZERO);

    Dashboard::new(Arc::new(yahoo), edgar.clone(), edgar, AggregatorConfig::default())
}

async fn mock_tickers(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/company_tickers.json");
            then.status(200).body(TICKERS);
        })
        .await;
}

async fn mock_chart(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v8/finance/chart/AAPL");
            then.status(200).body(CHART);
        })
        .await;
}

fn concept_path(tag: &str) -> String {
    format!("/api/xbrl/companyconcept/CIK0000320193/us-gaap/{tag}.json")
}

#[tokio::test]
async fn test_one_concept_failing_leaves_the_rest() {
    let server = MockServer::start_async().await;
    mock_tickers(&server).await;
    mock_chart(&server).await;

    let mut seen = Vec::new();
    for concept in TRACKED_CONCEPTS {
        if seen.contains(&concept.tag) {
            continue;
        }
        seen.push(concept.tag);

        let path = concept_path(concept.tag);
        if concept.tag == "FreeCashFlow" {
            server
                .mock_async(|when, then| {
                    when.method(GET).path(path.as_str());
                    then.status(500);
                })
                .await;
        } else {
            let body = concept_body(concept.tag);
            server
                .mock_async(|when, then| {
                    when.method(GET).path(path.as_str());
                    then.status(200).body(body.as_str());
                })
                .await;
        }
    }

    let analysis = dashboard(&server).analyze("aapl", ChartRange::OneYear).await;

    assert_eq!(analysis.price.as_ref().unwrap().height(), 3);

    let Filings::Found {
        cik,
        metrics,
        net_income,
    } = &analysis.filings
    else {
        panic!("AAPL should resolve");
    };
    assert_eq!(cik.as_str(), "0000320193");

    // Only the five most recent 10-Q periods make it into the table.
    assert_eq!(metrics.table.height(), 5);
    assert_eq!(metrics.table.labels().len(), 9);
    assert!(!metrics.table.labels().iter().any(|l| l == "Free Cash Flow"));
    assert_eq!(metrics.failures().count(), 1);
    assert_eq!(
        metrics.table.column("Net Income").unwrap()[0],
        Some(21_448_000_000.0)
    );

    // The standalone fact reaches past the table into the annual report.
    let latest = net_income.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(latest.form, "10-K");
    assert_eq!(latest.value, 93_736_000_000.0);

    let notices = analysis.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Warning);
    assert!(notices[0].message.contains("Free Cash Flow"));
}

#[tokio::test]
async fn test_unknown_ticker_never_queries_filings() {
    let server = MockServer::start_async().await;
    mock_tickers(&server).await;
    let chart = server
        .mock_async(|when, then| {
            when.method(GET).path("/v8/finance/chart/ZZZZ");
            then.status(404);
        })
        .await;
    let filings = server
        .mock_async(|when, then| {
            when.method(GET).path_includes("/api/xbrl/");
            then.status(200).body("{}");
        })
        .await;

    let analysis = dashboard(&server).analyze("zzzz", ChartRange::OneDay).await;

    chart.assert_async().await;
    filings.assert_hits_async(0).await;
    assert!(matches!(analysis.filings, Filings::NotFound));

    let notices = analysis.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].severity, Severity::Error);
    assert_eq!(
        notices[1],
        Notice::warning("CIK not found for this ticker. Please try another.")
    );
}

#[tokio::test]
async fn test_symbol_table_outage_reads_as_not_found() {
    let server = MockServer::start_async().await;
    mock_chart(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/company_tickers.json");
            then.status(503);
        })
        .await;

    let analysis = dashboard(&server).analyze("AAPL", ChartRange::OneDay).await;

    assert!(analysis.price.is_ok());
    assert!(matches!(analysis.filings, Filings::NotFound));
}

#[tokio::test]
async fn test_all_concepts_failing() {
    let server = MockServer::start_async().await;
    mock_tickers(&server).await;
    mock_chart(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_includes("/api/xbrl/companyconcept/");
            then.status(500);
        })
        .await;

    let analysis = dashboard(&server).analyze("AAPL", ChartRange::OneDay).await;
    let metrics = analysis.metrics().unwrap();

    assert!(metrics.is_empty());
    assert_eq!(metrics.failures().count(), 10);
    assert!(
        analysis
            .notices()
            .contains(&Notice::warning("No financial data available for display."))
    );
}
