//! HTTP-level tests for the EDGAR provider against a local mock server.

use httpmock::prelude::*;
use std::time::Duration;
use tearsheet_core::{
    Cik, DataError, FilingFactsProvider, SymbolSource, SymbolTableFormat, SymbolTableProvider,
    Ticker,
};
use tearsheet_edgar::EdgarProvider;

const TICKERS_JSON: &str = r#"{
    "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
    "1": {"cik_str": 1067983, "ticker": "BRK-A", "title": "BERKSHIRE HATHAWAY INC"}
}"#;

fn provider(server: &MockServer, format: SymbolTableFormat, path: &str) -> EdgarProvider {
    EdgarProvider::new("Tearsheet-Test/0.1 (test@example.com)")
        .unwrap()
        .with_base_url(server.base_url())
        .with_symbol_source(SymbolSource::new(server.url(path), format))
        .with_rate_limit(Duration::ZERO)
}

#[tokio::test]
async fn test_fetch_json_symbol_table() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/company_tickers.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(TICKERS_JSON);
        })
        .await;

    let provider = provider(&server, SymbolTableFormat::Json, "/files/company_tickers.json");
    let table = provider.fetch_symbol_table().await.unwrap();

    mock.assert_async().await;
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.lookup(&Ticker::new("brk.a")).unwrap().as_str(),
        "0001067983"
    );
}

#[tokio::test]
async fn test_fetch_pipe_symbol_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ticker.txt");
            then.status(200).body("AAPL|320193\nBRK.A|1067983\n");
        })
        .await;

    let provider = provider(&server, SymbolTableFormat::PipeDelimited, "/ticker.txt");
    let table = provider.fetch_symbol_table().await.unwrap();

    assert_eq!(
        table.lookup(&Ticker::new("BRK-A")).unwrap().as_str(),
        "0001067983"
    );
}

#[tokio::test]
async fn test_symbol_table_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/down.json");
            then.status(503);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/garbage.json");
            then.status(200).body("<html>Request blocked</html>");
        })
        .await;

    let down = provider(&server, SymbolTableFormat::Json, "/down.json");
    assert!(matches!(
        down.fetch_symbol_table().await,
        Err(DataError::Status { status: 503, .. })
    ));

    let garbage = provider(&server, SymbolTableFormat::Json, "/garbage.json");
    assert!(matches!(
        garbage.fetch_symbol_table().await,
        Err(DataError::Parse(_))
    ));
}

#[tokio::test]
async fn test_fetch_concept() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/xbrl/companyconcept/CIK0000320193/us-gaap/Revenues.json");
            then.status(200).body(
                r#"{"units": {"USD": [
                    {"end": "2024-06-29", "val": 85777000000, "fy": 2024, "fp": "Q3", "form": "10-Q", "filed": "2024-08-02"},
                    {"end": "2024-03-30", "val": 90753000000, "fy": 2024, "fp": "Q2", "form": "10-Q", "filed": "2024-05-03"}
                ]}}"#,
            );
        })
        .await;

    let provider = provider(&server, SymbolTableFormat::Json, "/unused");
    let cik = Cik::from_number(320193).unwrap();
    let facts = provider.fetch_concept(&cik, "us-gaap", "Revenues").await.unwrap();

    mock.assert_async().await;
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].end, "2024-06-29");
    assert_eq!(facts[1].fp.as_deref(), Some("Q2"));
}

#[tokio::test]
async fn test_concept_status_mapping() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/xbrl/companyconcept/CIK0000320193/us-gaap/FreeCashFlow.json");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/xbrl/companyconcept/CIK0000320193/us-gaap/Revenues.json");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/xbrl/companyconcept/CIK0000320193/us-gaap/ShortTermDebt.json");
            then.status(429);
        })
        .await;

    let provider = provider(&server, SymbolTableFormat::Json, "/unused");
    let cik = Cik::from_number(320193).unwrap();

    assert!(matches!(
        provider.fetch_concept(&cik, "us-gaap", "FreeCashFlow").await,
        Err(DataError::DataNotAvailable(_))
    ));
    assert!(matches!(
        provider.fetch_concept(&cik, "us-gaap", "Revenues").await,
        Err(DataError::Status { status: 500, .. })
    ));
    assert!(matches!(
        provider.fetch_concept(&cik, "us-gaap", "ShortTermDebt").await,
        Err(DataError::RateLimited { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let provider = EdgarProvider::new("Tearsheet-Test/0.1 (test@example.com)")
        .unwrap()
        .with_base_url("http://127.0.0.1:1")
        .with_rate_limit(Duration::ZERO);
    let cik = Cik::from_number(320193).unwrap();

    assert!(matches!(
        provider.fetch_concept(&cik, "us-gaap", "Revenues").await,
        Err(DataError::Network(_))
    ));
}
