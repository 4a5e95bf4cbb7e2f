//! The dashboard page over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tearsheet::{ChartRange, Dashboard};
use tracing::info;

use crate::DEFAULT_TICKER;
use crate::render::html;

/// Query string of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    ticker: Option<String>,
    range: Option<String>,
    analyze: Option<String>,
}

/// What the page should show, after defaults are applied.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) ticker: String,
    pub(crate) range: ChartRange,
    pub(crate) analyze: bool,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        Self {
            ticker: query.ticker.unwrap_or_else(|| DEFAULT_TICKER.to_string()),
            range: query
                .range
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
            analyze: query.analyze.is_some(),
        }
    }
}

pub(crate) fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(dashboard)
}

async fn index(
    State(dashboard): State<Arc<Dashboard>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let request = PageRequest::from(query);

    let analysis = if request.analyze {
        Some(dashboard.analyze(&request.ticker, request.range).await)
    } else {
        None
    };

    Html(html::page(&request.ticker, request.range, analysis.as_ref()))
}

/// Serves the dashboard until the process is stopped.
pub(crate) async fn serve(dashboard: Arc<Dashboard>, bind: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Dashboard: http://{}", listener.local_addr()?);
    axum::serve(listener, router(dashboard)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::from(PageQuery::default());
        assert_eq!(
            request,
            PageRequest {
                ticker: "AAPL".to_string(),
                range: ChartRange::OneDay,
                analyze: false,
            }
        );
    }

    #[test]
    fn test_unknown_range_falls_back() {
        let request = PageRequest::from(PageQuery {
            ticker: Some("msft".to_string()),
            range: Some("3w".to_string()),
            analyze: Some("1".to_string()),
        });
        assert_eq!(request.ticker, "msft");
        assert_eq!(request.range, ChartRange::OneDay);
        assert!(request.analyze);
    }

    #[test]
    fn test_range_is_parsed() {
        let request = PageRequest::from(PageQuery {
            range: Some("10y".to_string()),
            ..PageQuery::default()
        });
        assert_eq!(request.range, ChartRange::TenYears);
    }
}
