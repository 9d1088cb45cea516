//! Yahoo Finance provider against a mocked chart API

use chrono::NaiveDate;
use serde_json::json;
use stock_monitor::error::ProviderError;
use stock_monitor::services::market_data::MarketDataProvider;
use stock_monitor::services::yahoo::YahooFinanceProvider;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chart_body() -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                // 09:30 New York on 2026-01-07, 08 and 09
                "timestamp": [1767796200, 1767882600, 1767969000],
                "indicators": {
                    "quote": [{
                        "open": [250.0, 252.0, 255.0],
                        "high": [253.0, 256.0, 257.0],
                        "low": [249.0, 251.0, 254.0],
                        "close": [252.5, 255.5, null],
                        "volume": [1000000, 1200000, null]
                    }],
                    "adjclose": [{ "adjclose": [252.0, 255.0, null] }]
                }
            }],
            "error": null
        }
    })
}

async fn mock_chart(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("interval", "1d"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn provider(server: &MockServer) -> YahooFinanceProvider {
    YahooFinanceProvider::with_client(server.uri(), reqwest::Client::new())
}

#[tokio::test]
async fn fetch_bars_parses_chart_and_skips_null_rows() {
    let server = MockServer::start().await;
    mock_chart(&server, ResponseTemplate::new(200).set_body_json(chart_body())).await;

    let bars = provider(&server).fetch_bars("AAPL", 30).await.unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
    assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
    assert_eq!(bars[0].close, 252.5);
    assert_eq!(bars[0].adj_close, 252.0);
    assert_eq!(bars[1].volume, 1_200_000);
    assert!(bars.iter().all(|b| b.symbol == "AAPL"));
}

#[tokio::test]
async fn fetch_bars_keeps_most_recent_lookback() {
    let server = MockServer::start().await;
    mock_chart(&server, ResponseTemplate::new(200).set_body_json(chart_body())).await;

    let bars = provider(&server).fetch_bars("AAPL", 1).await.unwrap();

    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
}

#[tokio::test]
async fn rate_limit_maps_to_retryable_error() {
    let server = MockServer::start().await;
    mock_chart(&server, ResponseTemplate::new(429)).await;

    let err = provider(&server).fetch_bars("AAPL", 30).await.unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    mock_chart(&server, ResponseTemplate::new(503)).await;

    let err = provider(&server).fetch_bars("AAPL", 30).await.unwrap_err();

    assert!(matches!(err, ProviderError::Unavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn garbage_body_maps_to_malformed() {
    let server = MockServer::start().await;
    mock_chart(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = provider(&server).fetch_bars("AAPL", 30).await.unwrap_err();

    assert!(matches!(err, ProviderError::Malformed { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn chart_error_maps_to_malformed() {
    let server = MockServer::start().await;
    let body = json!({
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
        }
    });
    mock_chart(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let err = provider(&server).fetch_bars("AAPL", 30).await.unwrap_err();

    assert!(matches!(err, ProviderError::Malformed { .. }));
}
