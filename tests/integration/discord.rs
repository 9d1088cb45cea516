//! Discord webhook sink against a mocked endpoint

use chrono::{NaiveDate, TimeZone, Utc};
use stock_monitor::models::alert::{Alert, AlertKind, Severity};
use stock_monitor::services::notifications::{
    DiscordWebhookSink, FanoutSink, LogSink, NotificationSink,
};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> Alert {
    Alert {
        symbol: "AAPL".to_string(),
        kind: AlertKind::PriceMove,
        severity: Severity::Critical,
        message: "AAPL moved up +5.10% to $262.00".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 1, 8).unwrap(),
        timestamp: Utc.with_ymd_and_hms(2026, 1, 8, 21, 5, 0).unwrap(),
    }
}

#[tokio::test]
async fn delivers_embed_and_accepts_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_string_contains("AAPL price alert"))
        .and(body_string_contains("\"color\":16711680"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let sink = DiscordWebhookSink::with_client(format!("{}/webhook", server.uri()), reqwest::Client::new());
    sink.deliver(&alert()).await.unwrap();
}

#[tokio::test]
async fn non_2xx_is_a_delivery_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let sink = DiscordWebhookSink::with_client(format!("{}/webhook", server.uri()), reqwest::Client::new());
    let err = sink.deliver(&alert()).await.unwrap_err();

    assert_eq!(err.sink, "discord");
    assert!(err.reason.contains("500"));
}

#[tokio::test]
async fn fanout_requires_every_sink_to_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let discord = DiscordWebhookSink::with_client(format!("{}/webhook", server.uri()), reqwest::Client::new());
    let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink), Arc::new(discord)];
    let fanout = FanoutSink::new(sinks);
    assert!(fanout.deliver(&alert()).await.is_err());

    let log_only: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    let logging_only = FanoutSink::new(log_only);
    assert!(logging_only.deliver(&alert()).await.is_ok());
}
