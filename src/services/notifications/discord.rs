//! Discord webhook notification sink

use crate::error::DeliveryError;
use crate::models::alert::{Alert, AlertKind, Severity};
use crate::services::notifications::NotificationSink;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
    fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

pub struct DiscordWebhookSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl DiscordWebhookSink {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(webhook_url, client))
    }

    pub fn with_client(webhook_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    fn color(severity: Severity) -> u32 {
        match severity {
            Severity::Info => 0x3498db,
            Severity::Warning => 0xffa500,
            Severity::Critical => 0xff0000,
        }
    }

    fn title(alert: &Alert) -> String {
        let label = match alert.kind {
            AlertKind::PriceMove => "price alert",
            AlertKind::RsiExtreme => "RSI alert",
            AlertKind::MacdCross(_) => "MACD cross",
            AlertKind::VolumeSpike => "volume spike",
            AlertKind::SignalChange => "signal change",
        };
        format!("{} {}", alert.symbol, label)
    }

    fn payload(alert: &Alert) -> WebhookPayload {
        WebhookPayload {
            content: format!("**{}** [{}] {}", alert.symbol, alert.severity, alert.message),
            embeds: vec![Embed {
                title: Self::title(alert),
                description: alert.message.clone(),
                color: Self::color(alert.severity),
                timestamp: alert.timestamp.to_rfc3339(),
                fields: vec![
                    EmbedField {
                        name: "Severity".to_string(),
                        value: alert.severity.to_string(),
                        inline: true,
                    },
                    EmbedField {
                        name: "Bar".to_string(),
                        value: alert.date.to_string(),
                        inline: true,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhookSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::payload(alert))
            .send()
            .await
            .map_err(|e| DeliveryError::new(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::new(
                self.name(),
                format!("HTTP {}: {}", status, body),
            ));
        }

        debug!(symbol = %alert.symbol, kind = %alert.kind, "discord notification delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "discord"
    }
}
