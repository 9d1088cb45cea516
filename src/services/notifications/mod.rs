//! Notification sinks that deliver fired alerts.

pub mod discord;
pub mod log;

pub use discord::DiscordWebhookSink;
pub use log::LogSink;

use crate::error::DeliveryError;
use crate::models::alert::Alert;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one alert. `Ok` is the sink's acknowledgement.
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError>;

    fn name(&self) -> &str;
}

/// Delivers to every inner sink; acknowledged only when all of them ack.
///
/// Every sink is attempted even after a failure, so a retry after a partial
/// failure may deliver a duplicate to the sinks that already succeeded.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl NotificationSink for FanoutSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(alert).await {
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DeliveryError::new(self.name(), failures.join("; ")))
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}
