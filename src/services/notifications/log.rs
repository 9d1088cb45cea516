use crate::error::DeliveryError;
use crate::models::alert::{Alert, Severity};
use crate::services::notifications::NotificationSink;
use async_trait::async_trait;
use tracing::{info, warn};

/// Writes alerts to the tracing log. Always acknowledges.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), DeliveryError> {
        match alert.severity {
            Severity::Info => info!(
                symbol = %alert.symbol,
                kind = %alert.kind,
                severity = %alert.severity,
                "ALERT: {}",
                alert.message
            ),
            Severity::Warning | Severity::Critical => warn!(
                symbol = %alert.symbol,
                kind = %alert.kind,
                severity = %alert.severity,
                "ALERT: {}",
                alert.message
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
