//! Exponential backoff for upstream fetches

use crate::error::ProviderError;
use crate::models::price::PricePoint;
use crate::services::market_data::MarketDataProvider;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub attempts: usize,
    pub initial_delay: Duration,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, initial_delay: Duration) -> Self {
        Self {
            attempts,
            initial_delay,
            ..Self::default()
        }
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_factor(self.factor)
            .with_max_times(self.attempts.saturating_sub(1))
    }
}

/// Fetch bars, retrying rate-limit and availability failures per `policy`.
///
/// Malformed responses are returned immediately.
pub async fn fetch_with_retry(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    lookback: usize,
    policy: &RetryPolicy,
) -> Result<Vec<PricePoint>, ProviderError> {
    (move || provider.fetch_bars(symbol, lookback))
        .retry(policy.backoff())
        .when(|e: &ProviderError| e.is_retryable())
        .notify(|e: &ProviderError, delay: Duration| {
            warn!(
                symbol = %symbol,
                provider = provider.name(),
                error = %e,
                "fetch failed, retrying in {:?}",
                delay
            );
        })
        .await
}
