//! Market data provider interface.

use crate::error::ProviderError;
use crate::models::price::PricePoint;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch up to `lookback` most recent daily bars, oldest first.
    async fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PricePoint>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Provider that never has data; used when no upstream is configured.
pub struct PlaceholderMarketDataProvider;

#[async_trait]
impl MarketDataProvider for PlaceholderMarketDataProvider {
    async fn fetch_bars(&self, _symbol: &str, _lookback: usize) -> Result<Vec<PricePoint>, ProviderError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}
