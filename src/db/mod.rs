//! Append-only record store for bars, snapshots, signals and fired alerts

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::StoreError;
use crate::models::alert::{Alert, DedupKey};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::price::{PricePoint, PriceSeries};
use crate::models::signal::Signal;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a daily bar.
    ///
    /// A bar dated before the symbol's latest stored bar is rejected with
    /// `StoreError::OrderingViolation`. A bar on the latest date is a
    /// correction and supersedes the stored one on read.
    async fn append_bar(&self, bar: &PricePoint) -> Result<(), StoreError>;

    /// The symbol's series, oldest first, optionally from `since` (inclusive).
    async fn read_series(&self, symbol: &str, since: Option<NaiveDate>) -> Result<PriceSeries, StoreError>;

    async fn append_indicator_snapshot(&self, snapshot: &IndicatorSnapshot) -> Result<(), StoreError>;

    async fn append_signal(&self, signal: &Signal) -> Result<(), StoreError>;

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// When an alert for `key` was last delivered, if ever.
    async fn read_last_fired(&self, key: &DedupKey) -> Result<Option<DateTime<Utc>>, StoreError>;
}
