//! In-process record store

use crate::db::RecordStore;
use crate::error::StoreError;
use crate::models::alert::{Alert, DedupKey};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::price::{PricePoint, PriceSeries};
use crate::models::signal::Signal;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Records {
    bars: HashMap<String, Vec<PricePoint>>,
    snapshots: HashMap<String, Vec<IndicatorSnapshot>>,
    signals: HashMap<String, Vec<Signal>>,
    alerts: Vec<Alert>,
}

/// Keeps every append in memory. Used for tests and storage-less runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bar log for a symbol, corrections included.
    pub async fn bar_log(&self, symbol: &str) -> Vec<PricePoint> {
        let records = self.records.read().await;
        records.bars.get(symbol).cloned().unwrap_or_default()
    }

    pub async fn snapshots(&self, symbol: &str) -> Vec<IndicatorSnapshot> {
        let records = self.records.read().await;
        records.snapshots.get(symbol).cloned().unwrap_or_default()
    }

    pub async fn signals(&self, symbol: &str) -> Vec<Signal> {
        let records = self.records.read().await;
        records.signals.get(symbol).cloned().unwrap_or_default()
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.records.read().await.alerts.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_bar(&self, bar: &PricePoint) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let log = records.bars.entry(bar.symbol.clone()).or_default();
        if let Some(last) = log.iter().map(|b| b.date).max() {
            if bar.date < last {
                return Err(StoreError::OrderingViolation {
                    symbol: bar.symbol.clone(),
                    date: bar.date,
                    last,
                });
            }
        }
        log.push(bar.clone());
        Ok(())
    }

    async fn read_series(&self, symbol: &str, since: Option<NaiveDate>) -> Result<PriceSeries, StoreError> {
        let records = self.records.read().await;
        let log = records.bars.get(symbol).map(Vec::as_slice).unwrap_or_default();
        Ok(PriceSeries::from_log(
            symbol,
            log.iter()
                .filter(|b| since.map_or(true, |since| b.date >= since))
                .cloned(),
        ))
    }

    async fn append_indicator_snapshot(&self, snapshot: &IndicatorSnapshot) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records
            .snapshots
            .entry(snapshot.symbol.clone())
            .or_default()
            .push(snapshot.clone());
        Ok(())
    }

    async fn append_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records
            .signals
            .entry(signal.symbol.clone())
            .or_default()
            .push(signal.clone());
        Ok(())
    }

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.records.write().await.alerts.push(alert.clone());
        Ok(())
    }

    async fn read_last_fired(&self, key: &DedupKey) -> Result<Option<DateTime<Utc>>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .alerts
            .iter()
            .filter(|a| a.symbol == key.symbol && a.kind == key.kind)
            .map(|a| a.timestamp)
            .max())
    }
}
