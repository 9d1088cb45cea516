//! PostgreSQL record store

use crate::db::RecordStore;
use crate::error::StoreError;
use crate::models::alert::{Alert, DedupKey};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::price::{PricePoint, PriceSeries};
use crate::models::signal::Signal;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect and bootstrap the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| StoreError::backend(format!("failed to connect to database: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        info!("PostgreSQL record store ready");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        // Append-only tables; `seq` preserves insertion order for bar corrections
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS price_bars (
                    seq BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    date DATE NOT NULL,
                    open DOUBLE PRECISION NOT NULL,
                    high DOUBLE PRECISION NOT NULL,
                    low DOUBLE PRECISION NOT NULL,
                    close DOUBLE PRECISION NOT NULL,
                    adj_close DOUBLE PRECISION NOT NULL,
                    volume BIGINT NOT NULL,
                    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                CREATE INDEX IF NOT EXISTS price_bars_symbol_date ON price_bars (symbol, date);

                CREATE TABLE IF NOT EXISTS indicator_snapshots (
                    seq BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    date DATE NOT NULL,
                    snapshot_json TEXT NOT NULL,
                    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE TABLE IF NOT EXISTS signals (
                    seq BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    date DATE NOT NULL,
                    verdict TEXT NOT NULL,
                    confidence DOUBLE PRECISION NOT NULL,
                    risk TEXT NOT NULL,
                    reasoning TEXT NOT NULL,
                    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now()
                );

                CREATE TABLE IF NOT EXISTS alerts (
                    seq BIGSERIAL PRIMARY KEY,
                    symbol TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    severity TEXT NOT NULL,
                    message TEXT NOT NULL,
                    date DATE NOT NULL,
                    fired_at TIMESTAMPTZ NOT NULL
                );
                CREATE INDEX IF NOT EXISTS alerts_symbol_kind ON alerts (symbol, kind, fired_at);",
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to create schema: {}", e)))
    }
}

fn to_volume(volume: i64) -> u64 {
    u64::try_from(volume).unwrap_or(0)
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn append_bar(&self, bar: &PricePoint) -> Result<(), StoreError> {
        let row = self
            .client
            .query_one(
                "SELECT max(date) FROM price_bars WHERE symbol = $1",
                &[&bar.symbol],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to read series tail: {}", e)))?;
        let last: Option<NaiveDate> = row.get(0);
        if let Some(last) = last {
            if bar.date < last {
                return Err(StoreError::OrderingViolation {
                    symbol: bar.symbol.clone(),
                    date: bar.date,
                    last,
                });
            }
        }

        let volume = i64::try_from(bar.volume).unwrap_or(i64::MAX);
        self.client
            .execute(
                "INSERT INTO price_bars (symbol, date, open, high, low, close, adj_close, volume)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &bar.symbol,
                    &bar.date,
                    &bar.open,
                    &bar.high,
                    &bar.low,
                    &bar.close,
                    &bar.adj_close,
                    &volume,
                ],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to store bar: {}", e)))?;
        Ok(())
    }

    async fn read_series(&self, symbol: &str, since: Option<NaiveDate>) -> Result<PriceSeries, StoreError> {
        let rows = match since {
            Some(since) => {
                self.client
                    .query(
                        "SELECT date, open, high, low, close, adj_close, volume
                         FROM price_bars
                         WHERE symbol = $1 AND date >= $2
                         ORDER BY date, seq",
                        &[&symbol, &since],
                    )
                    .await
            }
            None => {
                self.client
                    .query(
                        "SELECT date, open, high, low, close, adj_close, volume
                         FROM price_bars
                         WHERE symbol = $1
                         ORDER BY date, seq",
                        &[&symbol],
                    )
                    .await
            }
        }
        .map_err(|e| StoreError::backend(format!("failed to query bars: {}", e)))?;

        let log = rows.into_iter().map(|row| PricePoint {
            symbol: symbol.to_string(),
            date: row.get(0),
            open: row.get(1),
            high: row.get(2),
            low: row.get(3),
            close: row.get(4),
            adj_close: row.get(5),
            volume: to_volume(row.get(6)),
        });
        Ok(PriceSeries::from_log(symbol, log))
    }

    async fn append_indicator_snapshot(&self, snapshot: &IndicatorSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::backend(format!("failed to serialize snapshot: {}", e)))?;
        self.client
            .execute(
                "INSERT INTO indicator_snapshots (symbol, date, snapshot_json) VALUES ($1, $2, $3)",
                &[&snapshot.symbol, &snapshot.date, &json],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to store snapshot: {}", e)))?;
        Ok(())
    }

    async fn append_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        self.client
            .execute(
                "INSERT INTO signals (symbol, date, verdict, confidence, risk, reasoning)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &signal.symbol,
                    &signal.date,
                    &signal.verdict.as_str(),
                    &signal.confidence,
                    &signal.risk.as_str(),
                    &signal.reasoning,
                ],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to store signal: {}", e)))?;
        Ok(())
    }

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.client
            .execute(
                "INSERT INTO alerts (symbol, kind, severity, message, date, fired_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &alert.symbol,
                    &alert.kind.as_str(),
                    &alert.severity.as_str(),
                    &alert.message,
                    &alert.date,
                    &alert.timestamp,
                ],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to store alert: {}", e)))?;
        Ok(())
    }

    async fn read_last_fired(&self, key: &DedupKey) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row = self
            .client
            .query_one(
                "SELECT max(fired_at) FROM alerts WHERE symbol = $1 AND kind = $2",
                &[&key.symbol, &key.kind.as_str()],
            )
            .await
            .map_err(|e| StoreError::backend(format!("failed to query alerts: {}", e)))?;
        Ok(row.get(0))
    }
}
