//! Yahoo Finance chart API provider for daily bars

use crate::error::ProviderError;
use crate::models::price::PricePoint;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-monitor/0.1)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooFinanceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn unavailable(symbol: &str, reason: impl std::fmt::Display) -> ProviderError {
        ProviderError::Unavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    fn malformed(symbol: &str, reason: impl std::fmt::Display) -> ProviderError {
        ProviderError::Malformed {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_bars(symbol: &str, body: ChartResponse) -> Result<Vec<PricePoint>, ProviderError> {
        if let Some(err) = body.chart.error {
            return Err(Self::malformed(symbol, format!("{}: {}", err.code, err.description)));
        }
        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| Self::malformed(symbol, "empty chart result"))?;

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = result
            .indicators
            .adjclose
            .and_then(|a| a.into_iter().next())
            .map(|a| a.adjclose)
            .unwrap_or_default();

        let mut bars: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let value = |column: &Vec<Option<f64>>| column.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close)) =
                (value(&quote.open), value(&quote.high), value(&quote.low), value(&quote.close))
            else {
                // Yahoo pads halted or in-progress sessions with nulls
                continue;
            };
            let Some(date) = DateTime::<Utc>::from_timestamp(ts + result.meta.gmtoffset, 0)
                .map(|dt| dt.date_naive())
            else {
                continue;
            };
            let bar = PricePoint {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                adj_close: value(&adjclose).unwrap_or(close),
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            };
            match bars.last() {
                Some(last) if last.date == bar.date => {
                    let idx = bars.len() - 1;
                    bars[idx] = bar;
                }
                _ => bars.push(bar),
            }
        }
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    async fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PricePoint>, ProviderError> {
        // Calendar span wide enough to cover `lookback` trading days plus holidays
        let span_days = (lookback as i64 * 7 / 5) + 10;
        let now = Utc::now();
        let period1 = (now - chrono::Duration::days(span_days)).timestamp();
        let period2 = now.timestamp();

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!(symbol = %symbol, url = %url, lookback, "fetching daily bars");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Self::unavailable(symbol, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                symbol: symbol.to_string(),
            });
        }
        if status.is_server_error() {
            return Err(Self::unavailable(symbol, format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(Self::malformed(symbol, format!("HTTP {}", status)));
        }

        let body: ChartResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                Self::unavailable(symbol, e)
            } else {
                Self::malformed(symbol, e)
            }
        })?;

        let mut bars = Self::parse_bars(symbol, body)?;
        if bars.len() > lookback {
            bars.drain(..bars.len() - lookback);
        }
        Ok(bars)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
