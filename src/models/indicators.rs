use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdIndicator {
    /// Signed distance of the MACD line above its signal line.
    pub fn spread(&self) -> f64 {
        self.line - self.signal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    /// Band width relative to the middle band, `None` when the middle is zero.
    pub fn width(&self) -> Option<f64> {
        if self.middle == 0.0 {
            return None;
        }
        Some((self.upper - self.lower) / self.middle)
    }
}

/// Indicator values for one symbol as of one bar.
///
/// Each field is independently available; `None` means the series prefix
/// was too short for that indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    pub volume: u64,
    pub moving_averages: BTreeMap<usize, Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_average: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn new(symbol: String, date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            symbol,
            date,
            close,
            previous_close: None,
            volume,
            moving_averages: BTreeMap::new(),
            rsi: None,
            macd: None,
            bollinger: None,
            volume_average: None,
        }
    }

    pub fn with_previous_close(mut self, previous_close: f64) -> Self {
        self.previous_close = Some(previous_close);
        self
    }

    pub fn with_rsi(mut self, rsi: f64) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_macd(mut self, macd: MacdIndicator) -> Self {
        self.macd = Some(macd);
        self
    }

    pub fn with_bollinger(mut self, bands: BollingerBands) -> Self {
        self.bollinger = Some(bands);
        self
    }

    pub fn with_volume_average(mut self, average: f64) -> Self {
        self.volume_average = Some(average);
        self
    }

    pub fn moving_average(&self, window: usize) -> Option<f64> {
        self.moving_averages.get(&window).copied().flatten()
    }

    /// Percentage change of the close against the prior bar's close.
    pub fn change_pct(&self) -> Option<f64> {
        match self.previous_close {
            Some(prev) if prev != 0.0 => Some((self.close - prev) / prev * 100.0),
            _ => None,
        }
    }

    /// True when at least one indicator field could be computed.
    pub fn has_any_indicator(&self) -> bool {
        self.rsi.is_some()
            || self.macd.is_some()
            || self.bollinger.is_some()
            || self.volume_average.is_some()
            || self.moving_averages.values().any(Option::is_some)
    }
}
