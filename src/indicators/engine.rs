//! Indicator snapshot computation over a price series prefix.

use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::trend::calculate_smas;
use crate::indicators::volatility::calculate_bollinger_bands;
use crate::indicators::volume::calculate_volume_average;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::price::PriceSeries;
use serde::{Deserialize, Serialize};

/// Window lengths and multipliers for every indicator in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub ma_windows: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub volume_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_windows: vec![5, 10, 20, 50, 200],
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            volume_window: 20,
        }
    }
}

impl IndicatorConfig {
    /// Number of bars needed before every field of a snapshot is available.
    pub fn warmup_bars(&self) -> usize {
        let longest_ma = self.ma_windows.iter().copied().max().unwrap_or(0);
        longest_ma
            .max(self.rsi_period)
            .max(self.macd_slow + self.macd_signal)
            .max(self.bollinger_period)
            .max(self.volume_window)
    }
}

pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Compute the snapshot for the bar at `as_of`.
    ///
    /// Only bars `0..=as_of` are read. Returns `None` when `as_of` is outside
    /// the series.
    pub fn compute(
        series: &PriceSeries,
        as_of: usize,
        config: &IndicatorConfig,
    ) -> Option<IndicatorSnapshot> {
        let bar = series.points().get(as_of)?;
        let closes = series.closes_until(as_of);
        let volumes = series.volumes_until(as_of);

        let mut snapshot =
            IndicatorSnapshot::new(series.symbol().to_string(), bar.date, bar.close, bar.volume);

        if as_of > 0 {
            snapshot = snapshot.with_previous_close(closes[as_of - 1]);
        }

        snapshot.moving_averages = calculate_smas(&closes, &config.ma_windows);

        if let Some(rsi) = calculate_rsi(&closes, config.rsi_period) {
            snapshot = snapshot.with_rsi(rsi);
        }

        if let Some(macd) = calculate_macd(
            &closes,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        ) {
            snapshot = snapshot.with_macd(macd);
        }

        if let Some(bands) =
            calculate_bollinger_bands(&closes, config.bollinger_period, config.bollinger_std_dev)
        {
            snapshot = snapshot.with_bollinger(bands);
        }

        if let Some(average) = calculate_volume_average(&volumes, config.volume_window) {
            snapshot = snapshot.with_volume_average(average);
        }

        Some(snapshot)
    }

    /// Compute the snapshot for the most recent bar.
    pub fn compute_latest(series: &PriceSeries, config: &IndicatorConfig) -> Option<IndicatorSnapshot> {
        if series.is_empty() {
            return None;
        }
        Self::compute(series, series.len() - 1, config)
    }
}
