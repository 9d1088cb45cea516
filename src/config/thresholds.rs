//! Per-symbol signal thresholds

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Absolute bar-over-bar move, in percent, that counts as a price move.
    pub price_change_threshold_pct: f64,
    pub volume_spike_multiplier: f64,
    /// Bollinger band width, relative to the middle band, above which risk is MEDIUM.
    pub volatility_threshold: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            price_change_threshold_pct: 2.0,
            volume_spike_multiplier: 2.0,
            volatility_threshold: 0.15,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        let key = |field: &str| format!("{}.{}", scope, field);

        if !(0.0..=100.0).contains(&self.rsi_oversold) {
            return Err(ConfigError::invalid(key("rsi_oversold"), "must be within 0..=100"));
        }
        if !(0.0..=100.0).contains(&self.rsi_overbought) {
            return Err(ConfigError::invalid(key("rsi_overbought"), "must be within 0..=100"));
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(ConfigError::invalid(
                key("rsi_oversold"),
                format!(
                    "{} must be below rsi_overbought {}",
                    self.rsi_oversold, self.rsi_overbought
                ),
            ));
        }
        if !is_positive(self.price_change_threshold_pct) {
            return Err(ConfigError::invalid(key("price_change_threshold_pct"), "must be positive"));
        }
        if !is_positive(self.volume_spike_multiplier) {
            return Err(ConfigError::invalid(key("volume_spike_multiplier"), "must be positive"));
        }
        if !is_positive(self.volatility_threshold) {
            return Err(ConfigError::invalid(key("volatility_threshold"), "must be positive"));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
