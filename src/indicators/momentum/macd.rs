//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::models::indicators::MacdIndicator;

/// Calculate MACD as of the last close
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of the MACD line, seeded by the SMA of its first
/// `signal_period` values
/// Histogram = MACD - Signal
///
/// Returns `None` while fewer than `slow_period + signal_period` closes exist.
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdIndicator> {
    if fast_period == 0 || fast_period >= slow_period || signal_period == 0 {
        return None;
    }
    if closes.len() < slow_period + signal_period {
        return None;
    }

    let fast = math::ema_series(closes, fast_period);
    let slow = math::ema_series(closes, slow_period);

    let macd_values: Vec<f64> = fast
        .iter()
        .zip(slow.iter())
        .filter_map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let line = *macd_values.last()?;
    let signal = math::ema(&macd_values, signal_period)?;

    Some(MacdIndicator {
        line,
        signal,
        histogram: line - signal,
    })
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> Option<MacdIndicator> {
    calculate_macd(closes, 12, 26, 9)
}
