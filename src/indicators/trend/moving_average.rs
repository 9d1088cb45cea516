//! Simple moving averages of closing prices

use crate::common::math;
use std::collections::BTreeMap;

/// Mean of the last `window` closes, `None` if fewer exist
pub fn calculate_sma(closes: &[f64], window: usize) -> Option<f64> {
    math::sma(closes, window)
}

/// Calculate several SMAs at once, keeping unavailable windows as `None`
pub fn calculate_smas(closes: &[f64], windows: &[usize]) -> BTreeMap<usize, Option<f64>> {
    windows
        .iter()
        .map(|&window| (window, calculate_sma(closes, window)))
        .collect()
}
