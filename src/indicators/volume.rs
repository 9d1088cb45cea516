//! Volume indicators

use crate::common::math;

/// Average traded volume over the last `window` bars
pub fn calculate_volume_average(volumes: &[f64], window: usize) -> Option<f64> {
    math::sma(volumes, window)
}
