//! RSI (Relative Strength Index) indicator

/// Calculate Wilder-smoothed RSI as of the last close
///
/// The first bar has no predecessor and counts as a change of 0, so a value
/// is available from `period` closes onward. The first average gain/loss is
/// the simple mean of the first `period` changes; each later change updates
/// them with `avg = (avg * (period - 1) + x) / period`.
///
/// RSI = 100 - (100 / (1 + avg_gain / avg_loss)), or 100 when avg_loss is 0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i < period {
            avg_gain += gain;
            avg_loss += loss;
            if i == period - 1 {
                avg_gain /= period as f64;
                avg_loss /= period as f64;
            }
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Option<f64> {
    calculate_rsi(closes, 14)
}
