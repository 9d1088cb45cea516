//! Confidence and risk scoring for a decided verdict

use crate::config::SignalThresholds;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{RiskLevel, Verdict};

/// Number of independent indicators that can corroborate a verdict.
pub const SUPPORTING_INDICATORS: usize = 3;

/// Whether RSI sits in the extreme zone on the verdict's side.
pub fn rsi_supports(snapshot: &IndicatorSnapshot, verdict: Verdict, thresholds: &SignalThresholds) -> bool {
    match (snapshot.rsi, verdict) {
        (Some(rsi), Verdict::Buy) => rsi <= thresholds.rsi_oversold,
        (Some(rsi), Verdict::Sell) => rsi >= thresholds.rsi_overbought,
        _ => false,
    }
}

/// Whether the MACD histogram sign agrees with the verdict.
pub fn histogram_supports(snapshot: &IndicatorSnapshot, verdict: Verdict) -> bool {
    match (snapshot.macd, verdict) {
        (Some(macd), Verdict::Buy) => macd.histogram > 0.0,
        (Some(macd), Verdict::Sell) => macd.histogram < 0.0,
        _ => false,
    }
}

/// Whether the close is outside the Bollinger band on the verdict's side.
pub fn band_supports(snapshot: &IndicatorSnapshot, verdict: Verdict) -> bool {
    match (snapshot.bollinger, verdict) {
        (Some(bands), Verdict::Buy) => snapshot.close < bands.lower,
        (Some(bands), Verdict::Sell) => snapshot.close > bands.upper,
        _ => false,
    }
}

/// Fraction of supporting indicators, in `[0, 1]`. HOLD is never corroborated.
pub fn calculate_confidence(
    snapshot: &IndicatorSnapshot,
    verdict: Verdict,
    thresholds: &SignalThresholds,
) -> f64 {
    if !verdict.is_actionable() {
        return 0.0;
    }
    let supporting = [
        rsi_supports(snapshot, verdict, thresholds),
        histogram_supports(snapshot, verdict),
        band_supports(snapshot, verdict),
    ]
    .iter()
    .filter(|&&s| s)
    .count();
    supporting as f64 / SUPPORTING_INDICATORS as f64
}

/// Whether the latest bar moved more than the configured percentage.
pub fn exceeds_price_threshold(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> bool {
    snapshot
        .change_pct()
        .map(|pct| pct.abs() > thresholds.price_change_threshold_pct)
        .unwrap_or(false)
}

pub fn assess_risk(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> RiskLevel {
    if exceeds_price_threshold(snapshot, thresholds) {
        return RiskLevel::High;
    }
    let wide_bands = snapshot
        .bollinger
        .and_then(|bands| bands.width())
        .map(|width| width > thresholds.volatility_threshold)
        .unwrap_or(false);
    if wide_bands {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
