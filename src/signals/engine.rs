//! Rule-based signal evaluation over consecutive indicator snapshots.

use crate::config::SignalThresholds;
use crate::models::alert::{Alert, CrossDirection};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{Signal, Verdict};
use crate::signals::alerts;
use crate::signals::scoring;

/// Longest reasoning text kept on a signal.
pub const MAX_REASONING_LEN: usize = 500;

/// Result of evaluating one snapshot: the signal plus candidate alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub signal: Signal,
    pub candidates: Vec<Alert>,
}

pub struct SignalEngine;

impl SignalEngine {
    /// Evaluate the current snapshot against the one before it.
    ///
    /// Rules are applied in a fixed order and the first match wins:
    /// 1. MACD line crossing its signal line (BUY up, SELL down)
    /// 2. RSI at or beyond the oversold/overbought thresholds
    /// 3. HOLD
    pub fn evaluate(
        current: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
        thresholds: &SignalThresholds,
    ) -> Evaluation {
        let mut reasons = Vec::new();
        let cross = Self::detect_cross(current, previous);

        let verdict = match (cross, current.rsi) {
            (Some(CrossDirection::Up), _) => {
                reasons.push("MACD crossed above signal line".to_string());
                Verdict::Buy
            }
            (Some(CrossDirection::Down), _) => {
                reasons.push("MACD crossed below signal line".to_string());
                Verdict::Sell
            }
            (None, Some(rsi)) if rsi <= thresholds.rsi_oversold => {
                reasons.push(format!("RSI oversold ({:.2} <= {:.0})", rsi, thresholds.rsi_oversold));
                Verdict::Buy
            }
            (None, Some(rsi)) if rsi >= thresholds.rsi_overbought => {
                reasons.push(format!("RSI overbought ({:.2} >= {:.0})", rsi, thresholds.rsi_overbought));
                Verdict::Sell
            }
            _ => {
                reasons.push("no rule triggered".to_string());
                Verdict::Hold
            }
        };

        let confidence = scoring::calculate_confidence(current, verdict, thresholds);
        let risk = scoring::assess_risk(current, thresholds);

        if verdict.is_actionable() {
            if cross.is_some() && scoring::rsi_supports(current, verdict, thresholds) {
                reasons.push(format!("RSI confirms ({:.2})", current.rsi.unwrap_or_default()));
            }
            if scoring::histogram_supports(current, verdict) {
                let histogram = current.macd.map(|m| m.histogram).unwrap_or_default();
                reasons.push(format!("MACD histogram agrees ({:.4})", histogram));
            }
            if scoring::band_supports(current, verdict) {
                reasons.push(format!("close ${:.2} outside Bollinger band", current.close));
            }
        }
        if let Some(change) = current.change_pct() {
            if change.abs() > thresholds.price_change_threshold_pct {
                reasons.push(format!("price moved {:+.2}%", change));
            }
        }
        if let Some(width) = current.bollinger.and_then(|b| b.width()) {
            if width > thresholds.volatility_threshold {
                reasons.push(format!("wide Bollinger bands (width {:.3})", width));
            }
        }

        let signal = Signal {
            symbol: current.symbol.clone(),
            date: current.date,
            verdict,
            confidence,
            risk,
            reasoning: join_reasons(&reasons),
        };

        let mut candidates = Vec::new();
        candidates.extend(alerts::price_move_alert(current, thresholds));
        match cross {
            Some(direction) => candidates.extend(alerts::macd_cross_alert(current, direction)),
            None => candidates.extend(alerts::rsi_extreme_alert(current, thresholds)),
        }
        candidates.extend(alerts::volume_spike_alert(current, thresholds));

        Evaluation { signal, candidates }
    }

    /// Direction of a MACD/signal-line cross between two consecutive snapshots.
    ///
    /// The previous snapshot must belong to the same symbol and an earlier bar.
    pub fn detect_cross(
        current: &IndicatorSnapshot,
        previous: Option<&IndicatorSnapshot>,
    ) -> Option<CrossDirection> {
        let previous = previous.filter(|p| p.symbol == current.symbol && p.date < current.date)?;
        let before = previous.macd?.spread();
        let now = current.macd?.spread();

        if before <= 0.0 && now > 0.0 {
            Some(CrossDirection::Up)
        } else if before >= 0.0 && now < 0.0 {
            Some(CrossDirection::Down)
        } else {
            None
        }
    }

    /// Signal-change candidate for a freshly decided signal.
    pub fn signal_change(previous: Option<&Signal>, current: &Signal) -> Option<Alert> {
        alerts::signal_change_alert(previous, current)
    }
}

fn join_reasons(reasons: &[String]) -> String {
    let joined = reasons.join("; ");
    if joined.len() <= MAX_REASONING_LEN {
        return joined;
    }
    let mut cut = MAX_REASONING_LEN - 3;
    while !joined.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &joined[..cut])
}
