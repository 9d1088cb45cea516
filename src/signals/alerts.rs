//! Candidate alert derivation
//!
//! Candidates are raised here; whether they are delivered is decided by the
//! deduplicator.

use crate::config::SignalThresholds;
use crate::models::alert::{Alert, AlertKind, CrossDirection, Severity};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{RiskLevel, Signal, Verdict};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Candidates are stamped with the start of their bar's day; the orchestrator
/// restamps them with the delivery time once they fire.
fn bar_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn alert(snapshot: &IndicatorSnapshot, kind: AlertKind, severity: Severity, message: String) -> Alert {
    Alert {
        symbol: snapshot.symbol.clone(),
        kind,
        severity,
        message,
        date: snapshot.date,
        timestamp: bar_timestamp(snapshot.date),
    }
}

pub fn price_move_alert(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Option<Alert> {
    let change = snapshot.change_pct()?;
    if change.abs() <= thresholds.price_change_threshold_pct {
        return None;
    }
    let severity = if change.abs() >= thresholds.price_change_threshold_pct * 2.0 {
        Severity::Critical
    } else {
        Severity::Warning
    };
    let direction = if change > 0.0 { "up" } else { "down" };
    Some(alert(
        snapshot,
        AlertKind::PriceMove,
        severity,
        format!(
            "{} moved {} {:+.2}% to ${:.2} (previous ${:.2})",
            snapshot.symbol,
            direction,
            change,
            snapshot.close,
            snapshot.previous_close.unwrap_or_default()
        ),
    ))
}

pub fn rsi_extreme_alert(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Option<Alert> {
    let rsi = snapshot.rsi?;
    let message = if rsi <= thresholds.rsi_oversold {
        format!(
            "{} RSI oversold at {:.2} (<= {:.0}), possible rebound",
            snapshot.symbol, rsi, thresholds.rsi_oversold
        )
    } else if rsi >= thresholds.rsi_overbought {
        format!(
            "{} RSI overbought at {:.2} (>= {:.0}), pullback risk",
            snapshot.symbol, rsi, thresholds.rsi_overbought
        )
    } else {
        return None;
    };
    Some(alert(snapshot, AlertKind::RsiExtreme, Severity::Warning, message))
}

pub fn macd_cross_alert(snapshot: &IndicatorSnapshot, direction: CrossDirection) -> Option<Alert> {
    let macd = snapshot.macd?;
    let side = match direction {
        CrossDirection::Up => "above",
        CrossDirection::Down => "below",
    };
    Some(alert(
        snapshot,
        AlertKind::MacdCross(direction),
        Severity::Info,
        format!(
            "{} MACD line crossed {} its signal line (MACD={:.4}, signal={:.4})",
            snapshot.symbol, side, macd.line, macd.signal
        ),
    ))
}

pub fn volume_spike_alert(snapshot: &IndicatorSnapshot, thresholds: &SignalThresholds) -> Option<Alert> {
    let average = snapshot.volume_average?;
    if average <= 0.0 {
        return None;
    }
    let volume = snapshot.volume as f64;
    if volume <= thresholds.volume_spike_multiplier * average {
        return None;
    }
    Some(alert(
        snapshot,
        AlertKind::VolumeSpike,
        Severity::Info,
        format!(
            "{} volume {} is {:.1}x its average ({:.0})",
            snapshot.symbol,
            snapshot.volume,
            volume / average,
            average
        ),
    ))
}

/// Alert when an actionable verdict differs from the last recorded one.
pub fn signal_change_alert(previous: Option<&Signal>, current: &Signal) -> Option<Alert> {
    if !current.verdict.is_actionable() {
        return None;
    }
    let from = previous
        .filter(|p| p.symbol == current.symbol)
        .map(|p| p.verdict)
        .unwrap_or(Verdict::Hold);
    if from == current.verdict {
        return None;
    }
    let severity = if current.risk == RiskLevel::High {
        Severity::Critical
    } else {
        Severity::Warning
    };
    Some(Alert {
        symbol: current.symbol.clone(),
        kind: AlertKind::SignalChange,
        severity,
        message: format!(
            "{} signal changed {} -> {} (confidence {:.0}%, risk {})",
            current.symbol,
            from,
            current.verdict,
            current.confidence * 100.0,
            current.risk
        ),
        date: current.date,
        timestamp: bar_timestamp(current.date),
    })
}
