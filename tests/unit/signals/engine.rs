//! Unit tests for signal evaluation

use chrono::NaiveDate;
use stock_monitor::config::SignalThresholds;
use stock_monitor::models::alert::{AlertKind, CrossDirection, Severity};
use stock_monitor::models::indicators::{BollingerBands, IndicatorSnapshot, MacdIndicator};
use stock_monitor::models::signal::{RiskLevel, Signal, Verdict};
use stock_monitor::signals::engine::MAX_REASONING_LEN;
use stock_monitor::signals::SignalEngine;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
}

fn snapshot(d: u32, close: f64) -> IndicatorSnapshot {
    IndicatorSnapshot::new("AAPL".to_string(), date(d), close, 1_000)
}

fn macd(line: f64, signal: f64) -> MacdIndicator {
    MacdIndicator {
        line,
        signal,
        histogram: line - signal,
    }
}

fn signal(verdict: Verdict, risk: RiskLevel) -> Signal {
    Signal {
        symbol: "AAPL".to_string(),
        date: date(10),
        verdict,
        confidence: 0.5,
        risk,
        reasoning: String::new(),
    }
}

#[test]
fn test_macd_up_cross_is_buy_with_candidate() {
    let previous = snapshot(9, 100.0).with_macd(macd(-0.1, 0.0));
    let current = snapshot(10, 100.5)
        .with_previous_close(100.0)
        .with_macd(macd(0.2, 0.1))
        .with_rsi(50.0);

    let evaluation = SignalEngine::evaluate(&current, Some(&previous), &SignalThresholds::default());

    assert_eq!(evaluation.signal.verdict, Verdict::Buy);
    assert!(evaluation.signal.reasoning.contains("MACD crossed above"));
    let cross = evaluation
        .candidates
        .iter()
        .find(|a| a.kind == AlertKind::MacdCross(CrossDirection::Up))
        .expect("cross candidate");
    assert_eq!(cross.severity, Severity::Info);
    assert_eq!(cross.date, date(10));
    // histogram agrees, RSI neutral, no bands
    assert!((evaluation.signal.confidence - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_macd_down_cross_is_sell() {
    let previous = snapshot(9, 100.0).with_macd(macd(0.3, 0.1));
    let current = snapshot(10, 99.8)
        .with_previous_close(100.0)
        .with_macd(macd(0.05, 0.1));

    let evaluation = SignalEngine::evaluate(&current, Some(&previous), &SignalThresholds::default());

    assert_eq!(evaluation.signal.verdict, Verdict::Sell);
    assert!(evaluation
        .candidates
        .iter()
        .any(|a| a.kind == AlertKind::MacdCross(CrossDirection::Down)));
}

#[test]
fn test_touching_zero_counts_as_cross() {
    let previous = snapshot(9, 100.0).with_macd(macd(0.1, 0.1));
    let current = snapshot(10, 100.0).with_macd(macd(0.2, 0.1));
    assert_eq!(
        SignalEngine::detect_cross(&current, Some(&previous)),
        Some(CrossDirection::Up)
    );
}

#[test]
fn test_cross_requires_earlier_snapshot_of_same_symbol() {
    let current = snapshot(10, 100.0).with_macd(macd(0.2, 0.1));

    let same_day = snapshot(10, 100.0).with_macd(macd(-0.2, 0.1));
    assert_eq!(SignalEngine::detect_cross(&current, Some(&same_day)), None);

    let mut other = snapshot(9, 100.0).with_macd(macd(-0.2, 0.1));
    other.symbol = "MSFT".to_string();
    assert_eq!(SignalEngine::detect_cross(&current, Some(&other)), None);

    let without_macd = snapshot(9, 100.0);
    assert_eq!(SignalEngine::detect_cross(&current, Some(&without_macd)), None);
    assert_eq!(SignalEngine::detect_cross(&current, None), None);
}

#[test]
fn test_cross_takes_precedence_over_rsi() {
    let previous = snapshot(9, 100.0).with_macd(macd(-0.1, 0.0));
    let current = snapshot(10, 100.0).with_macd(macd(0.2, 0.1)).with_rsi(85.0);

    let evaluation = SignalEngine::evaluate(&current, Some(&previous), &SignalThresholds::default());
    assert_eq!(evaluation.signal.verdict, Verdict::Buy);
    // the cross decided the verdict, so no overbought warning rides along
    assert!(!evaluation.candidates.iter().any(|a| a.kind == AlertKind::RsiExtreme));
    assert!(evaluation
        .candidates
        .iter()
        .any(|a| a.kind == AlertKind::MacdCross(CrossDirection::Up)));
}

#[test]
fn test_rsi_oversold_is_buy() {
    let current = snapshot(10, 100.0).with_rsi(25.0);
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());

    assert_eq!(evaluation.signal.verdict, Verdict::Buy);
    assert!((evaluation.signal.confidence - 1.0 / 3.0).abs() < 1e-12);
    let rsi = evaluation
        .candidates
        .iter()
        .find(|a| a.kind == AlertKind::RsiExtreme)
        .expect("rsi candidate");
    assert_eq!(rsi.severity, Severity::Warning);
}

#[test]
fn test_rsi_overbought_is_sell_with_full_support() {
    let current = snapshot(10, 120.0)
        .with_rsi(75.0)
        .with_macd(macd(0.1, 0.3))
        .with_bollinger(BollingerBands {
            upper: 115.0,
            middle: 110.0,
            lower: 105.0,
        });
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());

    assert_eq!(evaluation.signal.verdict, Verdict::Sell);
    assert!((evaluation.signal.confidence - 1.0).abs() < 1e-12);
}

#[test]
fn test_rsi_boundaries_are_inclusive() {
    let thresholds = SignalThresholds::default();
    let at_oversold = SignalEngine::evaluate(&snapshot(10, 100.0).with_rsi(30.0), None, &thresholds);
    assert_eq!(at_oversold.signal.verdict, Verdict::Buy);
    let at_overbought = SignalEngine::evaluate(&snapshot(10, 100.0).with_rsi(70.0), None, &thresholds);
    assert_eq!(at_overbought.signal.verdict, Verdict::Sell);
}

#[test]
fn test_neutral_is_hold_with_zero_confidence() {
    let current = snapshot(10, 100.0).with_rsi(50.0);
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());

    assert_eq!(evaluation.signal.verdict, Verdict::Hold);
    assert_eq!(evaluation.signal.confidence, 0.0);
    assert_eq!(evaluation.signal.risk, RiskLevel::Low);
    assert!(evaluation.candidates.is_empty());
}

#[test]
fn test_large_move_is_high_risk_and_critical() {
    let current = snapshot(10, 105.0).with_previous_close(100.0);
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());

    assert_eq!(evaluation.signal.risk, RiskLevel::High);
    let alert = evaluation
        .candidates
        .iter()
        .find(|a| a.kind == AlertKind::PriceMove)
        .expect("price candidate");
    assert_eq!(alert.severity, Severity::Critical);
}

#[test]
fn test_moderate_move_is_warning() {
    let current = snapshot(10, 97.0).with_previous_close(100.0);
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());
    let alert = evaluation
        .candidates
        .iter()
        .find(|a| a.kind == AlertKind::PriceMove)
        .expect("price candidate");
    assert_eq!(alert.severity, Severity::Warning);
    assert!(alert.message.contains("down"));
}

#[test]
fn test_move_at_threshold_is_not_an_alert() {
    let current = snapshot(10, 125.0).with_previous_close(100.0);
    let thresholds = SignalThresholds {
        price_change_threshold_pct: 25.0,
        ..SignalThresholds::default()
    };
    let evaluation = SignalEngine::evaluate(&current, None, &thresholds);
    assert!(evaluation.candidates.iter().all(|a| a.kind != AlertKind::PriceMove));
    assert_ne!(evaluation.signal.risk, RiskLevel::High);
}

#[test]
fn test_wide_bands_are_medium_risk() {
    let current = snapshot(10, 100.0).with_bollinger(BollingerBands {
        upper: 110.0,
        middle: 100.0,
        lower: 90.0,
    });
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());
    assert_eq!(evaluation.signal.risk, RiskLevel::Medium);
}

#[test]
fn test_volume_spike_candidate() {
    let mut current = snapshot(10, 100.0).with_volume_average(100.0);
    current.volume = 250;
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());
    let spike = evaluation
        .candidates
        .iter()
        .find(|a| a.kind == AlertKind::VolumeSpike)
        .expect("volume candidate");
    assert_eq!(spike.severity, Severity::Info);

    current.volume = 200;
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());
    assert!(evaluation.candidates.iter().all(|a| a.kind != AlertKind::VolumeSpike));
}

#[test]
fn test_signal_change_candidates() {
    let buy = signal(Verdict::Buy, RiskLevel::Low);
    let alert = SignalEngine::signal_change(None, &buy).expect("first actionable signal");
    assert_eq!(alert.kind, AlertKind::SignalChange);
    assert_eq!(alert.severity, Severity::Warning);

    assert!(SignalEngine::signal_change(Some(&buy), &buy).is_none());

    let risky_sell = signal(Verdict::Sell, RiskLevel::High);
    let alert = SignalEngine::signal_change(Some(&buy), &risky_sell).unwrap();
    assert_eq!(alert.severity, Severity::Critical);

    let hold = signal(Verdict::Hold, RiskLevel::Low);
    assert!(SignalEngine::signal_change(Some(&buy), &hold).is_none());
}

#[test]
fn test_reasoning_is_capped() {
    let current = snapshot(10, 130.0)
        .with_previous_close(100.0)
        .with_rsi(95.0)
        .with_bollinger(BollingerBands {
            upper: 120.0,
            middle: 100.0,
            lower: 80.0,
        });
    let evaluation = SignalEngine::evaluate(&current, None, &SignalThresholds::default());
    assert!(!evaluation.signal.reasoning.is_empty());
    assert!(evaluation.signal.reasoning.len() <= MAX_REASONING_LEN);
}
