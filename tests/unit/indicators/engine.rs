//! Unit tests for indicator snapshot computation

use chrono::NaiveDate;
use stock_monitor::indicators::{IndicatorConfig, IndicatorEngine};
use stock_monitor::models::price::{PricePoint, PriceSeries};

fn create_series(count: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    PriceSeries::from_log(
        "AAPL",
        (0..count).map(|i| {
            let close = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1;
            PricePoint::flat("AAPL", start + chrono::Duration::days(i as i64), close, 1_000 + i as u64)
        }),
    )
}

#[test]
fn test_short_series_marks_fields_insufficient() {
    let series = create_series(10);
    let snapshot = IndicatorEngine::compute_latest(&series, &IndicatorConfig::default()).unwrap();

    assert!(snapshot.moving_average(5).is_some());
    assert!(snapshot.moving_average(10).is_some());
    assert!(snapshot.moving_average(20).is_none());
    assert!(snapshot.moving_average(200).is_none());
    assert!(snapshot.rsi.is_none());
    assert!(snapshot.macd.is_none());
    assert!(snapshot.bollinger.is_none());
    assert!(snapshot.volume_average.is_none());
    assert!(snapshot.previous_close.is_some());
    assert!(snapshot.has_any_indicator());
}

#[test]
fn test_full_series_fills_every_field() {
    let config = IndicatorConfig::default();
    let series = create_series(config.warmup_bars());
    let snapshot = IndicatorEngine::compute_latest(&series, &config).unwrap();

    for window in &config.ma_windows {
        assert!(snapshot.moving_average(*window).is_some(), "MA{} missing", window);
    }
    assert!(snapshot.rsi.is_some());
    assert!(snapshot.macd.is_some());
    assert!(snapshot.bollinger.is_some());
    assert!(snapshot.volume_average.is_some());
}

#[test]
fn test_compute_reads_only_prefix() {
    let config = IndicatorConfig::default();
    let long = create_series(80);
    let short = create_series(50);

    let from_long = IndicatorEngine::compute(&long, 49, &config).unwrap();
    let from_short = IndicatorEngine::compute_latest(&short, &config).unwrap();
    assert_eq!(from_long, from_short);
}

#[test]
fn test_compute_is_deterministic() {
    let config = IndicatorConfig::default();
    let series = create_series(120);
    let first = IndicatorEngine::compute_latest(&series, &config).unwrap();
    let second = IndicatorEngine::compute_latest(&series, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compute_out_of_range() {
    let series = create_series(5);
    assert!(IndicatorEngine::compute(&series, 5, &IndicatorConfig::default()).is_none());
    assert!(IndicatorEngine::compute_latest(&PriceSeries::new("AAPL"), &IndicatorConfig::default()).is_none());
}

#[test]
fn test_warmup_bars_defaults() {
    assert_eq!(IndicatorConfig::default().warmup_bars(), 200);
    let config = IndicatorConfig {
        ma_windows: vec![5, 10, 20],
        ..IndicatorConfig::default()
    };
    assert_eq!(config.warmup_bars(), 35);
}
