//! Unit tests for shared numeric helpers

use stock_monitor::common::math::{ema, ema_multiplier, ema_series, sma, standard_deviation};

#[test]
fn test_sma_uses_last_values() {
    assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), Some(4.0));
}

#[test]
fn test_sma_insufficient_data() {
    assert!(sma(&[1.0, 2.0], 3).is_none());
    assert!(sma(&[1.0, 2.0], 0).is_none());
}

#[test]
fn test_ema_series_seeded_by_sma() {
    let series = ema_series(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert_eq!(series[0], None);
    assert_eq!(series[1], None);
    assert_eq!(series[2], Some(2.0));
    // k = 0.5
    assert_eq!(series[3], Some(3.0));
    assert_eq!(series[4], Some(4.0));
    assert_eq!(ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), Some(4.0));
}

#[test]
fn test_ema_multiplier() {
    assert!((ema_multiplier(9) - 0.2).abs() < 1e-12);
}

#[test]
fn test_sample_standard_deviation() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let std = standard_deviation(&values, 8).unwrap();
    assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    assert!(standard_deviation(&values, 9).is_none());
}
