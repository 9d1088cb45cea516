//! Unit tests for Bollinger Bands

use stock_monitor::indicators::volatility::{
    calculate_bollinger_bands, calculate_bollinger_bands_default,
};

#[test]
fn test_bollinger_insufficient_data() {
    let closes = vec![100.0; 19];
    assert!(calculate_bollinger_bands_default(&closes).is_none());
}

#[test]
fn test_bollinger_flat_series_collapses() {
    let closes = vec![10.0; 20];
    let bands = calculate_bollinger_bands_default(&closes).unwrap();
    assert_eq!(bands.upper, 10.0);
    assert_eq!(bands.middle, 10.0);
    assert_eq!(bands.lower, 10.0);
    assert_eq!(bands.width(), Some(0.0));
}

#[test]
fn test_bollinger_uses_sample_deviation() {
    let closes: Vec<f64> = (1..=20).map(f64::from).collect();
    let bands = calculate_bollinger_bands(&closes, 20, 2.0).unwrap();
    // sample variance of 1..=20 is 35
    let std = 35.0f64.sqrt();
    assert!((bands.middle - 10.5).abs() < 1e-12);
    assert!((bands.upper - (10.5 + 2.0 * std)).abs() < 1e-9);
    assert!((bands.lower - (10.5 - 2.0 * std)).abs() < 1e-9);
}
