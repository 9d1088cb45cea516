//! Unit tests for price series ordering

use chrono::NaiveDate;
use stock_monitor::models::price::{PricePoint, PriceSeries};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

#[test]
fn test_from_log_last_correction_wins() {
    let series = PriceSeries::from_log(
        "MSFT",
        vec![
            PricePoint::flat("MSFT", day(2), 10.0, 100),
            PricePoint::flat("MSFT", day(3), 11.0, 100),
            PricePoint::flat("MSFT", day(3), 11.5, 120),
        ],
    );
    assert_eq!(series.len(), 2);
    assert_eq!(series.last().unwrap().close, 11.5);
    assert_eq!(series.last().unwrap().volume, 120);
}

#[test]
fn test_from_log_drops_out_of_order_entries() {
    let series = PriceSeries::from_log(
        "MSFT",
        vec![
            PricePoint::flat("MSFT", day(5), 10.0, 100),
            PricePoint::flat("MSFT", day(4), 9.0, 100),
            PricePoint::flat("MSFT", day(6), 11.0, 100),
        ],
    );
    let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![day(5), day(6)]);
}

#[test]
fn test_push_requires_later_date() {
    let mut series = PriceSeries::new("MSFT");
    assert!(series.push(PricePoint::flat("MSFT", day(2), 10.0, 1)).is_ok());
    // gaps are fine
    assert!(series.push(PricePoint::flat("MSFT", day(9), 10.0, 1)).is_ok());
    let rejected = series.push(PricePoint::flat("MSFT", day(9), 12.0, 1)).unwrap_err();
    assert_eq!(rejected.close, 12.0);
    assert!(series.push(PricePoint::flat("MSFT", day(3), 12.0, 1)).is_err());
    assert_eq!(series.len(), 2);
    assert_eq!(series.position_from(day(9)), 1);
    assert_eq!(series.position_from(day(4)), 1);
    assert_eq!(series.position_from(day(10)), 2);
}
