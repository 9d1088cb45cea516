//! Unit tests for interval to cron conversion

use chrono::Utc;
use stock_monitor::core::scheduler::schedule_for_interval;

fn tick_gap(interval: u64) -> i64 {
    let schedule = schedule_for_interval(interval).unwrap();
    let ticks: Vec<_> = schedule.upcoming(Utc).take(2).collect();
    (ticks[1] - ticks[0]).num_seconds()
}

#[test]
fn test_zero_interval_is_rejected() {
    assert!(schedule_for_interval(0).is_err());
}

#[test]
fn test_second_minute_and_hour_intervals() {
    assert_eq!(tick_gap(30), 30);
    assert_eq!(tick_gap(60), 60);
    assert_eq!(tick_gap(300), 300);
    assert_eq!(tick_gap(900), 900);
    assert_eq!(tick_gap(7200), 7200);
}

#[test]
fn test_daily_interval() {
    assert_eq!(tick_gap(86_400), 86_400);
}

#[test]
fn test_off_grid_intervals_are_rejected() {
    // would otherwise be rounded to a coarser or uneven cron step
    for interval in [7, 90, 420, 5400, 18_000, 172_800] {
        assert!(schedule_for_interval(interval).is_err(), "{}s accepted", interval);
    }
}
