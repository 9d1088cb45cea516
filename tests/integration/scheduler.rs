//! Scheduler ticks driving the orchestrator

use crate::test_utils::{bars, crossing_closes, test_config, Script, TestPipeline};
use chrono::NaiveDate;
use std::sync::Arc;
use stock_monitor::core::run_state::SymbolStatus;
use stock_monitor::core::scheduler::{tick, Timer};
use stock_monitor::core::PipelineScheduler;
use stock_monitor::models::alert::{AlertKind, CrossDirection};

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, d).unwrap()
}

#[test]
fn each_timer_reads_its_own_interval() {
    let mut config = test_config(&["AAA"]);
    config.ingest_interval_seconds = 30;
    config.compute_interval_seconds = 600;
    config.evaluate_interval_seconds = 3600;

    let intervals: Vec<u64> = Timer::ALL.iter().map(|t| t.interval_seconds(&config)).collect();
    assert_eq!(intervals, vec![30, 600, 3600]);
}

#[test]
fn scheduler_rejects_off_grid_evaluate_interval() {
    let mut config = test_config(&["AAA"]);
    config.evaluate_interval_seconds = 5400;
    let pipeline = TestPipeline::new(config);

    assert!(PipelineScheduler::new(Arc::new(pipeline.orchestrator)).is_err());
}

#[tokio::test]
async fn ingest_tick_skips_non_trading_days() {
    let mut config = test_config(&["AAA"]);
    config.skip_non_trading_days = true;
    let pipeline = TestPipeline::new(config);
    pipeline.provider.set("AAA", Script::Bars(bars("AAA", &[10.0, 11.0])));

    // Saturday, then Christmas
    assert!(tick(&pipeline.orchestrator, Timer::Ingest, day(3, 7)).await.is_none());
    assert!(tick(&pipeline.orchestrator, Timer::Ingest, day(12, 25)).await.is_none());
    assert_eq!(pipeline.provider.calls("AAA"), 0);

    let reports = tick(&pipeline.orchestrator, Timer::Ingest, day(3, 9)).await.unwrap();
    assert_eq!(reports[0].status, SymbolStatus::Success);
    assert_eq!(pipeline.provider.calls("AAA"), 1);
}

#[tokio::test]
async fn ingest_tick_runs_on_weekends_when_not_skipping() {
    let pipeline = TestPipeline::new(test_config(&["AAA"]));
    pipeline.provider.set("AAA", Script::Bars(bars("AAA", &[10.0, 11.0])));

    assert!(tick(&pipeline.orchestrator, Timer::Ingest, day(3, 7)).await.is_some());
    assert_eq!(pipeline.provider.calls("AAA"), 1);
}

#[tokio::test]
async fn timers_in_sequence_deliver_alerts() {
    let pipeline = TestPipeline::new(test_config(&["AAA", "BBB"]));
    pipeline.provider.set("AAA", Script::Bars(bars("AAA", &crossing_closes())));
    pipeline.provider.set("BBB", Script::Bars(bars("BBB", &crossing_closes())));
    let today = day(3, 9);

    tick(&pipeline.orchestrator, Timer::Ingest, today).await.unwrap();
    tick(&pipeline.orchestrator, Timer::Compute, today).await.unwrap();
    // analyze runs before the alert check within one evaluate tick
    let reports = tick(&pipeline.orchestrator, Timer::Evaluate, today).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.status == SymbolStatus::Success));
    let cross = AlertKind::MacdCross(CrossDirection::Up);
    for symbol in ["AAA", "BBB"] {
        assert!(pipeline
            .sink
            .delivered()
            .iter()
            .any(|a| a.symbol == symbol && a.kind == cross));
    }
}

#[tokio::test]
async fn evaluate_tick_before_compute_reports_insufficient_data() {
    let pipeline = TestPipeline::new(test_config(&["AAA"]));

    let reports = tick(&pipeline.orchestrator, Timer::Evaluate, day(3, 9)).await.unwrap();

    assert!(matches!(reports[0].status, SymbolStatus::InsufficientData { .. }));
    assert!(pipeline.sink.delivered().is_empty());
}
