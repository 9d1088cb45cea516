//! Unit tests for per-symbol run bookkeeping

use stock_monitor::core::run_state::{PipelineStage, RunStates, Stage, SymbolStatus};

#[test]
fn test_second_run_is_refused_while_in_flight() {
    let runs = RunStates::new();
    let guard = runs.try_begin("AAPL", Stage::Ingesting).expect("idle symbol");
    assert!(runs.try_begin("AAPL", Stage::Computing).is_none());
    assert!(runs.try_begin("MSFT", Stage::Computing).is_some());

    guard.finish(&SymbolStatus::Success);
    assert!(runs.try_begin("AAPL", Stage::Computing).is_some());
}

#[test]
fn test_stage_transitions() {
    let runs = RunStates::new();
    let guard = runs.try_begin("AAPL", Stage::Ingesting).unwrap();
    assert_eq!(runs.get("AAPL").stage, PipelineStage::Running(Stage::Ingesting));
    assert!(runs.get("AAPL").in_flight);

    guard.advance(Stage::Computing);
    assert_eq!(runs.get("AAPL").stage, PipelineStage::Running(Stage::Computing));

    guard.finish(&SymbolStatus::Success);
    let state = runs.get("AAPL");
    assert_eq!(state.stage, PipelineStage::Idle);
    assert!(!state.in_flight);
    assert_eq!(state.last_result, Some(SymbolStatus::Success));
}

#[test]
fn test_failure_is_recorded_until_next_run() {
    let runs = RunStates::new();
    let guard = runs.try_begin("AAPL", Stage::Ingesting).unwrap();
    guard.finish(&SymbolStatus::Failed {
        stage: Stage::Ingesting,
        reason: "rate limited".to_string(),
    });
    assert_eq!(runs.get("AAPL").stage, PipelineStage::Failed(Stage::Ingesting));

    let _next = runs.try_begin("AAPL", Stage::Ingesting).expect("failed symbol can run again");
    assert_eq!(runs.get("AAPL").stage, PipelineStage::Running(Stage::Ingesting));
}

#[test]
fn test_dropped_guard_releases_symbol() {
    let runs = RunStates::new();
    drop(runs.try_begin("AAPL", Stage::Notifying).unwrap());
    assert!(!runs.get("AAPL").in_flight);
    assert_eq!(runs.get("AAPL").stage, PipelineStage::Idle);
}
