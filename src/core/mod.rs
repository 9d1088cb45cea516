//! Pipeline runtime: orchestration, scheduling and run bookkeeping

pub mod calendar;
pub mod orchestrator;
pub mod retry;
pub mod run_state;
pub mod scheduler;

pub use calendar::TradingCalendar;
pub use orchestrator::PipelineOrchestrator;
pub use retry::RetryPolicy;
pub use run_state::{PipelineStage, RunState, RunStates, Stage, SymbolReport, SymbolStatus};
pub use scheduler::PipelineScheduler;
