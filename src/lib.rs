//! Daily-bar stock monitor: indicators, rule-based signals and deduplicated alerts.

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod dedup;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use config::Config;
pub use crate::core::{PipelineOrchestrator, PipelineScheduler, SymbolReport, SymbolStatus};
pub use error::PipelineError;
