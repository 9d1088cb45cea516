//! Per-symbol run bookkeeping
//!
//! Each symbol moves `Idle -> Ingesting -> Computing -> Deciding -> Notifying
//! -> Idle`. A failure parks it in `Failed(stage)` until the next trigger
//! starts a new run. Only one run per symbol is in flight at a time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingesting,
    Computing,
    Deciding,
    Notifying,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingesting => "ingesting",
            Stage::Computing => "computing",
            Stage::Deciding => "deciding",
            Stage::Notifying => "notifying",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PipelineStage {
    #[default]
    Idle,
    Running(Stage),
    Failed(Stage),
}

/// Outcome of one symbol's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolStatus {
    Success,
    InsufficientData { reason: String },
    /// Another run for the symbol was already in flight.
    Skipped,
    Failed { stage: Stage, reason: String },
}

impl SymbolStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SymbolStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SymbolStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub status: SymbolStatus,
}

impl SymbolReport {
    pub fn new(symbol: impl Into<String>, status: SymbolStatus) -> Self {
        Self {
            symbol: symbol.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub stage: PipelineStage,
    pub in_flight: bool,
    pub last_result: Option<SymbolStatus>,
    pub last_finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct RunStates {
    states: Mutex<HashMap<String, RunState>>,
}

impl RunStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the symbol for a run starting at `stage`.
    ///
    /// Returns `None` when a run for the symbol is already in flight.
    pub fn try_begin(&self, symbol: &str, stage: Stage) -> Option<RunGuard<'_>> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(symbol.to_string()).or_default();
        if state.in_flight {
            return None;
        }
        state.in_flight = true;
        state.stage = PipelineStage::Running(stage);
        Some(RunGuard {
            states: self,
            symbol: symbol.to_string(),
            finished: false,
        })
    }

    pub fn get(&self, symbol: &str) -> RunState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(symbol).cloned().unwrap_or_default()
    }

    fn update(&self, symbol: &str, apply: impl FnOnce(&mut RunState)) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        apply(states.entry(symbol.to_string()).or_default());
    }
}

/// Holds a symbol's in-flight flag for the duration of a run.
pub struct RunGuard<'a> {
    states: &'a RunStates,
    symbol: String,
    finished: bool,
}

impl RunGuard<'_> {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn advance(&self, stage: Stage) {
        self.states
            .update(&self.symbol, |state| state.stage = PipelineStage::Running(stage));
    }

    pub fn finish(mut self, status: &SymbolStatus) {
        let stage = match status {
            SymbolStatus::Failed { stage, .. } => PipelineStage::Failed(*stage),
            _ => PipelineStage::Idle,
        };
        self.states.update(&self.symbol, |state| {
            state.stage = stage;
            state.in_flight = false;
            state.last_result = Some(status.clone());
            state.last_finished_at = Some(Utc::now());
        });
        self.finished = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // run was cancelled mid-stage
            self.states.update(&self.symbol, |state| {
                state.stage = PipelineStage::Idle;
                state.in_flight = false;
            });
        }
    }
}
