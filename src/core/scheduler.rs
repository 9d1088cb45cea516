//! Cron-based timers driving the pipeline stages

use crate::config::Config;
use crate::core::orchestrator::PipelineOrchestrator;
use crate::core::run_state::SymbolReport;
use crate::error::ConfigError;
use chrono::{NaiveDate, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Convert a fixed interval into a cron schedule.
///
/// Cron format: second minute hour day month weekday. The interval must land
/// on the cron grid: a divisor of a minute in seconds, of an hour in whole
/// minutes, of a day in whole hours, or exactly one day.
pub fn schedule_for_interval(interval_seconds: u64) -> Result<Schedule, ConfigError> {
    let off_grid = || {
        ConfigError::invalid(
            "interval",
            format!(
                "{}s does not divide a minute, an hour or a day evenly",
                interval_seconds
            ),
        )
    };
    let cron_expr = match interval_seconds {
        0 => return Err(ConfigError::invalid("interval", "must be > 0")),
        s if s < 60 && 60 % s == 0 => format!("*/{} * * * * *", s),
        s if s < 3600 && s % 60 == 0 && 60 % (s / 60) == 0 => format!("0 */{} * * * *", s / 60),
        s if s < 86_400 && s % 3600 == 0 && 24 % (s / 3600) == 0 => {
            format!("0 0 */{} * * *", s / 3600)
        }
        86_400 => "0 0 0 * * *".to_string(),
        _ => return Err(off_grid()),
    };
    Schedule::from_str(&cron_expr)
        .map_err(|e| ConfigError::invalid("interval", format!("invalid cron expression '{}': {}", cron_expr, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Ingest,
    Compute,
    /// Analyze then check alerts.
    Evaluate,
}

impl Timer {
    pub const ALL: [Timer; 3] = [Timer::Ingest, Timer::Compute, Timer::Evaluate];

    /// Configured interval between ticks of this timer.
    pub fn interval_seconds(&self, config: &Config) -> u64 {
        match self {
            Timer::Ingest => config.ingest_interval_seconds,
            Timer::Compute => config.compute_interval_seconds,
            Timer::Evaluate => config.evaluate_interval_seconds,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timer::Ingest => "ingest",
            Timer::Compute => "compute",
            Timer::Evaluate => "evaluate",
        }
    }
}

/// Runs the ingestion, computation and evaluation timers.
pub struct PipelineScheduler {
    orchestrator: Arc<PipelineOrchestrator>,
    timers: Vec<(Timer, Schedule)>,
    handles: Arc<RwLock<Vec<JoinHandle<()>>>>,
}

impl PipelineScheduler {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>) -> Result<Self, ConfigError> {
        let config = orchestrator.config();
        let timers = Timer::ALL
            .into_iter()
            .map(|timer| Ok((timer, schedule_for_interval(timer.interval_seconds(config))?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        info!(
            ingest = config.ingest_interval_seconds,
            compute = config.compute_interval_seconds,
            evaluate = config.evaluate_interval_seconds,
            symbols = ?config.symbols,
            "PipelineScheduler: created"
        );
        Ok(Self {
            orchestrator,
            timers,
            handles: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub async fn start(&self) {
        let mut handles = self.handles.write().await;
        if !handles.is_empty() {
            warn!("PipelineScheduler: already running");
            return;
        }
        for (timer, schedule) in &self.timers {
            let orchestrator = self.orchestrator.clone();
            let timer = *timer;
            let schedule = schedule.clone();
            handles.push(tokio::spawn(async move {
                info!(timer = timer.as_str(), "PipelineScheduler: timer started");
                loop {
                    let Some(next_tick) = schedule.upcoming(Utc).next() else {
                        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                        continue;
                    };
                    let now = Utc::now();
                    if next_tick > now {
                        tokio::time::sleep((next_tick - now).to_std().unwrap_or_default()).await;
                    }
                    tick(&orchestrator, timer, Utc::now().date_naive()).await;
                }
            }));
        }
        info!("PipelineScheduler: started");
    }

    pub async fn stop(&self) {
        let mut handles = self.handles.write().await;
        for handle in handles.drain(..) {
            handle.abort();
        }
        info!("PipelineScheduler: stopped");
    }
}

/// Run one tick of `timer` for every configured symbol as of `today`.
///
/// Returns `None` when the tick was skipped. An evaluate tick analyzes every
/// symbol before checking alerts and returns the alert-check reports.
pub async fn tick(
    orchestrator: &PipelineOrchestrator,
    timer: Timer,
    today: NaiveDate,
) -> Option<Vec<SymbolReport>> {
    let reports = match timer {
        Timer::Ingest => {
            let config = orchestrator.config();
            if config.skip_non_trading_days && !config.calendar.is_trading_day(today) {
                info!(date = %today, "PipelineScheduler: {} is not a trading day, skipping ingestion", today);
                return None;
            }
            orchestrator.refresh_all().await
        }
        Timer::Compute => orchestrator.calculate_all().await,
        Timer::Evaluate => {
            log_reports("analyze", &orchestrator.analyze_all().await);
            orchestrator.check_alerts_all().await
        }
    };
    log_reports(timer.as_str(), &reports);
    Some(reports)
}

fn log_reports(step: &str, reports: &[SymbolReport]) {
    let succeeded = reports.iter().filter(|r| r.status.is_success()).count();
    info!(
        step,
        succeeded,
        total = reports.len(),
        "PipelineScheduler: {} tick done ({}/{} ok)",
        step,
        succeeded,
        reports.len()
    );
}
