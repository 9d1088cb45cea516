//! Pipeline orchestration: ingest, compute, decide and notify per symbol
//!
//! Every public operation processes one symbol (or all configured symbols
//! concurrently) and reports a status per symbol instead of failing the batch.

use crate::config::Config;
use crate::core::retry::{fetch_with_retry, RetryPolicy};
use crate::core::run_state::{RunStates, Stage, SymbolReport, SymbolStatus};
use crate::db::RecordStore;
use crate::dedup::AlertDeduplicator;
use crate::error::{DeliveryError, PipelineError};
use crate::indicators::IndicatorEngine;
use crate::metrics::Metrics;
use crate::models::alert::{Alert, AlertKind, DedupKey};
use crate::models::price::PricePoint;
use crate::services::market_data::MarketDataProvider;
use crate::services::notifications::NotificationSink;
use crate::signals::{AlertBacklog, DecisionBook, SignalEngine, SnapshotBook};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const FULL_RUN: [Stage; 4] = [
    Stage::Ingesting,
    Stage::Computing,
    Stage::Deciding,
    Stage::Notifying,
];

/// How a stage ended when it did not fail.
enum StageOutcome {
    Done,
    /// Stage produced a result with some indicators still warming up.
    Partial(String),
}

pub struct PipelineOrchestrator {
    config: Arc<Config>,
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn NotificationSink>,
    dedup: AlertDeduplicator,
    snapshots: SnapshotBook,
    decisions: DecisionBook,
    backlog: AlertBacklog,
    runs: RunStates,
    retry: RetryPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineOrchestrator {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn RecordStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let retry = RetryPolicy::new(config.fetch_retry_attempts, config.fetch_retry_delay);
        // one fetch never returns more than the lookback, so a backlog fits
        let history = config.lookback_bars;
        Self {
            dedup: AlertDeduplicator::new(config.cooldowns),
            config,
            provider,
            store,
            sink,
            snapshots: SnapshotBook::with_capacity(history),
            decisions: DecisionBook::new(),
            backlog: AlertBacklog::new(),
            runs: RunStates::new(),
            retry,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dedup(&self) -> &AlertDeduplicator {
        &self.dedup
    }

    pub fn snapshots(&self) -> &SnapshotBook {
        &self.snapshots
    }

    pub fn decisions(&self) -> &DecisionBook {
        &self.decisions
    }

    pub fn run_states(&self) -> &RunStates {
        &self.runs
    }

    pub async fn refresh(&self, symbol: &str) -> SymbolReport {
        self.run(symbol, &[Stage::Ingesting], Utc::now()).await
    }

    pub async fn calculate(&self, symbol: &str) -> SymbolReport {
        self.run(symbol, &[Stage::Computing], Utc::now()).await
    }

    pub async fn analyze(&self, symbol: &str) -> SymbolReport {
        self.run(symbol, &[Stage::Deciding], Utc::now()).await
    }

    pub async fn check_alerts(&self, symbol: &str) -> SymbolReport {
        self.check_alerts_at(symbol, Utc::now()).await
    }

    /// Deliver the symbol's pending candidate alerts as of `now`.
    pub async fn check_alerts_at(&self, symbol: &str, now: DateTime<Utc>) -> SymbolReport {
        self.run(symbol, &[Stage::Notifying], now).await
    }

    /// Ingest, compute, decide and notify for one symbol in a single run.
    pub async fn run_pipeline(&self, symbol: &str) -> SymbolReport {
        self.run(symbol, &FULL_RUN, Utc::now()).await
    }

    pub async fn refresh_all(&self) -> Vec<SymbolReport> {
        self.for_all_symbols(|symbol| self.refresh(symbol)).await
    }

    pub async fn calculate_all(&self) -> Vec<SymbolReport> {
        self.for_all_symbols(|symbol| self.calculate(symbol)).await
    }

    pub async fn analyze_all(&self) -> Vec<SymbolReport> {
        self.for_all_symbols(|symbol| self.analyze(symbol)).await
    }

    pub async fn check_alerts_all(&self) -> Vec<SymbolReport> {
        let now = Utc::now();
        self.for_all_symbols(|symbol| self.check_alerts_at(symbol, now))
            .await
    }

    pub async fn run_pipeline_all(&self) -> Vec<SymbolReport> {
        self.for_all_symbols(|symbol| self.run_pipeline(symbol)).await
    }

    /// Seed cooldown clocks from alerts recorded by earlier processes.
    ///
    /// Store errors are logged and skipped; returns how many keys were restored.
    pub async fn restore_dedup_state(&self) -> usize {
        let mut restored = 0;
        for symbol in &self.config.symbols {
            for kind in AlertKind::ALL {
                let key = DedupKey::new(symbol.as_str(), kind);
                match self.store.read_last_fired(&key).await {
                    Ok(Some(fired_at)) => {
                        self.dedup.restore(key, fired_at);
                        restored += 1;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(key = %key, error = %e, "failed to restore dedup state");
                    }
                }
            }
        }
        info!(restored, "restored {} dedup keys from the record store", restored);
        restored
    }

    async fn for_all_symbols<'a, F, Fut>(&'a self, op: F) -> Vec<SymbolReport>
    where
        F: Fn(&'a str) -> Fut,
        Fut: Future<Output = SymbolReport>,
    {
        let reports = join_all(self.config.symbols.iter().map(|s| op(s.as_str()))).await;
        let failed = reports.iter().filter(|r| r.status.is_failed()).count();
        if failed > 0 {
            warn!(
                symbols = reports.len(),
                failed,
                "batch finished with {} failed symbol(s)",
                failed
            );
        } else {
            debug!(symbols = reports.len(), "batch finished");
        }
        reports
    }

    async fn run(&self, symbol: &str, stages: &[Stage], now: DateTime<Utc>) -> SymbolReport {
        let Some(first) = stages.first().copied() else {
            return SymbolReport::new(symbol, SymbolStatus::Success);
        };
        let Some(guard) = self.runs.try_begin(symbol, first) else {
            info!(symbol = %symbol, stage = %first, "run already in flight, skipping");
            if let Some(ref metrics) = self.metrics {
                metrics.runs_skipped_total.inc();
            }
            return SymbolReport::new(symbol, SymbolStatus::Skipped);
        };

        let start = Instant::now();
        let mut status = SymbolStatus::Success;
        for &stage in stages {
            guard.advance(stage);
            match self.execute(stage, symbol, now).await {
                Ok(StageOutcome::Done) => {}
                Ok(StageOutcome::Partial(reason)) => {
                    status = SymbolStatus::InsufficientData { reason };
                }
                Err(PipelineError::InsufficientData { reason, .. }) => {
                    info!(symbol = %symbol, stage = %stage, "insufficient data: {}", reason);
                    status = SymbolStatus::InsufficientData { reason };
                    break;
                }
                Err(e) => {
                    error!(symbol = %symbol, stage = %stage, error = %e, "stage failed for {}", symbol);
                    if let Some(ref metrics) = self.metrics {
                        metrics
                            .stage_failures_total
                            .with_label_values(&[stage.as_str()])
                            .inc();
                    }
                    status = SymbolStatus::Failed {
                        stage,
                        reason: e.to_string(),
                    };
                    break;
                }
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics
                .pipeline_run_duration_seconds
                .observe(start.elapsed().as_secs_f64());
        }
        guard.finish(&status);
        SymbolReport::new(symbol, status)
    }

    async fn execute(
        &self,
        stage: Stage,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<StageOutcome, PipelineError> {
        match stage {
            Stage::Ingesting => self.ingest(symbol).await,
            Stage::Computing => self.compute(symbol).await,
            Stage::Deciding => self.decide(symbol).await,
            Stage::Notifying => self.notify(symbol, now).await,
        }
    }

    async fn ingest(&self, symbol: &str) -> Result<StageOutcome, PipelineError> {
        let mut bars = fetch_with_retry(
            self.provider.as_ref(),
            symbol,
            self.config.lookback_bars,
            &self.retry,
        )
        .await?;

        for bar in bars.iter_mut() {
            bar.symbol = symbol.to_string();
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(PipelineError::DataOrderingViolation {
                symbol: symbol.to_string(),
                date: pair[1].date,
                last: pair[0].date,
            });
        }

        let Some(first) = bars.first() else {
            debug!(symbol = %symbol, provider = self.provider.name(), "provider returned no bars");
            return Ok(StageOutcome::Done);
        };
        let stored = self.store.read_series(symbol, Some(first.date)).await?;
        let tail: Option<&PricePoint> = stored.last();

        let mut appended = 0u64;
        for bar in &bars {
            let is_new = match tail {
                None => true,
                Some(tail) if bar.date > tail.date => true,
                // correction of the latest stored bar
                Some(tail) if bar.date == tail.date => bar != tail,
                Some(_) => false,
            };
            if is_new {
                self.store.append_bar(bar).await?;
                appended += 1;
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics.bars_ingested_total.inc_by(appended);
        }
        info!(
            symbol = %symbol,
            fetched = bars.len(),
            appended,
            "ingested {} new bar(s) for {}",
            appended,
            symbol
        );
        Ok(StageOutcome::Done)
    }

    /// Compute one snapshot per bar from the last computed bar onward.
    ///
    /// The last computed bar is recomputed so a corrected close flows through.
    /// A symbol's first computation covers only its latest bar; the bar
    /// before it is kept in the book as cross context but not recorded.
    async fn compute(&self, symbol: &str) -> Result<StageOutcome, PipelineError> {
        let series = self.store.read_series(symbol, None).await?;
        let indicators = &self.config.indicators;
        if series.is_empty() {
            return Err(PipelineError::InsufficientData {
                symbol: symbol.to_string(),
                reason: "no bars stored".to_string(),
            });
        }

        let last = series.len() - 1;
        let start = match self.snapshots.latest(symbol) {
            Some(computed) => series.position_from(computed.date),
            None => {
                if let Some(context) = last
                    .checked_sub(1)
                    .and_then(|idx| IndicatorEngine::compute(&series, idx, indicators))
                {
                    self.snapshots.insert(symbol, context);
                }
                last
            }
        };

        let mut computed = 0usize;
        for idx in start..=last {
            let Some(snapshot) = IndicatorEngine::compute(&series, idx, indicators) else {
                continue;
            };
            if self.snapshots.latest(symbol).as_ref() == Some(&snapshot) {
                debug!(symbol = %symbol, date = %snapshot.date, "indicator snapshot unchanged");
                continue;
            }
            self.store.append_indicator_snapshot(&snapshot).await?;
            debug!(
                symbol = %symbol,
                date = %snapshot.date,
                rsi = ?snapshot.rsi,
                "computed indicator snapshot for {}",
                symbol
            );
            self.snapshots.insert(symbol, snapshot);
            computed += 1;
        }
        if computed > 1 {
            info!(symbol = %symbol, computed, "caught up {} indicator snapshots for {}", computed, symbol);
        }

        let warmup = indicators.warmup_bars();
        if series.len() < warmup {
            return Ok(StageOutcome::Partial(format!(
                "{} of {} bars needed for every indicator",
                series.len(),
                warmup
            )));
        }
        Ok(StageOutcome::Done)
    }

    /// Decide every snapshot from the last decided bar onward, oldest first.
    ///
    /// Candidates of bars superseded within the same run go to the backlog;
    /// the latest evaluation keeps its own.
    async fn decide(&self, symbol: &str) -> Result<StageOutcome, PipelineError> {
        let pending = match self.decisions.latest(symbol) {
            Some(decided) => self.snapshots.since(symbol, decided.signal.date),
            None => self.snapshots.latest(symbol).into_iter().collect(),
        };
        if pending.is_empty() {
            return Err(PipelineError::InsufficientData {
                symbol: symbol.to_string(),
                reason: "no indicator snapshot computed".to_string(),
            });
        }
        let thresholds = self.config.thresholds_for(symbol);

        let newest = pending.len() - 1;
        for (i, current) in pending.into_iter().enumerate() {
            let previous = self.snapshots.previous_for(symbol, current.date);
            let mut evaluation = SignalEngine::evaluate(&current, previous.as_ref(), &thresholds);
            let last_decision = self.decisions.previous_for(symbol, current.date);
            evaluation.candidates.extend(SignalEngine::signal_change(
                last_decision.as_ref().map(|e| &e.signal),
                &evaluation.signal,
            ));

            if self.decisions.latest(symbol).as_ref() == Some(&evaluation) {
                debug!(symbol = %symbol, date = %current.date, "signal unchanged");
                continue;
            }

            self.store.append_signal(&evaluation.signal).await?;
            info!(
                symbol = %symbol,
                date = %current.date,
                verdict = %evaluation.signal.verdict,
                confidence = evaluation.signal.confidence,
                risk = %evaluation.signal.risk,
                candidates = evaluation.candidates.len(),
                "{} signal for {}: {}",
                evaluation.signal.verdict,
                symbol,
                evaluation.signal.reasoning
            );
            if i < newest {
                self.backlog.push(symbol, evaluation.candidates.iter().cloned());
            }
            self.decisions.insert(symbol, evaluation);
        }
        Ok(StageOutcome::Done)
    }

    async fn notify(&self, symbol: &str, now: DateTime<Utc>) -> Result<StageOutcome, PipelineError> {
        let Some(evaluation) = self.decisions.latest(symbol) else {
            return Err(PipelineError::InsufficientData {
                symbol: symbol.to_string(),
                reason: "no signal decided".to_string(),
            });
        };

        // backlog alerts are offered once; only failed deliveries are requeued
        let backlog = self.backlog.take(symbol);
        let backlog_len = backlog.len();
        let mut requeue = Vec::new();
        let mut first_failure: Option<DeliveryError> = None;
        for (i, candidate) in backlog.iter().chain(&evaluation.candidates).enumerate() {
            let Some(reservation) = self.dedup.try_reserve(candidate, now) else {
                if let Some(ref metrics) = self.metrics {
                    metrics.alerts_suppressed_total.inc();
                }
                continue;
            };

            let alert = Alert {
                timestamp: now,
                ..candidate.clone()
            };
            match self.sink.deliver(&alert).await {
                Ok(()) => {
                    reservation.commit(now);
                    if let Some(ref metrics) = self.metrics {
                        metrics.alerts_fired_total.inc();
                    }
                    info!(symbol = %symbol, kind = %alert.kind, severity = %alert.severity, "alert fired");
                    if let Err(e) = self.store.append_alert(&alert).await {
                        error!(symbol = %symbol, kind = %alert.kind, error = %e, "failed to record fired alert");
                    }
                }
                Err(e) => {
                    drop(reservation);
                    if let Some(ref metrics) = self.metrics {
                        metrics.alerts_failed_total.inc();
                    }
                    warn!(symbol = %symbol, kind = %alert.kind, error = %e, "alert delivery failed");
                    if i < backlog_len {
                        requeue.push(candidate.clone());
                    }
                    first_failure.get_or_insert(e);
                }
            }
        }
        if !requeue.is_empty() {
            self.backlog.push(symbol, requeue);
        }

        match first_failure {
            Some(e) => Err(PipelineError::DeliveryFailure(e)),
            None => Ok(StageOutcome::Done),
        }
    }
}
