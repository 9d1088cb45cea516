//! Prometheus metrics for the monitoring pipeline

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub bars_ingested_total: IntCounter,
    pub stage_failures_total: IntCounterVec,
    pub runs_skipped_total: IntCounter,
    pub alerts_fired_total: IntCounter,
    pub alerts_suppressed_total: IntCounter,
    pub alerts_failed_total: IntCounter,
    pub pipeline_run_duration_seconds: Histogram,
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let bars_ingested_total = IntCounter::with_opts(Opts::new(
            "stock_monitor_bars_ingested_total",
            "Daily bars appended to the record store",
        ))?;
        let stage_failures_total = IntCounterVec::new(
            Opts::new(
                "stock_monitor_stage_failures_total",
                "Symbol runs that failed, by pipeline stage",
            ),
            &["stage"],
        )?;
        let runs_skipped_total = IntCounter::with_opts(Opts::new(
            "stock_monitor_runs_skipped_total",
            "Symbol runs skipped because another run was in flight",
        ))?;
        let alerts_fired_total = IntCounter::with_opts(Opts::new(
            "stock_monitor_alerts_fired_total",
            "Alerts delivered to the notification sink",
        ))?;
        let alerts_suppressed_total = IntCounter::with_opts(Opts::new(
            "stock_monitor_alerts_suppressed_total",
            "Candidate alerts suppressed by cooldown",
        ))?;
        let alerts_failed_total = IntCounter::with_opts(Opts::new(
            "stock_monitor_alerts_failed_total",
            "Alerts whose delivery failed",
        ))?;
        let pipeline_run_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "stock_monitor_pipeline_run_duration_seconds",
                "Duration of a single-symbol stage run",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        let database_connected = Gauge::with_opts(Opts::new(
            "stock_monitor_database_connected",
            "1 when the record store database is connected",
        ))?;

        registry.register(Box::new(bars_ingested_total.clone()))?;
        registry.register(Box::new(stage_failures_total.clone()))?;
        registry.register(Box::new(runs_skipped_total.clone()))?;
        registry.register(Box::new(alerts_fired_total.clone()))?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;
        registry.register(Box::new(alerts_failed_total.clone()))?;
        registry.register(Box::new(pipeline_run_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            bars_ingested_total,
            stage_failures_total,
            runs_skipped_total,
            alerts_fired_total,
            alerts_suppressed_total,
            alerts_failed_total,
            pipeline_run_duration_seconds,
            database_connected,
        })
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
