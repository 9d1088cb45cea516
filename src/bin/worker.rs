//! Stock monitor worker
//!
//! Runs the ingestion, computation and evaluation timers for the configured
//! symbols until interrupted.

use dotenvy::dotenv;
use std::sync::Arc;
use stock_monitor::config::{self, Config};
use stock_monitor::core::{PipelineOrchestrator, PipelineScheduler};
use stock_monitor::db::{MemoryStore, PostgresStore, RecordStore};
use stock_monitor::logging;
use stock_monitor::metrics::Metrics;
use stock_monitor::services::market_data::MarketDataProvider;
use stock_monitor::services::notifications::{
    DiscordWebhookSink, FanoutSink, LogSink, NotificationSink,
};
use stock_monitor::services::yahoo::YahooFinanceProvider;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = config::get_environment();
    info!("Starting stock monitor worker");
    info!(environment = %env, "Environment");

    let config = Arc::new(Config::from_env()?);
    info!(
        symbols = ?config.symbols,
        "Monitoring {} symbol(s): {}",
        config.symbols.len(),
        config.symbols.join(", ")
    );

    let metrics = Arc::new(Metrics::new()?);

    let store: Arc<dyn RecordStore> = match config.database_url.as_deref() {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let store = PostgresStore::connect(url).await?;
            metrics.database_connected.set(1.0);
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set - records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceProvider::new()?);

    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    if config.discord_enabled {
        if let Some(url) = config.discord_webhook_url.as_deref() {
            info!("Discord notifications enabled");
            sinks.push(Arc::new(DiscordWebhookSink::new(url)?));
        }
    }
    let sink: Arc<dyn NotificationSink> = Arc::new(FanoutSink::new(sinks));

    let orchestrator = Arc::new(
        PipelineOrchestrator::new(config.clone(), provider, store, sink).with_metrics(metrics.clone()),
    );
    if config.dedup_restore {
        orchestrator.restore_dedup_state().await;
    }

    let scheduler = PipelineScheduler::new(orchestrator.clone())?;
    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    if let Ok(report) = metrics.export() {
        info!("Final metrics:\n{}", report);
    }
    info!("Worker stopped");

    Ok(())
}
