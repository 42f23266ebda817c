//! Fuelcast forecaster daemon
//!
//! Wires the PostgreSQL store into the engine, then runs the recompute
//! worker and the periodic forecast and alert batches until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fuelcast_db::{PgStockStore, connect};
use fuelcast_engine::{
    EngineSettings, ForecastEngine, RecomputeQueue, RecomputeWorker, Scheduler, StockStore, TracingPublisher,
};
use fuelcast_shared::AppConfig;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fuelcast=info,fuelcast_engine=debug,fuelcast_db=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(config.log.json);

    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(max_connections = config.database.max_connections, "Connected to database");

    let settings = EngineSettings::from(&config);
    let (queue, receiver) = RecomputeQueue::channel(settings.recompute_queue_capacity);
    let debounce = settings.recompute_debounce;
    let scheduler_enabled = settings.scheduler.enabled;

    let store: Arc<dyn StockStore> = Arc::new(PgStockStore::new(db));
    let engine = Arc::new(
        ForecastEngine::new(store, settings)
            .with_publisher(Arc::new(TracingPublisher))
            .with_recompute(queue),
    );

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(
        RecomputeWorker::new(Arc::clone(&engine), receiver, debounce).run(cancel.clone()),
    ));
    if scheduler_enabled {
        tasks.push(tokio::spawn(Scheduler::new(Arc::clone(&engine)).run(cancel.clone())));
    } else {
        warn!("Scheduler disabled, forecasts refresh only after ledger writes");
    }

    info!(overdraft_policy = ?config.ledger.overdraft_policy, "Forecaster running");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    cancel.cancel();

    for task in tasks {
        if let Err(err) = task.await {
            warn!(error = %err, "Background task ended abnormally");
        }
    }
    info!("Forecaster stopped");
    Ok(())
}
