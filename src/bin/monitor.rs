use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use storage_monitoring::{
    actors::Scheduler,
    alerts::AlertSender,
    config::{Config, StorageConfig, read_config_file},
    inventory::{AlistClient, DemoInventory, InventoryClient},
    monitors::MonitorCycle,
    storage::{MemoryStore, StateStore},
    wechat::WeChatSender,
};
use tracing::{debug, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,

    /// Log level for the monitor's own targets
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new().with_targets(vec![
        ("storage_monitoring", level),
        ("monitor", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let store = open_store(&config).await?;
    seed_config(&config, store.as_ref()).await?;

    let timeout = Duration::from_secs(config.http.timeout_secs);
    let mut inventory: Arc<dyn InventoryClient> =
        Arc::new(AlistClient::new(timeout).context("failed to build AList client")?);
    if config.demo {
        info!("demo tokens enabled");
        inventory = Arc::new(DemoInventory::new(inventory));
    }
    let sender: Arc<dyn AlertSender> =
        Arc::new(WeChatSender::new(timeout).context("failed to build webhook client")?);

    let cycle = MonitorCycle::new(store.clone(), inventory.clone(), sender.clone())
        .with_dispatch_concurrency(config.dispatch.concurrency);
    let scheduler = Scheduler::new(cycle);

    match store.get_config().await? {
        Some(monitor) if monitor.active => {
            if let Err(e) = scheduler.start(monitor).await {
                warn!("stored configuration could not be started: {e}");
            }
        }
        Some(_) => info!("monitor is configured but inactive, waiting for start"),
        None => info!("no monitor configuration stored yet"),
    }

    #[cfg(feature = "api")]
    {
        use storage_monitoring::api::{ApiState, spawn_api_server};
        use storage_monitoring::util::apply_env_overrides;

        let settings = apply_env_overrides(config.api.clone());
        let state = ApiState::new(scheduler.clone(), inventory, sender);
        spawn_api_server(&settings, state).await?;
    }
    #[cfg(not(feature = "api"))]
    {
        let _ = (inventory, sender);
        debug!("built without the api feature, running headless");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    scheduler.stop().await;
    store.close().await?;

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn StateStore>> {
    match config.storage.clone().unwrap_or_default() {
        StorageConfig::None => {
            info!("using in-memory store, state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            use storage_monitoring::storage::sqlite::SqliteStore;

            info!("using sqlite store at {}", path.display());
            let store = SqliteStore::new(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => {
            anyhow::bail!("sqlite storage requested but the storage-sqlite feature is disabled")
        }
    }
}

/// Store the file's monitor section unless a config was saved before
async fn seed_config(config: &Config, store: &dyn StateStore) -> anyhow::Result<()> {
    let Some(monitor) = &config.monitor else {
        return Ok(());
    };

    if store.get_config().await?.is_some() {
        debug!("keeping stored monitor configuration, ignoring file seed");
        return Ok(());
    }

    store.save_config(monitor.clone()).await?;
    info!("seeded monitor configuration from the config file");
    Ok(())
}
