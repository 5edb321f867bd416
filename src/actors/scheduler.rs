//! Scheduler - lifecycle of periodic monitor runs
//!
//! The scheduler is an explicit value, cloned into whoever needs to control
//! it. At most one run is active at a time:
//!
//! ```text
//! Idle ──start(ok)──→ Running(config snapshot, ticker)
//!  ↑                     │ start(ok)  → restart with the new snapshot
//!  └──────stop()─────────┘ stop()     → Idle (idempotent)
//! ```
//!
//! Scheduled ticks and `trigger_once` share one gate, so two cycles never
//! overlap. Ticks give up when the gate is busy, manual triggers wait.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::messages::{MonitorOverview, SchedulerStatus};
use super::ticker::TickerHandle;
use crate::config::{ConfigError, MonitorConfig};
use crate::monitors::{CycleReport, MonitorCycle, MonitorError};
use crate::storage::StateStore;
use crate::{DeliveryState, NewNotification, NotificationKind, StorageStatus};

struct ActiveRun {
    config: Arc<MonitorConfig>,
    started_at: DateTime<Utc>,
    ticker: TickerHandle,
}

/// Drives monitor cycles on a timer and on demand
#[derive(Clone)]
pub struct Scheduler {
    cycle: Arc<MonitorCycle>,
    gate: Arc<Mutex<()>>,
    run: Arc<RwLock<Option<ActiveRun>>>,
}

impl Scheduler {
    pub fn new(cycle: MonitorCycle) -> Self {
        Self {
            cycle: Arc::new(cycle),
            gate: Arc::new(Mutex::new(())),
            run: Arc::new(RwLock::new(None)),
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        self.cycle.store()
    }

    /// Start periodic checks with `config`
    ///
    /// A running schedule is replaced. Nothing changes if the config is
    /// rejected or the start record cannot be written.
    #[instrument(skip_all, fields(interval = config.interval))]
    pub async fn start(&self, config: MonitorConfig) -> Result<(), MonitorError> {
        config.validate()?;

        let started_at = Utc::now();
        self.store()
            .create_notification(NewNotification {
                title: "Monitor started".to_string(),
                message: format!(
                    "Storage monitor started, checking every {} minute(s).",
                    config.interval
                ),
                kind: NotificationKind::Info,
                delivery_state: DeliveryState::Sent,
                created_at: started_at,
            })
            .await?;

        let config = Arc::new(config);
        let previous = {
            let mut run = self.run.write().await;
            let ticker = TickerHandle::spawn(config.clone(), self.cycle.clone(), self.gate.clone());
            run.replace(ActiveRun {
                config: config.clone(),
                started_at,
                ticker,
            })
        };

        if let Some(previous) = previous {
            debug!("replaced running schedule");
            stop_ticker(&previous).await;
        }

        info!(
            "monitor started, checking {} every {} minute(s)",
            config.alist_url, config.interval
        );
        Ok(())
    }

    /// Read the stored config and start with it
    pub async fn start_from_store(&self) -> Result<(), MonitorError> {
        let config = self
            .store()
            .get_config()
            .await?
            .ok_or(ConfigError::Missing)?;
        self.start(config).await
    }

    /// Stop periodic checks
    ///
    /// A cycle already in flight finishes. Stopping an idle scheduler is a
    /// no-op.
    pub async fn stop(&self) {
        let run = self.run.write().await.take();
        match run {
            Some(run) => {
                stop_ticker(&run).await;
                info!("monitor stopped");
            }
            None => debug!("stop requested but monitor is not running"),
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        match self.run.read().await.as_ref() {
            Some(run) => SchedulerStatus {
                active: true,
                interval_minutes: Some(run.config.interval),
                started_at: Some(run.started_at),
                next_check: Some(run.ticker.next_check()),
            },
            None => SchedulerStatus::default(),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.run.read().await.is_some()
    }

    /// Run one cycle now, waiting for any cycle in flight
    ///
    /// Uses the running config when a schedule is active, otherwise the
    /// stored config whether it is active or not.
    #[instrument(skip_all)]
    pub async fn trigger_once(&self) -> Result<CycleReport, MonitorError> {
        let running = self.run.read().await.as_ref().map(|run| run.config.clone());
        let config = match running {
            Some(config) => config,
            None => Arc::new(
                self.store()
                    .get_config()
                    .await?
                    .ok_or(ConfigError::Missing)?,
            ),
        };

        let _guard = self.gate.lock().await;
        debug!("running manual cycle");
        Ok(self.cycle.run(&config).await?)
    }

    /// Scheduler state combined with a summary of the stored storages
    pub async fn overview(&self) -> Result<MonitorOverview, MonitorError> {
        let status = self.status().await;
        let storages = self.store().list_storages().await?;

        Ok(MonitorOverview {
            active: status.active,
            total_storages: storages.len(),
            working_storages: storages
                .iter()
                .filter(|s| s.status == StorageStatus::Work)
                .count(),
            last_check: storages.iter().map(|s| s.last_check).max(),
            next_check: status.next_check,
        })
    }
}

async fn stop_ticker(run: &ActiveRun) {
    if let Err(e) = run.ticker.shutdown().await {
        warn!("ticker already gone: {e:#}");
    }
}
