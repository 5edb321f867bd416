use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use super::dispatcher::NotificationDispatcher;
use super::reconciler::Reconciler;
use crate::alerts::AlertSender;
use crate::config::MonitorConfig;
use crate::inventory::InventoryClient;
use crate::storage::{StateStore, StorageResult};
use crate::{DeliveryState, NotificationRecord};

/// Outcome of one monitor cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub observed_at: DateTime<Utc>,
    /// Number of inventory entries reconciled (0 when the fetch failed)
    pub storages_observed: usize,
    pub inventory_available: bool,
    pub notifications: Vec<NotificationRecord>,
}

impl CycleReport {
    pub fn sent(&self) -> usize {
        self.count(DeliveryState::Sent)
    }

    pub fn failed(&self) -> usize {
        self.count(DeliveryState::Failed)
    }

    fn count(&self, state: DeliveryState) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.delivery_state == state)
            .count()
    }
}

/// One fetch → reconcile → dispatch pass
#[derive(Clone)]
pub struct MonitorCycle {
    store: Arc<dyn StateStore>,
    inventory: Arc<dyn InventoryClient>,
    sender: Arc<dyn AlertSender>,
    dispatch_concurrency: usize,
}

impl MonitorCycle {
    pub fn new(
        store: Arc<dyn StateStore>,
        inventory: Arc<dyn InventoryClient>,
        sender: Arc<dyn AlertSender>,
    ) -> Self {
        Self {
            store,
            inventory,
            sender,
            dispatch_concurrency: 1,
        }
    }

    pub fn with_dispatch_concurrency(mut self, concurrency: usize) -> Self {
        self.dispatch_concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Run the pipeline once against `config`
    ///
    /// The config is used as given; activation checks belong to the caller.
    #[instrument(skip_all, fields(target = %config.alist_url))]
    pub async fn run(&self, config: &MonitorConfig) -> StorageResult<CycleReport> {
        let observed_at = Utc::now();

        let fetched = self.inventory.fetch(&config.inventory_target()).await;
        let inventory_available = fetched.is_ok();
        let storages_observed = fetched.as_ref().map(Vec::len).unwrap_or(0);

        let candidates = Reconciler::new(self.store.clone())
            .reconcile(fetched, observed_at)
            .await?;

        let notifications = NotificationDispatcher::new(
            self.store.clone(),
            self.sender.clone(),
            config.webhook_url.clone(),
        )
        .with_concurrency(self.dispatch_concurrency)
        .dispatch_all(candidates)
        .await?;

        let report = CycleReport {
            observed_at,
            storages_observed,
            inventory_available,
            notifications,
        };
        info!(
            "cycle done: {} storages, {} alerts sent, {} failed",
            report.storages_observed,
            report.sent(),
            report.failed()
        );
        Ok(report)
    }
}
