//! API shared state

use std::sync::Arc;

use crate::actors::Scheduler;
use crate::alerts::AlertSender;
use crate::inventory::InventoryClient;
use crate::storage::StateStore;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Scheduler,

    /// Used by the connection test endpoints
    pub inventory: Arc<dyn InventoryClient>,

    /// Used by the connection test endpoints
    pub sender: Arc<dyn AlertSender>,
}

impl ApiState {
    pub fn new(
        scheduler: Scheduler,
        inventory: Arc<dyn InventoryClient>,
        sender: Arc<dyn AlertSender>,
    ) -> Self {
        Self {
            scheduler,
            inventory,
            sender,
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        self.scheduler.store()
    }
}
