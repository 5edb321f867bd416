//! In-memory state store (no persistence)
//!
//! This backend keeps everything in process memory behind a `RwLock`.
//! It's useful for:
//! - Testing without database dependencies
//! - Deployments that only care about the current run
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Unbounded log**: The notification log grows for the process lifetime

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::backend::{HealthStatus, StateStore};
use super::error::{StorageError, StorageResult};
use crate::config::MonitorConfig;
use crate::{
    DeliveryState, NewNotification, NotificationRecord, StorageFields, StorageIdentity,
    StorageRecord,
};

#[derive(Debug, Default)]
struct Inner {
    config: Option<MonitorConfig>,
    storages: BTreeMap<i64, StorageRecord>,
    identities: HashMap<StorageIdentity, i64>,
    notifications: BTreeMap<i64, NotificationRecord>,
    next_storage_id: i64,
    next_notification_id: i64,
}

/// In-memory state store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_config(&self) -> StorageResult<Option<MonitorConfig>> {
        Ok(self.inner.read().await.config.clone())
    }

    async fn save_config(&self, config: MonitorConfig) -> StorageResult<MonitorConfig> {
        self.inner.write().await.config = Some(config.clone());
        Ok(config)
    }

    async fn list_storages(&self) -> StorageResult<Vec<StorageRecord>> {
        Ok(self.inner.read().await.storages.values().cloned().collect())
    }

    async fn upsert_storage(
        &self,
        identity: &StorageIdentity,
        fields: StorageFields,
    ) -> StorageResult<StorageRecord> {
        let mut inner = self.inner.write().await;

        let id = match inner.identities.get(identity) {
            Some(id) => *id,
            None => {
                inner.next_storage_id += 1;
                let id = inner.next_storage_id;
                inner.identities.insert(identity.clone(), id);
                trace!("new storage {identity} with id {id}");
                id
            }
        };

        let record = StorageRecord {
            id,
            name: identity.name.clone(),
            mount_path: identity.mount_path.clone(),
            driver: fields.driver,
            status: fields.status,
            last_check: fields.last_check,
        };
        inner.storages.insert(id, record.clone());

        Ok(record)
    }

    async fn list_notifications(&self) -> StorageResult<Vec<NotificationRecord>> {
        let inner = self.inner.read().await;
        let mut notifications: Vec<_> = inner.notifications.values().cloned().collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StorageResult<NotificationRecord> {
        let mut inner = self.inner.write().await;
        inner.next_notification_id += 1;

        let record = NotificationRecord {
            id: inner.next_notification_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            delivery_state: notification.delivery_state,
            created_at: notification.created_at,
        };
        inner.notifications.insert(record.id, record.clone());

        Ok(record)
    }

    async fn set_notification_state(&self, id: i64, state: DeliveryState) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .notifications
            .get_mut(&id)
            .ok_or(StorageError::NotificationNotFound(id))?;

        if !record.delivery_state.can_transition_to(state) {
            return Err(StorageError::InvalidTransition {
                id,
                from: record.delivery_state,
                to: state,
            });
        }

        record.delivery_state = state;
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let inner = self.inner.read().await;
        Ok(HealthStatus {
            healthy: true,
            message: "In-memory storage operational".to_string(),
            metadata: HashMap::from([
                ("backend".to_string(), "memory".to_string()),
                ("storages".to_string(), inner.storages.len().to_string()),
                (
                    "notifications".to_string(),
                    inner.notifications.len().to_string(),
                ),
            ]),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory store (no-op)");
        Ok(())
    }
}
