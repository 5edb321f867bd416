//! State store trait definition
//!
//! This module defines the core `StateStore` trait that all
//! storage implementations must implement.

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::StorageResult;
use crate::config::MonitorConfig;
use crate::{
    DeliveryState, NewNotification, NotificationRecord, StorageFields, StorageIdentity,
    StorageRecord,
};

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,

    /// Additional backend-specific metadata
    pub metadata: HashMap<String, String>,
}

/// Trait for state store backends
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as they are shared between the
/// scheduler's timer, in-flight cycles and the API handlers.
///
/// ## Error Handling
///
/// Methods return `StorageResult<T>`. Implementations convert
/// backend-specific errors to `StorageError` variants. A storage error
/// aborts the monitor cycle that hit it.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the stored monitor configuration, if one was saved
    async fn get_config(&self) -> StorageResult<Option<MonitorConfig>>;

    /// Replace the stored monitor configuration
    async fn save_config(&self, config: MonitorConfig) -> StorageResult<MonitorConfig>;

    /// All storage records, in id order
    async fn list_storages(&self) -> StorageResult<Vec<StorageRecord>>;

    /// Insert or overwrite the record with this identity
    ///
    /// An existing record keeps its id; driver, status and last check are
    /// replaced (last write wins).
    async fn upsert_storage(
        &self,
        identity: &StorageIdentity,
        fields: StorageFields,
    ) -> StorageResult<StorageRecord>;

    /// The notification log, newest first
    async fn list_notifications(&self) -> StorageResult<Vec<NotificationRecord>>;

    /// Append a notification and assign it the next id
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StorageResult<NotificationRecord>;

    /// Move a notification to a new delivery state
    ///
    /// Fails with `InvalidTransition` unless the record is still pending and
    /// `state` is terminal.
    async fn set_notification_state(&self, id: i64, state: DeliveryState) -> StorageResult<()>;

    /// Check backend health
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Close the backend and release resources
    async fn close(&self) -> StorageResult<()>;
}
