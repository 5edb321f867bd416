pub mod actors;
pub mod alerts;
pub mod api;
pub mod config;
pub mod inventory;
pub mod monitors;
pub mod storage;
pub mod util;
pub mod wechat;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health status reported by the remote inventory for one storage mount
///
/// `work` and `disabled` are the expected states. Anything else the remote
/// reports (including `error`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageStatus {
    Work,
    Disabled,
    Error,
    Other(String),
}

impl StorageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StorageStatus::Work => "work",
            StorageStatus::Disabled => "disabled",
            StorageStatus::Error => "error",
            StorageStatus::Other(status) => status,
        }
    }

    /// Whether this status is an expected state that never raises an alert
    pub fn is_healthy(&self) -> bool {
        matches!(self, StorageStatus::Work | StorageStatus::Disabled)
    }
}

impl From<&str> for StorageStatus {
    fn from(value: &str) -> Self {
        match value {
            "work" => StorageStatus::Work,
            "disabled" => StorageStatus::Disabled,
            "error" => StorageStatus::Error,
            other => StorageStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for StorageStatus {
    fn from(value: String) -> Self {
        StorageStatus::from(value.as_str())
    }
}

impl From<StorageStatus> for String {
    fn from(value: StorageStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage mount as reported by the remote inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: u64,
    pub driver: String,
    pub mount_path: String,
    pub status: StorageStatus,
}

impl InventoryEntry {
    /// Display name used as the first half of the storage identity
    ///
    /// The inventory carries no separate name, so the mount path doubles as
    /// one. Entries with an empty mount path get a label built from their id.
    pub fn display_name(&self) -> String {
        if self.mount_path.is_empty() {
            format!("storage-{}", self.id)
        } else {
            self.mount_path.clone()
        }
    }

    pub fn identity(&self) -> StorageIdentity {
        StorageIdentity {
            name: self.display_name(),
            mount_path: self.mount_path.clone(),
        }
    }
}

/// Unique key of a stored storage record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageIdentity {
    pub name: String,
    pub mount_path: String,
}

impl fmt::Display for StorageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.mount_path)
    }
}

/// A storage mount as last observed by the monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    pub id: i64,
    pub name: String,
    pub mount_path: String,
    pub driver: String,
    pub status: StorageStatus,
    pub last_check: DateTime<Utc>,
}

/// Mutable part of a storage record, overwritten on every observation
#[derive(Debug, Clone, PartialEq)]
pub struct StorageFields {
    pub driver: String,
    pub status: StorageStatus,
    pub last_check: DateTime<Utc>,
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(NotificationKind::Info),
            "warning" => Some(NotificationKind::Warning),
            "error" => Some(NotificationKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of a notification
///
/// ```text
/// Pending ──send ok──→ Sent    (terminal)
///    └─────send err──→ Failed  (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Sent,
    Failed,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Sent => "sent",
            DeliveryState::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(DeliveryState::Pending),
            "sent" => Some(DeliveryState::Sent),
            "failed" => Some(DeliveryState::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryState::Pending)
    }

    /// Whether a record in this state may move to `next`
    pub fn can_transition_to(&self, next: DeliveryState) -> bool {
        matches!(
            (self, next),
            (DeliveryState::Pending, DeliveryState::Sent)
                | (DeliveryState::Pending, DeliveryState::Failed)
        )
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry of the flat notification log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub delivery_state: DeliveryState,
    pub created_at: DateTime<Utc>,
}

/// Fields of a notification before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub delivery_state: DeliveryState,
    pub created_at: DateTime<Utc>,
}
