//! Reconciler - folds a fetched inventory into the store and picks alerts
//!
//! ```text
//! status        alert   kind
//! work          no      -
//! disabled      no      -
//! error         yes     error
//! <anything>    yes     warning
//! fetch failed  yes     error (one synthetic candidate, nothing upserted)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace, warn};

use crate::inventory::FetchError;
use crate::storage::{StateStore, StorageResult};
use crate::{InventoryEntry, NotificationKind, StorageFields, StorageIdentity, StorageStatus};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// What an alert candidate is about
#[derive(Debug, Clone, PartialEq)]
pub enum AlertSubject {
    /// A storage reported an unhealthy status
    Storage {
        identity: StorageIdentity,
        driver: String,
        status: StorageStatus,
    },

    /// The inventory itself could not be fetched
    InventoryUnavailable { error: FetchError },
}

/// A reconciler decision that a notification must be sent
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub subject: AlertSubject,
    pub kind: NotificationKind,
    pub observed_at: DateTime<Utc>,
}

impl AlertCandidate {
    /// Build a candidate for an inventory entry, or `None` if it is healthy
    pub fn for_entry(entry: &InventoryEntry, observed_at: DateTime<Utc>) -> Option<Self> {
        let kind = classify(&entry.status)?;
        Some(Self {
            subject: AlertSubject::Storage {
                identity: entry.identity(),
                driver: entry.driver.clone(),
                status: entry.status.clone(),
            },
            kind,
            observed_at,
        })
    }

    pub fn inventory_unavailable(error: FetchError, observed_at: DateTime<Utc>) -> Self {
        Self {
            subject: AlertSubject::InventoryUnavailable { error },
            kind: NotificationKind::Error,
            observed_at,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.subject {
            AlertSubject::Storage { .. } => "Storage status alert",
            AlertSubject::InventoryUnavailable { .. } => "Storage check failed",
        }
    }

    /// Self-describing notification body
    pub fn message(&self) -> String {
        let checked_at = self.observed_at.format(TIMESTAMP_FORMAT);
        match &self.subject {
            AlertSubject::Storage {
                identity,
                driver,
                status,
            } => format!(
                "Storage \"{}\" reported status \"{status}\", please check it.\n\
                 Name: {}\n\
                 Driver: {driver}\n\
                 Mount path: {}\n\
                 Status: {status}\n\
                 Checked at: {checked_at}",
                identity.name, identity.name, identity.mount_path,
            ),
            AlertSubject::InventoryUnavailable { error } => format!(
                "Storage status check failed: {error}\n\
                 Checked at: {checked_at}"
            ),
        }
    }

    /// Text delivered to the notification channel
    pub fn alert_text(&self) -> String {
        format!("🚨 {}\n\n{}", self.title(), self.message())
    }
}

/// Notification kind for a status, `None` for healthy statuses
pub fn classify(status: &StorageStatus) -> Option<NotificationKind> {
    match status {
        s if s.is_healthy() => None,
        StorageStatus::Error => Some(NotificationKind::Error),
        _ => Some(NotificationKind::Warning),
    }
}

/// Applies inventory snapshots to the state store
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn StateStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Upsert every fetched entry and return the alert-worthy ones
    ///
    /// A failed fetch touches nothing and yields a single error candidate.
    /// Store errors abort the reconciliation.
    #[instrument(skip_all)]
    pub async fn reconcile(
        &self,
        fetched: Result<Vec<InventoryEntry>, FetchError>,
        observed_at: DateTime<Utc>,
    ) -> StorageResult<Vec<AlertCandidate>> {
        let entries = match fetched {
            Ok(entries) => entries,
            Err(error) => {
                warn!("inventory fetch failed: {error}");
                return Ok(vec![AlertCandidate::inventory_unavailable(
                    error,
                    observed_at,
                )]);
            }
        };

        let mut candidates = Vec::new();
        for entry in &entries {
            let identity = entry.identity();
            self.store
                .upsert_storage(
                    &identity,
                    StorageFields {
                        driver: entry.driver.clone(),
                        status: entry.status.clone(),
                        last_check: observed_at,
                    },
                )
                .await?;
            trace!("{identity}: {}", entry.status);

            if let Some(candidate) = AlertCandidate::for_entry(entry, observed_at) {
                debug!("{identity} is unhealthy ({})", entry.status);
                candidates.push(candidate);
            }
        }

        debug!(
            "reconciled {} storages, {} need attention",
            entries.len(),
            candidates.len()
        );
        Ok(candidates)
    }
}
