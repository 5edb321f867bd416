//! NotificationDispatcher - records and delivers alert candidates
//!
//! Every candidate becomes exactly one notification record:
//!
//! ```text
//! create (pending) → send → sent
//!                       └──→ failed   (logged, not re-raised)
//! ```
//!
//! Failed records are never retried. The next cycle that still sees the
//! problem creates a fresh record.

use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{debug, instrument, warn};

use super::reconciler::AlertCandidate;
use crate::alerts::AlertSender;
use crate::storage::{StateStore, StorageResult};
use crate::{DeliveryState, NewNotification, NotificationRecord};

/// Turns alert candidates into delivered (or failed) notifications
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn StateStore>,
    sender: Arc<dyn AlertSender>,
    endpoint: String,
    concurrency: usize,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn StateStore>,
        sender: Arc<dyn AlertSender>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sender,
            endpoint: endpoint.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` deliveries in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Record one candidate and attempt its delivery
    ///
    /// Only store errors are returned. A delivery failure is a successful
    /// dispatch that ends in `DeliveryState::Failed`.
    #[instrument(skip_all, fields(title = candidate.title()))]
    pub async fn dispatch(&self, candidate: AlertCandidate) -> StorageResult<NotificationRecord> {
        let record = self
            .store
            .create_notification(NewNotification {
                title: candidate.title().to_string(),
                message: candidate.message(),
                kind: candidate.kind,
                delivery_state: DeliveryState::Pending,
                created_at: candidate.observed_at,
            })
            .await?;

        let state = match self.sender.send(&self.endpoint, &candidate.alert_text()).await {
            Ok(()) => {
                debug!("notification {} delivered", record.id);
                DeliveryState::Sent
            }
            Err(e) => {
                warn!("failed to deliver notification {}: {e}", record.id);
                DeliveryState::Failed
            }
        };

        self.store.set_notification_state(record.id, state).await?;

        Ok(NotificationRecord {
            delivery_state: state,
            ..record
        })
    }

    /// Dispatch candidates with bounded parallelism, keeping their order
    ///
    /// Every dispatch runs to completion before the first store error, if
    /// any, is returned.
    pub async fn dispatch_all(
        &self,
        candidates: Vec<AlertCandidate>,
    ) -> StorageResult<Vec<NotificationRecord>> {
        let outcomes: Vec<StorageResult<NotificationRecord>> = stream::iter(candidates)
            .map(|candidate| self.dispatch(candidate))
            .buffered(self.concurrency)
            .collect()
            .await;

        outcomes.into_iter().collect()
    }
}
