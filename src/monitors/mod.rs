//! Reconciliation and notification core
//!
//! ```text
//! fetch inventory → Reconciler (upsert + classify) → AlertCandidates
//!                                                       │
//!                      NotificationDispatcher ←─────────┘
//!                      (pending record → send → sent | failed)
//! ```
//!
//! A [`cycle::MonitorCycle`] runs the whole pipeline once for a given config.
//! Serializing cycles is the scheduler's job, not this module's.

pub mod cycle;
pub mod dispatcher;
pub mod reconciler;

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

pub use cycle::{CycleReport, MonitorCycle};
pub use dispatcher::NotificationDispatcher;
pub use reconciler::{AlertCandidate, AlertSubject, Reconciler};

/// Errors surfaced by scheduler operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("monitor cycle aborted: {0}")]
    Store(#[from] StorageError),
}
