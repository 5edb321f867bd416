//! Message types for actor communication

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Commands that can be sent to a TickerActor
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Stop ticking
    ///
    /// A cycle already in flight runs to completion on its own task.
    Shutdown,
}

/// Snapshot of the scheduler's run state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub active: bool,

    /// Interval of the current run in minutes
    pub interval_minutes: Option<u32>,

    pub started_at: Option<DateTime<Utc>>,

    /// When the next tick is due
    pub next_check: Option<DateTime<Utc>>,
}

/// Operator-facing summary of the monitor and the stored inventory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorOverview {
    pub active: bool,
    pub total_storages: usize,

    /// Storages whose last observed status is `work`
    pub working_storages: usize,

    /// Most recent `last_check` across all stored storages
    pub last_check: Option<DateTime<Utc>>,

    pub next_check: Option<DateTime<Utc>>,
}
