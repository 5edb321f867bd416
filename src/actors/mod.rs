//! Actor-based scheduling
//!
//! The periodic timer runs as an independent async task controlled through a
//! Tokio command channel, the same way every long-lived loop in this crate is
//! built.
//!
//! ```text
//!        ┌──────────────────┐   start / stop / status / trigger_once
//!        │    Scheduler     │ ◄──────────────────────────────────────  API, binary
//!        └────────┬─────────┘
//!                 │ spawns (one per run)
//!        ┌────────▼─────────┐   watch: next check time
//!        │   TickerActor    │ ─────────────────────────►  status()
//!        └────────┬─────────┘
//!                 │ every `interval` minutes, if the gate is free
//!        ┌────────▼─────────┐
//!        │  MonitorCycle    │  fetch → reconcile → dispatch
//!        └──────────────────┘
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: the ticker has an mpsc command channel (`Shutdown`)
//! 2. **State**: the next tick time is published on a `watch` channel
//! 3. **Exclusion**: a shared `Mutex` gate keeps cycles from overlapping

pub mod messages;
pub mod scheduler;
pub mod ticker;

pub use messages::{MonitorOverview, SchedulerCommand, SchedulerStatus};
pub use scheduler::Scheduler;
