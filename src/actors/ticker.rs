//! TickerActor - fires one monitor cycle per interval
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → publish next check → try gate ─ free ─→ spawn MonitorCycle::run
//!     ↑                                   └─── busy ──→ drop tick (debug log)
//!     └─── Commands (Shutdown)
//! ```
//!
//! The first tick fires one full period after spawn. Cycles run on their own
//! task so a slow cycle never delays the timer.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, debug, error, info_span, instrument, warn};

use super::messages::SchedulerCommand;
use crate::config::MonitorConfig;
use crate::monitors::MonitorCycle;

/// Actor that owns the repeating timer of one scheduler run
pub struct TickerActor {
    /// Config snapshot, immutable for the run
    config: Arc<MonitorConfig>,

    cycle: Arc<MonitorCycle>,

    /// Shared with `Scheduler::trigger_once`
    gate: Arc<Mutex<()>>,

    command_rx: mpsc::Receiver<SchedulerCommand>,

    next_check_tx: watch::Sender<DateTime<Utc>>,

    period: Duration,
}

impl TickerActor {
    pub fn new(
        config: Arc<MonitorConfig>,
        cycle: Arc<MonitorCycle>,
        gate: Arc<Mutex<()>>,
        command_rx: mpsc::Receiver<SchedulerCommand>,
        next_check_tx: watch::Sender<DateTime<Utc>>,
    ) -> Self {
        let period = period_of(&config);
        Self {
            config,
            cycle,
            gate,
            command_rx,
            next_check_tx,
            period,
        }
    }

    /// Run the actor's main loop
    ///
    /// This runs until a Shutdown command is received or every handle is
    /// dropped.
    #[instrument(skip(self), fields(interval = self.config.interval))]
    pub async fn run(mut self) {
        debug!("starting ticker actor");

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),

                cmd = self.command_rx.recv() => match cmd {
                    Some(SchedulerCommand::Shutdown) => {
                        debug!("received shutdown command");
                        break;
                    }
                    None => {
                        warn!("command channel closed, shutting down");
                        break;
                    }
                },
            }
        }

        debug!("ticker actor stopped");
    }

    fn on_tick(&self) {
        self.next_check_tx.send_replace(next_check_after(Utc::now(), &self.config));

        let guard = match self.gate.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("previous cycle still running, dropping tick");
                return;
            }
        };

        let cycle = self.cycle.clone();
        let config = self.config.clone();
        tokio::spawn(
            async move {
                let _guard = guard;
                if let Err(e) = cycle.run(&config).await {
                    error!("monitor cycle failed: {e}");
                }
            }
            .instrument(info_span!("scheduled_cycle")),
        );
    }
}

/// Handle for controlling a TickerActor
#[derive(Clone)]
pub struct TickerHandle {
    sender: mpsc::Sender<SchedulerCommand>,
    next_check: watch::Receiver<DateTime<Utc>>,
}

impl TickerHandle {
    /// Spawn a new ticker actor for `config`
    pub fn spawn(
        config: Arc<MonitorConfig>,
        cycle: Arc<MonitorCycle>,
        gate: Arc<Mutex<()>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (next_check_tx, next_check) =
            watch::channel(next_check_after(Utc::now(), &config));

        let actor = TickerActor::new(config, cycle, gate, cmd_rx, next_check_tx);
        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            next_check,
        }
    }

    /// When the next tick is due
    pub fn next_check(&self) -> DateTime<Utc> {
        *self.next_check.borrow()
    }

    /// Stop the timer
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SchedulerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}

fn period_of(config: &MonitorConfig) -> Duration {
    Duration::from_secs(u64::from(config.interval) * 60)
}

fn next_check_after(now: DateTime<Utc>, config: &MonitorConfig) -> DateTime<Utc> {
    now + chrono::Duration::minutes(i64::from(config.interval))
}
