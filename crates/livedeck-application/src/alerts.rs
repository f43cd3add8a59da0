//! AlertScheduler - the two alert timers.
//!
//! The poll timer fetches alert conditions and replaces the rotor's list; the
//! rotation timer advances the rotor cursor. They run independently of each
//! other and of the event stream. The network call never holds the dashboard
//! lock.

use livedeck_core::ports::AlertSource;
use livedeck_core::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::shared::{SharedDashboard, write_dashboard};

const TARGET: &str = "livedeck::alerts";

pub struct AlertScheduler {
    dashboard: SharedDashboard,
    source: Arc<dyn AlertSource>,
    poll_interval: Duration,
    rotate_interval: Duration,
    cancel: Option<CancellationToken>,
    workers: JoinSet<()>,
}

impl AlertScheduler {
    pub fn new(
        dashboard: SharedDashboard,
        source: Arc<dyn AlertSource>,
        poll_interval: Duration,
        rotate_interval: Duration,
    ) -> Self {
        Self {
            dashboard,
            source,
            poll_interval,
            rotate_interval,
            cancel: None,
            workers: JoinSet::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Spawns both timers. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!(target: TARGET, "Scheduler already running, skipping");
            return;
        }
        let cancel = CancellationToken::new();

        // Poll immediately, then on every interval.
        let poller = Poller {
            dashboard: Arc::clone(&self.dashboard),
            source: Arc::clone(&self.source),
        };
        let poll_interval = self.poll_interval;
        let poll_cancel = cancel.clone();
        self.workers.spawn(async move {
            let mut ticker = interval_at(Instant::now(), poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = poll_cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = poll_cancel.cancelled() => break,
                    _ = poller.poll_once() => {}
                }
            }
            tracing::debug!(target: TARGET, "Poll timer stopped");
        });

        // First rotation one full period after start.
        let dashboard = Arc::clone(&self.dashboard);
        let rotate_interval = self.rotate_interval;
        let rotate_cancel = cancel.clone();
        self.workers.spawn(async move {
            let mut ticker = interval_at(Instant::now() + rotate_interval, rotate_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = rotate_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        write_dashboard(&dashboard).rotate_alerts();
                    }
                }
            }
            tracing::debug!(target: TARGET, "Rotation timer stopped");
        });

        tracing::info!(
            target: TARGET,
            "Scheduler started (poll {}s, rotate {}s)",
            self.poll_interval.as_secs_f64(),
            self.rotate_interval.as_secs_f64()
        );
        self.cancel = Some(cancel);
    }

    /// Cancels both timers and waits for them to exit. Safe to call repeatedly.
    pub async fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        while self.workers.join_next().await.is_some() {}
    }

    /// Runs one poll outside the timer.
    pub async fn poll_once(&self) -> Result<()> {
        Poller {
            dashboard: Arc::clone(&self.dashboard),
            source: Arc::clone(&self.source),
        }
        .poll_once()
        .await
    }
}

struct Poller {
    dashboard: SharedDashboard,
    source: Arc<dyn AlertSource>,
}

impl Poller {
    /// A failed poll leaves the current alert list untouched.
    async fn poll_once(&self) -> Result<()> {
        match self.source.poll_alerts().await {
            Ok(conditions) => {
                tracing::debug!(
                    target: TARGET,
                    "Polled {} alerts, {} advisories",
                    conditions.alerts.len(),
                    conditions.recommendations.len()
                );
                write_dashboard(&self.dashboard).apply_alert_conditions(conditions);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: TARGET, "Alert poll failed: {}", err);
                Err(err)
            }
        }
    }
}
