//! Check-and-notify pipeline for a monitored process.
//!
//! The same pipeline runs from two triggers: the background timer (gated by
//! the monitor's minimum interval) and on-demand admin checks (not gated).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::liveness::{CheckOutcome, LivenessMonitor};
use crate::model::Recipient;
use crate::notify::{DeliveryReport, NotificationDispatcher};

/// What one pass of the pipeline did.
#[derive(Debug)]
pub enum CheckReport {
    /// The minimum interval has not elapsed; nothing was probed.
    Skipped,
    /// The probe failed; state is unchanged.
    ProbeFailed(ProbeError),
    /// The probe succeeded. `alert` is set when admins were notified.
    Checked {
        outcome: CheckOutcome,
        alert: Option<DeliveryReport>,
    },
}

/// Drives a [`LivenessMonitor`] for one process and alerts on down-transitions.
pub struct Watchdog {
    monitor: Arc<LivenessMonitor>,
    dispatcher: Arc<NotificationDispatcher>,
    process_name: String,
    recipients: Vec<Recipient>,
    notify_on_first_down: bool,
}

impl Watchdog {
    pub fn new(
        monitor: Arc<LivenessMonitor>,
        dispatcher: Arc<NotificationDispatcher>,
        process_name: impl Into<String>,
        recipients: Vec<Recipient>,
    ) -> Self {
        Self {
            monitor,
            dispatcher,
            process_name: process_name.into(),
            recipients,
            notify_on_first_down: true,
        }
    }

    /// Whether an `Unknown -> Down` check alerts admins.
    pub fn with_notify_on_first_down(mut self, enabled: bool) -> Self {
        self.notify_on_first_down = enabled;
        self
    }

    pub fn monitor(&self) -> &LivenessMonitor {
        &self.monitor
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Timer entry point: checks only if the minimum interval has elapsed.
    pub async fn tick(&self) -> CheckReport {
        if !self.monitor.should_check(&self.process_name).await {
            debug!(process = %self.process_name, "skipping check, checked recently");
            return CheckReport::Skipped;
        }
        self.check_now().await
    }

    /// On-demand entry point: always checks.
    pub async fn check_now(&self) -> CheckReport {
        let outcome = match self.monitor.check_status(&self.process_name).await {
            Ok(outcome) => outcome,
            Err(e) => return CheckReport::ProbeFailed(e),
        };

        let alert = if outcome.went_down(self.notify_on_first_down) {
            if self.recipients.is_empty() {
                warn!(process = %self.process_name, "process is down but no admins are configured");
            }
            Some(self.dispatcher.notify_down(&self.process_name, &self.recipients).await)
        } else {
            None
        };

        CheckReport::Checked { outcome, alert }
    }

    /// Runs [`tick`](Self::tick) every `period` until `shutdown` turns true.
    ///
    /// Probe failures are logged and the loop carries on.
    pub async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            process = %self.process_name,
            period_secs = period.as_secs(),
            "starting liveness watchdog"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let CheckReport::ProbeFailed(e) = self.tick().await {
                        warn!(process = %self.process_name, error = %e, "scheduled check failed, retrying next tick");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("watchdog received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!(process = %self.process_name, "liveness watchdog stopped");
    }
}
