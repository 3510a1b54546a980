//! Liveness tracking for long-running external processes.
//!
//! Each monitored process has a [`LivenessRecord`] that starts as
//! [`Liveness::Unknown`] and is updated by successful probes only. A failed
//! probe leaves the record untouched so a flaky tool never fakes a
//! transition.
//!
//! Checks of the same process are single-flight: the record's mutex is held
//! for the whole probe-and-update, so a timer tick and an admin command
//! cannot interleave their reads and writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ProbeError;
use crate::model::Liveness;
use crate::traits::ProcessProbe;

/// Default bound on a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timer wake-ups may land slightly early relative to the previous stamp.
const TIMER_SLACK: Duration = Duration::from_millis(500);

/// Last known state of one process.
#[derive(Debug, Clone)]
pub struct LivenessRecord {
    pub process_name: String,
    pub last_known: Liveness,
    /// Monotonic time the last successful check started.
    pub last_checked_at: Option<Instant>,
    /// Wall-clock time of the last successful check, for display.
    pub last_checked_wall: Option<DateTime<Utc>>,
}

impl LivenessRecord {
    fn new(process_name: &str) -> Self {
        Self {
            process_name: process_name.to_string(),
            last_known: Liveness::Unknown,
            last_checked_at: None,
            last_checked_wall: None,
        }
    }
}

/// A change between two successful checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub process_name: String,
    pub from: Liveness,
    pub to: Liveness,
}

/// Result of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub process_name: String,
    pub previous: Liveness,
    pub current: Liveness,
}

impl CheckOutcome {
    /// The logged transition, if any.
    ///
    /// The first successful check after start-up is never a transition.
    pub fn transition(&self) -> Option<Transition> {
        if self.previous == Liveness::Unknown || self.previous == self.current {
            return None;
        }
        Some(Transition {
            process_name: self.process_name.clone(),
            from: self.previous,
            to: self.current,
        })
    }

    /// Whether this check should alert admins that the process went down.
    ///
    /// `Up -> Down` always alerts. `Unknown -> Down` alerts only when
    /// `include_first_down` is set. `Down -> Down` never alerts.
    pub fn went_down(&self, include_first_down: bool) -> bool {
        if self.current != Liveness::Down {
            return false;
        }
        match self.previous {
            Liveness::Up => true,
            Liveness::Unknown => include_first_down,
            Liveness::Down => false,
        }
    }
}

/// Tracks liveness of named processes through a [`ProcessProbe`].
pub struct LivenessMonitor {
    probe: Arc<dyn ProcessProbe>,
    records: RwLock<HashMap<String, Arc<Mutex<LivenessRecord>>>>,
    min_interval: Duration,
    probe_timeout: Duration,
}

impl LivenessMonitor {
    /// Creates a monitor with the given minimum interval between timer checks.
    pub fn new(probe: Arc<dyn ProcessProbe>, min_interval: Duration) -> Self {
        Self {
            probe,
            records: RwLock::new(HashMap::new()),
            min_interval,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Sets the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    async fn record(&self, process_name: &str) -> Arc<Mutex<LivenessRecord>> {
        if let Some(record) = self.records.read().await.get(process_name) {
            return Arc::clone(record);
        }

        let mut records = self.records.write().await;
        Arc::clone(
            records
                .entry(process_name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(LivenessRecord::new(process_name)))),
        )
    }

    /// Returns a copy of the current record.
    pub async fn snapshot(&self, process_name: &str) -> LivenessRecord {
        let record = self.record(process_name).await;
        let guard = record.lock().await;
        guard.clone()
    }

    /// Returns true if enough time has passed since the last successful check.
    ///
    /// A timer firing a few milliseconds short of `min_interval` still counts,
    /// so a tick period equal to the interval never skips a beat.
    ///
    /// Only the timer path consults this; on-demand checks call
    /// [`check_status`](Self::check_status) directly.
    pub async fn should_check(&self, process_name: &str) -> bool {
        let record = self.record(process_name).await;
        let guard = record.lock().await;
        match guard.last_checked_at {
            None => true,
            Some(at) => {
                let slack = TIMER_SLACK.min(self.min_interval / 10);
                Instant::now().saturating_duration_since(at) + slack >= self.min_interval
            }
        }
    }

    /// Probes the process and updates its record.
    ///
    /// # Errors
    ///
    /// Returns the probe error (or [`ProbeError::Timeout`]) without touching
    /// the record.
    pub async fn check_status(&self, process_name: &str) -> Result<CheckOutcome, ProbeError> {
        let record = self.record(process_name).await;
        let mut guard = record.lock().await;

        debug!(process = %process_name, "checking process status");
        let started = Instant::now();

        let running = match tokio::time::timeout(self.probe_timeout, self.probe.probe(process_name)).await {
            Ok(Ok(running)) => running,
            Ok(Err(e)) => {
                warn!(process = %process_name, error = %e, "status probe failed");
                return Err(e);
            }
            Err(_) => {
                warn!(process = %process_name, timeout = ?self.probe_timeout, "status probe timed out");
                return Err(ProbeError::Timeout(self.probe_timeout));
            }
        };

        let current = Liveness::from_running(running);
        let outcome = CheckOutcome {
            process_name: process_name.to_string(),
            previous: guard.last_known,
            current,
        };

        if let Some(transition) = outcome.transition() {
            info!(
                process = %transition.process_name,
                from = %transition.from,
                to = %transition.to,
                "process status changed"
            );
        }

        guard.last_known = current;
        guard.last_checked_at = Some(started);
        guard.last_checked_wall = Some(Utc::now());

        Ok(outcome)
    }
}
