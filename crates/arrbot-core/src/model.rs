//! Plain data types shared by the engine and its collaborators.

use std::fmt;

/// An in-flight unit of work exposed by a backend queue.
///
/// Work items are fetched fresh for every query and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// Display name (torrent name or queue record title).
    pub name: String,
    /// Backend-reported status, rendered verbatim.
    pub status_label: String,
    /// Completion percentage on the 0 to 100 scale.
    pub progress: f64,
}

impl WorkItem {
    /// Creates a work item from a percentage in `[0, 100]`.
    pub fn new(name: impl Into<String>, status_label: impl Into<String>, progress: f64) -> Self {
        Self {
            name: name.into(),
            status_label: status_label.into(),
            progress,
        }
    }

    /// Creates a work item from a completion ratio in `[0, 1]`.
    pub fn from_ratio(name: impl Into<String>, status_label: impl Into<String>, ratio: f64) -> Self {
        Self::new(name, status_label, ratio * 100.0)
    }

    /// Creates a work item from total and remaining byte counts.
    ///
    /// A zero total yields 0% rather than dividing by zero.
    pub fn from_sizes(
        name: impl Into<String>,
        status_label: impl Into<String>,
        size_total: f64,
        size_left: f64,
    ) -> Self {
        let progress = if size_total > 0.0 {
            (size_total - size_left) / size_total * 100.0
        } else {
            0.0
        };
        Self::new(name, status_label, progress)
    }
}

/// An admin identifier that can receive notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Recipient(pub String);

impl Recipient {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Recipient {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Observed liveness of a monitored process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    /// Not checked successfully yet.
    #[default]
    Unknown,
    /// Running.
    Up,
    /// Not running.
    Down,
}

impl Liveness {
    /// Maps a probe result to a known state.
    pub fn from_running(running: bool) -> Self {
        if running {
            Liveness::Up
        } else {
            Liveness::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Liveness::Unknown => "unknown",
            Liveness::Up => "running",
            Liveness::Down => "stopped",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
