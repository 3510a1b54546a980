//! Collaborator traits.
//!
//! The engine never talks to HTTP APIs, container runtimes or chat transports
//! directly. Each of those sits behind one of these traits so the engine can
//! be driven by real clients in the bot and by mocks in tests.

use async_trait::async_trait;

use crate::error::{BackendError, ControlError, DeliveryError, ProbeError};
use crate::model::{Recipient, WorkItem};

/// A backend queue that exposes in-flight work items.
///
/// Implementations must fetch fresh data on every call.
#[async_trait]
pub trait WorkSource: Send + Sync {
    /// Human-readable backend name for messages and logs.
    fn name(&self) -> &str;

    /// Fetches the current queue.
    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>, BackendError>;
}

/// Reports whether a named process is running.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// Returns `Ok(true)` if running, `Ok(false)` if not, and an error if the
    /// state could not be determined.
    async fn probe(&self, process_name: &str) -> Result<bool, ProbeError>;
}

/// Result of running a restart command to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    /// Whether the command exited successfully.
    pub succeeded: bool,
    /// Captured standard error, verbatim.
    pub error_output: String,
}

/// Administrative control over a named process.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Runs the configured restart command.
    async fn restart(&self, process_name: &str) -> Result<RestartOutcome, ControlError>;

    /// Returns the last `lines` lines of the process log.
    async fn logs(&self, process_name: &str, lines: usize) -> Result<String, ControlError>;
}

/// Delivers a text message to one recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DeliveryError>;
}
