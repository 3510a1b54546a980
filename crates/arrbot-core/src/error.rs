//! Error types for the arrbot engine.
//!
//! Each external collaborator has its own error kind so callers can branch on
//! what failed instead of unwinding through a catch-all.

use std::time::Duration;

use thiserror::Error;

/// The liveness probe could not determine whether a process is running.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The runtime tooling (e.g. the docker binary) is not available.
    #[error("probe tool not found: {0}")]
    ToolNotFound(String),

    /// The probe command ran but reported a failure.
    #[error("probe command failed: {0}")]
    CommandFailed(String),

    /// The probe did not finish in time.
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error while running the probe.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single notification could not be delivered.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient identifier is not valid for the transport.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The transport rejected or failed the send.
    #[error("send failed: {0}")]
    Transport(String),

    /// The send did not finish in time.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// A control action (restart, log fetch) could not be executed at all.
///
/// A restart command that runs and exits non-zero is not a `ControlError`;
/// it is reported through [`crate::traits::RestartOutcome`].
#[derive(Debug, Error)]
pub enum ControlError {
    /// Nothing is configured to run.
    #[error("no restart command configured")]
    NoCommand,

    /// The runtime tooling is not available.
    #[error("control tool not found: {0}")]
    ToolNotFound(String),

    /// The command ran but failed.
    #[error("control command failed: {0}")]
    CommandFailed(String),

    /// The command did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error while spawning the command.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetching work items from a backend failed.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(String),

    /// The backend answered with an unexpected status code.
    #[error("{backend} returned status {status}")]
    Status { backend: String, status: u16 },

    /// The response body could not be decoded.
    #[error("failed to decode {backend} response: {reason}")]
    Decode { backend: String, reason: String },

    /// The backend is not configured.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The configured endpoint is not a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Configuration is missing or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set to a value that cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    /// The dotenv file could not be read.
    #[error("failed to load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
