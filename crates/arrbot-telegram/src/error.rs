//! Error types for the Telegram bot.

use arrbot_core::{BackendError, ConfigError, ProbeError};
use thiserror::Error;

/// Errors that stop the bot from starting or running.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend client could not be constructed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Container monitoring is enabled but docker is unavailable.
    #[error("Container monitoring unavailable: {0}")]
    Docker(#[from] ProbeError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Telegram API request error.
    #[error("Telegram API error: {0}")]
    Request(#[from] teloxide::RequestError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
