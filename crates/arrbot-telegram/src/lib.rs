//! Telegram bot for arrbot.
//!
//! Reports download progress from Transmission, Radarr and Sonarr, and
//! watches a VPN container, alerting admins when it stops and letting them
//! restart it from chat.
//!
//! # Environment Variables
//!
//! See [`arrbot_core::config`] for the full list. Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! # Example
//!
//! ```no_run
//! use arrbot_core::BotConfig;
//! use arrbot_telegram::ArrBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bot = ArrBot::new(BotConfig::from_env()?)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! Default names; every command accepts configured aliases.
//!
//! - `/start`, `/help` - Welcome and command list
//! - `/status <name>` - Torrent progress
//! - `/status_movie <name>` - Radarr queue progress
//! - `/status_show <name>` - Sonarr queue progress
//! - `/restart_vpn` - Restart the VPN container (admin)
//! - `/vpn_status` - Check the VPN container now (admin)
//! - `/vpn_logs [lines]` - Recent container logs (admin)

pub mod bot;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod sender;
pub mod state;

pub use bot::ArrBot;
pub use commands::{CommandKind, CommandTable, ParsedCommand};
pub use error::{Result, TelegramError};
pub use handlers::replies;
pub use sender::TelegramSender;
pub use state::{BotState, Monitoring};
