//! Main Telegram bot implementation.

use std::sync::Arc;

use arrbot_core::{BotConfig, CheckReport};
use teloxide::prelude::*;
use teloxide::types::Me;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::commands::ParsedCommand;
use crate::error::{Result, TelegramError};
use crate::handlers::handle_command;
use crate::sender::TelegramSender;
use crate::state::BotState;

/// The arrbot Telegram bot.
pub struct ArrBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
}

impl ArrBot {
    /// Create a bot from validated configuration.
    pub fn new(config: BotConfig) -> Result<Self> {
        let bot = Bot::new(&config.telegram_token);
        let sender = Arc::new(TelegramSender::new(bot.clone()));
        let state = BotState::from_config(config, sender)?;
        Ok(Self {
            bot,
            state: Arc::new(state),
        })
    }

    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Run a single liveness check and notify admins if the container is down.
    pub async fn check_now(&self) -> Option<CheckReport> {
        let monitoring = self.state.monitoring.as_ref()?;
        Some(monitoring.watchdog.check_now().await)
    }

    /// Start the bot in polling mode with the liveness watchdog alongside.
    ///
    /// Returns after Ctrl+C, once the watchdog has stopped.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let commands = self.state.commands.bot_commands(self.state.monitoring_enabled());
        if let Err(e) = self.bot.set_my_commands(commands).await {
            warn!(error = %e, "Failed to register command menu");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let watchdog_task = self.state.monitoring.as_ref().map(|monitoring| {
            let watchdog = Arc::clone(&monitoring.watchdog);
            let period = monitoring.config.check_interval;
            tokio::spawn(async move {
                watchdog.run(period, shutdown_rx).await;
            })
        });

        let state_for_filter = Arc::clone(&self.state);
        let state_for_commands = Arc::clone(&self.state);

        let handler = Update::filter_message()
            .filter_map(move |msg: Message, me: Me| {
                let text = msg.text()?;
                state_for_filter.commands.parse(text, Some(me.username()))
            })
            .endpoint(move |bot: Bot, msg: Message, cmd: ParsedCommand| {
                let state = Arc::clone(&state_for_commands);
                async move { handle_command(bot, msg, cmd, state).await }
            });

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_upd| async move {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Stopping Telegram bot...");
        let _ = shutdown_tx.send(true);
        if let Some(task) = watchdog_task {
            if let Err(e) = task.await {
                warn!(error = %e, "watchdog task ended abnormally");
            }
        }

        info!("Bot stopped");
        Ok(())
    }
}
