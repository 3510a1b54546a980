//! Telegram transport for admin notifications.

use arrbot_core::{DeliveryError, MessageSender, Recipient};
use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

/// Resolves a recipient id to a Telegram chat.
///
/// Admin ids are Telegram user ids, which double as the private chat id.
pub fn chat_id(recipient: &Recipient) -> Result<ChatId, DeliveryError> {
    recipient
        .as_str()
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| DeliveryError::InvalidRecipient(recipient.to_string()))
}

/// Sends notifications through the Bot API.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DeliveryError> {
        let chat = chat_id(recipient)?;
        self.bot
            .send_message(chat, text)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        debug!(chat_id = %chat, "notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id() {
        assert_eq!(chat_id(&Recipient::new("123")).unwrap(), ChatId(123));
        assert_eq!(chat_id(&Recipient::new("-100200")).unwrap(), ChatId(-100200));
    }

    #[test]
    fn test_invalid_chat_id() {
        let err = chat_id(&Recipient::new("@someone")).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRecipient(ref id) if id == "@someone"));
    }
}
