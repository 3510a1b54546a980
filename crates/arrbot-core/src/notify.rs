//! Down notifications for admins.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::DeliveryError;
use crate::model::Recipient;
use crate::traits::MessageSender;

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-recipient delivery results, in recipient order.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    results: Vec<(Recipient, Result<(), DeliveryError>)>,
}

impl DeliveryReport {
    /// All results in send order.
    pub fn results(&self) -> &[(Recipient, Result<(), DeliveryError>)] {
        &self.results
    }

    /// Recipients that received the message.
    pub fn delivered(&self) -> Vec<&Recipient> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(recipient, _)| recipient)
            .collect()
    }

    /// Recipients that did not, with the reason.
    pub fn failed(&self) -> Vec<(&Recipient, &DeliveryError)> {
        self.results
            .iter()
            .filter_map(|(recipient, r)| r.as_ref().err().map(|e| (recipient, e)))
            .collect()
    }

    /// Whether the message reached `recipient`.
    pub fn is_delivered(&self, recipient: &Recipient) -> bool {
        self.results
            .iter()
            .any(|(r, result)| r == recipient && result.is_ok())
    }

    pub fn all_delivered(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Builds the admin alert for a stopped process.
pub fn down_message(process_name: &str, restart_command: Option<&str>) -> String {
    let mut message = format!("⚠️ Container {} is not running!", process_name);
    if let Some(command) = restart_command {
        message.push_str(&format!("\n\nUse /{} to restart it.", command));
    }
    message
}

/// Sends down alerts to every recipient with per-recipient failure isolation.
pub struct NotificationDispatcher {
    sender: Arc<dyn MessageSender>,
    send_timeout: Duration,
    restart_command: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self {
            sender,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            restart_command: None,
        }
    }

    /// Sets the per-send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Names the chat command admins can use to restart, for the alert text.
    pub fn with_restart_command(mut self, command: impl Into<String>) -> Self {
        self.restart_command = Some(command.into());
        self
    }

    /// Sends `text` to each recipient in turn.
    ///
    /// A failed or timed-out send is logged and recorded; the remaining
    /// recipients are still attempted.
    pub async fn broadcast(&self, recipients: &[Recipient], text: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for recipient in recipients {
            let result = match tokio::time::timeout(self.send_timeout, self.sender.send(recipient, text)).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(self.send_timeout)),
            };

            match &result {
                Ok(()) => info!(recipient = %recipient, "notification sent"),
                Err(e) => warn!(recipient = %recipient, error = %e, "failed to send notification"),
            }

            report.results.push((recipient.clone(), result));
        }

        report
    }

    /// Alerts every recipient that `process_name` is down.
    pub async fn notify_down(&self, process_name: &str, recipients: &[Recipient]) -> DeliveryReport {
        let message = down_message(process_name, self.restart_command.as_deref());
        let report = self.broadcast(recipients, &message).await;
        info!(
            process = %process_name,
            delivered = report.delivered().len(),
            failed = report.failed().len(),
            "down notification dispatched"
        );
        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Mutex;

    /// Sender that records deliveries and fails for chosen recipients.
    #[derive(Default)]
    pub(crate) struct RecordingSender {
        pub(crate) failing: HashSet<String>,
        pub(crate) sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub(crate) fn failing_for(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DeliveryError> {
            if self.failing.contains(recipient.as_str()) {
                return Err(DeliveryError::Transport("chat not found".into()));
            }
            self.sent
                .lock()
                .await
                .push((recipient.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct SlowSender;

    #[async_trait]
    impl MessageSender for SlowSender {
        async fn send(&self, _recipient: &Recipient, _text: &str) -> Result<(), DeliveryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn recipients(ids: &[&str]) -> Vec<Recipient> {
        ids.iter().map(|id| Recipient::from(*id)).collect()
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_recipients() {
        let sender = Arc::new(RecordingSender::failing_for(&["2"]));
        let dispatcher = NotificationDispatcher::new(sender.clone());
        let admins = recipients(&["1", "2", "3"]);

        let report = dispatcher.notify_down("protonvpn", &admins).await;

        assert_eq!(report.len(), 3);
        assert!(report.is_delivered(&admins[0]));
        assert!(!report.is_delivered(&admins[1]));
        assert!(report.is_delivered(&admins[2]));
        assert!(!report.all_delivered());

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, &admins[1]);

        let sent = sender.sent.lock().await;
        let ids: Vec<&str> = sent.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(sent[0].1.contains("protonvpn"));
    }

    #[tokio::test]
    async fn test_restart_hint_in_message() {
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = NotificationDispatcher::new(sender.clone()).with_restart_command("restart_vpn");

        let report = dispatcher.notify_down("protonvpn", &recipients(&["1"])).await;
        assert!(report.all_delivered());

        let sent = sender.sent.lock().await;
        assert!(sent[0].1.contains("/restart_vpn"));
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let dispatcher = NotificationDispatcher::new(Arc::new(RecordingSender::default()));
        let report = dispatcher.notify_down("protonvpn", &[]).await;
        assert!(report.is_empty());
        assert!(report.all_delivered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_timeout_is_a_failure() {
        let dispatcher = NotificationDispatcher::new(Arc::new(SlowSender))
            .with_send_timeout(Duration::from_secs(1));
        let admins = recipients(&["1", "2"]);

        let report = dispatcher.notify_down("protonvpn", &admins).await;

        assert_eq!(report.failed().len(), 2);
        assert!(matches!(report.failed()[0].1, DeliveryError::Timeout(_)));
    }

    #[test]
    fn test_down_message_without_hint() {
        let message = down_message("protonvpn", None);
        assert!(message.contains("protonvpn"));
        assert!(!message.contains('/'));
    }
}
