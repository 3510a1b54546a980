//! End-to-end tests for the read path and the admin write path.

use std::sync::Arc;
use std::time::Duration;

use arrbot_core::{
    AdminGate, BackendError, CheckReport, ControlError, DeliveryError, Liveness, LivenessMonitor,
    MessageSender, NotificationDispatcher, PrivilegedActions, ProbeError, ProcessControl, ProcessProbe,
    QueueKind, QueueReporter, Recipient, ReportFormatter, ReportOutcome, RestartOutcome, RestartResult,
    Watchdog, WorkItem, WorkSource,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

struct FixedQueue(Vec<WorkItem>);

#[async_trait]
impl WorkSource for FixedQueue {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>, BackendError> {
        Ok(self.0.clone())
    }
}

/// A container that is down until restarted.
#[derive(Default)]
struct FakeContainer {
    running: Mutex<bool>,
}

#[async_trait]
impl ProcessProbe for FakeContainer {
    async fn probe(&self, _process_name: &str) -> Result<bool, ProbeError> {
        Ok(*self.running.lock().await)
    }
}

#[async_trait]
impl ProcessControl for FakeContainer {
    async fn restart(&self, _process_name: &str) -> Result<RestartOutcome, ControlError> {
        *self.running.lock().await = true;
        Ok(RestartOutcome {
            succeeded: true,
            error_output: String::new(),
        })
    }

    async fn logs(&self, _process_name: &str, _lines: usize) -> Result<String, ControlError> {
        Ok(String::new())
    }
}

#[derive(Default)]
struct Inbox {
    messages: Mutex<Vec<(Recipient, String)>>,
}

#[async_trait]
impl MessageSender for Inbox {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DeliveryError> {
        self.messages.lock().await.push((recipient.clone(), text.to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn test_office_query_orders_by_progress() {
    let queue = FixedQueue(vec![
        WorkItem::new("The Office", "Downloading", 42.0),
        WorkItem::new("Office Space", "Completed", 100.0),
    ]);
    let reporter = QueueReporter::new(ReportFormatter::new()).with_source(QueueKind::Torrents, Arc::new(queue));

    let outcome = reporter.status(QueueKind::Torrents, "office").await.unwrap();
    let ReportOutcome::Report(report) = outcome else {
        panic!("expected both items to match");
    };

    assert_eq!(report.entries, 2);
    assert_eq!(report.chunks.len(), 1);

    let text = &report.chunks[0];
    let space = text.find("Office Space").unwrap();
    let office = text.find("The Office").unwrap();
    assert!(space < office, "Office Space (100%) should come first");
    assert!(text.contains("1) Name: Office Space"));
    assert!(text.contains("2) Name: The Office"));
    assert!(text.contains("Status: Completed"));
    assert!(text.contains("100.00%"));
}

#[tokio::test]
async fn test_unknown_title_is_not_found() {
    let reporter = QueueReporter::default().with_source(
        QueueKind::Movies,
        Arc::new(FixedQueue(vec![WorkItem::new("Office Space", "Completed", 100.0)])),
    );

    let outcome = reporter.status(QueueKind::Movies, "parks and rec").await.unwrap();
    assert_eq!(outcome, ReportOutcome::NoMatch);
}

#[tokio::test]
async fn test_down_alert_then_admin_restart() {
    let container = Arc::new(FakeContainer::default());
    let inbox = Arc::new(Inbox::default());
    let gate = AdminGate::new(["123", "456"]);

    let monitor = Arc::new(LivenessMonitor::new(container.clone(), Duration::from_secs(300)));
    let dispatcher = Arc::new(NotificationDispatcher::new(inbox.clone()).with_restart_command("restart_vpn"));
    let watchdog = Watchdog::new(monitor, dispatcher, "protonvpn", gate.recipients());
    let actions = PrivilegedActions::new(gate, container.clone(), "protonvpn");

    // Container starts down: both admins are told.
    match watchdog.tick().await {
        CheckReport::Checked { outcome, alert: Some(report) } => {
            assert_eq!(outcome.current, Liveness::Down);
            assert!(report.all_delivered());
            assert_eq!(report.len(), 2);
        }
        other => panic!("expected a down alert, got {other:?}"),
    }

    // A stranger cannot restart it.
    assert_eq!(actions.restart("999").await, RestartResult::Denied);
    assert!(!*container.running.lock().await);

    // An admin can.
    assert_eq!(actions.restart("123").await, RestartResult::Restarted);

    // The timer is still rate limited, but an on-demand check sees it back up.
    assert!(matches!(watchdog.tick().await, CheckReport::Skipped));
    match watchdog.check_now().await {
        CheckReport::Checked { outcome, alert } => {
            assert_eq!(outcome.current, Liveness::Up);
            assert!(outcome.transition().is_some());
            assert!(alert.is_none());
        }
        other => panic!("expected a successful check, got {other:?}"),
    }

    let messages = inbox.messages.lock().await;
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|(_, text)| text.contains("protonvpn") && text.contains("/restart_vpn")));
}
