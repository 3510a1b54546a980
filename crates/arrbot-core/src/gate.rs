//! Admin allow-list and the privileged actions it guards.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::error::ControlError;
use crate::model::Recipient;
use crate::traits::ProcessControl;

/// Default bound on a restart or log fetch.
pub const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_secs(120);

/// Exact membership test of `requester_id` in `allow_list`.
pub fn authorize(requester_id: &str, allow_list: &HashSet<String>) -> bool {
    allow_list.contains(requester_id)
}

/// The configured set of admin identifiers.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    allow_list: HashSet<String>,
}

impl AdminGate {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow_list: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `requester_id` is an admin.
    pub fn authorize(&self, requester_id: &str) -> bool {
        authorize(requester_id, &self.allow_list)
    }

    /// Admins as notification recipients, in a stable order.
    pub fn recipients(&self) -> Vec<Recipient> {
        let mut recipients: Vec<Recipient> = self.allow_list.iter().map(|id| Recipient::new(id.clone())).collect();
        recipients.sort();
        recipients
    }

    pub fn is_empty(&self) -> bool {
        self.allow_list.is_empty()
    }
}

/// Outcome of a gated action.
#[derive(Debug)]
pub enum Gated<T> {
    /// The requester is not an admin; nothing was executed.
    Denied,
    Allowed(T),
}

/// Outcome of a restart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartResult {
    /// The requester is not an admin; nothing was executed.
    Denied,
    /// The restart command succeeded.
    Restarted,
    /// The restart failed; carries the command's error output verbatim.
    Failed(String),
}

/// Restart and log access for one process, behind the admin gate.
pub struct PrivilegedActions {
    gate: AdminGate,
    control: Arc<dyn ProcessControl>,
    process_name: String,
    control_timeout: Duration,
}

impl PrivilegedActions {
    pub fn new(gate: AdminGate, control: Arc<dyn ProcessControl>, process_name: impl Into<String>) -> Self {
        Self {
            gate,
            control,
            process_name: process_name.into(),
            control_timeout: DEFAULT_CONTROL_TIMEOUT,
        }
    }

    /// Bounds each restart and log fetch.
    pub fn with_control_timeout(mut self, limit: Duration) -> Self {
        self.control_timeout = limit;
        self
    }

    pub fn gate(&self) -> &AdminGate {
        &self.gate
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Restarts the process if `requester_id` is an admin.
    pub async fn restart(&self, requester_id: &str) -> RestartResult {
        if !self.gate.authorize(requester_id) {
            warn!(requester = %requester_id, process = %self.process_name, "unauthorized restart attempt");
            return RestartResult::Denied;
        }

        info!(requester = %requester_id, process = %self.process_name, "restarting process");
        let result = timeout(self.control_timeout, self.control.restart(&self.process_name))
            .await
            .unwrap_or(Err(ControlError::Timeout(self.control_timeout)));

        match result {
            Ok(outcome) if outcome.succeeded => {
                info!(process = %self.process_name, "restart succeeded");
                RestartResult::Restarted
            }
            Ok(outcome) => {
                error!(process = %self.process_name, stderr = %outcome.error_output, "restart command failed");
                RestartResult::Failed(outcome.error_output)
            }
            Err(e) => {
                error!(process = %self.process_name, error = %e, "could not run restart command");
                RestartResult::Failed(e.to_string())
            }
        }
    }

    /// Fetches the last `lines` log lines if `requester_id` is an admin.
    pub async fn logs(&self, requester_id: &str, lines: usize) -> Gated<Result<String, ControlError>> {
        if !self.gate.authorize(requester_id) {
            warn!(requester = %requester_id, process = %self.process_name, "unauthorized log request");
            return Gated::Denied;
        }
        let result = timeout(self.control_timeout, self.control.logs(&self.process_name, lines))
            .await
            .unwrap_or(Err(ControlError::Timeout(self.control_timeout)));
        if let Err(e) = &result {
            warn!(process = %self.process_name, error = %e, "log fetch failed");
        }
        Gated::Allowed(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RestartOutcome;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeControl {
        outcome: RestartOutcome,
        restarts: AtomicUsize,
    }

    impl FakeControl {
        fn new(succeeded: bool, error_output: &str) -> Self {
            Self {
                outcome: RestartOutcome {
                    succeeded,
                    error_output: error_output.to_string(),
                },
                restarts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProcessControl for FakeControl {
        async fn restart(&self, _process_name: &str) -> Result<RestartOutcome, ControlError> {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }

        async fn logs(&self, process_name: &str, lines: usize) -> Result<String, ControlError> {
            Ok(format!("{process_name}: last {lines} lines"))
        }
    }

    /// Control whose commands never finish.
    struct HangingControl;

    #[async_trait]
    impl ProcessControl for HangingControl {
        async fn restart(&self, _process_name: &str) -> Result<RestartOutcome, ControlError> {
            std::future::pending().await
        }

        async fn logs(&self, _process_name: &str, _lines: usize) -> Result<String, ControlError> {
            std::future::pending().await
        }
    }

    fn allow_list(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_authorize_membership() {
        let admins = allow_list(&["123", "456"]);
        assert!(!authorize("999", &admins));
        assert!(authorize("123", &admins));
        assert!(authorize("456", &admins));
    }

    #[test]
    fn test_authorize_is_exact() {
        let admins = allow_list(&["123"]);
        assert!(!authorize("12", &admins));
        assert!(!authorize("1234", &admins));
        assert!(!authorize(" 123", &admins));
        assert!(!authorize("", &admins));
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let gate = AdminGate::default();
        assert!(gate.is_empty());
        assert!(!gate.authorize("123"));
    }

    #[test]
    fn test_recipients_are_sorted() {
        let gate = AdminGate::new(["456", "123"]);
        assert_eq!(gate.recipients(), vec![Recipient::from("123"), Recipient::from("456")]);
    }

    #[tokio::test]
    async fn test_denied_restart_does_not_run() {
        let control = Arc::new(FakeControl::new(true, ""));
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), control.clone(), "protonvpn");

        assert_eq!(actions.restart("999").await, RestartResult::Denied);
        assert_eq!(control.restarts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_restart() {
        let control = Arc::new(FakeControl::new(true, ""));
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), control.clone(), "protonvpn");

        assert_eq!(actions.restart("123").await, RestartResult::Restarted);
        assert_eq!(control.restarts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_restart_carries_stderr() {
        let control = Arc::new(FakeControl::new(false, "no such service: protonvpn"));
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), control, "protonvpn");

        assert_eq!(
            actions.restart("123").await,
            RestartResult::Failed("no such service: protonvpn".to_string())
        );
    }

    #[tokio::test]
    async fn test_logs_are_gated() {
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), Arc::new(FakeControl::new(true, "")), "protonvpn");

        assert!(matches!(actions.logs("999", 10).await, Gated::Denied));
        match actions.logs("123", 10).await {
            Gated::Allowed(Ok(logs)) => assert_eq!(logs, "protonvpn: last 10 lines"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_restart_times_out() {
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), Arc::new(HangingControl), "protonvpn")
            .with_control_timeout(Duration::from_secs(30));

        assert_eq!(
            actions.restart("123").await,
            RestartResult::Failed("timed out after 30s".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_log_fetch_times_out() {
        let actions = PrivilegedActions::new(AdminGate::new(["123"]), Arc::new(HangingControl), "protonvpn")
            .with_control_timeout(Duration::from_secs(30));

        match actions.logs("123", 10).await {
            Gated::Allowed(Err(ControlError::Timeout(limit))) => assert_eq!(limit, Duration::from_secs(30)),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
