//! Shared state for the Telegram bot.

use std::sync::Arc;

use arrbot_backends::{ArrClient, DockerRuntime, TransmissionClient};
use arrbot_core::{
    AdminGate, BotConfig, LivenessMonitor, MessageSender, MonitorConfig, NotificationDispatcher,
    PrivilegedActions, ProcessControl, ProcessProbe, QueueKind, QueueReporter, ReportFormatter,
    Watchdog,
};
use tracing::info;

use crate::commands::{CommandKind, CommandTable};
use crate::error::Result;

/// Container monitoring wired to its probe, dispatcher and admin actions.
pub struct Monitoring {
    pub config: MonitorConfig,
    pub watchdog: Arc<Watchdog>,
    pub actions: PrivilegedActions,
}

/// Everything a handler needs, built once at start-up.
pub struct BotState {
    pub commands: CommandTable,
    pub queues: QueueReporter,
    pub gate: AdminGate,
    pub monitoring: Option<Monitoring>,
}

impl BotState {
    /// Builds the state with real backend clients.
    ///
    /// # Errors
    ///
    /// Fails if a backend URL is invalid or monitoring is enabled without a
    /// docker binary in PATH.
    pub fn from_config(config: BotConfig, sender: Arc<dyn MessageSender>) -> Result<Self> {
        let mut queues = QueueReporter::new(ReportFormatter::new());

        if let Some(transmission) = &config.transmission {
            let client = TransmissionClient::new(transmission, config.http_timeout)?;
            info!(url = %client.rpc_url(), "transmission enabled");
            queues = queues.with_source(QueueKind::Torrents, Arc::new(client));
        }
        if let Some(radarr) = &config.radarr {
            queues = queues.with_source(
                QueueKind::Movies,
                Arc::new(ArrClient::new("radarr", radarr, config.http_timeout)?),
            );
            info!(url = %radarr.url, "radarr enabled");
        }
        if let Some(sonarr) = &config.sonarr {
            queues = queues.with_source(
                QueueKind::Shows,
                Arc::new(ArrClient::new("sonarr", sonarr, config.http_timeout)?),
            );
            info!(url = %sonarr.url, "sonarr enabled");
        }

        let runtime = match &config.monitor {
            Some(monitor) => {
                let docker = DockerRuntime::new()?
                    .with_restart_command(monitor.restart_command.clone(), monitor.restart_dir.clone());
                info!(container = %monitor.container_name, "container monitoring enabled");
                Some(Arc::new(docker))
            }
            None => None,
        };

        let runtime = runtime.map(|docker| {
            let probe: Arc<dyn ProcessProbe> = docker.clone();
            let control: Arc<dyn ProcessControl> = docker;
            (probe, control)
        });

        Ok(Self::with_components(config, queues, runtime, sender))
    }

    /// Builds the state around caller-supplied collaborators.
    pub fn with_components(
        config: BotConfig,
        queues: QueueReporter,
        runtime: Option<(Arc<dyn ProcessProbe>, Arc<dyn ProcessControl>)>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        let commands = CommandTable::new(&config.aliases);
        let gate = AdminGate::new(config.admin_ids.iter().map(String::as_str));

        let monitoring = match (&config.monitor, runtime) {
            (Some(monitor), Some((probe, control))) => {
                let monitor_state = Arc::new(
                    LivenessMonitor::new(probe, monitor.min_check_interval)
                        .with_probe_timeout(monitor.probe_timeout),
                );
                let dispatcher = Arc::new(
                    NotificationDispatcher::new(sender)
                        .with_send_timeout(config.send_timeout)
                        .with_restart_command(commands.primary(CommandKind::Restart)),
                );
                let watchdog = Watchdog::new(
                    monitor_state,
                    dispatcher,
                    monitor.container_name.clone(),
                    gate.recipients(),
                )
                .with_notify_on_first_down(monitor.notify_on_first_down);
                let actions = PrivilegedActions::new(gate.clone(), control, monitor.container_name.clone())
                    .with_control_timeout(monitor.control_timeout);

                Some(Monitoring {
                    config: monitor.clone(),
                    watchdog: Arc::new(watchdog),
                    actions,
                })
            }
            _ => None,
        };

        Self {
            commands,
            queues,
            gate,
            monitoring,
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.is_some()
    }
}
