//! Command handlers for the Telegram bot.
//!
//! Handlers compute their replies in [`replies`] without touching the Bot
//! API, then [`handle_command`] sends them. Backend and runtime failures
//! become reply text here and never reach the dispatcher.

use std::sync::Arc;

use arrbot_core::{split_chunks, BackendError, CheckReport, Gated, QueueKind, ReportOutcome, RestartResult};
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::commands::{parse_log_lines, CommandKind, ParsedCommand, MAX_LOG_LINES};
use crate::state::BotState;

/// Longest reply sent in one message.
const MAX_MESSAGE_CHARS: usize = 4000;

const NOT_AUTHORIZED: &str = "⛔ You are not authorized to use this command.";
const MONITORING_DISABLED: &str = "Container management is not enabled.";

/// Handle a parsed slash command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: ParsedCommand,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let requester = msg.from.as_ref().map(|u| u.id.0.to_string());
    info!(chat_id = %msg.chat.id, requester = ?requester, command = ?cmd, "command received");

    for reply in replies(&state, requester.as_deref(), &cmd).await {
        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
            warn!(chat_id = %msg.chat.id, error = %e, "failed to send reply chunk");
        }
    }
    Ok(())
}

/// Computes the replies for `cmd` sent by `requester` (a Telegram user id).
pub async fn replies(state: &BotState, requester: Option<&str>, cmd: &ParsedCommand) -> Vec<String> {
    let (kind, args) = match cmd {
        ParsedCommand::Known { kind, args } => (*kind, args.as_str()),
        ParsedCommand::Unknown(name) => {
            return vec![format!(
                "Unknown command: /{}\n\nUse /{} to see available commands.",
                name,
                state.commands.primary(CommandKind::Help)
            )];
        }
    };

    match kind {
        CommandKind::Start => vec![format!(
            "Welcome to arrbot! 🎬\n\nI report download progress from your media stack.\n\n{}",
            state.commands.help_text(state.monitoring_enabled())
        )],
        CommandKind::Help => vec![state.commands.help_text(state.monitoring_enabled())],
        CommandKind::Status => queue_status(state, kind, QueueKind::Torrents, args).await,
        CommandKind::StatusMovie => queue_status(state, kind, QueueKind::Movies, args).await,
        CommandKind::StatusShow => queue_status(state, kind, QueueKind::Shows, args).await,
        CommandKind::Restart => vec![restart(state, requester).await],
        CommandKind::ProcessStatus => vec![process_status(state, requester).await],
        CommandKind::ProcessLogs => process_logs(state, requester, args).await,
    }
}

async fn queue_status(state: &BotState, kind: CommandKind, queue: QueueKind, query: &str) -> Vec<String> {
    if query.is_empty() {
        return vec![format!("Usage: {}", state.commands.usage(kind))];
    }

    match state.queues.status(queue, query).await {
        Ok(ReportOutcome::Report(report)) => {
            if report.omitted() > 0 {
                info!(queue = %queue, query = %query, omitted = report.omitted(), "report truncated");
            }
            report.chunks
        }
        Ok(ReportOutcome::NoMatch) => vec![format!("{} was not found...", query)],
        Err(BackendError::NotConfigured(_)) => vec![format!("{} status is not configured.", capitalize(queue.as_str()))],
        Err(e) => {
            warn!(queue = %queue, error = %e, "queue status failed");
            vec![format!("❌ Could not fetch {}: {}", queue, e)]
        }
    }
}

async fn restart(state: &BotState, requester: Option<&str>) -> String {
    let Some(monitoring) = &state.monitoring else {
        return MONITORING_DISABLED.to_string();
    };
    let Some(requester) = requester else {
        return NOT_AUTHORIZED.to_string();
    };

    let name = monitoring.actions.process_name();
    match monitoring.actions.restart(requester).await {
        RestartResult::Denied => NOT_AUTHORIZED.to_string(),
        RestartResult::Restarted => format!("✅ Container {} restarted.", name),
        RestartResult::Failed(stderr) if stderr.is_empty() => format!("❌ Failed to restart {}.", name),
        RestartResult::Failed(stderr) => format!("❌ Failed to restart {}:\n{}", name, stderr),
    }
}

async fn process_status(state: &BotState, requester: Option<&str>) -> String {
    let Some(monitoring) = &state.monitoring else {
        return MONITORING_DISABLED.to_string();
    };
    if !requester.is_some_and(|id| state.gate.authorize(id)) {
        warn!(requester = ?requester, "unauthorized status check");
        return NOT_AUTHORIZED.to_string();
    }

    let name = monitoring.watchdog.process_name();
    match monitoring.watchdog.check_now().await {
        CheckReport::Checked { outcome, alert } => {
            let mut reply = format!("Container {} is {}.", name, outcome.current);
            if let Some(report) = alert {
                reply.push_str(&format!(
                    "\n\nAlert sent to {} of {} admins.",
                    report.delivered().len(),
                    report.len()
                ));
            }
            reply
        }
        CheckReport::ProbeFailed(e) => {
            error!(container = %name, error = %e, "on-demand check failed");
            let mut reply = format!("❌ Could not check {}: {}", name, e);
            let last = monitoring.watchdog.monitor().snapshot(name).await;
            if let Some(at) = last.last_checked_wall {
                reply.push_str(&format!(
                    "\nLast known: {} at {}",
                    last.last_known,
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                ));
            }
            reply
        }
        CheckReport::Skipped => format!("Container {} was checked recently.", name),
    }
}

async fn process_logs(state: &BotState, requester: Option<&str>, args: &str) -> Vec<String> {
    let Some(monitoring) = &state.monitoring else {
        return vec![MONITORING_DISABLED.to_string()];
    };
    let Some(requester) = requester else {
        return vec![NOT_AUTHORIZED.to_string()];
    };
    let Some(lines) = parse_log_lines(args) else {
        return vec![format!(
            "Usage: {} (1-{})",
            state.commands.usage(CommandKind::ProcessLogs),
            MAX_LOG_LINES
        )];
    };

    let name = monitoring.actions.process_name();
    match monitoring.actions.logs(requester, lines).await {
        Gated::Denied => vec![NOT_AUTHORIZED.to_string()],
        Gated::Allowed(Ok(logs)) if logs.trim().is_empty() => vec![format!("No log output from {}.", name)],
        Gated::Allowed(Ok(logs)) => split_chunks(&logs, MAX_MESSAGE_CHARS),
        Gated::Allowed(Err(e)) => {
            error!(container = %name, error = %e, "failed to fetch logs");
            vec![format!("❌ Failed to fetch logs for {}: {}", name, e)]
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
