//! Chat command routing.
//!
//! Command names are configurable aliases, so they are resolved at runtime
//! through a [`CommandTable`] instead of a derived command enum.

use std::collections::HashMap;

use arrbot_core::CommandAliases;
use teloxide::types::BotCommand;

/// Default number of log lines for the logs command.
pub const DEFAULT_LOG_LINES: usize = 10;

/// Upper bound on requested log lines.
pub const MAX_LOG_LINES: usize = 200;

/// What a chat command does, independent of the alias used to invoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Help,
    /// Torrent progress for a title.
    Status,
    /// Movie queue progress for a title.
    StatusMovie,
    /// Show queue progress for a title.
    StatusShow,
    /// Restart the monitored container.
    Restart,
    /// Check the monitored container now.
    ProcessStatus,
    /// Tail the monitored container's logs.
    ProcessLogs,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        CommandKind::Start,
        CommandKind::Help,
        CommandKind::Status,
        CommandKind::StatusMovie,
        CommandKind::StatusShow,
        CommandKind::Restart,
        CommandKind::ProcessStatus,
        CommandKind::ProcessLogs,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Start => "Start the bot",
            CommandKind::Help => "Show this help",
            CommandKind::Status => "Torrent progress for a title",
            CommandKind::StatusMovie => "Movie download progress for a title",
            CommandKind::StatusShow => "Show download progress for a title",
            CommandKind::Restart => "Restart the VPN container (admin)",
            CommandKind::ProcessStatus => "Check the VPN container now (admin)",
            CommandKind::ProcessLogs => "Recent VPN container logs (admin)",
        }
    }

    /// Argument placeholder shown in help text.
    pub fn usage_arg(&self) -> Option<&'static str> {
        match self {
            CommandKind::Status | CommandKind::StatusMovie | CommandKind::StatusShow => Some("<name>"),
            CommandKind::ProcessLogs => Some("[lines]"),
            _ => None,
        }
    }

    /// Commands that only make sense with container monitoring enabled.
    pub fn needs_monitor(&self) -> bool {
        matches!(
            self,
            CommandKind::Restart | CommandKind::ProcessStatus | CommandKind::ProcessLogs
        )
    }
}

/// A slash command parsed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// A configured alias with its trimmed argument text.
    Known { kind: CommandKind, args: String },
    /// A slash command that matches no alias, without the leading `/`.
    Unknown(String),
}

/// Alias lookup built once from configuration.
#[derive(Debug, Clone)]
pub struct CommandTable {
    lookup: HashMap<String, CommandKind>,
    aliases: CommandAliases,
}

impl CommandTable {
    pub fn new(aliases: &CommandAliases) -> Self {
        let mut lookup = HashMap::new();
        for kind in CommandKind::ALL {
            for alias in group(aliases, kind) {
                lookup.insert(alias.to_ascii_lowercase(), kind);
            }
        }
        Self {
            lookup,
            aliases: aliases.clone(),
        }
    }

    /// All aliases for `kind`, primary first.
    pub fn aliases(&self, kind: CommandKind) -> &[String] {
        group(&self.aliases, kind)
    }

    /// The alias shown in help and hints.
    pub fn primary(&self, kind: CommandKind) -> &str {
        self.aliases(kind).first().map(String::as_str).unwrap_or_default()
    }

    /// Parses `/name[@bot] args`.
    ///
    /// Returns `None` for plain text and for commands addressed to another
    /// bot. Unmatched names come back as [`ParsedCommand::Unknown`].
    pub fn parse(&self, text: &str, bot_username: Option<&str>) -> Option<ParsedCommand> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };

        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (head, None),
        };

        if let (Some(mention), Some(me)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(me) {
                return None;
            }
        }

        if name.is_empty() {
            return None;
        }

        let name = name.to_ascii_lowercase();
        Some(match self.lookup.get(&name) {
            Some(&kind) => ParsedCommand::Known {
                kind,
                args: args.to_string(),
            },
            None => ParsedCommand::Unknown(name),
        })
    }

    /// Usage line for a command, e.g. `/status <name>`.
    pub fn usage(&self, kind: CommandKind) -> String {
        match kind.usage_arg() {
            Some(arg) => format!("/{} {}", self.primary(kind), arg),
            None => format!("/{}", self.primary(kind)),
        }
    }

    /// Help text listing every available command and its aliases.
    pub fn help_text(&self, monitoring: bool) -> String {
        let mut text = String::from("Available commands:\n");
        for kind in CommandKind::ALL {
            if kind.needs_monitor() && !monitoring {
                continue;
            }
            text.push_str(&format!("\n{} - {}", self.usage(kind), kind.description()));
            let others = self.aliases(kind).get(1..).unwrap_or_default();
            if !others.is_empty() {
                let others: Vec<String> = others.iter().map(|a| format!("/{}", a)).collect();
                text.push_str(&format!(" (also {})", others.join(", ")));
            }
        }
        text
    }

    /// Commands registered with Telegram for the client-side menu.
    pub fn bot_commands(&self, monitoring: bool) -> Vec<BotCommand> {
        CommandKind::ALL
            .into_iter()
            .filter(|kind| monitoring || !kind.needs_monitor())
            .map(|kind| BotCommand::new(self.primary(kind), kind.description()))
            .collect()
    }
}

fn group(aliases: &CommandAliases, kind: CommandKind) -> &[String] {
    match kind {
        CommandKind::Start => &aliases.start,
        CommandKind::Help => &aliases.help,
        CommandKind::Status => &aliases.status,
        CommandKind::StatusMovie => &aliases.status_movie,
        CommandKind::StatusShow => &aliases.status_show,
        CommandKind::Restart => &aliases.restart,
        CommandKind::ProcessStatus => &aliases.process_status,
        CommandKind::ProcessLogs => &aliases.process_logs,
    }
}

/// Parses the optional line count for the logs command.
///
/// Empty means the default; values are capped at [`MAX_LOG_LINES`].
pub fn parse_log_lines(args: &str) -> Option<usize> {
    if args.is_empty() {
        return Some(DEFAULT_LOG_LINES);
    }
    match args.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n.min(MAX_LOG_LINES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CommandTable {
        CommandTable::new(&CommandAliases::default())
    }

    fn known(kind: CommandKind, args: &str) -> Option<ParsedCommand> {
        Some(ParsedCommand::Known {
            kind,
            args: args.to_string(),
        })
    }

    #[test]
    fn test_parse_with_arguments() {
        let table = table();
        assert_eq!(table.parse("/status the office", None), known(CommandKind::Status, "the office"));
        assert_eq!(table.parse("/status   office  ", None), known(CommandKind::Status, "office"));
        assert_eq!(table.parse("/status", None), known(CommandKind::Status, ""));
    }

    #[test]
    fn test_every_alias_resolves() {
        let table = table();
        assert_eq!(table.parse("/statusmovie dune", None), known(CommandKind::StatusMovie, "dune"));
        assert_eq!(table.parse("/status_movie dune", None), known(CommandKind::StatusMovie, "dune"));
        assert_eq!(table.parse("/statusshows office", None), known(CommandKind::StatusShow, "office"));
        assert_eq!(table.parse("/restart", None), known(CommandKind::Restart, ""));
        assert_eq!(table.parse("/restart_vpn", None), known(CommandKind::Restart, ""));
        assert_eq!(table.parse("/vpn_logs 50", None), known(CommandKind::ProcessLogs, "50"));
    }

    #[test]
    fn test_command_names_are_case_insensitive() {
        assert_eq!(table().parse("/StatusMovie dune", None), known(CommandKind::StatusMovie, "dune"));
    }

    #[test]
    fn test_bot_mention() {
        let table = table();
        assert_eq!(
            table.parse("/status@ArrBot office", Some("arrbot")),
            known(CommandKind::Status, "office")
        );
        assert_eq!(table.parse("/status@OtherBot office", Some("arrbot")), None);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        let table = table();
        assert_eq!(table.parse("status office", None), None);
        assert_eq!(table.parse("/", None), None);
        assert_eq!(table.parse("/ status", None), None);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(table().parse("/connect foo", None), Some(ParsedCommand::Unknown("connect".into())));
    }

    #[test]
    fn test_custom_aliases() {
        let aliases = CommandAliases {
            status: vec!["torrent".into(), "t".into()],
            ..CommandAliases::default()
        };
        let table = CommandTable::new(&aliases);
        assert_eq!(table.parse("/t office", None), known(CommandKind::Status, "office"));
        assert_eq!(table.parse("/status office", None), Some(ParsedCommand::Unknown("status".into())));
        assert_eq!(table.primary(CommandKind::Status), "torrent");
    }

    #[test]
    fn test_help_lists_aliases() {
        let help = table().help_text(true);
        assert!(help.contains("/status <name> - Torrent progress for a title"));
        assert!(help.contains("/status_movie <name>"));
        assert!(help.contains("(also /statusmovie)"));
        assert!(help.contains("/restart_vpn - Restart the VPN container (admin) (also /restart)"));
        assert!(help.contains("/vpn_logs [lines]"));
    }

    #[test]
    fn test_help_hides_monitor_commands_when_disabled() {
        let help = table().help_text(false);
        assert!(help.contains("/status <name>"));
        assert!(!help.contains("restart"));
        assert!(!help.contains("vpn_"));

        let commands = table().bot_commands(false);
        assert_eq!(commands.len(), 5);
        assert_eq!(table().bot_commands(true).len(), 8);
    }

    #[test]
    fn test_parse_log_lines() {
        assert_eq!(parse_log_lines(""), Some(DEFAULT_LOG_LINES));
        assert_eq!(parse_log_lines("25"), Some(25));
        assert_eq!(parse_log_lines("5000"), Some(MAX_LOG_LINES));
        assert_eq!(parse_log_lines("0"), None);
        assert_eq!(parse_log_lines("-3"), None);
        assert_eq!(parse_log_lines("many"), None);
    }
}
