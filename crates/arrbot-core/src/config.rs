//! Bot configuration.
//!
//! Configuration comes from environment variables, optionally seeded from a
//! dotenv file. It is parsed once into an immutable [`BotConfig`] that is
//! shared by reference; nothing reads the environment after start-up.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//!
//! Backends (each disabled when unset):
//! - `SONARR_URL`, `SONARR_API_KEY`
//! - `RADARR_URL`, `RADARR_API_KEY`
//! - `TRANSMISSION_HOST`, `TRANSMISSION_PORT` (default 9091),
//!   `TRANSMISSION_USERNAME`, `TRANSMISSION_PASSWORD`
//!
//! Container monitoring:
//! - `DOCKER_CONTAINER_MANAGEMENT_ENABLED` (default false)
//! - `DOCKER_CONTAINER_NAME`, `DOCKER_CONTAINER_RESTART_COMMAND` (required when enabled)
//! - `DOCKER_CONTAINER_RESTART_DIR`
//! - `DOCKER_STATUS_CHECK_INTERVAL` (seconds, default 300)
//! - `DOCKER_MIN_CHECK_INTERVAL` (seconds, default: the check interval)
//! - `DOCKER_PROBE_TIMEOUT` (seconds, default 15)
//! - `DOCKER_CONTROL_TIMEOUT` (seconds, default 120): restart and log fetch bound
//! - `DOCKER_NOTIFY_ON_FIRST_DOWN` (default true)
//!
//! General:
//! - `ARRBOT_ADMIN_IDS`: comma-separated Telegram user ids
//! - `ARRBOT_HTTP_TIMEOUT`, `ARRBOT_SEND_TIMEOUT` (seconds)
//! - `ARRBOT_<COMMAND>_ALIASES`: comma-separated command aliases

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const ADMIN_IDS_ENV: &str = "ARRBOT_ADMIN_IDS";
pub const HTTP_TIMEOUT_ENV: &str = "ARRBOT_HTTP_TIMEOUT";
pub const SEND_TIMEOUT_ENV: &str = "ARRBOT_SEND_TIMEOUT";

const DEFAULT_TRANSMISSION_PORT: u16 = 9091;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CONTROL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

/// Longest alias Telegram accepts as a bot command.
const MAX_ALIAS_LEN: usize = 32;

/// Transmission RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A Sonarr or Radarr instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrConfig {
    pub url: String,
    pub api_key: String,
}

/// Container liveness monitoring and restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub container_name: String,
    pub restart_command: String,
    /// Working directory for the restart command, `~` already expanded.
    pub restart_dir: Option<PathBuf>,
    pub check_interval: Duration,
    pub min_check_interval: Duration,
    pub probe_timeout: Duration,
    /// Bound on the restart command and on log fetches.
    pub control_timeout: Duration,
    pub notify_on_first_down: bool,
}

/// Chat command aliases, lowercase and without the leading `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAliases {
    pub start: Vec<String>,
    pub help: Vec<String>,
    pub status: Vec<String>,
    pub status_movie: Vec<String>,
    pub status_show: Vec<String>,
    pub restart: Vec<String>,
    pub process_status: Vec<String>,
    pub process_logs: Vec<String>,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for CommandAliases {
    fn default() -> Self {
        Self {
            start: aliases(&["start"]),
            help: aliases(&["help"]),
            status: aliases(&["status"]),
            status_movie: aliases(&["status_movie", "statusmovie"]),
            status_show: aliases(&["status_show", "statusshows"]),
            restart: aliases(&["restart_vpn", "restart"]),
            process_status: aliases(&["vpn_status"]),
            process_logs: aliases(&["vpn_logs"]),
        }
    }
}

impl CommandAliases {
    /// All alias groups with the variable that configures them.
    pub fn groups(&self) -> [(&'static str, &[String]); 8] {
        [
            ("ARRBOT_START_ALIASES", self.start.as_slice()),
            ("ARRBOT_HELP_ALIASES", self.help.as_slice()),
            ("ARRBOT_STATUS_ALIASES", self.status.as_slice()),
            ("ARRBOT_STATUS_MOVIE_ALIASES", self.status_movie.as_slice()),
            ("ARRBOT_STATUS_SHOW_ALIASES", self.status_show.as_slice()),
            ("ARRBOT_RESTART_ALIASES", self.restart.as_slice()),
            ("ARRBOT_PROCESS_STATUS_ALIASES", self.process_status.as_slice()),
            ("ARRBOT_PROCESS_LOGS_ALIASES", self.process_logs.as_slice()),
        ]
    }

    fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (key, group) in self.groups() {
            if group.is_empty() {
                return Err(invalid(key, "at least one alias is required"));
            }
            for alias in group {
                if alias.is_empty()
                    || alias.len() > MAX_ALIAS_LEN
                    || !alias.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
                {
                    return Err(invalid(key, format!("'{}' is not a valid command name", alias)));
                }
                if !seen.insert(alias.as_str()) {
                    return Err(invalid(key, format!("'{}' is used by more than one command", alias)));
                }
            }
        }
        Ok(())
    }
}

/// Complete bot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub telegram_token: String,
    pub admin_ids: Vec<String>,
    pub transmission: Option<TransmissionConfig>,
    pub sonarr: Option<ArrConfig>,
    pub radarr: Option<ArrConfig>,
    pub monitor: Option<MonitorConfig>,
    pub aliases: CommandAliases,
    pub http_timeout: Duration,
    pub send_timeout: Duration,
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Typed access over a variable lookup. Empty values count as unset.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn secs(&self, key: &str, default: u64) -> Result<Duration> {
        match self.get(key) {
            None => Ok(Duration::from_secs(default)),
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| invalid(key, format!("expected whole seconds, got '{}'", raw))),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(key, format!("expected a boolean, got '{}'", v))),
            },
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    fn aliases(&self, key: &str, default: &[String]) -> Vec<String> {
        self.list(key)
            .map(|names| {
                names
                    .into_iter()
                    .map(|n| n.trim_start_matches('/').to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_else(|| default.to_vec())
    }

    fn arr(&self, url_key: &str, key_key: &'static str) -> Result<Option<ArrConfig>> {
        let Some(url) = self.get(url_key) else {
            return Ok(None);
        };
        Ok(Some(ArrConfig {
            url: url.trim_end_matches('/').to_string(),
            api_key: self.require(key_key)?,
        }))
    }
}

impl BotConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration from a dotenv file, with the process environment
    /// taking precedence over the file.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let file = dotenvy::from_path_iter(path)?
            .collect::<std::result::Result<HashMap<String, String>, dotenvy::Error>>()?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Reads configuration through `lookup` and validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let transmission = match vars.get("TRANSMISSION_HOST") {
            None => None,
            Some(host) => {
                let port = match vars.get("TRANSMISSION_PORT") {
                    None => DEFAULT_TRANSMISSION_PORT,
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| invalid("TRANSMISSION_PORT", format!("expected a port, got '{}'", raw)))?,
                };
                Some(TransmissionConfig {
                    host,
                    port,
                    username: vars.get("TRANSMISSION_USERNAME"),
                    password: vars.get("TRANSMISSION_PASSWORD"),
                })
            }
        };

        let monitor = if vars.flag("DOCKER_CONTAINER_MANAGEMENT_ENABLED", false)? {
            let check_interval = vars.secs("DOCKER_STATUS_CHECK_INTERVAL", DEFAULT_CHECK_INTERVAL_SECS)?;
            Some(MonitorConfig {
                container_name: vars.require("DOCKER_CONTAINER_NAME")?,
                restart_command: vars.require("DOCKER_CONTAINER_RESTART_COMMAND")?,
                restart_dir: vars
                    .get("DOCKER_CONTAINER_RESTART_DIR")
                    .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned())),
                check_interval,
                min_check_interval: vars.secs("DOCKER_MIN_CHECK_INTERVAL", check_interval.as_secs())?,
                probe_timeout: vars.secs("DOCKER_PROBE_TIMEOUT", DEFAULT_PROBE_TIMEOUT_SECS)?,
                control_timeout: vars.secs("DOCKER_CONTROL_TIMEOUT", DEFAULT_CONTROL_TIMEOUT_SECS)?,
                notify_on_first_down: vars.flag("DOCKER_NOTIFY_ON_FIRST_DOWN", true)?,
            })
        } else {
            None
        };

        let defaults = CommandAliases::default();
        let aliases = CommandAliases {
            start: vars.aliases("ARRBOT_START_ALIASES", &defaults.start),
            help: vars.aliases("ARRBOT_HELP_ALIASES", &defaults.help),
            status: vars.aliases("ARRBOT_STATUS_ALIASES", &defaults.status),
            status_movie: vars.aliases("ARRBOT_STATUS_MOVIE_ALIASES", &defaults.status_movie),
            status_show: vars.aliases("ARRBOT_STATUS_SHOW_ALIASES", &defaults.status_show),
            restart: vars.aliases("ARRBOT_RESTART_ALIASES", &defaults.restart),
            process_status: vars.aliases("ARRBOT_PROCESS_STATUS_ALIASES", &defaults.process_status),
            process_logs: vars.aliases("ARRBOT_PROCESS_LOGS_ALIASES", &defaults.process_logs),
        };

        let config = Self {
            telegram_token: vars.require(TOKEN_ENV)?,
            admin_ids: vars.list(ADMIN_IDS_ENV).unwrap_or_default(),
            transmission,
            sonarr: vars.arr("SONARR_URL", "SONARR_API_KEY")?,
            radarr: vars.arr("RADARR_URL", "RADARR_API_KEY")?,
            monitor,
            aliases,
            http_timeout: vars.secs(HTTP_TIMEOUT_ENV, DEFAULT_HTTP_TIMEOUT_SECS)?,
            send_timeout: vars.secs(SEND_TIMEOUT_ENV, DEFAULT_SEND_TIMEOUT_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout.is_zero() {
            return Err(invalid(HTTP_TIMEOUT_ENV, "must be greater than zero"));
        }
        if self.send_timeout.is_zero() {
            return Err(invalid(SEND_TIMEOUT_ENV, "must be greater than zero"));
        }
        if let Some(monitor) = &self.monitor {
            if monitor.check_interval.is_zero() {
                return Err(invalid("DOCKER_STATUS_CHECK_INTERVAL", "must be greater than zero"));
            }
            if monitor.probe_timeout.is_zero() {
                return Err(invalid("DOCKER_PROBE_TIMEOUT", "must be greater than zero"));
            }
            if monitor.control_timeout.is_zero() {
                return Err(invalid("DOCKER_CONTROL_TIMEOUT", "must be greater than zero"));
            }
        }
        self.aliases.validate()
    }
}
