//! Docker container runtime.
//!
//! Liveness comes from `docker ps`, logs from `docker logs`, and restarts run
//! the operator's own shell command (usually a `docker compose up -d`) in an
//! optional working directory.

use std::path::{Path, PathBuf};
use std::process::Output;

use arrbot_core::{ControlError, ProbeError, ProcessControl, ProcessProbe, RestartOutcome};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

/// True if `docker ps --format {{.Names}}` output lists `container_name`.
///
/// The `name=` filter is itself a substring match, so containment is the
/// same test docker applied.
pub fn container_listed(stdout: &str, container_name: &str) -> bool {
    !container_name.is_empty() && stdout.contains(container_name)
}

/// Talks to the local docker daemon through the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    /// Path to the docker binary.
    docker_path: PathBuf,
    restart_command: Option<String>,
    restart_dir: Option<PathBuf>,
}

impl DockerRuntime {
    /// Creates a runtime using the docker binary found in PATH.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::ToolNotFound` if docker is not installed.
    pub fn new() -> Result<Self, ProbeError> {
        let docker_path = which::which("docker").map_err(|e| ProbeError::ToolNotFound(format!("docker: {}", e)))?;
        debug!(path = %docker_path.display(), "docker found");
        Ok(Self::with_binary(docker_path))
    }

    /// Creates a runtime that invokes `docker_path` instead of searching PATH.
    pub fn with_binary(docker_path: impl Into<PathBuf>) -> Self {
        Self {
            docker_path: docker_path.into(),
            restart_command: None,
            restart_dir: None,
        }
    }

    /// Sets the shell command run by [`ProcessControl::restart`].
    pub fn with_restart_command(mut self, command: impl Into<String>, dir: Option<PathBuf>) -> Self {
        self.restart_command = Some(command.into());
        self.restart_dir = dir;
        self
    }

    pub fn restart_dir(&self) -> Option<&Path> {
        self.restart_dir.as_deref()
    }

    /// Run a docker command and return the output.
    async fn run_docker(&self, args: &[&str]) -> std::io::Result<Output> {
        trace!(args = ?args, "running docker command");
        let output = Command::new(&self.docker_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;
        trace!(
            status = %output.status,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "docker command completed"
        );
        Ok(output)
    }
}

#[async_trait]
impl ProcessProbe for DockerRuntime {
    async fn probe(&self, process_name: &str) -> Result<bool, ProbeError> {
        let filter = format!("name={}", process_name);
        let output = self
            .run_docker(&["ps", "--filter", &filter, "--format", "{{.Names}}"])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProbeError::CommandFailed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(container_listed(&stdout, process_name))
    }
}

#[async_trait]
impl ProcessControl for DockerRuntime {
    async fn restart(&self, process_name: &str) -> Result<RestartOutcome, ControlError> {
        let command = self.restart_command.as_deref().ok_or(ControlError::NoCommand)?;
        info!(container = %process_name, command = %command, "restarting container");

        let mut shell = Command::new("sh");
        shell.arg("-c").arg(command).kill_on_drop(true);
        if let Some(dir) = &self.restart_dir {
            shell.current_dir(dir);
        }

        let output = shell.output().await?;
        let error_output = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if output.status.success() {
            info!(container = %process_name, "restart command succeeded");
        } else {
            warn!(container = %process_name, status = %output.status, stderr = %error_output, "restart command failed");
        }

        Ok(RestartOutcome {
            succeeded: output.status.success(),
            error_output,
        })
    }

    async fn logs(&self, process_name: &str, lines: usize) -> Result<String, ControlError> {
        let tail = lines.to_string();
        let output = self.run_docker(&["logs", "--tail", &tail, process_name]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ControlError::CommandFailed(stderr));
        }

        // docker logs replays the container's stderr on its own stderr.
        let mut logs = String::from_utf8_lossy(&output.stdout).to_string();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(logs)
    }
}
