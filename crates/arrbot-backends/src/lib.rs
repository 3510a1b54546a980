//! Backend clients for arrbot.
//!
//! Each client implements one of the collaborator traits from `arrbot-core`:
//! - [`TransmissionClient`]: torrent transfers over Transmission RPC ([`WorkSource`])
//! - [`ArrClient`]: Sonarr and Radarr download queues ([`WorkSource`])
//! - [`DockerRuntime`]: container liveness, restart and logs
//!   ([`ProcessProbe`], [`ProcessControl`])
//!
//! Clients hold no per-request state; every call fetches fresh data.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use arrbot_backends::TransmissionClient;
//! use arrbot_core::{TransmissionConfig, WorkSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TransmissionConfig {
//!     host: "localhost".into(),
//!     port: 9091,
//!     username: None,
//!     password: None,
//! };
//! let client = TransmissionClient::new(&config, Duration::from_secs(30))?;
//! for item in client.fetch_work_items().await? {
//!     println!("{} {:.1}%", item.name, item.progress);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`WorkSource`]: arrbot_core::WorkSource
//! [`ProcessProbe`]: arrbot_core::ProcessProbe
//! [`ProcessControl`]: arrbot_core::ProcessControl

pub mod arr;
pub mod docker;
pub mod transmission;

pub use arr::{parse_queue, ArrClient};
pub use docker::{container_listed, DockerRuntime};
pub use transmission::{parse_torrents, status_label, TransmissionClient};

use std::time::Duration;

use arrbot_core::BackendError;

/// Builds the shared HTTP client with a per-request timeout.
fn http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http_error)
}

fn http_error(e: reqwest::Error) -> BackendError {
    BackendError::Http(e.to_string())
}
