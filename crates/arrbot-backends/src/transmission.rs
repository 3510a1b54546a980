//! Transmission RPC client.
//!
//! Transmission guards its RPC endpoint with a session id: the first request
//! is answered with `409 Conflict` and an `X-Transmission-Session-Id` header
//! that must be echoed on the retry. The client repeats that handshake on
//! every call instead of caching the id.

use std::time::Duration;

use arrbot_core::{BackendError, TransmissionConfig, WorkItem, WorkSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

use crate::{http_client, http_error};

const BACKEND: &str = "transmission";
const SESSION_HEADER: &str = "X-Transmission-Session-Id";
const RPC_PATH: &str = "/transmission/rpc";

/// Maps a numeric torrent status to its label.
pub fn status_label(status: i64) -> &'static str {
    match status {
        0 => "stopped",
        1 => "check pending",
        2 => "checking",
        3 => "download pending",
        4 => "downloading",
        5 => "seed pending",
        6 => "seeding",
        _ => "unknown",
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: Option<TorrentList>,
}

#[derive(Debug, Deserialize)]
struct TorrentList {
    #[serde(default)]
    torrents: Vec<Torrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Torrent {
    name: String,
    #[serde(default)]
    status: i64,
    #[serde(default)]
    percent_done: f64,
}

fn decode_error(reason: impl Into<String>) -> BackendError {
    BackendError::Decode {
        backend: BACKEND.to_string(),
        reason: reason.into(),
    }
}

/// Parses a `torrent-get` response body into work items.
pub fn parse_torrents(body: &str) -> Result<Vec<WorkItem>, BackendError> {
    let response: RpcResponse = serde_json::from_str(body).map_err(|e| decode_error(e.to_string()))?;

    if response.result != "success" {
        return Err(decode_error(format!("rpc result '{}'", response.result)));
    }

    let torrents = response.arguments.map(|a| a.torrents).unwrap_or_default();
    Ok(torrents
        .into_iter()
        .map(|t| WorkItem::from_ratio(t.name, status_label(t.status), t.percent_done))
        .collect())
}

/// Builds the RPC endpoint from a host (with or without scheme) and port.
fn rpc_url(host: &str, port: u16) -> Result<Url, BackendError> {
    let base = if host.contains("://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", host)
    };

    let mut url = Url::parse(&base).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base, e)))?;
    url.set_port(Some(port))
        .map_err(|_| BackendError::InvalidUrl(format!("{}: cannot carry a port", base)))?;
    url.set_path(RPC_PATH);
    Ok(url)
}

/// Lists torrents from a Transmission daemon.
#[derive(Debug, Clone)]
pub struct TransmissionClient {
    http: reqwest::Client,
    rpc_url: Url,
    credentials: Option<(String, Option<String>)>,
}

impl TransmissionClient {
    /// Creates a client for the configured daemon.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the host cannot form a URL.
    pub fn new(config: &TransmissionConfig, timeout: Duration) -> Result<Self, BackendError> {
        let rpc_url = rpc_url(&config.host, config.port)?;
        debug!(url = %rpc_url, "transmission client configured");

        Ok(Self {
            http: http_client(timeout)?,
            rpc_url,
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    async fn post(&self, session_id: Option<&str>) -> Result<reqwest::Response, BackendError> {
        let body = json!({
            "method": "torrent-get",
            "arguments": { "fields": ["id", "name", "status", "percentDone"] }
        });

        let mut request = self.http.post(self.rpc_url.clone()).json(&body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_deref());
        }
        if let Some(id) = session_id {
            request = request.header(SESSION_HEADER, id);
        }

        request.send().await.map_err(http_error)
    }
}

#[async_trait]
impl WorkSource for TransmissionClient {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>, BackendError> {
        let mut response = self.post(None).await?;

        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| decode_error("409 without a session id"))?;
            trace!("retrying with transmission session id");
            response = self.post(Some(&session_id)).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                backend: BACKEND.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_error)?;
        parse_torrents(&body)
    }
}
