//! Sonarr and Radarr download queues.
//!
//! Both expose the same v3 queue endpoint authenticated with an `apikey`
//! query parameter, so one client serves either.

use std::time::Duration;

use arrbot_core::{ArrConfig, BackendError, WorkItem, WorkSource};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{http_client, http_error};

/// Queue records requested per call. The queue endpoint is paginated and
/// defaults to a page of 10.
const PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
struct QueuePage {
    #[serde(default)]
    records: Vec<QueueRecord>,
}

#[derive(Debug, Deserialize)]
struct QueueRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    size: f64,
    #[serde(default, rename = "sizeleft")]
    size_left: f64,
    #[serde(default)]
    status: Option<String>,
}

/// Parses a queue page into work items.
pub fn parse_queue(backend: &str, body: &str) -> Result<Vec<WorkItem>, BackendError> {
    let page: QueuePage = serde_json::from_str(body).map_err(|e| BackendError::Decode {
        backend: backend.to_string(),
        reason: e.to_string(),
    })?;

    Ok(page
        .records
        .into_iter()
        .map(|r| {
            let status = r.status.unwrap_or_else(|| "unknown".to_string());
            WorkItem::from_sizes(r.title, status, r.size, r.size_left)
        })
        .collect())
}

/// A Sonarr or Radarr instance.
#[derive(Debug, Clone)]
pub struct ArrClient {
    name: String,
    http: reqwest::Client,
    queue_url: Url,
}

impl ArrClient {
    /// Creates a client named `name` ("sonarr", "radarr") for `config`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the base URL does not parse.
    pub fn new(name: impl Into<String>, config: &ArrConfig, timeout: Duration) -> Result<Self, BackendError> {
        let name = name.into();
        let mut queue_url = Url::parse(&format!("{}/api/v3/queue", config.url))
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        queue_url
            .query_pairs_mut()
            .append_pair("apikey", &config.api_key)
            .append_pair("pageSize", &PAGE_SIZE.to_string());

        debug!(backend = %name, base = %config.url, "queue client configured");

        Ok(Self {
            name,
            http: http_client(timeout)?,
            queue_url,
        })
    }
}

#[async_trait]
impl WorkSource for ArrClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>, BackendError> {
        let response = self.http.get(self.queue_url.clone()).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                backend: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(http_error)?;
        parse_queue(&self.name, &body)
    }
}
