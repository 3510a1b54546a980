//! Read path: fetch a backend queue and render a report for a query.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::BackendError;
use crate::report::{ReportFormatter, ReportOutcome};
use crate::traits::WorkSource;

/// The queues the bot can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// Torrent client transfers.
    Torrents,
    /// Movie download queue.
    Movies,
    /// Show download queue.
    Shows,
}

impl QueueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::Torrents => "torrents",
            QueueKind::Movies => "movies",
            QueueKind::Shows => "shows",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered queue backends and the report formatter.
#[derive(Default)]
pub struct QueueReporter {
    sources: HashMap<QueueKind, Arc<dyn WorkSource>>,
    formatter: ReportFormatter,
}

impl QueueReporter {
    pub fn new(formatter: ReportFormatter) -> Self {
        Self {
            sources: HashMap::new(),
            formatter,
        }
    }

    /// Registers the backend for a queue, replacing any previous one.
    pub fn with_source(mut self, kind: QueueKind, source: Arc<dyn WorkSource>) -> Self {
        self.sources.insert(kind, source);
        self
    }

    /// Fetches the queue fresh and renders a report for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotConfigured`] if no backend is registered
    /// for `kind`, or the backend's own fetch error.
    pub async fn status(&self, kind: QueueKind, query: &str) -> Result<ReportOutcome, BackendError> {
        let source = self
            .sources
            .get(&kind)
            .ok_or_else(|| BackendError::NotConfigured(kind.to_string()))?;

        let items = source.fetch_work_items().await.map_err(|e| {
            warn!(backend = %source.name(), error = %e, "failed to fetch queue");
            e
        })?;

        debug!(backend = %source.name(), items = items.len(), query = %query, "fetched queue");
        Ok(self.formatter.render(query, &items))
    }
}
