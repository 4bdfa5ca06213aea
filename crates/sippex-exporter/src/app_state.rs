//! Shared application state for the exporter.
//!
//! Holds the metric type registry and the queues of every reader, in
//! reader registration order. Cloned into each request handler.

use std::sync::Arc;

use sippex_core::error::Result;
use sippex_core::exposition::render_scrape;
use sippex_core::{MetricTypeRegistry, SampleQueue};

use crate::config::ExporterConfig;
use crate::reader::StatsReader;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: Arc<MetricTypeRegistry>,
    queues: Vec<Arc<SampleQueue>>,
}

impl AppState {
    pub fn new(registry: Arc<MetricTypeRegistry>, queues: Vec<Arc<SampleQueue>>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { registry, queues }),
        }
    }

    /// Open one reader per configured source and build the state around
    /// their queues. Any source that cannot be opened fails the whole
    /// startup.
    pub async fn from_config(cfg: &ExporterConfig) -> Result<(Self, Vec<StatsReader>)> {
        let registry = Arc::new(MetricTypeRegistry::new());
        let poll_interval = cfg.exporter.poll_interval();

        let mut readers = Vec::new();
        for path in cfg.resolve_sources()? {
            let reader = StatsReader::open(path, Arc::clone(&registry), poll_interval).await?;
            readers.push(reader);
        }

        let queues = readers.iter().map(StatsReader::queue).collect();
        Ok((Self::new(registry, queues), readers))
    }

    pub fn reader_count(&self) -> usize {
        self.inner.queues.len()
    }

    /// Render one scrape: declarations, then every queue drained newest-first.
    pub fn scrape(&self) -> String {
        render_scrape(
            &self.inner.registry,
            self.inner.queues.iter().map(Arc::as_ref),
        )
    }
}
