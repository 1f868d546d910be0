// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` assembles the full ingestion stack over a temp SQLite
//! database and a [`MemoryStream`], and exposes the gateway router so tests
//! can drive it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use vigil_config::VigilConfig;
use vigil_config::model::StorageConfig;
use vigil_core::{AlertStore, StreamPublisher, VigilError};
use vigil_gateway::GatewayState;
use vigil_gateway::server::MetricsRender;
use vigil_ingest::{BatchCoordinator, CoordinatorSettings, HealthAggregator, MetricIngestor};
use vigil_storage::SqliteStore;
use vigil_stream::MemoryStream;

use crate::fakes::{FailingStream, RecordingStore, UnavailableStore};

/// Builder for creating test environments with configurable failures.
pub struct TestHarnessBuilder {
    failing_stream: bool,
    unavailable_store: bool,
    stream_max_len: usize,
    operation_timeout: Option<Duration>,
    prometheus_render: Option<MetricsRender>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            failing_stream: false,
            unavailable_store: false,
            stream_max_len: 1000,
            operation_timeout: None,
            prometheus_render: None,
        }
    }

    /// Wire a broker that rejects every publish.
    pub fn with_failing_stream(mut self) -> Self {
        self.failing_stream = true;
        self
    }

    /// Wire a store that fails every call.
    pub fn with_unavailable_store(mut self) -> Self {
        self.unavailable_store = true;
        self
    }

    pub fn with_stream_max_len(mut self, max_len: usize) -> Self {
        self.stream_max_len = max_len;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Enable `GET /metrics` with the given renderer.
    pub fn with_prometheus_render(mut self, render: MetricsRender) -> Self {
        self.prometheus_render = Some(render);
        self
    }

    /// Build the harness, creating the temp database.
    pub async fn build(self) -> Result<TestHarness, VigilError> {
        let temp_dir = tempfile::TempDir::new().map_err(VigilError::persistence)?;
        let db_path = temp_dir.path().join("vigil-test.db");

        let mut config = VigilConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.stream.max_len = self.stream_max_len;
        if let Some(timeout) = self.operation_timeout {
            config.ingest.operation_timeout_ms = timeout.as_millis() as u64;
        }

        let sqlite = SqliteStore::new(config.storage.clone());
        sqlite.initialize().await?;
        let store = Arc::new(sqlite);

        let wired: Arc<dyn AlertStore> = if self.unavailable_store {
            Arc::new(UnavailableStore)
        } else {
            store.clone()
        };
        let recorder = Arc::new(RecordingStore::new(wired));

        let stream = Arc::new(MemoryStream::new(
            config.stream.stream_name.clone(),
            config.stream.max_len,
        ));
        let publisher: Arc<dyn StreamPublisher> = if self.failing_stream {
            Arc::new(FailingStream::new())
        } else {
            stream.clone()
        };

        let coordinator = Arc::new(BatchCoordinator::new(
            recorder.clone(),
            publisher.clone(),
            CoordinatorSettings::from_config(&config),
        ));
        let metrics = Arc::new(MetricIngestor::new(
            recorder.clone(),
            publisher.clone(),
            config.ingest.operation_timeout(),
        ));
        let health = Arc::new(HealthAggregator::new(
            recorder.clone(),
            publisher.clone(),
            config.ingest.health_timeout(),
        ));

        Ok(TestHarness {
            config,
            store,
            recorder,
            stream,
            publisher,
            coordinator,
            metrics,
            health,
            prometheus_render: self.prometheus_render,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete ingestion stack over temp storage.
pub struct TestHarness {
    pub config: VigilConfig,
    /// The SQLite store backing the temp database.
    pub store: Arc<SqliteStore>,
    /// The store the pipeline talks to; counts every call.
    pub recorder: Arc<RecordingStore>,
    /// In-memory stream. Receives nothing when the failing stream is wired.
    pub stream: Arc<MemoryStream>,
    pub publisher: Arc<dyn StreamPublisher>,
    pub coordinator: Arc<BatchCoordinator>,
    pub metrics: Arc<MetricIngestor>,
    pub health: Arc<HealthAggregator>,
    prometheus_render: Option<MetricsRender>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Gateway state sharing this harness's pipeline.
    pub fn gateway_state(&self) -> GatewayState {
        GatewayState {
            coordinator: self.coordinator.clone(),
            metrics: self.metrics.clone(),
            health: self.health.clone(),
            prometheus_render: self.prometheus_render.clone(),
        }
    }

    /// The full gateway router over this harness.
    pub fn router(&self) -> axum::Router {
        vigil_gateway::router(self.gateway_state())
    }

    /// Rows in the `alerts` table, read directly from SQLite.
    pub async fn alert_count(&self) -> Result<i64, VigilError> {
        self.store.count_alerts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert_eq!(harness.alert_count().await.unwrap(), 0);
        assert!(harness.stream.is_empty());
        assert!(harness.health.check().await.is_healthy());
    }

    #[tokio::test]
    async fn unavailable_store_fails_health() {
        let harness = TestHarness::builder()
            .with_unavailable_store()
            .build()
            .await
            .unwrap();
        assert!(!harness.health.check().await.is_healthy());
        assert_eq!(harness.recorder.calls(), 1);
    }
}
