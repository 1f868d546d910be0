// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fake store and stream adapters for deterministic failure tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use vigil_core::{
    AdapterType, AlertRecord, AlertStore, HealthStatus, MetricSample, PluginAdapter,
    StreamMessage, StreamPublisher, UpsertOutcome, VigilError,
};

fn test_version() -> semver::Version {
    semver::Version::new(0, 1, 0)
}

/// A broker that is down: every publish fails and health reports unhealthy.
#[derive(Debug, Default)]
pub struct FailingStream {
    attempts: AtomicUsize,
}

impl FailingStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of publish calls received.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for FailingStream {
    fn name(&self) -> &str {
        "failing-stream"
    }

    fn version(&self) -> semver::Version {
        test_version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Stream
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        Ok(HealthStatus::Unhealthy("connection refused".to_string()))
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        Ok(())
    }
}

#[async_trait]
impl StreamPublisher for FailingStream {
    async fn publish(&self, _message: &StreamMessage) -> Result<String, VigilError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(VigilError::Publish {
            message: "connection refused".to_string(),
            source: None,
        })
    }

    fn stream_name(&self) -> &str {
        "metrics:raw"
    }
}

/// A store that cannot be reached.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn unavailable() -> VigilError {
        VigilError::persistence("database is unavailable")
    }
}

#[async_trait]
impl PluginAdapter for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable-store"
    }

    fn version(&self) -> semver::Version {
        test_version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        Err(Self::unavailable())
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        Ok(())
    }
}

#[async_trait]
impl AlertStore for UnavailableStore {
    async fn upsert_alert(&self, _record: &AlertRecord) -> Result<UpsertOutcome, VigilError> {
        Err(Self::unavailable())
    }

    async fn get_alert(&self, _id: &str) -> Result<Option<AlertRecord>, VigilError> {
        Err(Self::unavailable())
    }

    async fn get_alert_by_identity(
        &self,
        _identity_key: &str,
    ) -> Result<Option<AlertRecord>, VigilError> {
        Err(Self::unavailable())
    }

    async fn count_alerts(&self) -> Result<i64, VigilError> {
        Err(Self::unavailable())
    }

    async fn insert_metric(&self, _sample: &MetricSample) -> Result<(), VigilError> {
        Err(Self::unavailable())
    }

    async fn count_metrics(&self) -> Result<i64, VigilError> {
        Err(Self::unavailable())
    }
}

/// Forwards to an inner store and counts every call.
pub struct RecordingStore {
    inner: Arc<dyn AlertStore>,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new(inner: Arc<dyn AlertStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of store calls made through this wrapper, health probes
    /// included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for RecordingStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        self.record();
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl AlertStore for RecordingStore {
    async fn upsert_alert(&self, record: &AlertRecord) -> Result<UpsertOutcome, VigilError> {
        self.record();
        self.inner.upsert_alert(record).await
    }

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRecord>, VigilError> {
        self.record();
        self.inner.get_alert(id).await
    }

    async fn get_alert_by_identity(
        &self,
        identity_key: &str,
    ) -> Result<Option<AlertRecord>, VigilError> {
        self.record();
        self.inner.get_alert_by_identity(identity_key).await
    }

    async fn count_alerts(&self) -> Result<i64, VigilError> {
        self.record();
        self.inner.count_alerts().await
    }

    async fn insert_metric(&self, sample: &MetricSample) -> Result<(), VigilError> {
        self.record();
        self.inner.insert_metric(sample).await
    }

    async fn count_metrics(&self) -> Result<i64, VigilError> {
        self.record();
        self.inner.count_metrics().await
    }
}
