// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch coordinator: drives every webhook item through identity,
//! normalization, validation, upsert and publish.
//!
//! Items are isolated from one another. A failure up to and including the
//! upsert aborts only that item; a publish failure is logged and counted but
//! the item still counts as processed, because the store is authoritative.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vigil_config::VigilConfig;
use vigil_core::{AlertRecord, AlertStore, Component, StreamMessage, StreamPublisher, VigilError};
use vigil_prometheus::recording;

use crate::decode::{WebhookBatch, WebhookItem};
use crate::identity::resolve_identity;
use crate::normalize::normalize;
use crate::validate::validate_alert;
use crate::within;

/// Where in the per-item pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// Required-field checks rejected the record.
    Validate,
    /// The upsert failed or timed out.
    Persist,
    /// The request deadline passed before the item was attempted.
    Deadline,
}

/// A failed item, reported back to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    /// Position of the item in the inbound batch.
    pub index: usize,
    pub identity_key: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub total_count: usize,
    pub processed_count: usize,
    /// Durable ids of processed items, in batch order.
    pub alert_ids: Vec<String>,
    pub errors: Vec<ItemError>,
    /// Items persisted but not handed to the stream.
    pub publish_failures: usize,
}

impl BatchOutcome {
    pub fn is_total_failure(&self) -> bool {
        self.total_count > 0 && self.processed_count == 0
    }

    /// The dependency to blame when the batch failed because of it.
    pub fn failing_component(&self) -> Option<Component> {
        self.errors
            .iter()
            .any(|e| matches!(e.stage, FailureStage::Persist | FailureStage::Deadline))
            .then_some(Component::Store)
    }
}

/// Time budgets and defaults for batch processing.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Upper bound on any single store or broker call.
    pub operation_timeout: Duration,
    /// Deadline for the whole batch.
    pub request_timeout: Duration,
    /// Source used when the webhook names no receiver.
    pub default_source: String,
}

impl CoordinatorSettings {
    pub fn from_config(config: &VigilConfig) -> Self {
        Self {
            operation_timeout: config.ingest.operation_timeout(),
            request_timeout: config.server.request_timeout(),
            default_source: config.ingest.default_source.clone(),
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&VigilConfig::default())
    }
}

/// Runs the ingestion pipeline for webhook batches.
pub struct BatchCoordinator {
    store: Arc<dyn AlertStore>,
    publisher: Arc<dyn StreamPublisher>,
    settings: CoordinatorSettings,
}

impl BatchCoordinator {
    pub fn new(
        store: Arc<dyn AlertStore>,
        publisher: Arc<dyn StreamPublisher>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            store,
            publisher,
            settings,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Process every item of `batch` and report per-item results.
    ///
    /// Returns [`VigilError::EmptyBatch`] without touching the store or the
    /// broker when the batch has no items. Any other failure is reported in
    /// the outcome rather than returned.
    pub async fn process_batch(&self, batch: &WebhookBatch) -> Result<BatchOutcome, VigilError> {
        if batch.alerts.is_empty() {
            return Err(VigilError::EmptyBatch);
        }

        let started = Instant::now();
        let deadline = started + self.settings.request_timeout;
        let source = match batch.receiver.trim() {
            "" => self.settings.default_source.as_str(),
            receiver => receiver,
        };

        info!(
            receiver = %batch.receiver,
            status = %batch.status,
            alert_count = batch.alerts.len(),
            "received alert webhook"
        );
        recording::record_alerts_received(batch.alerts.len());

        let mut outcome = BatchOutcome {
            total_count: batch.alerts.len(),
            ..BatchOutcome::default()
        };

        for (index, item) in batch.alerts.iter().enumerate() {
            match self
                .process_item(index, item, source, &batch.status, deadline)
                .await
            {
                Ok((id, published)) => {
                    recording::record_alert_processed();
                    if !published {
                        outcome.publish_failures += 1;
                    }
                    outcome.processed_count += 1;
                    outcome.alert_ids.push(id);
                }
                Err(item_error) => {
                    warn!(
                        index = item_error.index,
                        identity_key = %item_error.identity_key,
                        stage = %item_error.stage,
                        error = %item_error.message,
                        "failed to process alert"
                    );
                    recording::record_alert_failure(&item_error.stage.to_string());
                    outcome.errors.push(item_error);
                }
            }
        }

        recording::record_batch_duration(started.elapsed().as_secs_f64());
        info!(
            processed = outcome.processed_count,
            total = outcome.total_count,
            errors = outcome.errors.len(),
            publish_failures = outcome.publish_failures,
            "alert batch processed"
        );
        Ok(outcome)
    }

    /// Returns the durable id and whether the stream accepted the record.
    async fn process_item(
        &self,
        index: usize,
        item: &WebhookItem,
        source: &str,
        batch_status: &str,
        deadline: Instant,
    ) -> Result<(String, bool), ItemError> {
        let identity = resolve_identity(source, item.fingerprint.as_deref());
        let fail = |stage: FailureStage, err: VigilError| ItemError {
            index,
            identity_key: identity.to_string(),
            stage,
            message: err.to_string(),
        };

        if Instant::now() >= deadline {
            return Err(fail(
                FailureStage::Deadline,
                VigilError::Timeout {
                    operation: "request",
                    duration: self.settings.request_timeout,
                },
            ));
        }

        let normalized = normalize(&item.labels, &item.annotations);
        let now = Utc::now();
        let mut record = AlertRecord {
            id: uuid::Uuid::new_v4().to_string(),
            identity_key: identity.to_string(),
            source: source.to_string(),
            severity: normalized.severity,
            title: normalized.title,
            description: normalized.description,
            labels: item.labels.clone(),
            annotations: item.annotations.clone(),
            starts_at: item.starts_at,
            ends_at: item.ends_at,
            generator_url: item.generator_url.clone(),
            fingerprint: item.fingerprint.clone(),
            status: if item.status.is_empty() {
                batch_status.to_string()
            } else {
                item.status.clone()
            },
            raw_payload: item.raw_bytes().to_vec(),
            created_at: now,
            updated_at: now,
        };

        validate_alert(&record).map_err(|e| fail(FailureStage::Validate, e))?;

        let upserted = self
            .bounded("upsert", deadline, self.store.upsert_alert(&record))
            .await
            .map_err(|e| fail(FailureStage::Persist, e))?;
        debug!(
            id = %upserted.id,
            identity_key = %record.identity_key,
            inserted = upserted.inserted,
            "alert upserted"
        );
        record.id = upserted.id;
        record.created_at = upserted.created_at;

        let published = self.publish(&record, deadline).await;
        Ok((record.id, published))
    }

    async fn publish(&self, record: &AlertRecord, deadline: Instant) -> bool {
        let result = match StreamMessage::for_alert(record) {
            Ok(message) => {
                self.bounded("publish", deadline, self.publisher.publish(&message))
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(entry_id) => {
                debug!(id = %record.id, entry_id = %entry_id, "alert published");
                true
            }
            Err(e) => {
                warn!(
                    id = %record.id,
                    identity_key = %record.identity_key,
                    stream = %self.publisher.stream_name(),
                    error = %e,
                    "stream publish failed, alert is persisted"
                );
                recording::record_publish_failure("alert");
                false
            }
        }
    }

    /// Run `fut` within `min(operation_timeout, time left until deadline)`.
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        deadline: Instant,
        fut: F,
    ) -> Result<T, VigilError>
    where
        F: Future<Output = Result<T, VigilError>>,
    {
        let remaining = deadline.saturating_duration_since(Instant::now());
        within(operation, remaining.min(self.settings.operation_timeout), fut).await
    }
}
