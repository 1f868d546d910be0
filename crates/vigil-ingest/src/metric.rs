// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-sample metric ingestion.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use vigil_core::{AlertStore, MetricSample, StreamMessage, StreamPublisher, VigilError};
use vigil_prometheus::recording;

use crate::decode::MetricPayload;
use crate::validate::validate_metric;
use crate::within;

/// Persists pushed metric samples and forwards them to the stream.
pub struct MetricIngestor {
    store: Arc<dyn AlertStore>,
    publisher: Arc<dyn StreamPublisher>,
    operation_timeout: Duration,
}

impl MetricIngestor {
    pub fn new(
        store: Arc<dyn AlertStore>,
        publisher: Arc<dyn StreamPublisher>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            operation_timeout,
        }
    }

    /// Validate, insert, then publish one sample. Returns the sample id.
    ///
    /// The insert decides success. A publish failure is logged and counted
    /// only.
    pub async fn ingest(&self, payload: MetricPayload) -> Result<String, VigilError> {
        let now = Utc::now();
        let sample = MetricSample {
            id: uuid::Uuid::new_v4().to_string(),
            metric_name: payload.metric_name,
            metric_value: payload.metric_value,
            labels: payload.labels,
            observed_at: payload.timestamp.unwrap_or(now),
            created_at: now,
        };
        validate_metric(&sample)?;
        recording::record_metric_received();

        within(
            "insert",
            self.operation_timeout,
            self.store.insert_metric(&sample),
        )
        .await?;
        debug!(id = %sample.id, metric = %sample.metric_name, "metric stored");

        let published = match StreamMessage::for_metric(&sample) {
            Ok(message) => {
                within(
                    "publish",
                    self.operation_timeout,
                    self.publisher.publish(&message),
                )
                .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = published {
            warn!(
                id = %sample.id,
                stream = %self.publisher.stream_name(),
                error = %e,
                "stream publish failed, metric is persisted"
            );
            recording::record_publish_failure("metric");
        }

        Ok(sample.id)
    }
}
