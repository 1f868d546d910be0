// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store for alerts and metric samples.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AlertRecord, MetricSample, UpsertOutcome};

/// The authoritative persistence layer.
///
/// Implementations must enforce at most one alert per `identity_key` through
/// a single atomic conditional write, never a read followed by a write.
#[async_trait]
pub trait AlertStore: PluginAdapter {
    /// Inserts the alert, or overwrites the mutable fields of the row already
    /// holding its identity key. `id` and `created_at` of an existing row are
    /// preserved; the returned outcome carries the durable id.
    async fn upsert_alert(&self, record: &AlertRecord) -> Result<UpsertOutcome, VigilError>;

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRecord>, VigilError>;

    async fn get_alert_by_identity(
        &self,
        identity_key: &str,
    ) -> Result<Option<AlertRecord>, VigilError>;

    async fn count_alerts(&self) -> Result<i64, VigilError>;

    /// Appends a metric sample. Samples are never updated.
    async fn insert_metric(&self, sample: &MetricSample) -> Result<(), VigilError>;

    async fn count_metrics(&self) -> Result<i64, VigilError>;
}
