// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion pipeline for the Vigil service.
//!
//! Decodes alert webhooks and metric pushes, derives identity keys,
//! normalizes severity and title, validates, persists through an
//! [`AlertStore`](vigil_core::AlertStore) and forwards to a
//! [`StreamPublisher`](vigil_core::StreamPublisher).

pub mod coordinator;
pub mod decode;
pub mod health;
pub mod identity;
pub mod metric;
pub mod normalize;
pub mod validate;

use std::future::Future;
use std::time::Duration;

use vigil_core::VigilError;

pub use coordinator::{
    BatchCoordinator, BatchOutcome, CoordinatorSettings, FailureStage, ItemError,
};
pub use decode::{MetricPayload, WebhookBatch, WebhookItem, decode_metric, decode_webhook};
pub use health::{HealthAggregator, HealthReport};
pub use identity::{IdentityKey, resolve_identity};
pub use metric::MetricIngestor;
pub use normalize::{DEFAULT_SEVERITY, DEFAULT_TITLE, Normalized, normalize};

/// Await `fut`, failing with [`VigilError::Timeout`] once `budget` elapses.
pub(crate) async fn within<T, F>(
    operation: &'static str,
    budget: Duration,
    fut: F,
) -> Result<T, VigilError>
where
    F: Future<Output = Result<T, VigilError>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .unwrap_or(Err(VigilError::Timeout {
            operation,
            duration: budget,
        }))
}
