// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Liveness probing of the store and the stream broker.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use vigil_core::{AlertStore, Component, HealthStatus, StreamPublisher, VigilError};

use crate::within;

/// Combined liveness of all dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    Healthy,
    Unhealthy { component: Component, error: String },
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Probes the store, then the broker, stopping at the first failure.
pub struct HealthAggregator {
    store: Arc<dyn AlertStore>,
    publisher: Arc<dyn StreamPublisher>,
    timeout: Duration,
}

impl HealthAggregator {
    pub fn new(
        store: Arc<dyn AlertStore>,
        publisher: Arc<dyn StreamPublisher>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            timeout,
        }
    }

    pub async fn check(&self) -> HealthReport {
        if let Err(error) = self.probe(Component::Store).await {
            return HealthReport::Unhealthy {
                component: Component::Store,
                error,
            };
        }
        if let Err(error) = self.probe(Component::Broker).await {
            return HealthReport::Unhealthy {
                component: Component::Broker,
                error,
            };
        }
        HealthReport::Healthy
    }

    /// Degraded counts as reachable.
    async fn probe(&self, component: Component) -> Result<(), String> {
        let status = match component {
            Component::Store => {
                within("store health check", self.timeout, self.store.health_check()).await
            }
            Component::Broker => {
                within("broker health check", self.timeout, self.publisher.health_check()).await
            }
        };
        match status {
            Ok(HealthStatus::Healthy) => Ok(()),
            Ok(HealthStatus::Degraded(reason)) => {
                warn!(%component, %reason, "dependency degraded");
                Ok(())
            }
            Ok(HealthStatus::Unhealthy(reason)) => Err(reason),
            Err(e) => Err(VigilError::HealthCheckFailed {
                component,
                source: Box::new(e),
            }
            .to_string()),
        }
    }
}
