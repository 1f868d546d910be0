// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil serve` command implementation.
//!
//! Opens the store, builds the stream publisher, wires the ingestion
//! pipeline into the HTTP gateway, and serves until SIGINT or SIGTERM.

use std::sync::Arc;

use tracing::{info, warn};

use vigil_config::VigilConfig;
use vigil_config::model::LoggingConfig;
use vigil_core::{HealthStatus, PluginAdapter, VigilError};
use vigil_gateway::server::MetricsRender;
use vigil_gateway::{GatewayState, ServerConfig};
use vigil_ingest::{BatchCoordinator, CoordinatorSettings, HealthAggregator, MetricIngestor};
use vigil_prometheus::PrometheusAdapter;
use vigil_storage::SqliteStore;

use crate::shutdown;

pub async fn run_serve(config: VigilConfig) -> Result<(), VigilError> {
    init_tracing(&config.logging);

    info!("starting vigil serve");

    // Initialize Prometheus metrics (if enabled).
    let prometheus_render: Option<MetricsRender> = if config.prometheus.enabled {
        match PrometheusAdapter::new() {
            Ok(adapter) => {
                info!("prometheus metrics enabled");
                let adapter = Arc::new(adapter);
                Some(Arc::new(move || adapter.render()))
            }
            Err(e) => {
                warn!(error = %e, "prometheus initialization failed, continuing without metrics");
                None
            }
        }
    } else {
        info!("prometheus metrics disabled by configuration");
        None
    };

    // The store is authoritative, so a failure here aborts startup.
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;
    info!(path = %config.storage.database_path, "store opened");

    // The broker is best-effort; an unreachable broker is reported, not fatal.
    let publisher = vigil_stream::build_publisher(&config.stream)?;
    match publisher.health_check().await {
        Ok(HealthStatus::Healthy) => info!(
            backend = publisher.name(),
            stream = publisher.stream_name(),
            "stream ready"
        ),
        Ok(HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason)) => warn!(
            backend = publisher.name(),
            %reason,
            "stream not ready, alerts will still be stored"
        ),
        Err(e) => warn!(
            backend = publisher.name(),
            error = %e,
            "stream not reachable, alerts will still be stored"
        ),
    }

    let coordinator = Arc::new(BatchCoordinator::new(
        store.clone(),
        publisher.clone(),
        CoordinatorSettings::from_config(&config),
    ));
    let metrics = Arc::new(MetricIngestor::new(
        store.clone(),
        publisher.clone(),
        config.ingest.operation_timeout(),
    ));
    let health = Arc::new(HealthAggregator::new(
        store.clone(),
        publisher.clone(),
        config.ingest.health_timeout(),
    ));

    let state = GatewayState {
        coordinator,
        metrics,
        health,
        prometheus_render,
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let served = vigil_gateway::start_server(&server_config, state, cancel.clone()).await;
    cancel.cancel();

    if let Err(e) = publisher.shutdown().await {
        warn!(error = %e, "stream shutdown failed");
    }
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "store shutdown failed");
    }

    served?;
    info!("vigil serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let level = logging.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("vigil={level},tower_http={level},warn"))
    });

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(false)
            .init();
    }
}
