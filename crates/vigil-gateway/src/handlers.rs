// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Bodies are taken as raw bytes so decode failures produce the service's
//! own JSON error shape instead of axum's rejection text.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use vigil_core::{Component, VigilError};
use vigil_ingest::{BatchOutcome, HealthReport, ItemError, decode_metric, decode_webhook};

use crate::server::GatewayState;

/// Success body for the alert webhook.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    pub alert_ids: Vec<String>,
    pub processed_count: usize,
    pub total_count: usize,
    pub errors: Vec<ItemError>,
}

impl From<BatchOutcome> for BatchResponse {
    fn from(outcome: BatchOutcome) -> Self {
        let mut message = format!("Processed {} alerts", outcome.processed_count);
        if !outcome.errors.is_empty() {
            message.push_str(&format!(" with {} errors", outcome.errors.len()));
        }
        Self {
            success: true,
            message,
            alert_ids: outcome.alert_ids,
            processed_count: outcome.processed_count,
            total_count: outcome.total_count,
            errors: outcome.errors,
        }
    }
}

/// Error body shared by the ingest endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
}

impl ErrorResponse {
    fn new(message: &str, error: impl ToString) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            error: error.to_string(),
            component: None,
        }
    }

    fn with_component(mut self, component: Option<Component>) -> Self {
        self.component = component;
        self
    }
}

/// Body of a successful metric push.
#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub status: &'static str,
    pub id: String,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

/// POST /api/v1/alerts/webhook
///
/// 200 when at least one item was processed, 400 for an unreadable or empty
/// body, 500 when every item failed.
pub async fn post_alert_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let batch = match decode_webhook(&body) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(error = %e, "rejected alert webhook");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid JSON payload", e)),
            )
                .into_response();
        }
    };

    match state.coordinator.process_batch(&batch).await {
        Ok(outcome) if outcome.is_total_failure() => {
            let component = outcome.failing_component();
            let error = outcome
                .errors
                .iter()
                .map(|e| format!("alerts[{}]: {}", e.index, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    ErrorResponse::new("Failed to process all alerts", error)
                        .with_component(component),
                ),
            )
                .into_response()
        }
        Ok(outcome) => (StatusCode::OK, Json(BatchResponse::from(outcome))).into_response(),
        Err(VigilError::EmptyBatch) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "No alerts found in payload",
                VigilError::EmptyBatch,
            )),
        )
            .into_response(),
        Err(e) if e.is_request_level() => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid JSON payload", e)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "alert batch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to process all alerts", e)),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/metrics
pub async fn post_metric(State(state): State<GatewayState>, body: Bytes) -> Response {
    let payload = match decode_metric(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid JSON payload", e)),
            )
                .into_response();
        }
    };

    match state.metrics.ingest(payload).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(MetricResponse {
                status: "processed",
                id,
            }),
        )
            .into_response(),
        Err(e @ VigilError::Validation(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid metric", e)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metric ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    ErrorResponse::new("Failed to store metric", e)
                        .with_component(Some(Component::Store)),
                ),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    match state.health.check().await {
        HealthReport::Healthy => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                component: None,
                error: None,
            }),
        )
            .into_response(),
        HealthReport::Unhealthy { component, error } => {
            tracing::warn!(%component, %error, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    component: Some(component),
                    error: Some(error),
                }),
            )
                .into_response()
        }
    }
}

/// GET /metrics
///
/// Prometheus text exposition, or 404 when exposition is disabled.
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /
pub async fn get_root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "vigil",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}
