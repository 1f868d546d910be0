// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without an installed recorder every call is a
//! no-op.

use metrics::{Unit, describe_counter, describe_histogram};

/// Register all Vigil metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "vigil_alerts_received_total",
        "Alerts received in webhook batches"
    );
    describe_counter!(
        "vigil_alerts_processed_total",
        "Alerts durably upserted"
    );
    describe_counter!(
        "vigil_alert_failures_total",
        "Alerts that failed before or during persistence, by stage"
    );
    describe_counter!(
        "vigil_stream_publish_failures_total",
        "Persisted records that could not be published to the stream"
    );
    describe_counter!(
        "vigil_metrics_received_total",
        "Metric samples accepted on /api/v1/metrics"
    );
    describe_histogram!(
        "vigil_batch_duration_seconds",
        Unit::Seconds,
        "Wall time spent processing one webhook batch"
    );
}

pub fn record_alerts_received(count: usize) {
    metrics::counter!("vigil_alerts_received_total").increment(count as u64);
}

pub fn record_alert_processed() {
    metrics::counter!("vigil_alerts_processed_total").increment(1);
}

/// Record an item that failed at `stage` (`validate`, `persist`, `deadline`).
pub fn record_alert_failure(stage: &str) {
    metrics::counter!("vigil_alert_failures_total", "stage" => stage.to_string()).increment(1);
}

/// Record a publish failure for a record of `kind` (`alert` or `metric`).
pub fn record_publish_failure(kind: &str) {
    metrics::counter!("vigil_stream_publish_failures_total", "kind" => kind.to_string())
        .increment(1);
}

pub fn record_metric_received() {
    metrics::counter!("vigil_metrics_received_total").increment(1);
}

pub fn record_batch_duration(seconds: f64) {
    metrics::histogram!("vigil_batch_duration_seconds").record(seconds);
}
