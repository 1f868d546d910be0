// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook body decoding.
//!
//! Each alert item is captured as a [`RawValue`] first, so the exact bytes
//! the sender produced can be stored alongside the decoded fields.

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde_json::value::RawValue;

use vigil_core::{AttributeMap, VigilError};

/// A decoded alert webhook. Never stored as a unit.
#[derive(Debug)]
pub struct WebhookBatch {
    pub receiver: String,
    pub status: String,
    pub alerts: Vec<WebhookItem>,
}

/// One inbound alert with its original bytes.
#[derive(Debug)]
pub struct WebhookItem {
    raw: Box<RawValue>,
    pub status: String,
    pub labels: AttributeMap,
    pub annotations: AttributeMap,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub generator_url: String,
    pub fingerprint: Option<String>,
}

impl WebhookItem {
    /// The item's JSON exactly as received.
    pub fn raw_bytes(&self) -> &[u8] {
        self.raw.get().as_bytes()
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    receiver: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    alerts: Vec<Box<RawValue>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemFields {
    #[serde(default)]
    status: String,
    #[serde(default)]
    labels: AttributeMap,
    #[serde(default)]
    annotations: AttributeMap,
    starts_at: DateTime<Utc>,
    #[serde(default)]
    ends_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "generatorURL")]
    generator_url: String,
    #[serde(default)]
    fingerprint: Option<String>,
}

/// Decode an Alertmanager-style webhook body.
///
/// Any malformed item rejects the whole body. Envelope fields other than
/// `receiver`, `status` and `alerts` are ignored.
pub fn decode_webhook(body: &[u8]) -> Result<WebhookBatch, VigilError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| VigilError::Decode(e.to_string()))?;

    let alerts = envelope
        .alerts
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let fields: ItemFields = serde_json::from_str(raw.get())
                .map_err(|e| VigilError::Decode(format!("alerts[{index}]: {e}")))?;
            Ok(WebhookItem {
                raw,
                status: fields.status,
                labels: fields.labels,
                annotations: fields.annotations,
                starts_at: fields.starts_at,
                ends_at: fields.ends_at.filter(|t| !is_zero_time(t)),
                generator_url: fields.generator_url,
                fingerprint: fields.fingerprint,
            })
        })
        .collect::<Result<Vec<_>, VigilError>>()?;

    Ok(WebhookBatch {
        receiver: envelope.receiver,
        status: envelope.status,
        alerts,
    })
}

/// Alertmanager sends `0001-01-01T00:00:00Z` for alerts that have not ended.
fn is_zero_time(t: &DateTime<Utc>) -> bool {
    t.year() <= 1
}

/// Body of `POST /api/v1/metrics`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricPayload {
    #[serde(default)]
    pub metric_name: String,
    pub metric_value: f64,
    #[serde(default)]
    pub labels: AttributeMap,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

pub fn decode_metric(body: &[u8]) -> Result<MetricPayload, VigilError> {
    serde_json::from_slice(body).map_err(|e| VigilError::Decode(e.to_string()))
}
