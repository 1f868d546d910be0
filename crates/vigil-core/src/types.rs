// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types shared by the store, stream, and ingest crates.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::VigilError;

/// Health status reported by store and broker probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Dependency is fully operational.
    Healthy,
    /// Dependency answers but reports a problem.
    Degraded(String),
    /// Dependency is not operational.
    Unhealthy(String),
}

/// Adapter categories in the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AdapterType {
    Store,
    Stream,
    Observability,
}

/// External dependencies whose outage is surfaced to callers by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Store,
    Broker,
}

/// Tag carried by every stream entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Alert,
    Metric,
}

/// Arbitrary label or annotation map with mixed value types.
///
/// Values are kept as [`serde_json::Value`] so nested or non-string values
/// survive a store round-trip unchanged. Readers go through [`get_str`],
/// which treats a type mismatch as absence.
///
/// [`get_str`]: AttributeMap::get_str
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(BTreeMap<String, Value>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value under `key` if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Serializes the map to compact JSON text for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Parses a map previously written by [`to_json`](Self::to_json).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Canonical persisted alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Durable identifier, assigned on first insert and never reassigned.
    pub id: String,
    /// Deduplication key; the upsert conflict target.
    pub identity_key: String,
    pub source: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub labels: AttributeMap,
    pub annotations: AttributeMap,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub generator_url: String,
    pub fingerprint: Option<String>,
    /// `firing`, `resolved`, or whatever the source sent.
    pub status: String,
    /// Bytes of the inbound item exactly as received.
    #[serde(with = "raw_json")]
    pub raw_payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single metric observation pushed to `/api/v1/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub labels: AttributeMap,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of an atomic insert-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Durable id of the row, whether it was just created or already existed.
    pub id: String,
    /// First-insert time of the row.
    pub created_at: DateTime<Utc>,
    /// True when no row existed for the identity key.
    pub inserted: bool,
}

/// An entry handed to the stream broker.
///
/// Consumers must tolerate duplicates: a redelivered webhook produces a new
/// message for the same `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    /// Identity key for alerts, sample id for metrics.
    pub id: String,
    pub kind: StreamKind,
    /// JSON serialization of the record.
    pub payload: String,
    pub ingested_at: DateTime<Utc>,
}

impl StreamMessage {
    /// Builds the stream entry for a persisted alert.
    pub fn for_alert(record: &AlertRecord) -> Result<Self, VigilError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| VigilError::Internal(format!("failed to serialize alert: {e}")))?;
        Ok(Self {
            id: record.identity_key.clone(),
            kind: StreamKind::Alert,
            payload,
            ingested_at: Utc::now(),
        })
    }

    /// Builds the stream entry for a persisted metric sample.
    pub fn for_metric(sample: &MetricSample) -> Result<Self, VigilError> {
        let payload = serde_json::to_string(sample)
            .map_err(|e| VigilError::Internal(format!("failed to serialize metric: {e}")))?;
        Ok(Self {
            id: sample.id.clone(),
            kind: StreamKind::Metric,
            payload,
            ingested_at: Utc::now(),
        })
    }

    /// Field/value pairs in wire order: `type`, `id`, `data`, `ts`.
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            ("type", self.kind.to_string()),
            ("id", self.id.clone()),
            ("data", self.payload.clone()),
            ("ts", self.ingested_at.timestamp().to_string()),
        ]
    }
}

/// Formats a timestamp for storage. Fixed nanosecond width keeps the text
/// sortable and loses no precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses a timestamp written by [`format_timestamp`] (any RFC 3339 form).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
}

/// Raw payloads are JSON text, so they serialize as a string rather than a
/// byte array.
mod raw_json {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> AlertRecord {
        let now = Utc::now();
        AlertRecord {
            id: "a1".to_string(),
            identity_key: "am:fp1".to_string(),
            source: "am".to_string(),
            severity: "critical".to_string(),
            title: "HighCPU".to_string(),
            description: String::new(),
            labels: [("severity", "critical")].into_iter().collect(),
            annotations: AttributeMap::new(),
            starts_at: now,
            ends_at: None,
            generator_url: String::new(),
            fingerprint: Some("fp1".to_string()),
            status: "firing".to_string(),
            raw_payload: br#"{"status":"firing"}"#.to_vec(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn get_str_ignores_non_string_values() {
        let mut map = AttributeMap::new();
        map.insert("severity", json!(3));
        map.insert("priority", json!("high"));
        map.insert("nested", json!({"a": 1}));

        assert_eq!(map.get_str("severity"), None);
        assert_eq!(map.get_str("priority"), Some("high"));
        assert_eq!(map.get_str("nested"), None);
        assert_eq!(map.get_str("missing"), None);
    }

    #[test]
    fn attribute_map_json_round_trip_keeps_mixed_values() {
        let mut map = AttributeMap::new();
        map.insert("host", "web-01");
        map.insert("cpu", json!(0.1 + 0.2));
        map.insert("tags", json!(["a", "b"]));
        map.insert("flag", json!(null));

        let text = map.to_json().unwrap();
        let back = AttributeMap::from_json(&text).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn component_and_kind_display_lowercase() {
        assert_eq!(Component::Store.to_string(), "store");
        assert_eq!(Component::Broker.to_string(), "broker");
        assert_eq!(StreamKind::Alert.to_string(), "alert");
        assert_eq!(StreamKind::Metric.to_string(), "metric");
        assert_eq!(
            serde_json::to_string(&Component::Broker).unwrap(),
            "\"broker\""
        );
    }

    #[test]
    fn stream_message_for_alert_embeds_raw_payload_as_text() {
        let record = sample_record();
        let msg = StreamMessage::for_alert(&record).unwrap();
        assert_eq!(msg.id, "am:fp1");
        assert_eq!(msg.kind, StreamKind::Alert);

        let data: serde_json::Value = serde_json::from_str(&msg.payload).unwrap();
        assert_eq!(data["identity_key"], "am:fp1");
        assert_eq!(data["raw_payload"], r#"{"status":"firing"}"#);
    }

    #[test]
    fn stream_message_fields_are_in_wire_order() {
        let msg = StreamMessage::for_alert(&sample_record()).unwrap();
        let fields = msg.fields();
        let names: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["type", "id", "data", "ts"]);
        assert_eq!(fields[0].1, "alert");
        assert_eq!(fields[3].1, msg.ingested_at.timestamp().to_string());
    }

    #[test]
    fn timestamp_text_keeps_sub_second_precision() {
        let ts = parse_timestamp("2026-03-01T10:00:00.123456789Z").unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2026-03-01T10:00:00.123456789Z");
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
    }

    #[test]
    fn alert_record_serde_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: AlertRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
