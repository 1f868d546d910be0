// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite columns and the core record types.
//!
//! Timestamps are stored as fixed-width RFC 3339 text, attribute maps as JSON
//! text, and the raw payload as a BLOB.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

pub use vigil_core::types::{AlertRecord, AttributeMap, MetricSample, UpsertOutcome};

/// Column list shared by every alert SELECT, in [`alert_from_row`] order.
pub(crate) const ALERT_COLUMNS: &str = "id, identity_key, source, severity, title, description, \
     labels, annotations, starts_at, ends_at, generator_url, fingerprint, status, raw_payload, \
     created_at, updated_at";

pub(crate) const METRIC_COLUMNS: &str =
    "id, metric_name, metric_value, labels, observed_at, created_at";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    vigil_core::types::parse_timestamp(&text).map_err(|e| conversion_error(idx, e))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| vigil_core::types::parse_timestamp(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn attributes_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<AttributeMap> {
    let text: String = row.get(idx)?;
    AttributeMap::from_json(&text).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn alert_from_row(row: &Row<'_>) -> rusqlite::Result<AlertRecord> {
    Ok(AlertRecord {
        id: row.get(0)?,
        identity_key: row.get(1)?,
        source: row.get(2)?,
        severity: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        labels: attributes_at(row, 6)?,
        annotations: attributes_at(row, 7)?,
        starts_at: timestamp_at(row, 8)?,
        ends_at: optional_timestamp_at(row, 9)?,
        generator_url: row.get(10)?,
        fingerprint: row.get(11)?,
        status: row.get(12)?,
        raw_payload: row.get(13)?,
        created_at: timestamp_at(row, 14)?,
        updated_at: timestamp_at(row, 15)?,
    })
}

pub(crate) fn metric_from_row(row: &Row<'_>) -> rusqlite::Result<MetricSample> {
    Ok(MetricSample {
        id: row.get(0)?,
        metric_name: row.get(1)?,
        metric_value: row.get(2)?,
        labels: attributes_at(row, 3)?,
        observed_at: timestamp_at(row, 4)?,
        created_at: timestamp_at(row, 5)?,
    })
}
