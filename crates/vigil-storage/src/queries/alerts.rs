// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert upsert and lookups.

use rusqlite::{OptionalExtension, params};
use vigil_core::VigilError;
use vigil_core::types::format_timestamp;

use crate::database::Database;
use crate::models::{ALERT_COLUMNS, AlertRecord, UpsertOutcome, alert_from_row, timestamp_at};

/// Insert-or-update on `identity_key` as a single statement.
///
/// Only the mutable columns are overwritten on conflict. `id`, `created_at`,
/// `source`, `starts_at` and `fingerprint` keep their first-insert values.
const UPSERT_ALERT: &str = "INSERT INTO alerts (id, identity_key, source, severity, title, \
     description, labels, annotations, starts_at, ends_at, generator_url, fingerprint, status, \
     raw_payload, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
     ON CONFLICT(identity_key) DO UPDATE SET
         severity = excluded.severity,
         title = excluded.title,
         description = excluded.description,
         labels = excluded.labels,
         annotations = excluded.annotations,
         ends_at = excluded.ends_at,
         generator_url = excluded.generator_url,
         status = excluded.status,
         raw_payload = excluded.raw_payload,
         updated_at = excluded.updated_at
     RETURNING id, created_at";

/// Upsert an alert and report whether a new row was created.
///
/// `record.id` is only used when no row holds the identity key yet; the
/// returned id is always the durable one.
pub async fn upsert_alert(db: &Database, record: &AlertRecord) -> Result<UpsertOutcome, VigilError> {
    let labels = record
        .labels
        .to_json()
        .map_err(VigilError::persistence)?;
    let annotations = record
        .annotations
        .to_json()
        .map_err(VigilError::persistence)?;
    let record = record.clone();
    let candidate_id = record.id.clone();

    let (durable_id, created_at) = db
        .connection()
        .call(move |conn| -> Result<_, rusqlite::Error> {
            conn.query_row(
                UPSERT_ALERT,
                params![
                    record.id,
                    record.identity_key,
                    record.source,
                    record.severity,
                    record.title,
                    record.description,
                    labels,
                    annotations,
                    format_timestamp(&record.starts_at),
                    record.ends_at.as_ref().map(format_timestamp),
                    record.generator_url,
                    record.fingerprint,
                    record.status,
                    record.raw_payload,
                    format_timestamp(&record.created_at),
                    format_timestamp(&record.updated_at),
                ],
                |row| Ok((row.get::<_, String>(0)?, timestamp_at(row, 1)?)),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(UpsertOutcome {
        inserted: durable_id == candidate_id,
        id: durable_id,
        created_at,
    })
}

/// Get an alert by its durable id.
pub async fn get_alert(db: &Database, id: &str) -> Result<Option<AlertRecord>, VigilError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<AlertRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?1"),
                params![id],
                alert_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an alert by its identity key.
pub async fn get_alert_by_identity(
    db: &Database,
    identity_key: &str,
) -> Result<Option<AlertRecord>, VigilError> {
    let key = identity_key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<AlertRecord>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE identity_key = ?1"),
                params![key],
                alert_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn count_alerts(db: &Database) -> Result<i64, VigilError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vigil_core::AttributeMap;

    fn alert(id: &str, key: &str, severity: &str) -> AlertRecord {
        let now = Utc::now();
        AlertRecord {
            id: id.to_string(),
            identity_key: key.to_string(),
            source: "am".to_string(),
            severity: severity.to_string(),
            title: "DiskFull".to_string(),
            description: "disk is full".to_string(),
            labels: [("alertname", "DiskFull"), ("severity", severity)]
                .into_iter()
                .collect(),
            annotations: AttributeMap::new(),
            starts_at: now,
            ends_at: None,
            generator_url: String::new(),
            fingerprint: Some("fp".to_string()),
            status: "firing".to_string(),
            raw_payload: format!(r#"{{"severity":"{severity}"}}"#).into_bytes(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_update_keeps_id_and_created_at() {
        let db = Database::open_in_memory().await.unwrap();

        let first = alert("id-1", "am:fp", "warning");
        let outcome = upsert_alert(&db, &first).await.unwrap();
        assert!(outcome.inserted);
        assert_eq!(outcome.id, "id-1");

        let mut second = alert("id-2", "am:fp", "critical");
        second.status = "resolved".to_string();
        second.ends_at = Some(second.starts_at + Duration::minutes(5));
        second.created_at = first.created_at + Duration::seconds(30);
        second.updated_at = second.created_at;
        let outcome = upsert_alert(&db, &second).await.unwrap();
        assert!(!outcome.inserted);
        assert_eq!(outcome.id, "id-1");
        assert_eq!(outcome.created_at, first.created_at);

        assert_eq!(count_alerts(&db).await.unwrap(), 1);
        let stored = get_alert(&db, "id-1").await.unwrap().unwrap();
        assert_eq!(stored.created_at, first.created_at);
        assert_eq!(stored.updated_at, second.updated_at);
        assert_eq!(stored.severity, "critical");
        assert_eq!(stored.status, "resolved");
        assert_eq!(stored.ends_at, second.ends_at);
        assert_eq!(stored.raw_payload, second.raw_payload);
        assert!(get_alert(&db, "id-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_by_identity() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_alert(&db, &alert("a", "am:one", "info")).await.unwrap();
        upsert_alert(&db, &alert("b", "am:two", "info")).await.unwrap();

        let found = get_alert_by_identity(&db, "am:two").await.unwrap().unwrap();
        assert_eq!(found.id, "b");
        assert!(get_alert_by_identity(&db, "am:three").await.unwrap().is_none());
        assert_eq!(count_alerts(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn null_fingerprint_and_ends_at_round_trip() {
        let db = Database::open_in_memory().await.unwrap();
        let mut record = alert("x", "webhook:synthetic", "medium");
        record.fingerprint = None;
        record.ends_at = None;
        upsert_alert(&db, &record).await.unwrap();

        let stored = get_alert(&db, "x").await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn nested_attribute_values_are_stored_as_json() {
        let db = Database::open_in_memory().await.unwrap();
        let mut record = alert("n", "am:nested", "info");
        record.labels.insert("cores", serde_json::json!(8));
        record
            .annotations
            .insert("runbook", serde_json::json!({"steps": ["drain", "reboot"]}));
        upsert_alert(&db, &record).await.unwrap();

        let stored = get_alert(&db, "n").await.unwrap().unwrap();
        assert_eq!(stored.labels, record.labels);
        assert_eq!(stored.annotations, record.annotations);
    }

    #[test]
    fn attribute_encode_failure_is_a_persistence_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let mapped = VigilError::persistence(err);
        assert!(matches!(mapped, VigilError::Persistence { .. }));
        assert!(!mapped.is_request_level());
    }
}

