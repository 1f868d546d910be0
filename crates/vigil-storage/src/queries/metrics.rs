// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric sample inserts.

use rusqlite::{OptionalExtension, params};
use vigil_core::VigilError;
use vigil_core::types::format_timestamp;

use crate::database::Database;
use crate::models::{METRIC_COLUMNS, MetricSample, metric_from_row};

/// Insert a metric sample. Samples are append-only.
pub async fn insert_metric(db: &Database, sample: &MetricSample) -> Result<(), VigilError> {
    let labels = sample
        .labels
        .to_json()
        .map_err(VigilError::persistence)?;
    let sample = sample.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!("INSERT INTO metrics ({METRIC_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    sample.id,
                    sample.metric_name,
                    sample.metric_value,
                    labels,
                    format_timestamp(&sample.observed_at),
                    format_timestamp(&sample.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_metric(db: &Database, id: &str) -> Result<Option<MetricSample>, VigilError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<MetricSample>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {METRIC_COLUMNS} FROM metrics WHERE id = ?1"),
                params![id],
                metric_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn count_metrics(db: &Database) -> Result<i64, VigilError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM metrics", [], |row| row.get(0))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use vigil_core::AttributeMap;

    #[tokio::test]
    async fn insert_and_read_back() {
        let db = Database::open_in_memory().await.unwrap();
        let mut labels = AttributeMap::new();
        labels.insert("host", "web-01");
        labels.insert("cores", json!(8));
        let now = Utc::now();
        let sample = MetricSample {
            id: "m-1".to_string(),
            metric_name: "cpu_usage".to_string(),
            metric_value: 0.731,
            labels,
            observed_at: now,
            created_at: now,
        };

        insert_metric(&db, &sample).await.unwrap();
        assert_eq!(count_metrics(&db).await.unwrap(), 1);
        assert_eq!(get_metric(&db, "m-1").await.unwrap().unwrap(), sample);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let now = Utc::now();
        let sample = MetricSample {
            id: "dup".to_string(),
            metric_name: "mem".to_string(),
            metric_value: 1.0,
            labels: AttributeMap::new(),
            observed_at: now,
            created_at: now,
        };
        insert_metric(&db, &sample).await.unwrap();
        let err = insert_metric(&db, &sample).await.unwrap_err();
        assert!(matches!(err, VigilError::Persistence { .. }));
    }
}
