// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite alert store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;
use vigil_config::model::StorageConfig;
use vigil_core::{AlertRecord, AlertStore, AttributeMap, PluginAdapter};
use vigil_storage::SqliteStore;

fn record(identity_key: &str, severity: &str) -> AlertRecord {
    let now = Utc::now();
    AlertRecord {
        id: uuid::Uuid::new_v4().to_string(),
        identity_key: identity_key.to_string(),
        source: "alertmanager".to_string(),
        severity: severity.to_string(),
        title: "HighLatency".to_string(),
        description: String::new(),
        labels: AttributeMap::new(),
        annotations: AttributeMap::new(),
        starts_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        ends_at: None,
        generator_url: "http://prom:9090/graph".to_string(),
        fingerprint: identity_key.split_once(':').map(|(_, fp)| fp.to_string()),
        status: "firing".to_string(),
        raw_payload: b"{}".to_vec(),
        created_at: now,
        updated_at: now,
    }
}

async fn open_store(dir: &tempfile::TempDir, name: &str) -> Arc<SqliteStore> {
    let store = SqliteStore::new(StorageConfig {
        database_path: dir.path().join(name).display().to_string(),
        wal_mode: true,
    });
    store.initialize().await.unwrap();
    Arc::new(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_for_one_key_produce_one_row() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, "concurrent.db").await;

    let tasks = (0..16).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let severity = if i % 2 == 0 { "warning" } else { "critical" };
            store
                .upsert_alert(&record("alertmanager:fp-race", severity))
                .await
                .unwrap()
        })
    });
    let outcomes: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(store.count_alerts().await.unwrap(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.inserted).count(), 1);
    let first_id = &outcomes[0].id;
    assert!(outcomes.iter().all(|o| &o.id == first_id));
}

#[tokio::test]
async fn labels_and_annotations_round_trip_key_for_key() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir, "roundtrip.db").await;

    let mut rec = record("alertmanager:fp-labels", "critical");
    rec.labels.insert("alertname", "HighLatency");
    rec.labels.insert("replica", json!(3));
    rec.labels.insert("ratio", json!(0.1 + 0.2));
    rec.labels.insert("canary", json!(true));
    rec.labels.insert("zone", json!(null));
    rec.annotations.insert("summary", "p99 over budget");
    rec.annotations.insert("runbook", json!({"url": "http://wiki/latency", "steps": [1, 2]}));
    rec.raw_payload = br#"{"labels": {"replica": 3},  "odd  spacing": true}"#.to_vec();

    let outcome = store.upsert_alert(&rec).await.unwrap();
    let stored = store.get_alert(&outcome.id).await.unwrap().unwrap();

    assert_eq!(stored.labels, rec.labels);
    assert_eq!(stored.annotations, rec.annotations);
    assert_eq!(stored.raw_payload, rec.raw_payload);
    assert_eq!(stored.labels.get("ratio"), Some(&json!(0.30000000000000004)));
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reopen.db").display().to_string();
    let config = StorageConfig {
        database_path: path,
        wal_mode: true,
    };

    let store = SqliteStore::new(config.clone());
    store.initialize().await.unwrap();
    let outcome = store
        .upsert_alert(&record("alertmanager:fp-durable", "info"))
        .await
        .unwrap();
    store.shutdown().await.unwrap();
    drop(store);

    let reopened = SqliteStore::new(config);
    reopened.initialize().await.unwrap();
    let found = reopened
        .get_alert_by_identity("alertmanager:fp-durable")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, outcome.id);
}
