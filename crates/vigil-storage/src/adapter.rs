// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the AlertStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use vigil_config::model::StorageConfig;
use vigil_core::types::{AlertRecord, MetricSample, UpsertOutcome};
use vigil_core::{AdapterType, AlertStore, HealthStatus, PluginAdapter, VigilError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed alert store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`initialize`](SqliteStore::initialize).
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig {
                database_path: ":memory:".to_string(),
                wal_mode: false,
            },
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database file and run pending migrations.
    pub async fn initialize(&self) -> Result<(), VigilError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| VigilError::persistence("store already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, VigilError> {
        self.db
            .get()
            .ok_or_else(|| VigilError::persistence("store not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn upsert_alert(&self, record: &AlertRecord) -> Result<UpsertOutcome, VigilError> {
        queries::alerts::upsert_alert(self.db()?, record).await
    }

    async fn get_alert(&self, id: &str) -> Result<Option<AlertRecord>, VigilError> {
        queries::alerts::get_alert(self.db()?, id).await
    }

    async fn get_alert_by_identity(
        &self,
        identity_key: &str,
    ) -> Result<Option<AlertRecord>, VigilError> {
        queries::alerts::get_alert_by_identity(self.db()?, identity_key).await
    }

    async fn count_alerts(&self) -> Result<i64, VigilError> {
        queries::alerts::count_alerts(self.db()?).await
    }

    async fn insert_metric(&self, sample: &MetricSample) -> Result<(), VigilError> {
        queries::metrics::insert_metric(self.db()?, sample).await
    }

    async fn count_metrics(&self) -> Result<i64, VigilError> {
        queries::metrics::count_metrics(self.db()?).await
    }
}
