// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use tracing::debug;
use vigil_core::VigilError;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into `VigilError::Persistence`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VigilError {
    VigilError::persistence(e)
}

/// Unwraps a domain error raised inside a `call` closure.
fn map_call_err(e: tokio_rusqlite::Error<VigilError>) -> VigilError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => VigilError::persistence(other.to_string()),
    }
}

/// Handle to the single SQLite connection.
///
/// Opening applies connection PRAGMAs and runs pending migrations before
/// the handle is returned.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, VigilError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(VigilError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(VigilError::persistence)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and `vigil doctor`.
    pub async fn open_in_memory() -> Result<Self, VigilError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(VigilError::persistence)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), VigilError> {
        self.conn
            .call(move |conn| -> Result<(), VigilError> {
                let journal = if wal_mode { "WAL" } else { "DELETE" };
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode = {journal};
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA foreign_keys = ON;"
                ))
                .map_err(VigilError::persistence)?;
                run_migrations(conn)
            })
            .await
            .map_err(map_call_err)
    }

    /// The underlying async connection. Query modules go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), VigilError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), VigilError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(VigilError::persistence)
    }
}
