// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the SQLite store and
//! the stream broker, and prints a pass/fail table.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use vigil_config::{StreamBackend, VigilConfig};
use vigil_core::{HealthStatus, VigilError};
use vigil_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `vigil doctor` command.
///
/// Fails when any check fails; warnings are reported but do not fail.
pub async fn run_doctor(
    config: &VigilConfig,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<(), VigilError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config_path).await,
        check_migrations().await,
        check_database(&config.storage.database_path).await,
        check_broker(config).await,
    ];

    println!();
    println!("  vigil doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result, use_color));
    }

    println!();

    let fail_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warn_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(VigilError::Internal(format!(
            "{fail_count} doctor check(s) failed"
        )));
    }
    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

/// Check configuration loads and validates.
async fn check_config(path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match path {
        Some(path) => vigil_config::load_and_validate_path(path),
        None => vigil_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the embedded schema migrations apply to a fresh database.
async fn check_migrations() -> CheckResult {
    let start = Instant::now();
    let applied = match Database::open_in_memory().await {
        Ok(db) => db.close().await,
        Err(e) => Err(e),
    };
    migrations_result(applied, start)
}

fn migrations_result(applied: Result<(), VigilError>, start: Instant) -> CheckResult {
    match applied {
        Ok(()) => CheckResult::new("Migrations", CheckStatus::Pass, "schema applies", start),
        Err(e) => CheckResult::new("Migrations", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the database file exists and passes an integrity check.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "Database",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };

    let rows = conn
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(rows)
        })
        .await;

    match rows {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("Database", CheckStatus::Pass, "connected, integrity ok", start)
        }
        Ok(rows) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("{} integrity issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Check the configured stream broker answers.
async fn check_broker(config: &VigilConfig) -> CheckResult {
    let start = Instant::now();

    if config.stream.backend == StreamBackend::Memory {
        return CheckResult::new(
            "Stream broker",
            CheckStatus::Pass,
            "in-memory backend",
            start,
        );
    }

    let publisher = match vigil_stream::build_publisher(&config.stream) {
        Ok(publisher) => publisher,
        Err(e) => return CheckResult::new("Stream broker", CheckStatus::Fail, e.to_string(), start),
    };

    let timeout = config.stream.connect_timeout() + config.ingest.health_timeout();
    match tokio::time::timeout(timeout, publisher.health_check()).await {
        Ok(Ok(HealthStatus::Healthy)) => CheckResult::new(
            "Stream broker",
            CheckStatus::Pass,
            format!("{} reachable", config.stream.redis_url),
            start,
        ),
        Ok(Ok(HealthStatus::Degraded(reason))) => {
            CheckResult::new("Stream broker", CheckStatus::Warn, reason, start)
        }
        Ok(Ok(HealthStatus::Unhealthy(reason))) => {
            CheckResult::new("Stream broker", CheckStatus::Fail, reason, start)
        }
        Ok(Err(e)) => CheckResult::new("Stream broker", CheckStatus::Fail, e.to_string(), start),
        Err(_) => CheckResult::new(
            "Stream broker",
            CheckStatus::Fail,
            format!("no answer within {timeout:?}"),
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_config::model::StreamConfig;

    #[test]
    fn plain_line_has_status_tag() {
        let result = CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Warn,
            message: "not found".to_string(),
            duration: Duration::from_millis(5),
        };
        let line = format_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("not found"));
        assert!(line.contains("(5ms)"));
    }

    #[tokio::test]
    async fn explicit_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.toml");
        std::fs::write(&path, "[stream]\nbackend = \"memory\"\n").unwrap();

        let result = check_config(Some(&path)).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.name, "Configuration");
    }

    #[tokio::test]
    async fn migrations_apply() {
        assert_eq!(check_migrations().await.status, CheckStatus::Pass);
    }

    #[test]
    fn migrations_close_error_fails_check() {
        let closed = Err(VigilError::persistence("database is locked"));
        let result = migrations_result(closed, Instant::now());
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("database is locked"));
    }

    #[tokio::test]
    async fn missing_database_warns() {
        let result = check_database("/tmp/nonexistent-vigil-test-xyz.db").await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn existing_database_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();

        let result = check_database(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn memory_backend_passes() {
        let mut config = VigilConfig::default();
        config.stream.backend = StreamBackend::Memory;
        assert_eq!(check_broker(&config).await.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn unreachable_redis_fails() {
        let mut config = VigilConfig::default();
        config.stream = StreamConfig {
            redis_url: "redis://127.0.0.1:1".to_string(),
            connect_timeout_ms: 200,
            ..StreamConfig::default()
        };
        let result = check_broker(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }
}
