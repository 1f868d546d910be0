// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vigil configuration system.

use std::io::Write;

use vigil_config::diagnostic::ConfigError;
use vigil_config::model::StreamBackend;
use vigil_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vigil_config() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
request_timeout_secs = 3

[storage]
database_path = "/tmp/vigil-test.db"
wal_mode = false

[stream]
backend = "memory"
stream_name = "alerts:raw"
max_len = 250
connect_timeout_ms = 100

[ingest]
operation_timeout_ms = 750
health_timeout_ms = 300
default_source = "alertmanager"

[logging]
level = "debug"
json = true

[prometheus]
enabled = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.request_timeout_secs, 3);
    assert_eq!(config.storage.database_path, "/tmp/vigil-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.stream.backend, StreamBackend::Memory);
    assert_eq!(config.stream.stream_name, "alerts:raw");
    assert_eq!(config.stream.max_len, 250);
    assert_eq!(config.stream.connect_timeout_ms, 100);
    assert_eq!(config.ingest.operation_timeout_ms, 750);
    assert_eq!(config.ingest.health_timeout_ms, 300);
    assert_eq!(config.ingest.default_source, "alertmanager");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(!config.prometheus.enabled);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty config should use defaults");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.stream.stream_name, "metrics:raw");
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[stream]
redis_ulr = "redis://localhost"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            span,
            ..
        } => {
            assert_eq!(key, "redis_ulr");
            assert_eq!(suggestion.as_deref(), Some("redis_url"));
            assert!(valid_keys.contains("stream_name"));
            assert!(span.is_some(), "inline source should yield a span");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[servr]
port = 1
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown section");
    assert!(matches!(
        &errors[0],
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "server"
    ));
}

#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "server.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn invalid_backend_name_is_rejected() {
    let toml = r#"
[stream]
backend = "kafka"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn validation_errors_are_collected_together() {
    let toml = r#"
[stream]
max_len = 0
redis_url = "tcp://localhost"

[ingest]
default_source = ""
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 3);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 8181\n\n[stream]\nbackend = \"memory\"").unwrap();

    let config = load_and_validate_path(file.path()).expect("file config should load");
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.stream.backend, StreamBackend::Memory);
}

#[test]
fn explicit_path_unknown_key_points_into_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ingest]\noperation_timeout = 10").unwrap();

    let errors = load_and_validate_path(file.path()).expect_err("should reject unknown key");
    match &errors[0] {
        ConfigError::UnknownKey {
            suggestion, span, ..
        } => {
            assert_eq!(suggestion.as_deref(), Some("operation_timeout_ms"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
