// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, non-zero timeouts, and URL schemes.

use crate::diagnostic::ConfigError;
use crate::model::{StreamBackend, VigilConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// otherwise (does not fail fast).
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.request_timeout_secs == 0 {
        fail("server.request_timeout_secs must be greater than 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.stream.stream_name.trim().is_empty() {
        fail("stream.stream_name must not be empty".to_string());
    }

    if config.stream.max_len == 0 {
        fail("stream.max_len must be greater than 0".to_string());
    }

    if config.stream.connect_timeout_ms == 0 {
        fail("stream.connect_timeout_ms must be greater than 0".to_string());
    }

    if config.stream.backend == StreamBackend::Redis {
        let url = config.stream.redis_url.trim();
        if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
            fail(format!(
                "stream.redis_url `{url}` must start with redis:// or rediss://"
            ));
        }
    }

    if config.ingest.operation_timeout_ms == 0 {
        fail("ingest.operation_timeout_ms must be greater than 0".to_string());
    }

    if config.ingest.health_timeout_ms == 0 {
        fail("ingest.health_timeout_ms must be greater than 0".to_string());
    }

    if config.ingest.default_source.trim().is_empty() {
        fail("ingest.default_source must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&VigilConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = VigilConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(messages(&errors)[0].contains("storage.database_path"));
    }

    #[test]
    fn zero_values_are_all_reported() {
        let mut config = VigilConfig::default();
        config.stream.max_len = 0;
        config.ingest.operation_timeout_ms = 0;
        config.ingest.health_timeout_ms = 0;
        config.server.request_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn redis_url_scheme_is_checked_only_for_redis_backend() {
        let mut config = VigilConfig::default();
        config.stream.redis_url = "http://cache:6379".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("stream.redis_url"));

        config.stream.backend = StreamBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rediss_scheme_is_accepted() {
        let mut config = VigilConfig::default();
        config.stream.redis_url = "rediss://cache:6380/0".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn invalid_host_fails_validation() {
        let mut config = VigilConfig::default();
        config.server.host = "not a host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("server.host"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = VigilConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(validate_config(&config).is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
