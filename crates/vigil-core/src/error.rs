// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vigil ingestion pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::types::Component;

/// The primary error type used across the store, stream, and ingest crates.
///
/// Variants follow the pipeline's propagation policy: [`Decode`](Self::Decode)
/// and [`EmptyBatch`](Self::EmptyBatch) reject a whole request, everything
/// else is isolated to a single item.
#[derive(Debug, Error)]
pub enum VigilError {
    /// The webhook body is malformed or misses a required field.
    #[error("decode error: {0}")]
    Decode(String),

    /// The webhook carried no alerts.
    #[error("empty alert list")]
    EmptyBatch,

    /// A normalized record failed its required-field checks.
    #[error("validation error: {0}")]
    Validation(String),

    /// The durable store rejected or could not execute the write.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The stream broker could not accept the message.
    #[error("publish error: {message}")]
    Publish {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A store or broker call exceeded its time budget.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: &'static str,
        duration: Duration,
    },

    /// Configuration errors (invalid values, missing sections).
    #[error("configuration error: {0}")]
    Config(String),

    /// A liveness probe failed.
    #[error("health check failed for {component}: {source}")]
    HealthCheckFailed {
        component: Component,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VigilError {
    /// Wraps any error as a persistence failure.
    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Persistence { source: err.into() }
    }

    /// Wraps a broker error as a publish failure.
    pub fn publish<E>(message: impl Into<String>, err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Publish {
            message: message.into(),
            source: Some(err.into()),
        }
    }

    /// Returns true if the request as a whole must be rejected.
    pub fn is_request_level(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::EmptyBatch)
    }
}
