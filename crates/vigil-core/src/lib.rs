// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vigil alert ingestion service.
//!
//! This crate provides the adapter traits, the error type, and the record
//! types shared by the storage, stream, ingest, and gateway crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::VigilError;
pub use types::{
    AdapterType, AlertRecord, AttributeMap, Component, HealthStatus, MetricSample, StreamKind,
    StreamMessage, UpsertOutcome,
};

pub use traits::{AlertStore, PluginAdapter, StreamPublisher};
