// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vigil integration tests.
//!
//! Provides fake adapters and a harness that wires the full pipeline over a
//! temp SQLite database and an in-memory stream, so no Redis is needed.
//!
//! # Components
//!
//! - [`TestHarness`] - Full pipeline with router, store and stream handles
//! - [`FailingStream`] - Broker that rejects every publish
//! - [`UnavailableStore`] - Store that fails every call
//! - [`RecordingStore`] - Wrapper that counts store calls

pub mod fakes;
pub mod harness;

pub use fakes::{FailingStream, RecordingStore, UnavailableStore};
pub use harness::{TestHarness, TestHarnessBuilder};
