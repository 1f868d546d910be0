// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Vigil ingestion service.
//!
//! Thin axum layer over the ingest crate: handlers decode the body, hand it
//! to the coordinator or metric ingestor, and translate the outcome into a
//! status code and JSON body.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, serve, start_server};
