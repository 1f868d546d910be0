// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the ingestion pipeline's external
//! dependencies.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be shared as `Arc<dyn ...>`.

pub mod adapter;
pub mod store;
pub mod stream;

pub use adapter::PluginAdapter;
pub use store::AlertStore;
pub use stream::StreamPublisher;
