// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that the store and stream adapters implement.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, lifecycle, and liveness shared by every adapter.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Probes the backing dependency. Must not mutate state.
    async fn health_check(&self) -> Result<HealthStatus, VigilError>;

    /// Releases held resources. Called once during graceful shutdown.
    async fn shutdown(&self) -> Result<(), VigilError>;
}
