// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only stream publisher.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::traits::adapter::PluginAdapter;
use crate::types::StreamMessage;

/// Best-effort hand-off of records to downstream consumers.
///
/// Delivery is at-least-once. Failures surface as [`VigilError::Publish`] and
/// callers decide whether to tolerate them.
#[async_trait]
pub trait StreamPublisher: PluginAdapter {
    /// Appends `message` and returns the broker-assigned entry id.
    async fn publish(&self, message: &StreamMessage) -> Result<String, VigilError>;

    /// Name of the stream entries are appended to.
    fn stream_name(&self) -> &str;
}
