// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream publishers for handing persisted records to downstream consumers.
//!
//! Two backends implement [`StreamPublisher`]: [`RedisStream`] for
//! production and [`MemoryStream`] for local runs and tests. Both append
//! entries with the fields `type`, `id`, `data` and `ts`, and keep the stream
//! length near a configured bound.

pub mod memory;
pub mod redis_stream;

use std::sync::Arc;

use vigil_config::model::{StreamBackend, StreamConfig};
use vigil_core::{StreamPublisher, VigilError};

pub use memory::{MemoryStream, StreamEntry};
pub use redis_stream::RedisStream;

/// Build the publisher selected by `stream.backend`.
pub fn build_publisher(config: &StreamConfig) -> Result<Arc<dyn StreamPublisher>, VigilError> {
    match config.backend {
        StreamBackend::Redis => Ok(Arc::new(RedisStream::new(config)?)),
        StreamBackend::Memory => Ok(Arc::new(MemoryStream::new(
            config.stream_name.clone(),
            config.max_len,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::PluginAdapter;

    #[test]
    fn builds_backend_from_config() {
        let memory = StreamConfig {
            backend: StreamBackend::Memory,
            stream_name: "local".to_string(),
            ..StreamConfig::default()
        };
        let publisher = build_publisher(&memory).unwrap();
        assert_eq!(publisher.name(), "memory");
        assert_eq!(publisher.stream_name(), "local");

        let publisher = build_publisher(&StreamConfig::default()).unwrap();
        assert_eq!(publisher.name(), "redis");
        assert_eq!(publisher.stream_name(), "metrics:raw");
    }
}
