// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis stream publisher.
//!
//! Entries are appended with `XADD <stream> MAXLEN ~ <max_len> * ...`. The
//! connection is opened on first use and shared through a cloneable
//! [`ConnectionManager`], which reconnects on its own after a broker restart.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::StreamMaxlen;
use redis::AsyncCommands;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use vigil_config::model::StreamConfig;
use vigil_core::{AdapterType, HealthStatus, PluginAdapter, StreamMessage, StreamPublisher, VigilError};

/// Publishes to a Redis stream through a lazily established connection.
///
/// Construction never touches the network, so the service starts even when
/// the broker is down. A failed connect is not cached; the next publish
/// tries again.
pub struct RedisStream {
    client: redis::Client,
    stream_name: String,
    max_len: usize,
    connect_timeout: Duration,
    conn: OnceCell<ConnectionManager>,
}

impl RedisStream {
    /// Validates the URL and prepares the client without connecting.
    pub fn new(config: &StreamConfig) -> Result<Self, VigilError> {
        let client = redis::Client::open(config.redis_url.as_str())
            .map_err(|e| VigilError::Config(format!("invalid stream.redis_url: {e}")))?;
        Ok(Self {
            client,
            stream_name: config.stream_name.clone(),
            max_len: config.max_len,
            connect_timeout: config.connect_timeout(),
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, VigilError> {
        let manager = self
            .conn
            .get_or_try_init(|| async {
                let manager = tokio::time::timeout(
                    self.connect_timeout,
                    self.client.get_connection_manager(),
                )
                .await
                .map_err(|_| VigilError::Publish {
                    message: format!(
                        "connecting to redis timed out after {:?}",
                        self.connect_timeout
                    ),
                    source: None,
                })?
                .map_err(|e| VigilError::publish("failed to connect to redis", e))?;
                debug!(stream = %self.stream_name, "redis connection established");
                Ok::<_, VigilError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl PluginAdapter for RedisStream {
    fn name(&self) -> &str {
        "redis"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Stream
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| VigilError::publish("PING failed", e))?;
        if pong == "PONG" {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!("unexpected PING reply: {pong}")))
        }
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        // ConnectionManager closes when the last clone is dropped.
        Ok(())
    }
}

#[async_trait]
impl StreamPublisher for RedisStream {
    async fn publish(&self, message: &StreamMessage) -> Result<String, VigilError> {
        let mut conn = self.connection().await?;
        let fields = message.fields();
        let entry_id: String = conn
            .xadd_maxlen(
                &self.stream_name,
                StreamMaxlen::Approx(self.max_len),
                "*",
                fields.as_slice(),
            )
            .await
            .map_err(|e| {
                warn!(stream = %self.stream_name, error = %e, "XADD failed");
                VigilError::publish(format!("XADD to {} failed", self.stream_name), e)
            })?;
        debug!(stream = %self.stream_name, entry_id = %entry_id, kind = %message.kind, "published");
        Ok(entry_id)
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }
}
