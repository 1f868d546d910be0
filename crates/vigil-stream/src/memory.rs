// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process bounded stream for local runs and tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use vigil_core::{AdapterType, HealthStatus, PluginAdapter, StreamMessage, StreamPublisher, VigilError};

/// An entry as stored by [`MemoryStream`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    /// `<unix-millis>-<sequence>`, in the same shape as Redis entry ids.
    pub entry_id: String,
    pub fields: Vec<(String, String)>,
}

impl StreamEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct Log {
    entries: VecDeque<StreamEntry>,
    last_ms: i64,
    seq: u64,
}

/// Bounded append-only log.
///
/// Trimming is approximate like `MAXLEN ~`: the log may grow to `max_len`
/// plus a slack of one tenth before the oldest entries are dropped back down
/// to `max_len`.
pub struct MemoryStream {
    stream_name: String,
    max_len: usize,
    slack: usize,
    log: Mutex<Log>,
}

impl MemoryStream {
    pub fn new(stream_name: impl Into<String>, max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            stream_name: stream_name.into(),
            max_len,
            slack: (max_len / 10).max(1),
            log: Mutex::new(Log::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Log>, VigilError> {
        self.log
            .lock()
            .map_err(|_| VigilError::Internal("memory stream lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|log| log.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<StreamEntry> {
        self.lock()
            .map(|log| log.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Upper bound the log length never exceeds.
    pub fn hard_limit(&self) -> usize {
        self.max_len + self.slack
    }
}

#[async_trait]
impl PluginAdapter for MemoryStream {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Stream
    }

    async fn health_check(&self) -> Result<HealthStatus, VigilError> {
        drop(self.lock()?);
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VigilError> {
        Ok(())
    }
}

#[async_trait]
impl StreamPublisher for MemoryStream {
    async fn publish(&self, message: &StreamMessage) -> Result<String, VigilError> {
        let mut log = self.lock()?;

        let now_ms = Utc::now().timestamp_millis().max(log.last_ms);
        if now_ms == log.last_ms {
            log.seq += 1;
        } else {
            log.last_ms = now_ms;
            log.seq = 0;
        }
        let entry_id = format!("{}-{}", log.last_ms, log.seq);

        log.entries.push_back(StreamEntry {
            entry_id: entry_id.clone(),
            fields: message
                .fields()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        });

        if log.entries.len() > self.hard_limit() {
            let excess = log.entries.len() - self.max_len;
            log.entries.drain(..excess);
            debug!(stream = %self.stream_name, trimmed = excess, "trimmed memory stream");
        }

        Ok(entry_id)
    }

    fn stream_name(&self) -> &str {
        &self.stream_name
    }
}
