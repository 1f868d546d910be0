// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deduplication keys for alerts.

use std::fmt;

/// The key an alert is deduplicated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    key: String,
    synthesized: bool,
}

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// True when the sender supplied no fingerprint and the key is random.
    ///
    /// Redeliveries of such alerts cannot be recognized and produce new rows.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Derive the identity key for an alert from `source`.
///
/// A fingerprint that is non-empty after trimming gives the deterministic
/// key `"{source}:{fingerprint}"`. Otherwise a fresh UUID takes its place.
pub fn resolve_identity(source: &str, fingerprint: Option<&str>) -> IdentityKey {
    match fingerprint.map(str::trim).filter(|fp| !fp.is_empty()) {
        Some(fp) => IdentityKey {
            key: format!("{source}:{fp}"),
            synthesized: false,
        },
        None => IdentityKey {
            key: format!("{source}:{}", uuid::Uuid::new_v4()),
            synthesized: true,
        },
    }
}
