// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Required-field checks run before a record reaches the store.

use vigil_core::{AlertRecord, MetricSample, VigilError};

/// Reject an alert missing any of its required scalar fields.
///
/// Whitespace-only values count as missing. All missing fields are named in
/// one error.
pub fn validate_alert(record: &AlertRecord) -> Result<(), VigilError> {
    let missing: Vec<&str> = [
        ("identity_key", record.identity_key.as_str()),
        ("source", record.source.as_str()),
        ("severity", record.severity.as_str()),
        ("title", record.title.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VigilError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Reject a metric sample with no name or a non-finite value.
pub fn validate_metric(sample: &MetricSample) -> Result<(), VigilError> {
    if sample.metric_name.trim().is_empty() {
        return Err(VigilError::Validation(
            "metric_name must not be empty".to_string(),
        ));
    }
    if !sample.metric_value.is_finite() {
        return Err(VigilError::Validation(format!(
            "metric_value must be finite, got {}",
            sample.metric_value
        )));
    }
    Ok(())
}
