// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derives canonical severity, title and description from label and
//! annotation maps whose shape varies by sender.

use vigil_core::AttributeMap;

pub const DEFAULT_SEVERITY: &str = "medium";
pub const DEFAULT_TITLE: &str = "Unknown Alert";

/// Scalar fields derived from an alert's labels and annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub severity: String,
    pub title: String,
    pub description: String,
}

/// Derive the canonical scalar fields.
///
/// Each field takes the first candidate key holding a JSON string, falling
/// back to a default. Non-string values count as absent; an empty string is
/// taken as-is.
pub fn normalize(labels: &AttributeMap, annotations: &AttributeMap) -> Normalized {
    let severity = labels
        .get_str("severity")
        .or_else(|| labels.get_str("priority"))
        .unwrap_or(DEFAULT_SEVERITY);

    let title = annotations
        .get_str("summary")
        .or_else(|| annotations.get_str("title"))
        .or_else(|| labels.get_str("alertname"))
        .unwrap_or(DEFAULT_TITLE);

    let description = annotations
        .get_str("description")
        .or_else(|| annotations.get_str("message"))
        .unwrap_or_default();

    Normalized {
        severity: severity.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn map(pairs: &[(&str, Value)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn severity_prefers_severity_over_priority() {
        let labels = map(&[("severity", json!("critical")), ("priority", json!("high"))]);
        assert_eq!(normalize(&labels, &AttributeMap::new()).severity, "critical");
    }

    #[test]
    fn severity_falls_back_to_priority_then_default() {
        let labels = map(&[("priority", json!("high"))]);
        assert_eq!(normalize(&labels, &AttributeMap::new()).severity, "high");
        assert_eq!(
            normalize(&AttributeMap::new(), &AttributeMap::new()).severity,
            "medium"
        );
    }

    #[test]
    fn non_string_severity_is_treated_as_absent() {
        let labels = map(&[("severity", json!(3)), ("priority", json!("p1"))]);
        assert_eq!(normalize(&labels, &AttributeMap::new()).severity, "p1");

        let labels = map(&[("severity", json!(null))]);
        assert_eq!(normalize(&labels, &AttributeMap::new()).severity, "medium");
    }

    #[test]
    fn title_fallback_order() {
        let labels = map(&[("alertname", json!("HighCPU"))]);
        let both = map(&[("summary", json!("CPU over 90%")), ("title", json!("CPU"))]);
        let title_only = map(&[("title", json!("CPU"))]);

        assert_eq!(normalize(&labels, &both).title, "CPU over 90%");
        assert_eq!(normalize(&labels, &title_only).title, "CPU");
        assert_eq!(normalize(&labels, &AttributeMap::new()).title, "HighCPU");
        assert_eq!(
            normalize(&AttributeMap::new(), &AttributeMap::new()).title,
            "Unknown Alert"
        );
    }

    #[test]
    fn description_fallback_order() {
        let annotations = map(&[("message", json!("disk at 95%"))]);
        assert_eq!(
            normalize(&AttributeMap::new(), &annotations).description,
            "disk at 95%"
        );
        assert_eq!(
            normalize(&AttributeMap::new(), &AttributeMap::new()).description,
            ""
        );
    }

    #[test]
    fn present_empty_string_is_kept() {
        let labels = map(&[("severity", json!("")), ("priority", json!("high"))]);
        assert_eq!(normalize(&labels, &AttributeMap::new()).severity, "");
    }

    fn json_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn severity_is_first_string_candidate(sev in json_scalar(), prio in json_scalar()) {
            let labels = map(&[("severity", sev.clone()), ("priority", prio.clone())]);
            let expected = sev
                .as_str()
                .or(prio.as_str())
                .unwrap_or(DEFAULT_SEVERITY)
                .to_string();
            prop_assert_eq!(normalize(&labels, &AttributeMap::new()).severity, expected);
        }

        #[test]
        fn title_is_never_absent(
            summary in json_scalar(),
            title in json_scalar(),
            alertname in json_scalar()
        ) {
            let labels = map(&[("alertname", alertname.clone())]);
            let annotations = map(&[("summary", summary.clone()), ("title", title.clone())]);
            let expected = summary
                .as_str()
                .or(title.as_str())
                .or(alertname.as_str())
                .unwrap_or(DEFAULT_TITLE)
                .to_string();
            prop_assert_eq!(normalize(&labels, &annotations).title, expected);
        }
    }
}
