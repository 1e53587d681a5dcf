//! Conflict audit records.
//!
//! Every override, exclusion, cancellation, and contradiction the engine
//! reconciles (or cannot reconcile) is recorded here and returned as data.
//! The resolver never throws for a semantic conflict; callers decide
//! policy per severity.

use serde::{Deserialize, Serialize};

/// Winner/loser marker for contradictions the engine refuses to decide,
/// e.g. `require_import` and `forbid_import` of the same value.
pub const UNRESOLVED: &str = "unresolved";

/// How serious a reconciliation decision is.
///
/// `Info` documents an expected override. `Warning` flags likely
/// misconfiguration. `Error` marks a logically unresolvable contradiction
/// the caller should treat as build-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Info,
    Warning,
    Error,
}

/// One reconciliation decision: which definition won over which, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub rule: String,
    pub value: String,
    pub winner: String,
    pub loser: String,
    /// Human-readable trace of the decision.
    pub resolution: String,
    pub severity: ConflictSeverity,
}

impl ConflictReport {
    pub fn new(
        rule: impl Into<String>,
        value: impl Into<String>,
        winner: impl Into<String>,
        loser: impl Into<String>,
        resolution: impl Into<String>,
        severity: ConflictSeverity,
    ) -> Self {
        Self {
            rule: rule.into(),
            value: value.into(),
            winner: winner.into(),
            loser: loser.into(),
            resolution: resolution.into(),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_info_below_error() {
        assert!(ConflictSeverity::Info < ConflictSeverity::Warning);
        assert!(ConflictSeverity::Warning < ConflictSeverity::Error);
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ConflictReport::new(
            "forbid_import",
            "eval",
            "child",
            "base",
            "child overrides base due to precedence",
            ConflictSeverity::Info,
        );
        let rendered = serde_json::to_value(&report).expect("report should render");
        assert_eq!(
            rendered.get("severity"),
            Some(&serde_json::Value::String("info".to_string()))
        );
        assert!(rendered.get("resolution").is_some());
    }
}
