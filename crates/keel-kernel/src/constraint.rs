//! Constraint rules, values, and identity keys.
//!
//! A constraint is one enforceable rule instance. The rule tag determines
//! the shape of the value (text, list, or count); boundary loaders validate
//! that pairing once, so merge and reconciliation logic can match on the
//! tag without re-inspecting shapes.

use serde::{Deserialize, Serialize};

/// Rule discriminant for a constraint.
///
/// The named variants are the families the resolver itself reasons about
/// (cancellation, deny-wins, numeric divergence). Everything else passes
/// through as [`RuleKind::Custom`] for downstream validators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    ForbidImport,
    AllowImport,
    RequireImport,
    ForbidDecorator,
    RequireDecorator,
    AllowPattern,
    ForbidPattern,
    MaxFileLines,
    MaxPublicMethods,
    Custom(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::ForbidImport => "forbid_import",
            RuleKind::AllowImport => "allow_import",
            RuleKind::RequireImport => "require_import",
            RuleKind::ForbidDecorator => "forbid_decorator",
            RuleKind::RequireDecorator => "require_decorator",
            RuleKind::AllowPattern => "allow_pattern",
            RuleKind::ForbidPattern => "forbid_pattern",
            RuleKind::MaxFileLines => "max_file_lines",
            RuleKind::MaxPublicMethods => "max_public_methods",
            RuleKind::Custom(name) => name.as_str(),
        }
    }
}

impl From<String> for RuleKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "forbid_import" => RuleKind::ForbidImport,
            "allow_import" => RuleKind::AllowImport,
            "require_import" => RuleKind::RequireImport,
            "forbid_decorator" => RuleKind::ForbidDecorator,
            "require_decorator" => RuleKind::RequireDecorator,
            "allow_pattern" => RuleKind::AllowPattern,
            "forbid_pattern" => RuleKind::ForbidPattern,
            "max_file_lines" => RuleKind::MaxFileLines,
            "max_public_methods" => RuleKind::MaxPublicMethods,
            _ => RuleKind::Custom(raw),
        }
    }
}

impl From<&str> for RuleKind {
    fn from(raw: &str) -> Self {
        RuleKind::from(raw.to_string())
    }
}

impl From<RuleKind> for String {
    fn from(rule: RuleKind) -> Self {
        rule.as_str().to_string()
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tagged constraint value. The loader guarantees the shape matches the
/// rule family; the resolver never needs to guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Count(u64),
    Text(String),
    List(Vec<String>),
}

impl RuleValue {
    /// Canonical text form used for identity keys and report rendering.
    /// List members join with `,` in declared order.
    pub fn canonical(&self) -> String {
        match self {
            RuleValue::Count(n) => n.to_string(),
            RuleValue::Text(s) => s.clone(),
            RuleValue::List(items) => items.join(","),
        }
    }

    /// Individual string members, for value-overlap checks.
    pub fn members(&self) -> Vec<&str> {
        match self {
            RuleValue::Count(_) => Vec::new(),
            RuleValue::Text(s) => vec![s.as_str()],
            RuleValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            RuleValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// Enforcement severity carried through to downstream validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// One enforceable rule instance as declared in the registry.
///
/// `pattern`, `before`, and `unless` scope where a constraint applies; the
/// descriptive fields feed validators and context hydration. All of them
/// are opaque to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub rule: RuleKind,
    pub value: RuleValue,
    #[serde(default)]
    pub severity: Severity,
    /// When set, this constraint evicts every accumulated entry for the
    /// same rule, whatever their values.
    #[serde(default, rename = "override", skip_serializing_if = "std::ops::Not::not")]
    pub override_rule: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl Constraint {
    pub fn new(rule: impl Into<RuleKind>, value: RuleValue) -> Self {
        Self {
            rule: rule.into(),
            value,
            severity: Severity::default(),
            override_rule: false,
            pattern: None,
            before: None,
            unless: None,
            why: None,
            alternative: None,
            alternatives: Vec::new(),
            examples: Vec::new(),
            usage: None,
            intent: None,
        }
    }

    /// Identity key for deduplication, override, and exclusion matching.
    pub fn key(&self) -> String {
        constraint_key(&self.rule, &self.value)
    }
}

/// A constraint plus the node or mixin id that contributed the winning
/// definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConstraint {
    #[serde(flatten)]
    pub constraint: Constraint,
    pub source: String,
}

/// Reference material attached to a node or mixin, deduplicated by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Stable constraint identity.
///
/// Value-carrying rules key as `rule:canonical-value`, so distinct values
/// of the same rule coexist. Count-valued rules key by rule alone: a node
/// holds one limit per rule and a later contributor's limit overwrites an
/// earlier one.
pub fn constraint_key(rule: &RuleKind, value: &RuleValue) -> String {
    match value {
        RuleValue::Count(_) => rule.to_string(),
        _ => format!("{rule}:{}", value.canonical()),
    }
}

/// Pattern string of a pattern-family constraint: the explicit `pattern`
/// field when present, otherwise a text value. Shared by exclusion and
/// allow/forbid pattern reconciliation so both match the same way.
pub fn extract_pattern(constraint: &Constraint) -> Option<&str> {
    if let Some(pattern) = constraint.pattern.as_deref() {
        return Some(pattern);
    }
    match &constraint.value {
        RuleValue::Text(s) => Some(s.as_str()),
        _ => None,
    }
}
