//! Registry model: architecture nodes and mixins.
//!
//! A `Registry` is built once per run by an external loader and is
//! read-only for the lifetime of every resolution pass over it.

use crate::constraint::{Constraint, Pointer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ArchId = String;
pub type MixinId = String;

/// All declared architecture definitions, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub nodes: BTreeMap<ArchId, ArchitectureNode>,
    #[serde(default)]
    pub mixins: BTreeMap<MixinId, Mixin>,
}

impl Registry {
    pub fn node(&self, arch_id: &str) -> Option<&ArchitectureNode> {
        self.nodes.get(arch_id)
    }

    pub fn mixin(&self, mixin_id: &str) -> Option<&Mixin> {
        self.mixins.get(mixin_id)
    }

    pub fn arch_ids(&self) -> Vec<ArchId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn mixin_ids(&self) -> Vec<MixinId> {
        self.mixins.keys().cloned().collect()
    }
}

/// A named rule-bearing definition a file can be tagged with.
///
/// At most one `inherits` target: the registry is a forest, not a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureNode {
    pub id: ArchId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<ArchId>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Exclusion patterns applied against accumulated constraints:
    /// `rule:value` (exact key), `rule` (whole family), or `rule:` (prefix).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<MixinId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pointers: Vec<Pointer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_intents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_intents: Vec<String>,
}

impl ArchitectureNode {
    pub fn new(id: impl Into<ArchId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// How a mixin may be attached to a file's architecture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineMode {
    /// Usable both from a node's `mixins` list and from the inline tag.
    #[default]
    Unconstrained,
    /// Registry-declared only; the inline tag may not apply it.
    Forbidden,
    /// Inline-tag only; declaring it in a node's `mixins` list is flagged.
    Only,
}

/// A reusable constraint bundle attachable to many nodes.
///
/// Mixins compose additively: they carry no `inherits` pointer and no
/// `exclude_constraints`. Only architecture nodes may exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixin {
    pub id: MixinId,
    #[serde(default)]
    pub inline: InlineMode,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pointers: Vec<Pointer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Mixin {
    pub fn new(id: impl Into<MixinId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(InlineMode::Unconstrained).expect("mode should render"),
            serde_json::Value::String("unconstrained".to_string())
        );
        let parsed: InlineMode =
            serde_json::from_value(serde_json::json!("only")).expect("mode should parse");
        assert_eq!(parsed, InlineMode::Only);
    }

    #[test]
    fn registry_lookups_are_by_exact_id() {
        let mut registry = Registry::default();
        registry
            .nodes
            .insert("http-handler".to_string(), ArchitectureNode::new("http-handler"));
        registry
            .mixins
            .insert("strict-io".to_string(), Mixin::new("strict-io"));
        assert!(registry.node("http-handler").is_some());
        assert!(registry.node("http").is_none());
        assert!(registry.mixin("strict-io").is_some());
        assert_eq!(registry.arch_ids(), vec!["http-handler".to_string()]);
    }
}
