//! Registry YAML loader.
//!
//! Parses a registry document into the kernel model, enforcing the
//! rule/value shape pairings once so downstream merge logic never has to
//! re-inspect them.

use keel_kernel::{
    ArchitectureNode, Constraint, InlineMode, Mixin, Pointer, Registry, RuleKind, RuleValue,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const REGISTRY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read registry at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("registry version {0} is not supported (expected {REGISTRY_SCHEMA_VERSION})")]
    UnsupportedVersion(u32),

    /// A declaration parsed but violates the registry schema, e.g. a
    /// numeric value on an import rule.
    #[error("{location}: {message}")]
    Shape { location: String, message: String },
}

fn shape_error(location: impl Into<String>, message: impl Into<String>) -> LoadError {
    LoadError::Shape {
        location: location.into(),
        message: message.into(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct RegistryDoc {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    architectures: BTreeMap<String, NodeDoc>,
    #[serde(default)]
    mixins: BTreeMap<String, MixinDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct NodeDoc {
    #[serde(default)]
    inherits: Option<String>,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default)]
    exclude_constraints: Vec<String>,
    #[serde(default)]
    mixins: Vec<String>,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    pointers: Vec<Pointer>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    contract: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    deprecated_from: Option<String>,
    #[serde(default)]
    migration_guide: Option<String>,
    #[serde(default)]
    code_pattern: Option<String>,
    #[serde(default)]
    expected_intents: Vec<String>,
    #[serde(default)]
    suggested_intents: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MixinDoc {
    #[serde(default)]
    inline: InlineMode,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    pointers: Vec<Pointer>,
    #[serde(default)]
    description: Option<String>,
    /// Not part of the mixin schema; mixins compose additively. Captured
    /// only so a declaration can be rejected with a real message instead
    /// of being silently ignored.
    #[serde(default)]
    exclude_constraints: Option<serde_yaml::Value>,
}

/// Load and validate a registry from YAML text.
pub fn load_registry_str(raw: &str) -> Result<Registry, LoadError> {
    let doc: RegistryDoc = serde_yaml::from_str(raw)?;
    if let Some(version) = doc.version
        && version != REGISTRY_SCHEMA_VERSION
    {
        return Err(LoadError::UnsupportedVersion(version));
    }

    let mut registry = Registry::default();

    for (raw_id, node_doc) in doc.architectures {
        let id = raw_id.trim().to_string();
        if id.is_empty() {
            return Err(shape_error(
                "architectures",
                "architecture ids must be non-empty",
            ));
        }
        let location = format!("architectures.{id}");
        validate_constraints(&location, &node_doc.constraints)?;
        for (index, pattern) in node_doc.exclude_constraints.iter().enumerate() {
            if pattern.trim().is_empty() {
                return Err(shape_error(
                    format!("{location}.exclude_constraints[{index}]"),
                    "exclusion patterns must be non-empty",
                ));
            }
        }

        let mut node = ArchitectureNode::new(id.clone());
        node.inherits = node_doc.inherits.map(|parent| parent.trim().to_string());
        node.constraints = node_doc.constraints;
        node.exclude_constraints = node_doc.exclude_constraints;
        node.mixins = node_doc.mixins;
        node.hints = node_doc.hints;
        node.pointers = node_doc.pointers;
        node.description = node_doc.description;
        node.rationale = node_doc.rationale;
        node.contract = node_doc.contract;
        node.version = node_doc.version;
        node.deprecated_from = node_doc.deprecated_from;
        node.migration_guide = node_doc.migration_guide;
        node.code_pattern = node_doc.code_pattern;
        node.expected_intents = node_doc.expected_intents;
        node.suggested_intents = node_doc.suggested_intents;
        registry.nodes.insert(id, node);
    }

    for (raw_id, mixin_doc) in doc.mixins {
        let id = raw_id.trim().to_string();
        if id.is_empty() {
            return Err(shape_error("mixins", "mixin ids must be non-empty"));
        }
        let location = format!("mixins.{id}");
        if mixin_doc.exclude_constraints.is_some() {
            return Err(shape_error(
                &location,
                "mixins cannot declare exclude_constraints; only architecture nodes may exclude",
            ));
        }
        validate_constraints(&location, &mixin_doc.constraints)?;

        let mut mixin = Mixin::new(id.clone());
        mixin.inline = mixin_doc.inline;
        mixin.constraints = mixin_doc.constraints;
        mixin.hints = mixin_doc.hints;
        mixin.pointers = mixin_doc.pointers;
        mixin.description = mixin_doc.description;
        registry.mixins.insert(id, mixin);
    }

    Ok(registry)
}

/// Load and validate a registry from a YAML file.
pub fn load_registry_path(path: impl AsRef<Path>) -> Result<Registry, LoadError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_registry_str(&raw)
}

fn validate_constraints(location: &str, constraints: &[Constraint]) -> Result<(), LoadError> {
    for (index, constraint) in constraints.iter().enumerate() {
        let valid = match &constraint.rule {
            RuleKind::ForbidImport
            | RuleKind::AllowImport
            | RuleKind::RequireImport
            | RuleKind::ForbidDecorator
            | RuleKind::RequireDecorator => matches!(
                constraint.value,
                RuleValue::Text(_) | RuleValue::List(_)
            ),
            RuleKind::AllowPattern | RuleKind::ForbidPattern => {
                matches!(constraint.value, RuleValue::Text(_))
            }
            RuleKind::MaxFileLines | RuleKind::MaxPublicMethods => {
                matches!(constraint.value, RuleValue::Count(_))
            }
            RuleKind::Custom(_) => true,
        };
        if !valid {
            return Err(shape_error(
                format!("{location}.constraints[{index}]"),
                format!(
                    "rule `{}` cannot take a {} value",
                    constraint.rule,
                    shape_name(&constraint.value)
                ),
            ));
        }
    }
    Ok(())
}

fn shape_name(value: &RuleValue) -> &'static str {
    match value {
        RuleValue::Count(_) => "count",
        RuleValue::Text(_) => "text",
        RuleValue::List(_) => "list",
    }
}
