//! Structural registry checking.
//!
//! The loader guarantees shapes; this pass checks cross-references over a
//! whole registry (parents, cycles, mixin ids) and reports every defect at
//! once instead of failing on the first resolution that trips over one.

use keel_kernel::{Registry, ResolveError, build_inheritance_chain};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub mod failure_class {
    pub const EMPTY_ID: &str = "registry_empty_id";
    pub const UNKNOWN_PARENT: &str = "registry_unknown_parent";
    pub const INHERITANCE_CYCLE: &str = "registry_inheritance_cycle";
    pub const UNKNOWN_MIXIN: &str = "registry_unknown_mixin";
    pub const INLINE_ONLY_DECLARED: &str = "registry_inline_only_declared";
    pub const DUPLICATE_POINTER: &str = "registry_duplicate_pointer";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryIssue {
    pub failure_class: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryReport {
    pub result: String,
    pub failure_classes: Vec<String>,
    pub issues: Vec<RegistryIssue>,
}

impl RegistryReport {
    fn from_issues(mut issues: Vec<RegistryIssue>) -> Self {
        issues.sort_by(|a, b| {
            (&a.path, &a.failure_class, &a.message).cmp(&(&b.path, &b.failure_class, &b.message))
        });
        let failure_classes: Vec<String> = issues
            .iter()
            .map(|issue| issue.failure_class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            result: if issues.is_empty() {
                "accepted".to_string()
            } else {
                "rejected".to_string()
            },
            failure_classes,
            issues,
        }
    }
}

fn push_issue(
    issues: &mut Vec<RegistryIssue>,
    failure_class: &str,
    path: String,
    message: String,
) {
    issues.push(RegistryIssue {
        failure_class: failure_class.to_string(),
        path,
        message,
    });
}

/// Check every cross-reference in the registry.
pub fn check_registry(registry: &Registry) -> RegistryReport {
    let mut issues = Vec::new();

    for (id, node) in &registry.nodes {
        let path = format!("architectures.{id}");
        if id.trim().is_empty() {
            push_issue(
                &mut issues,
                failure_class::EMPTY_ID,
                "architectures".to_string(),
                "architecture ids must be non-empty".to_string(),
            );
            continue;
        }

        if let Some(parent) = &node.inherits {
            if registry.node(parent).is_none() {
                push_issue(
                    &mut issues,
                    failure_class::UNKNOWN_PARENT,
                    format!("{path}.inherits"),
                    format!("unknown parent architecture `{parent}`"),
                );
            } else if let Err(ResolveError::CircularInheritance { path: cycle }) =
                build_inheritance_chain(registry, id)
            {
                push_issue(
                    &mut issues,
                    failure_class::INHERITANCE_CYCLE,
                    format!("{path}.inherits"),
                    format!("inheritance cycle: {}", cycle.join(" -> ")),
                );
            }
        }

        for (index, mixin_id) in node.mixins.iter().enumerate() {
            match registry.mixin(mixin_id) {
                None => push_issue(
                    &mut issues,
                    failure_class::UNKNOWN_MIXIN,
                    format!("{path}.mixins[{index}]"),
                    format!("unknown mixin `{mixin_id}`"),
                ),
                Some(mixin) if mixin.inline == keel_kernel::InlineMode::Only => push_issue(
                    &mut issues,
                    failure_class::INLINE_ONLY_DECLARED,
                    format!("{path}.mixins[{index}]"),
                    format!(
                        "mixin `{mixin_id}` declares inline: only and may not be declared here"
                    ),
                ),
                Some(_) => {}
            }
        }

        let mut seen_uris: BTreeMap<&str, usize> = BTreeMap::new();
        for (index, pointer) in node.pointers.iter().enumerate() {
            if let Some(first) = seen_uris.insert(pointer.uri.as_str(), index) {
                push_issue(
                    &mut issues,
                    failure_class::DUPLICATE_POINTER,
                    format!("{path}.pointers[{index}]"),
                    format!(
                        "pointer `{}` duplicates pointers[{first}]",
                        pointer.uri
                    ),
                );
            }
        }
    }

    for id in registry.mixins.keys() {
        if id.trim().is_empty() {
            push_issue(
                &mut issues,
                failure_class::EMPTY_ID,
                "mixins".to_string(),
                "mixin ids must be non-empty".to_string(),
            );
        }
    }

    RegistryReport::from_issues(issues)
}
