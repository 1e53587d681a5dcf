//! Inheritance chain construction.

use crate::error::ResolveError;
use crate::registry::{ArchId, Registry};
use std::collections::BTreeSet;

/// Walk `inherits` pointers from `arch_id` to its root.
///
/// Returns the chain in root-first order, queried node last, length ≥ 1.
/// Fails with [`ResolveError::UnknownArch`] when the starting id or any
/// ancestor is absent, and with [`ResolveError::CircularInheritance`]
/// (carrying the full walk path) the moment an id repeats.
pub fn build_inheritance_chain(
    registry: &Registry,
    arch_id: &str,
) -> Result<Vec<ArchId>, ResolveError> {
    let mut chain: Vec<ArchId> = Vec::new();
    let mut visited: BTreeSet<ArchId> = BTreeSet::new();
    let mut current = arch_id.to_string();

    loop {
        if !visited.insert(current.clone()) {
            let mut path = chain;
            path.push(current);
            return Err(ResolveError::CircularInheritance { path });
        }
        let node = registry
            .node(&current)
            .ok_or_else(|| ResolveError::UnknownArch {
                arch_id: current.clone(),
                available: registry.arch_ids(),
            })?;
        chain.push(current.clone());
        match &node.inherits {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }

    chain.reverse();
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArchitectureNode;

    fn registry_with(nodes: &[(&str, Option<&str>)]) -> Registry {
        let mut registry = Registry::default();
        for (id, inherits) in nodes {
            let mut node = ArchitectureNode::new(*id);
            node.inherits = inherits.map(str::to_string);
            registry.nodes.insert((*id).to_string(), node);
        }
        registry
    }

    #[test]
    fn root_node_yields_single_element_chain() {
        let registry = registry_with(&[("base", None)]);
        let chain = build_inheritance_chain(&registry, "base").expect("chain should build");
        assert_eq!(chain, vec!["base".to_string()]);
    }

    #[test]
    fn chain_is_root_first_self_last() {
        let registry = registry_with(&[
            ("base", None),
            ("service", Some("base")),
            ("http-handler", Some("service")),
        ]);
        let chain =
            build_inheritance_chain(&registry, "http-handler").expect("chain should build");
        assert_eq!(
            chain,
            vec![
                "base".to_string(),
                "service".to_string(),
                "http-handler".to_string()
            ]
        );
    }

    #[test]
    fn unknown_start_is_a_structural_error() {
        let registry = registry_with(&[("base", None)]);
        let err = build_inheritance_chain(&registry, "ghost").expect_err("should fail");
        match err {
            ResolveError::UnknownArch { arch_id, available } => {
                assert_eq!(arch_id, "ghost");
                assert_eq!(available, vec!["base".to_string()]);
            }
            other => panic!("expected UnknownArch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_ancestor_is_a_structural_error() {
        let registry = registry_with(&[("child", Some("ghost"))]);
        let err = build_inheritance_chain(&registry, "child").expect_err("should fail");
        match err {
            ResolveError::UnknownArch { arch_id, .. } => assert_eq!(arch_id, "ghost"),
            other => panic!("expected UnknownArch, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_cycles_carry_the_path() {
        let registry = registry_with(&[("selfish", Some("selfish"))]);
        let err = build_inheritance_chain(&registry, "selfish").expect_err("should fail");
        match err {
            ResolveError::CircularInheritance { path } => {
                assert_eq!(path, vec!["selfish".to_string(), "selfish".to_string()]);
            }
            other => panic!("expected CircularInheritance, got {other:?}"),
        }
    }

    #[test]
    fn mutual_cycles_contain_both_ids() {
        let registry = registry_with(&[("a", Some("b")), ("b", Some("a"))]);
        let err = build_inheritance_chain(&registry, "a").expect_err("should fail");
        match err {
            ResolveError::CircularInheritance { path } => {
                assert_eq!(
                    path,
                    vec!["a".to_string(), "b".to_string(), "a".to_string()]
                );
            }
            other => panic!("expected CircularInheritance, got {other:?}"),
        }
    }
}
