//! Resolution entry point and the flattened result.

use crate::accumulate::Accumulator;
use crate::chain::build_inheritance_chain;
use crate::conflict::ConflictReport;
use crate::constraint::{Pointer, ResolvedConstraint};
use crate::error::ResolveError;
use crate::mixin_conflict::{MixinCandidate, MixinOrigin, detect_mixin_conflicts};
use crate::reconcile::reconcile;
use crate::registry::{ArchId, ArchitectureNode, MixinId, Registry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The fully-merged, conflict-reconciled rule set for one architecture id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedArchitecture {
    pub arch_id: ArchId,
    /// Root-first, queried node last, length ≥ 1.
    pub inheritance_chain: Vec<ArchId>,
    /// Registry-declared mixins then inline mixins, in application order.
    pub applied_mixins: Vec<MixinId>,
    /// No two entries share a constraint identity key.
    pub constraints: Vec<ResolvedConstraint>,
    pub hints: Vec<String>,
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

/// Result + diagnostics: the flattened architecture together with every
/// override/conflict decision made while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub architecture: FlattenedArchitecture,
    pub conflicts: Vec<ConflictReport>,
}

/// Flatten `arch_id` against the registry.
///
/// Contributors merge in precedence order: ancestors root-first, the
/// node's registry-declared mixins, the file's inline mixins, then the
/// node itself. Ancestor exclusions apply as each ancestor merges; the
/// queried node's exclusions are deferred until after all mixins so it
/// can exclude mixin-introduced constraints. The registry is never
/// mutated and no state survives the call.
pub fn resolve_architecture(
    registry: &Registry,
    arch_id: &str,
    inline_mixins: &[MixinId],
) -> Result<Resolution, ResolveError> {
    let chain = build_inheritance_chain(registry, arch_id)?;
    let leaf = lookup_node(registry, arch_id)?;

    let mut candidates: Vec<MixinCandidate<'_>> = Vec::new();
    for mixin_id in &leaf.mixins {
        candidates.push(MixinCandidate {
            id: mixin_id.as_str(),
            mixin: lookup_mixin(registry, mixin_id, arch_id)?,
            origin: MixinOrigin::Registry,
        });
    }
    for mixin_id in inline_mixins {
        candidates.push(MixinCandidate {
            id: mixin_id.as_str(),
            mixin: lookup_mixin(registry, mixin_id, "inline tag")?,
            origin: MixinOrigin::Inline,
        });
    }

    let mut acc = Accumulator::new();

    for ancestor_id in &chain[..chain.len() - 1] {
        let ancestor = lookup_node(registry, ancestor_id)?;
        acc.merge_constraints(ancestor_id, &ancestor.constraints);
        acc.merge_hints(&ancestor.hints);
        acc.merge_pointers(&ancestor.pointers);
        acc.apply_exclusions(ancestor_id, &ancestor.exclude_constraints);
    }

    acc.conflicts.extend(detect_mixin_conflicts(&candidates));

    for candidate in &candidates {
        acc.merge_constraints(candidate.id, &candidate.mixin.constraints);
        acc.merge_hints(&candidate.mixin.hints);
        acc.merge_pointers(&candidate.mixin.pointers);
    }

    acc.merge_constraints(arch_id, &leaf.constraints);
    acc.merge_hints(&leaf.hints);
    acc.merge_pointers(&leaf.pointers);
    acc.apply_exclusions(arch_id, &leaf.exclude_constraints);

    let Accumulator {
        mut constraints,
        hints,
        pointers,
        mut conflicts,
    } = acc;
    reconcile(&mut constraints, &mut conflicts);

    let architecture = FlattenedArchitecture {
        arch_id: arch_id.to_string(),
        inheritance_chain: chain,
        applied_mixins: candidates
            .iter()
            .map(|candidate| candidate.id.to_string())
            .collect(),
        constraints: constraints.into_values().collect(),
        hints: hints.into_iter().collect(),
        pointers: pointers.into_values().collect(),
        description: leaf.description.clone(),
        rationale: leaf.rationale.clone(),
        contract: leaf.contract.clone(),
        version: leaf.version.clone(),
        deprecated_from: leaf.deprecated_from.clone(),
        migration_guide: leaf.migration_guide.clone(),
        code_pattern: leaf.code_pattern.clone(),
        expected_intents: leaf.expected_intents.clone(),
        suggested_intents: leaf.suggested_intents.clone(),
    };

    Ok(Resolution {
        architecture,
        conflicts,
    })
}

fn lookup_node<'a>(
    registry: &'a Registry,
    arch_id: &str,
) -> Result<&'a ArchitectureNode, ResolveError> {
    registry.node(arch_id).ok_or_else(|| ResolveError::UnknownArch {
        arch_id: arch_id.to_string(),
        available: registry.arch_ids(),
    })
}

fn lookup_mixin<'a>(
    registry: &'a Registry,
    mixin_id: &str,
    referenced_by: &str,
) -> Result<&'a crate::registry::Mixin, ResolveError> {
    registry.mixin(mixin_id).ok_or_else(|| ResolveError::MissingMixin {
        mixin_id: mixin_id.to_string(),
        referenced_by: referenced_by.to_string(),
        available: registry.mixin_ids(),
    })
}

/// Content digest of a resolution's canonical JSON, for callers that
/// memoize resolutions across a large scan.
pub fn semantic_digest(resolution: &Resolution) -> String {
    let bytes = serde_json::to_vec(resolution).unwrap_or_default();
    format!("ar1_{}", digest_bytes(&bytes))
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut digest = Sha256::new();
    digest.update(bytes);
    let output = digest.finalize();
    let mut rendered = String::with_capacity(output.len() * 2);
    for byte in output {
        rendered.push_str(format!("{byte:02x}").as_str());
    }
    rendered
}
