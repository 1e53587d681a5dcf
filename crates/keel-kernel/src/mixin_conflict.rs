//! Mixin pre-conflict detection.
//!
//! Runs over the full candidate mixin set (registry-declared + inline)
//! before any mixin constraint is merged, so contradictions between
//! bundles are visible even when last-write-wins merging would silently
//! paper over them. A mixin never conflicts with itself.

use crate::conflict::{ConflictReport, ConflictSeverity, UNRESOLVED};
use crate::constraint::RuleKind;
use crate::registry::{InlineMode, Mixin};
use std::collections::BTreeSet;

/// How a candidate mixin arrived at this resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixinOrigin {
    /// Declared in the queried node's `mixins` list.
    Registry,
    /// Supplied by the per-file inline tag.
    Inline,
}

/// One mixin scheduled for merging, with its application origin.
#[derive(Debug, Clone, Copy)]
pub struct MixinCandidate<'a> {
    pub id: &'a str,
    pub mixin: &'a Mixin,
    pub origin: MixinOrigin,
}

/// Inspect the candidate set pairwise for contradictions and usage-mode
/// violations. Purely diagnostic: the merge that follows is unaffected.
pub fn detect_mixin_conflicts(candidates: &[MixinCandidate<'_>]) -> Vec<ConflictReport> {
    let mut conflicts = Vec::new();

    for candidate in candidates {
        check_usage_mode(candidate, &mut conflicts);
    }

    for (left_index, left) in candidates.iter().enumerate() {
        for right in candidates.iter().skip(left_index + 1) {
            if left.id == right.id {
                continue;
            }
            check_allow_forbid_imports(left, right, &mut conflicts);
            check_require_forbid_imports(left, right, &mut conflicts);
            check_decorators(left, right, &mut conflicts);
            check_numeric_divergence(left, right, &mut conflicts);
        }
    }

    conflicts
}

fn check_usage_mode(candidate: &MixinCandidate<'_>, conflicts: &mut Vec<ConflictReport>) {
    let violation = match (candidate.mixin.inline, candidate.origin) {
        (InlineMode::Forbidden, MixinOrigin::Inline) => Some(format!(
            "mixin `{}` declares inline: forbidden but was applied via the inline tag",
            candidate.id
        )),
        (InlineMode::Only, MixinOrigin::Registry) => Some(format!(
            "mixin `{}` declares inline: only but was declared in a registry mixins list",
            candidate.id
        )),
        _ => None,
    };
    if let Some(resolution) = violation {
        conflicts.push(ConflictReport::new(
            "mixin_usage",
            candidate.id,
            candidate.id,
            String::new(),
            resolution,
            ConflictSeverity::Warning,
        ));
    }
}

fn check_allow_forbid_imports(
    left: &MixinCandidate<'_>,
    right: &MixinCandidate<'_>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for (allower, forbidder) in [(left, right), (right, left)] {
        let allowed = rule_values(allower.mixin, &RuleKind::AllowImport);
        let forbidden = rule_values(forbidder.mixin, &RuleKind::ForbidImport);
        for value in allowed.intersection(&forbidden) {
            conflicts.push(ConflictReport::new(
                RuleKind::ForbidImport.as_str(),
                value.clone(),
                forbidder.id,
                allower.id,
                format!(
                    "mixin `{}` allows `{value}` but mixin `{}` forbids it",
                    allower.id, forbidder.id
                ),
                ConflictSeverity::Warning,
            ));
        }
    }
}

fn check_require_forbid_imports(
    left: &MixinCandidate<'_>,
    right: &MixinCandidate<'_>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for (requirer, forbidder) in [(left, right), (right, left)] {
        let required = rule_values(requirer.mixin, &RuleKind::RequireImport);
        let forbidden = rule_values(forbidder.mixin, &RuleKind::ForbidImport);
        for value in required.intersection(&forbidden) {
            conflicts.push(ConflictReport::new(
                RuleKind::RequireImport.as_str(),
                value.clone(),
                UNRESOLVED,
                UNRESOLVED,
                format!(
                    "mixin `{}` requires `{value}` but mixin `{}` forbids it; cannot reconcile",
                    requirer.id, forbidder.id
                ),
                ConflictSeverity::Error,
            ));
        }
    }
}

fn check_decorators(
    left: &MixinCandidate<'_>,
    right: &MixinCandidate<'_>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for (requirer, forbidder) in [(left, right), (right, left)] {
        let required = rule_values(requirer.mixin, &RuleKind::RequireDecorator);
        let forbidden = rule_values(forbidder.mixin, &RuleKind::ForbidDecorator);
        for value in required.intersection(&forbidden) {
            conflicts.push(ConflictReport::new(
                RuleKind::RequireDecorator.as_str(),
                value.clone(),
                UNRESOLVED,
                UNRESOLVED,
                format!(
                    "mixin `{}` requires decorator `{value}` but mixin `{}` forbids it; cannot reconcile",
                    requirer.id, forbidder.id
                ),
                ConflictSeverity::Error,
            ));
        }
    }
}

fn check_numeric_divergence(
    left: &MixinCandidate<'_>,
    right: &MixinCandidate<'_>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for rule in [RuleKind::MaxFileLines, RuleKind::MaxPublicMethods] {
        let Some(left_value) = declared_count(left.mixin, &rule) else {
            continue;
        };
        let Some(right_value) = declared_count(right.mixin, &rule) else {
            continue;
        };
        if left_value == right_value {
            continue;
        }
        let (winner, loser) = if left_value < right_value {
            (left, right)
        } else {
            (right, left)
        };
        conflicts.push(ConflictReport::new(
            rule.as_str(),
            format!("{left_value} vs {right_value}"),
            winner.id,
            loser.id,
            format!(
                "mixin `{}` sets {rule}={left_value} but mixin `{}` sets {right_value}; stricter value wins",
                left.id, right.id
            ),
            ConflictSeverity::Warning,
        ));
    }
}

fn rule_values(mixin: &Mixin, rule: &RuleKind) -> BTreeSet<String> {
    mixin
        .constraints
        .iter()
        .filter(|constraint| constraint.rule == *rule)
        .flat_map(|constraint| constraint.value.members())
        .map(str::to_string)
        .collect()
}

fn declared_count(mixin: &Mixin, rule: &RuleKind) -> Option<u64> {
    mixin
        .constraints
        .iter()
        .filter(|constraint| constraint.rule == *rule)
        .filter_map(|constraint| constraint.value.count())
        .next_back()
}
