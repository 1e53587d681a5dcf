//! Post-accumulation reconciliation.
//!
//! After every contributor has merged, allowance rules cancel their
//! matching prohibitions and are themselves dropped from the output,
//! deny wins over decorator requirements, and require/forbid import
//! contradictions are kept intact but flagged as unresolved.

use crate::conflict::{ConflictReport, ConflictSeverity, UNRESOLVED};
use crate::constraint::{
    ResolvedConstraint, RuleKind, RuleValue, constraint_key, extract_pattern,
};
use std::collections::BTreeMap;

pub fn reconcile(
    constraints: &mut BTreeMap<String, ResolvedConstraint>,
    conflicts: &mut Vec<ConflictReport>,
) {
    cancel_forbidden_imports(constraints, conflicts);
    cancel_forbidden_patterns(constraints, conflicts);
    deny_wins_over_required_decorators(constraints, conflicts);
    flag_unresolved_import_contradictions(constraints, conflicts);
}

fn keys_for_rule(constraints: &BTreeMap<String, ResolvedConstraint>, rule: &RuleKind) -> Vec<String> {
    constraints
        .iter()
        .filter(|(_, entry)| entry.constraint.rule == *rule)
        .map(|(key, _)| key.clone())
        .collect()
}

/// Each `allow_import` value removes its exact `forbid_import` entry; the
/// allowance itself never appears in the final constraint set.
fn cancel_forbidden_imports(
    constraints: &mut BTreeMap<String, ResolvedConstraint>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for key in keys_for_rule(constraints, &RuleKind::AllowImport) {
        let Some(allowance) = constraints.remove(&key) else {
            continue;
        };
        for value in allowance.constraint.value.members() {
            let forbid_key =
                constraint_key(&RuleKind::ForbidImport, &RuleValue::Text(value.to_string()));
            if let Some(forbidden) = constraints.remove(&forbid_key) {
                conflicts.push(ConflictReport::new(
                    RuleKind::ForbidImport.as_str(),
                    value,
                    allowance.source.clone(),
                    forbidden.source.clone(),
                    format!(
                        "`{}` allows `{value}`, cancelling forbid_import from `{}`",
                        allowance.source, forbidden.source
                    ),
                    ConflictSeverity::Info,
                ));
            }
        }
    }
}

/// Same cancellation for pattern rules, matched by exact pattern string.
fn cancel_forbidden_patterns(
    constraints: &mut BTreeMap<String, ResolvedConstraint>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for key in keys_for_rule(constraints, &RuleKind::AllowPattern) {
        let Some(allowance) = constraints.remove(&key) else {
            continue;
        };
        let Some(pattern) = extract_pattern(&allowance.constraint).map(str::to_string) else {
            continue;
        };
        let cancelled: Vec<String> = constraints
            .iter()
            .filter(|(_, entry)| {
                entry.constraint.rule == RuleKind::ForbidPattern
                    && extract_pattern(&entry.constraint) == Some(pattern.as_str())
            })
            .map(|(forbid_key, _)| forbid_key.clone())
            .collect();
        for forbid_key in cancelled {
            if let Some(forbidden) = constraints.remove(&forbid_key) {
                conflicts.push(ConflictReport::new(
                    RuleKind::ForbidPattern.as_str(),
                    pattern.clone(),
                    allowance.source.clone(),
                    forbidden.source.clone(),
                    format!(
                        "`{}` allows pattern `{pattern}`, cancelling forbid_pattern from `{}`",
                        allowance.source, forbidden.source
                    ),
                    ConflictSeverity::Info,
                ));
            }
        }
    }
}

/// A forbidden decorator beats a requirement for the same decorator.
fn deny_wins_over_required_decorators(
    constraints: &mut BTreeMap<String, ResolvedConstraint>,
    conflicts: &mut Vec<ConflictReport>,
) {
    for key in keys_for_rule(constraints, &RuleKind::RequireDecorator) {
        let Some(required) = constraints.get(&key) else {
            continue;
        };
        let overlap = constraints
            .iter()
            .filter(|(_, entry)| entry.constraint.rule == RuleKind::ForbidDecorator)
            .find_map(|(_, forbidding)| {
                required
                    .constraint
                    .value
                    .members()
                    .into_iter()
                    .find(|value| forbidding.constraint.value.members().contains(value))
                    .map(|value| (value.to_string(), forbidding.source.clone()))
            });
        if let Some((value, forbid_source)) = overlap
            && let Some(removed) = constraints.remove(&key)
        {
            conflicts.push(ConflictReport::new(
                RuleKind::RequireDecorator.as_str(),
                value.clone(),
                forbid_source.clone(),
                removed.source.clone(),
                format!(
                    "decorator `{value}` is both required by `{}` and forbidden by `{forbid_source}`; deny wins",
                    removed.source
                ),
                ConflictSeverity::Warning,
            ));
        }
    }
}

/// require_import vs forbid_import of the same value cannot be reconciled:
/// both stay in the output and downstream validators fail on each, but the
/// contradiction is surfaced at error severity.
fn flag_unresolved_import_contradictions(
    constraints: &BTreeMap<String, ResolvedConstraint>,
    conflicts: &mut Vec<ConflictReport>,
) {
    let required: Vec<&ResolvedConstraint> = constraints
        .values()
        .filter(|entry| entry.constraint.rule == RuleKind::RequireImport)
        .collect();
    let forbidden: Vec<&ResolvedConstraint> = constraints
        .values()
        .filter(|entry| entry.constraint.rule == RuleKind::ForbidImport)
        .collect();
    for requirement in &required {
        for prohibition in &forbidden {
            for value in requirement.constraint.value.members() {
                if prohibition.constraint.value.members().contains(&value) {
                    conflicts.push(ConflictReport::new(
                        RuleKind::RequireImport.as_str(),
                        value,
                        UNRESOLVED,
                        UNRESOLVED,
                        format!(
                            "`{}` requires `{value}` while `{}` forbids it; both constraints remain",
                            requirement.source, prohibition.source
                        ),
                        ConflictSeverity::Error,
                    ));
                }
            }
        }
    }
}
