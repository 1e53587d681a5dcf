//! Constraint accumulation across precedence-ordered contributors.
//!
//! The accumulator is fed contributors in precedence order (ancestors
//! root-first, registry mixins, inline mixins, then the queried node) and
//! later contributors always overwrite earlier ones on key collision.
//! Every overwrite, eviction, and exclusion is recorded as a conflict.

use crate::conflict::{ConflictReport, ConflictSeverity};
use crate::constraint::{Constraint, Pointer, ResolvedConstraint};
use std::collections::{BTreeMap, BTreeSet};

/// Merge state for one resolution pass.
#[derive(Debug, Default)]
pub struct Accumulator {
    /// Keyed by constraint identity (see [`crate::constraint_key`]).
    pub constraints: BTreeMap<String, ResolvedConstraint>,
    /// Deduplicated by text.
    pub hints: BTreeSet<String>,
    /// Deduplicated by URI; later contributors replace earlier entries.
    pub pointers: BTreeMap<String, Pointer>,
    pub conflicts: Vec<ConflictReport>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one contributor's constraint list under its source id.
    pub fn merge_constraints(&mut self, source: &str, constraints: &[Constraint]) {
        for constraint in constraints {
            self.merge_constraint(source, constraint);
        }
    }

    fn merge_constraint(&mut self, source: &str, incoming: &Constraint) {
        if incoming.override_rule {
            // The override flag evicts the whole rule family, values aside.
            let evicted: Vec<String> = self
                .constraints
                .iter()
                .filter(|(_, entry)| entry.constraint.rule == incoming.rule)
                .map(|(key, _)| key.clone())
                .collect();
            for key in evicted {
                if let Some(removed) = self.constraints.remove(&key) {
                    self.conflicts.push(ConflictReport::new(
                        incoming.rule.as_str(),
                        removed.constraint.value.canonical(),
                        source,
                        removed.source.clone(),
                        format!(
                            "`{source}` redefines `{}` with the override flag; dropped value `{}` from `{}`",
                            incoming.rule,
                            removed.constraint.value.canonical(),
                            removed.source
                        ),
                        ConflictSeverity::Info,
                    ));
                }
            }
            self.insert(source, incoming);
            return;
        }

        let key = incoming.key();
        if let Some(existing) = self.constraints.get(&key)
            && existing.source != source
        {
            self.conflicts.push(ConflictReport::new(
                incoming.rule.as_str(),
                incoming.value.canonical(),
                source,
                existing.source.clone(),
                format!(
                    "`{source}` overrides `{}` due to precedence",
                    existing.source
                ),
                ConflictSeverity::Info,
            ));
        }
        self.insert(source, incoming);
    }

    fn insert(&mut self, source: &str, constraint: &Constraint) {
        self.constraints.insert(
            constraint.key(),
            ResolvedConstraint {
                constraint: constraint.clone(),
                source: source.to_string(),
            },
        );
    }

    pub fn merge_hints(&mut self, hints: &[String]) {
        for hint in hints {
            self.hints.insert(hint.clone());
        }
    }

    pub fn merge_pointers(&mut self, pointers: &[Pointer]) {
        for pointer in pointers {
            self.pointers.insert(pointer.uri.clone(), pointer.clone());
        }
    }

    /// Apply one node's `exclude_constraints` against the accumulated map.
    ///
    /// Pattern forms: `rule:value` removes the exact key, bare `rule`
    /// removes the whole family, `rule:` removes every key with that
    /// prefix (same effect as the bare form). A pattern that removes
    /// nothing is flagged as a dead exclusion.
    pub fn apply_exclusions(&mut self, source: &str, patterns: &[String]) {
        for pattern in patterns {
            let matched: Vec<String> = self
                .constraints
                .iter()
                .filter(|(key, entry)| exclusion_matches(pattern, key, entry))
                .map(|(key, _)| key.clone())
                .collect();

            if matched.is_empty() {
                self.conflicts.push(ConflictReport::new(
                    exclusion_rule(pattern),
                    pattern.clone(),
                    source,
                    String::new(),
                    format!(
                        "exclusion `{pattern}` on `{source}` matched no accumulated constraints"
                    ),
                    ConflictSeverity::Warning,
                ));
                continue;
            }

            for key in matched {
                if let Some(removed) = self.constraints.remove(&key) {
                    self.conflicts.push(ConflictReport::new(
                        removed.constraint.rule.as_str(),
                        removed.constraint.value.canonical(),
                        source,
                        removed.source.clone(),
                        format!("`{source}` excludes `{key}` via pattern `{pattern}`"),
                        ConflictSeverity::Info,
                    ));
                }
            }
        }
    }
}

fn exclusion_matches(pattern: &str, key: &str, entry: &ResolvedConstraint) -> bool {
    if !pattern.contains(':') {
        return entry.constraint.rule.as_str() == pattern;
    }
    if pattern.ends_with(':') {
        // Same effect as the bare form, including count-keyed entries
        // whose key carries no value suffix.
        let rule_part = &pattern[..pattern.len() - 1];
        return key.starts_with(pattern) || entry.constraint.rule.as_str() == rule_part;
    }
    key == pattern
}

fn exclusion_rule(pattern: &str) -> &str {
    pattern.split(':').next().unwrap_or(pattern)
}
