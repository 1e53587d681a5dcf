use crate::support::{
    conflict_severity_label, load_registry_or_exit, resolve_or_exit, severity_label,
};
use keel_kernel::{ConflictReport, ResolvedConstraint, RuleKind};
use serde_json::json;

const EXPLAIN_KIND: &str = "keel.explain.v1";

/// Trace one rule through a resolution: which entries won and every
/// decision that touched the rule on the way.
pub fn run(
    arch_id: String,
    rule: String,
    registry_path: String,
    mixins: Vec<String>,
    json_output: bool,
) {
    let registry = load_registry_or_exit(&registry_path);
    let resolution = resolve_or_exit(&registry, &arch_id, &mixins);

    let rule_kind = RuleKind::from(rule.as_str());
    let winners: Vec<&ResolvedConstraint> = resolution
        .architecture
        .constraints
        .iter()
        .filter(|entry| entry.constraint.rule == rule_kind)
        .collect();
    let decisions: Vec<&ConflictReport> = resolution
        .conflicts
        .iter()
        .filter(|report| report.rule == rule)
        .collect();

    if json_output {
        let payload = json!({
            "schema": 1,
            "explainKind": EXPLAIN_KIND,
            "registryPath": registry_path,
            "archId": arch_id,
            "rule": rule,
            "inheritanceChain": resolution.architecture.inheritance_chain,
            "appliedMixins": resolution.architecture.applied_mixins,
            "winners": winners,
            "decisions": decisions,
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render explain json: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    println!("keel explain {arch_id} / {rule}");
    println!(
        "  Chain: {}",
        resolution.architecture.inheritance_chain.join(" -> ")
    );
    if winners.is_empty() && decisions.is_empty() {
        println!("  No entries or decisions for this rule.");
        return;
    }
    println!("  Winning entries: {}", winners.len());
    for entry in &winners {
        println!(
            "    {} = {}  [{}] from {}",
            entry.constraint.rule,
            entry.constraint.value.canonical(),
            severity_label(entry.constraint.severity),
            entry.source
        );
    }
    println!("  Decisions: {}", decisions.len());
    for report in &decisions {
        println!(
            "    [{}] {}",
            conflict_severity_label(report.severity),
            report.resolution
        );
    }
}
