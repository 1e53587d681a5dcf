use keel_kernel::{
    ConflictSeverity, Registry, Resolution, Severity, resolve_architecture, semantic_digest,
};
use keel_registry::load_registry_path;
use std::fs;

pub fn load_registry_or_exit(path: &str) -> Registry {
    load_registry_path(path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(1);
    })
}

pub fn resolve_or_exit(registry: &Registry, arch_id: &str, mixins: &[String]) -> Resolution {
    resolve_architecture(registry, arch_id, mixins).unwrap_or_else(|err| {
        eprintln!("error[{}]: {err}", err.code());
        std::process::exit(1);
    })
}

pub fn read_source_or_exit(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: failed to read {path}: {err}");
        std::process::exit(1);
    })
}

pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

pub fn conflict_severity_label(severity: ConflictSeverity) -> &'static str {
    match severity {
        ConflictSeverity::Info => "info",
        ConflictSeverity::Warning => "warning",
        ConflictSeverity::Error => "error",
    }
}

/// Human rendering shared by `resolve` and `tag`.
pub fn print_resolution(header: &str, resolution: &Resolution) {
    let architecture = &resolution.architecture;
    println!("{header}");
    println!(
        "  Chain: {}",
        architecture.inheritance_chain.join(" -> ")
    );
    if !architecture.applied_mixins.is_empty() {
        println!("  Mixins: {}", architecture.applied_mixins.join(", "));
    }
    println!("  Constraints: {}", architecture.constraints.len());
    for entry in &architecture.constraints {
        println!(
            "    {} = {}  [{}] from {}",
            entry.constraint.rule,
            entry.constraint.value.canonical(),
            severity_label(entry.constraint.severity),
            entry.source
        );
    }
    if !architecture.hints.is_empty() {
        println!("  Hints: {}", architecture.hints.len());
        for hint in &architecture.hints {
            println!("    {hint}");
        }
    }
    println!("  Conflicts: {}", resolution.conflicts.len());
    for report in &resolution.conflicts {
        println!(
            "    [{}] {}",
            conflict_severity_label(report.severity),
            report.resolution
        );
    }
    println!("  Digest: {}", semantic_digest(resolution));
}
