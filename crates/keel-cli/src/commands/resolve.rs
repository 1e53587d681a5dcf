use crate::cli::DenySeverity;
use crate::support::{load_registry_or_exit, print_resolution, resolve_or_exit};
use keel_kernel::{ConflictSeverity, Resolution, semantic_digest};
use serde_json::json;

const RESOLUTION_KIND: &str = "keel.resolution.v1";

pub fn run(
    arch_id: String,
    registry_path: String,
    mixins: Vec<String>,
    deny_conflicts: Option<DenySeverity>,
    json_output: bool,
) {
    let registry = load_registry_or_exit(&registry_path);
    let resolution = resolve_or_exit(&registry, &arch_id, &mixins);

    emit(&resolution, &registry_path, &mixins, json_output);

    if let Some(deny) = deny_conflicts {
        let threshold = match deny {
            DenySeverity::Warning => ConflictSeverity::Warning,
            DenySeverity::Error => ConflictSeverity::Error,
        };
        if resolution
            .conflicts
            .iter()
            .any(|report| report.severity >= threshold)
        {
            std::process::exit(1);
        }
    }
}

fn emit(resolution: &Resolution, registry_path: &str, inline_mixins: &[String], json_output: bool) {
    if json_output {
        let payload = json!({
            "schema": 1,
            "resolutionKind": RESOLUTION_KIND,
            "registryPath": registry_path,
            "inlineMixins": inline_mixins,
            "architecture": resolution.architecture,
            "conflicts": resolution.conflicts,
            "semanticDigest": semantic_digest(resolution),
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render resolution json: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    print_resolution(
        &format!("keel resolve {}", resolution.architecture.arch_id),
        resolution,
    );
}
