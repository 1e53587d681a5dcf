use crate::support::{
    load_registry_or_exit, print_resolution, read_source_or_exit, resolve_or_exit,
};
use keel_kernel::semantic_digest;
use keel_registry::parse_arch_tag;
use serde_json::json;

const TAG_KIND: &str = "keel.tag_resolution.v1";

pub fn run(file: String, registry_path: String, json_output: bool) {
    let source = read_source_or_exit(&file);
    let Some(tag) = parse_arch_tag(&source) else {
        eprintln!("error: no @arch tag found in {file}");
        std::process::exit(1);
    };

    let registry = load_registry_or_exit(&registry_path);
    let resolution = resolve_or_exit(&registry, &tag.arch_id, &tag.inline_mixins);

    if json_output {
        let payload = json!({
            "schema": 1,
            "resolutionKind": TAG_KIND,
            "registryPath": registry_path,
            "file": file,
            "archId": tag.arch_id,
            "inlineMixins": tag.inline_mixins,
            "architecture": resolution.architecture,
            "conflicts": resolution.conflicts,
            "semanticDigest": semantic_digest(&resolution),
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render tag-resolution json: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
        return;
    }

    print_resolution(&format!("keel tag {file} -> {}", tag.arch_id), &resolution);
}
