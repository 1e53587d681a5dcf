use crate::support::load_registry_or_exit;
use keel_registry::check_registry;
use serde_json::json;

const CHECK_KIND: &str = "keel.registry_check.v1";

pub fn run(registry_path: String, json_output: bool) {
    let registry = load_registry_or_exit(&registry_path);
    let report = check_registry(&registry);
    let rejected = report.result == "rejected";

    if json_output {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "registryPath": registry_path,
            "architectures": registry.nodes.len(),
            "mixins": registry.mixins.len(),
            "result": report.result,
            "failureClasses": report.failure_classes,
            "issues": report.issues,
        });
        let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|err| {
            eprintln!("error: failed to render registry-check json: {err}");
            std::process::exit(2);
        });
        println!("{rendered}");
    } else {
        println!("keel check");
        println!("  Registry path: {registry_path}");
        println!("  Architectures: {}", registry.nodes.len());
        println!("  Mixins: {}", registry.mixins.len());
        println!("  Result: {}", report.result);
        println!("  Failure classes: {}", report.failure_classes.len());
        println!("  Issues: {}", report.issues.len());
        for issue in &report.issues {
            println!("    {} [{}] {}", issue.path, issue.failure_class, issue.message);
        }
    }

    if rejected {
        std::process::exit(1);
    }
}
