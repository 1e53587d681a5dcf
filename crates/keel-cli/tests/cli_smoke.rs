use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "keel-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_keel<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_keel");
    Command::new(bin)
        .args(args)
        .output()
        .expect("keel command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout should be JSON: {err}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

const REGISTRY: &str = r#"
version: 1
architectures:
  base:
    constraints:
      - rule: forbid_import
        value: eval
        severity: error
  http-handler:
    inherits: base
    constraints:
      - rule: max_file_lines
        value: 300
    hints:
      - keep handlers transport-only
mixins:
  legacy-io:
    constraints:
      - rule: allow_import
        value: eval
  validated-io:
    constraints:
      - rule: require_import
        value: zod
  no-schemas:
    constraints:
      - rule: forbid_import
        value: zod
"#;

fn write_registry(dir: &TempDirGuard) -> String {
    let path = dir.path().join("registry.yaml");
    fs::write(&path, REGISTRY).expect("registry should write");
    path.display().to_string()
}

#[test]
fn resolve_emits_flattened_architecture_json() {
    let dir = TempDirGuard::new("resolve");
    let registry = write_registry(&dir);

    let output = run_keel([
        "resolve",
        "http-handler",
        "--registry",
        registry.as_str(),
        "--json",
    ]);
    assert_success(&output);

    let payload = stdout_json(&output);
    assert_eq!(
        payload.get("resolutionKind").and_then(Value::as_str),
        Some("keel.resolution.v1")
    );
    let architecture = payload.get("architecture").expect("architecture key");
    assert_eq!(
        architecture.get("archId").and_then(Value::as_str),
        Some("http-handler")
    );
    assert_eq!(
        architecture
            .get("inheritanceChain")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(2)
    );
    let constraints = architecture
        .get("constraints")
        .and_then(Value::as_array)
        .expect("constraints array");
    assert_eq!(constraints.len(), 2);
    assert!(
        payload
            .get("semanticDigest")
            .and_then(Value::as_str)
            .is_some_and(|digest| digest.starts_with("ar1_"))
    );
}

#[test]
fn inline_mixin_cancels_inherited_forbid() {
    let dir = TempDirGuard::new("cancel");
    let registry = write_registry(&dir);

    let output = run_keel([
        "resolve",
        "http-handler",
        "--registry",
        registry.as_str(),
        "--mixin",
        "legacy-io",
        "--json",
    ]);
    assert_success(&output);

    let payload = stdout_json(&output);
    let constraints = payload
        .pointer("/architecture/constraints")
        .and_then(Value::as_array)
        .expect("constraints array");
    assert!(
        constraints
            .iter()
            .all(|entry| entry.get("rule").and_then(Value::as_str) != Some("forbid_import")
                && entry.get("rule").and_then(Value::as_str) != Some("allow_import"))
    );
    let conflicts = payload
        .get("conflicts")
        .and_then(Value::as_array)
        .expect("conflicts array");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(
        conflicts[0].get("severity").and_then(Value::as_str),
        Some("info")
    );
}

#[test]
fn unknown_architecture_fails_with_code() {
    let dir = TempDirGuard::new("unknown");
    let registry = write_registry(&dir);

    let output = run_keel(["resolve", "ghost", "--registry", registry.as_str(), "--json"]);
    assert_failure(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("UNKNOWN_ARCH"), "stderr: {stderr}");
}

#[test]
fn deny_conflicts_escalates_unresolved_contradictions() {
    let dir = TempDirGuard::new("deny");
    let registry = write_registry(&dir);

    let tolerated = run_keel([
        "resolve",
        "http-handler",
        "--registry",
        registry.as_str(),
        "--mixin",
        "validated-io",
        "--mixin",
        "no-schemas",
        "--json",
    ]);
    assert_success(&tolerated);

    let denied = run_keel([
        "resolve",
        "http-handler",
        "--registry",
        registry.as_str(),
        "--mixin",
        "validated-io",
        "--mixin",
        "no-schemas",
        "--deny-conflicts",
        "error",
        "--json",
    ]);
    assert_failure(&denied);
}

#[test]
fn check_rejects_broken_references() {
    let dir = TempDirGuard::new("check");
    let path = dir.path().join("registry.yaml");
    fs::write(
        &path,
        "architectures:\n  orphan:\n    inherits: ghost\n",
    )
    .expect("registry should write");

    let output = run_keel([
        "check",
        "--registry",
        path.display().to_string().as_str(),
        "--json",
    ]);
    assert_failure(&output);

    let payload = stdout_json(&output);
    assert_eq!(payload.get("result").and_then(Value::as_str), Some("rejected"));
    assert!(
        payload
            .get("failureClasses")
            .and_then(Value::as_array)
            .is_some_and(|classes| classes
                .iter()
                .any(|class| class.as_str() == Some("registry_unknown_parent")))
    );
}

#[test]
fn tag_resolves_the_marked_architecture() {
    let dir = TempDirGuard::new("tag");
    let registry = write_registry(&dir);
    let source_path = dir.path().join("handler.py");
    fs::write(
        &source_path,
        "# @arch http-handler +legacy-io\ndef handle():\n    pass\n",
    )
    .expect("source should write");

    let output = run_keel([
        "tag",
        source_path.display().to_string().as_str(),
        "--registry",
        registry.as_str(),
        "--json",
    ]);
    assert_success(&output);

    let payload = stdout_json(&output);
    assert_eq!(
        payload.get("archId").and_then(Value::as_str),
        Some("http-handler")
    );
    assert_eq!(
        payload
            .get("inlineMixins")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(1)
    );
}

#[test]
fn explain_traces_a_single_rule() {
    let dir = TempDirGuard::new("explain");
    let registry = write_registry(&dir);

    let output = run_keel([
        "explain",
        "http-handler",
        "--rule",
        "forbid_import",
        "--registry",
        registry.as_str(),
        "--json",
    ]);
    assert_success(&output);

    let payload = stdout_json(&output);
    assert_eq!(
        payload.get("explainKind").and_then(Value::as_str),
        Some("keel.explain.v1")
    );
    let winners = payload
        .get("winners")
        .and_then(Value::as_array)
        .expect("winners array");
    assert_eq!(winners.len(), 1);
    assert_eq!(
        winners[0].get("source").and_then(Value::as_str),
        Some("base")
    );
}
