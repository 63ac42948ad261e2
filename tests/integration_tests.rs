//! Integration tests for the docgen CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a docgen command isolated from the user's config
fn docgen(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docgen").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("DOCGEN_OUTPUT")
        .env_remove("DOCGEN_COLUMNS")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

const LABELS_TEMPLATE: &str = r#"apiVersion: templates.gatekeeper.sh/v1
kind: ConstraintTemplate
metadata:
  name: k8srequiredlabels
  annotations:
    description: Requires resources to contain specified labels.
spec:
  crd:
    spec:
      names:
        kind: K8sRequiredLabels
      validation:
        openAPIV3Schema:
          type: object
          properties:
            message:
              type: string
            labels:
              type: array
              description: A list of labels and values the object must specify.
              items:
                type: object
                properties:
                  key:
                    type: string
                    description: The required label.
                  allowedRegex:
                    type: string
                    description: If specified, a regular expression the annotation's value must match.
"#;

const LABELS_SUITE: &str = r#"kind: Suite
apiVersion: test.gatekeeper.sh/v1alpha1
metadata:
  name: requiredlabels
tests:
- name: must-have-owner
  template: template.yaml
  constraint: samples/constraint.yaml
  cases:
  - name: example-allowed
    object: samples/allowed.yaml
    assertions:
    - violations: no
  - name: example-disallowed
    object: samples/disallowed.yaml
    assertions:
    - violations: yes
"#;

const LABELS_CONSTRAINT: &str = r#"apiVersion: constraints.gatekeeper.sh/v1beta1
kind: K8sRequiredLabels
metadata:
  name: all-must-have-owner
spec:
  parameters:
    labels:
    - key: owner
"#;

const PROC_MOUNT_TEMPLATE: &str = r#"apiVersion: templates.gatekeeper.sh/v1beta1
kind: ConstraintTemplate
metadata:
  name: k8spspprocmount
  annotations:
    description: Controls the allowed procMount types for the container.
spec:
  crd:
    spec:
      names:
        kind: K8sPSPProcMount
"#;

const PROC_MOUNT_SUITE: &str = r#"kind: Suite
apiVersion: test.gatekeeper.sh/v1alpha1
metadata:
  name: proc-mount
tests:
- name: default-proc-mount
  template: template.yaml
  constraint: constraint.yaml
  cases:
  - name: example-allowed
    object: pod.yaml
    assertions:
    - violations: 0
- name: hidden
  template: template.yaml
  constraint: hidden.yaml
  cases: []
"#;

fn namespace(name: &str) -> String {
    format!("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: {}\n", name)
}

/// A two-template library: one v1 template with a schema, one legacy
/// template without, plus a constraint marked as undocumented
fn setup_library() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let lib = tmp.path().join("library");

    let labels = lib.join("general/requiredlabels");
    write(&labels, "template.yaml", LABELS_TEMPLATE);
    write(&labels, "suite.yaml", LABELS_SUITE);
    write(&labels.join("samples"), "constraint.yaml", LABELS_CONSTRAINT);
    write(
        &labels.join("samples"),
        "allowed.yaml",
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: allowed-namespace\n  labels:\n    owner: user.agilebank.demo\n",
    );
    write(&labels.join("samples"), "disallowed.yaml", &namespace("disallowed-namespace"));

    let proc_mount = lib.join("pod-security-policy/proc-mount");
    write(&proc_mount, "template.yaml", PROC_MOUNT_TEMPLATE);
    write(&proc_mount, "suite.yaml", PROC_MOUNT_SUITE);
    write(
        &proc_mount,
        "constraint.yaml",
        "apiVersion: constraints.gatekeeper.sh/v1beta1\nkind: K8sPSPProcMount\nmetadata:\n  name: psp-proc-mount\n",
    );
    write(
        &proc_mount,
        "hidden.yaml",
        "apiVersion: constraints.gatekeeper.sh/v1beta1\nkind: K8sPSPProcMount\nmetadata:\n  name: not-for-docs\n  annotations:\n    policy.library/doc-gen: do_not_document\n",
    );
    write(
        &proc_mount,
        "pod.yaml",
        "apiVersion: v1\nkind: Pod\nmetadata:\n  name: nginx-proc-mount-allowed\nspec:\n  containers:\n  - name: nginx\n    image: nginx\n",
    );

    tmp
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    docgen(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("match"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    docgen(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("docgen"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    docgen(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docgen"));
}

// ============================================================================
// Generate
// ============================================================================

#[test]
fn test_generate_to_stdout() {
    let tmp = setup_library();
    let output = docgen(&tmp)
        .args(["generate", "library"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();

    let labels = text.find("## K8sRequiredLabels").unwrap();
    let proc_mount = text.find("## K8sPSPProcMount").unwrap();
    assert!(proc_mount < labels, "templates are sorted by kind name");

    assert!(text.contains("Requires resources to contain specified labels."));
    assert!(text.contains(
        "    # labels <array>: A list of labels and values the object must specify.\n    labels:\n      - # allowedRegex <string>:"
    ));
    assert!(text.contains("    message: <string>"));
    assert!(text.contains("<summary>all-must-have-owner</summary>"));
    assert!(text.contains("name: disallowed-namespace"));
    assert!(text.contains("<summary>psp-proc-mount</summary>"));
    assert!(!text.contains("not-for-docs"));
}

#[test]
fn test_generate_legacy_template_without_schema() {
    let tmp = setup_library();
    let output = docgen(&tmp)
        .args(["generate", "library/pod-security-policy"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();

    assert!(text.contains("kind: K8sPSPProcMount\nmetadata:\n  name: k8spspprocmount\nspec:\n  parameters:\n"));
    assert!(!text.contains("unknown fields"));
}

#[test]
fn test_generate_to_file() {
    let tmp = setup_library();
    docgen(&tmp)
        .args(["generate", "library", "--output", "docs.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Documented 2 template(s)"));

    let text = fs::read_to_string(tmp.path().join("docs.md")).unwrap();
    assert!(text.starts_with("## K8sPSPProcMount"));
    assert!(text.ends_with("</details>"));
}

#[test]
fn test_generate_output_from_project_config() {
    let tmp = setup_library();
    fs::write(tmp.path().join(".docgen.yaml"), "output: from-config.md\n").unwrap();

    docgen(&tmp)
        .args(["-q", "generate", "library"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(tmp.path().join("from-config.md").exists());
}

#[test]
fn test_generate_is_deterministic() {
    let tmp = setup_library();
    let first = docgen(&tmp).args(["generate", "library"]).output().unwrap();
    let second = docgen(&tmp).args(["generate", "library"]).output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_generate_multiple_roots_merge() {
    let tmp = setup_library();
    let copy = tmp.path().join("mirror/requiredlabels");
    let original = tmp.path().join("library/general/requiredlabels");
    write(&copy, "template.yaml", LABELS_TEMPLATE);
    write(&copy, "suite.yaml", LABELS_SUITE);
    for file in ["constraint.yaml", "allowed.yaml", "disallowed.yaml"] {
        let content = fs::read_to_string(original.join("samples").join(file)).unwrap();
        write(&copy.join("samples"), file, &content);
    }

    let output = docgen(&tmp)
        .args(["generate", "library/general", "mirror"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.matches("## K8sRequiredLabels").count(), 1);
    assert_eq!(text.matches("<summary>all-must-have-owner</summary>").count(), 1);
    assert_eq!(text.matches("name: disallowed-namespace").count(), 2);
}

#[test]
fn test_generate_empty_root_fails() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("empty")).unwrap();

    docgen(&tmp)
        .args(["generate", "empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generated no documentation data"));
}

#[test]
fn test_generate_reports_missing_fixture() {
    let tmp = setup_library();
    fs::remove_file(tmp.path().join("library/general/requiredlabels/samples/allowed.yaml")).unwrap();

    docgen(&tmp)
        .args(["generate", "library"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("example-allowed"));
}

#[test]
fn test_generate_conflicting_constraints_fail() {
    let tmp = setup_library();
    let other = tmp.path().join("library/other");
    write(&other, "template.yaml", LABELS_TEMPLATE);
    write(&other, "suite.yaml", LABELS_SUITE);
    write(
        &other.join("samples"),
        "constraint.yaml",
        &LABELS_CONSTRAINT.replace("key: owner", "key: team"),
    );
    write(&other.join("samples"), "allowed.yaml", &namespace("a"));
    write(&other.join("samples"), "disallowed.yaml", &namespace("b"));

    docgen(&tmp)
        .args(["generate", "library"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("merging constraint"));
}

// ============================================================================
// List and Match
// ============================================================================

#[test]
fn test_list_table() {
    let tmp = setup_library();
    docgen(&tmp)
        .args(["list", "library"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| K8sRequiredLabels"))
        .stdout(predicate::str::contains("2 template(s) found"));
}

#[test]
fn test_list_json() {
    let tmp = setup_library();
    let output = docgen(&tmp)
        .args(["list", "library", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["name"], "K8sPSPProcMount");
    assert_eq!(summaries[0]["legacy_schema"], true);
    assert_eq!(summaries[0]["allowed"], 1);
    assert_eq!(summaries[1]["name"], "K8sRequiredLabels");
    assert_eq!(summaries[1]["disallowed"], 1);
}

#[test]
fn test_match() {
    let tmp = TempDir::new().unwrap();
    docgen(&tmp)
        .arg("match")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Match"))
        .stdout(predicate::str::contains("excludedNamespaces:\n  - <string>"));
}
