//! End-to-end tests for the enclave binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG: &str = r#"type: enclave-sandbox
version: 1
image: example
resources:
  base:
    calls:
      - name: deploy
        command: ./scripts/deploy.sh
        allowed-args: "^--env=(dev|prod)$"
  web:
    http: [registry.npmjs.org]
apply:
  - path: ./
    resources: [base]
  - path: ./web
    resources: [web]
    image: web-image
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join(".enclave").join("config.yaml");
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(config, CONFIG).unwrap();
    dir
}

fn enclave(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_enclave"))
        .arg("--working-dir")
        .arg(dir)
        .args(args)
        .env_remove("ENCLAVE_CONFIG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn test_validate() {
    let dir = workspace();
    let output = enclave(dir.path(), &["validate"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 resource sets"));
}

#[test]
fn test_resolve_json() {
    let dir = workspace();
    let output = enclave(dir.path(), &["resolve", "--path", "web", "--json"]);
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["image"], "web-image");
    assert_eq!(plan["applied"], serde_json::json!(["base", "web"]));
    assert_eq!(plan["http"], serde_json::json!(["registry.npmjs.org"]));
    assert_eq!(plan["calls"]["deploy"]["allowed-args"], "^--env=(dev|prod)$");
}

#[test]
fn test_check_call() {
    let dir = workspace();
    let allowed = enclave(dir.path(), &["check-call", "deploy", "--", "--env=dev"]);
    assert!(allowed.status.success());

    let denied = enclave(dir.path(), &["check-call", "deploy", "--", "--env=qa"]);
    assert!(!denied.status.success());
}

#[test]
fn test_unknown_set_fails() {
    let dir = workspace();
    let output = enclave(dir.path(), &["resolve", "--set", "missing"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}
