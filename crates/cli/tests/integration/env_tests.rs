//! Tests for `prereq env`.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn env_writes_sections_for_installed_projects_only() {
  let env = TestEnv::new();
  env.install("MPC");

  env
    .prereq_cmd()
    .args(["--shell", "bash", "env"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote"))
    .stdout(predicate::str::contains(". \""));

  let script = std::fs::read_to_string(env.prefix().join("prereq-env.sh")).unwrap();
  assert!(script.starts_with("#!/usr/bin/env bash"));
  assert!(script.contains(r#"export MPC_ROOT="$PREREQ_THIS_DIR/MPC""#));
  assert!(!script.contains("OASIS_ROOT"));
}

#[test]
fn env_print_writes_script_to_stdout() {
  let env = TestEnv::new();
  env.install("MPC");
  env.install("OASIS");

  env
    .prereq_cmd()
    .args(["--shell", "fish", "env", "--print"])
    .assert()
    .success()
    .stdout(predicate::str::contains("set -gx MPC_ROOT"))
    .stdout(predicate::str::contains("set -gx OASIS_ROOT"));
}

#[test]
fn env_for_named_project_includes_registered_dependencies() {
  let env = TestEnv::new();
  env.install("MPC");
  env.install("OASIS");

  let output = env
    .prereq_cmd()
    .args(["--shell", "powershell", "-o", "json", "env", "OASIS"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["shell"], "powershell");
  let script_path = json["script"].as_str().unwrap();
  assert!(script_path.ends_with("prereq-env.ps1"));

  let script = std::fs::read_to_string(script_path).unwrap();
  assert!(script.find("MPC_ROOT").unwrap() < script.find("OASIS_ROOT").unwrap());
}

#[test]
fn env_with_nothing_installed_writes_empty_script() {
  let env = TestEnv::new();

  env.prereq_cmd().args(["--shell", "sh", "env"]).assert().success();

  let script = std::fs::read_to_string(env.prefix().join("prereq-env.sh")).unwrap();
  assert!(!script.contains("export"));
}
