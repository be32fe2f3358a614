//! Tests for `prereq status`.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn status_reports_installed_and_missing_projects() {
  let env = TestEnv::new();
  let mpc = env.install("MPC");
  std::fs::write(mpc.join("mwc.pl"), "x".repeat(2048)).unwrap();

  env
    .prereq_cmd()
    .args(["--shell", "sh", "status"])
    .assert()
    .success()
    .stdout(predicate::str::contains("MPC"))
    .stdout(predicate::str::contains("2.0 KB"))
    .stdout(predicate::str::contains("OASIS (not installed)"))
    .stderr(predicate::str::contains("No environment script yet"));
}

#[test]
fn status_json_lists_every_project() {
  let env = TestEnv::new();
  env.install("OASIS");

  let output = env
    .prereq_cmd()
    .args(["--shell", "sh", "-o", "json", "status"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let projects = json["projects"].as_array().unwrap();
  assert_eq!(projects.len(), 2);
  assert_eq!(projects[0]["name"], "MPC");
  assert_eq!(projects[0]["installed"], false);
  assert_eq!(projects[1]["installed"], true);
  assert!(json["script"].is_null());
}
