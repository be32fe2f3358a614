//! Tests for `prereq setup|download|build|clean` with declared projects.
//!
//! Every project is pre-installed (or cleaned without fetching), so no test
//! touches the network.

use predicates::prelude::*;

use super::common::TestEnv;

const LIBS: &str = r#"[
  {"name": "Core", "url": "https://example.invalid/core.git", "root_var": "CORE_ROOT", "path": ["bin"]},
  {"name": "App", "url": "https://example.invalid/app.git", "depends": ["Core"], "root_var": "APP_ROOT", "libpath": ["lib"]}
]"#;

#[test]
fn download_configures_installed_projects_in_order() {
  let env = TestEnv::new();
  let projects = env.project_file(LIBS);
  env.install("Core");
  env.install("App");

  env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .args(["--shell", "sh", "download", "App"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Core configured"))
    .stdout(predicate::str::contains("App configured"))
    .stdout(predicate::str::contains("download complete"));

  let script = std::fs::read_to_string(env.prefix().join("prereq-env.sh")).unwrap();
  let core = script.find("CORE_ROOT").unwrap();
  let app = script.find("APP_ROOT").unwrap();
  assert!(core < app);
  assert!(script.contains("$PREREQ_THIS_DIR/Core/bin"));
}

#[test]
fn json_report_lists_projects() {
  let env = TestEnv::new();
  let projects = env.project_file(LIBS);
  env.install("Core");
  env.install("App");

  let output = env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .args(["--shell", "fish", "-o", "json", "build", "App"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["action"], "build");
  assert_eq!(report["projects"][0]["name"], "Core");
  assert_eq!(report["projects"][1]["name"], "App");
  assert_eq!(report["projects"][1]["outcome"], "built");
  assert_eq!(report["projects"][1]["fetched"], false);
  assert!(report["script"].as_str().unwrap().ends_with("prereq-env.fish"));
}

#[test]
fn clean_skips_projects_that_are_not_installed() {
  let env = TestEnv::new();
  let projects = env.project_file(LIBS);

  env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .args(["--shell", "sh", "clean", "App"])
    .assert()
    .success()
    .stdout(predicate::str::contains("App not installed"));

  assert!(!env.prefix().join("Core").exists());
  assert!(!env.prefix().join("App").exists());
}

#[test]
fn failed_validation_names_the_project() {
  let env = TestEnv::new();
  let projects = env.project_file(
    r#"[{"name": "Tool", "url": "https://example.invalid/tool.git", "requires": ["PREREQ_TEST_UNSET_VAR"]}]"#,
  );
  env.install("Tool");

  env
    .prereq_cmd()
    .env_remove("PREREQ_TEST_UNSET_VAR")
    .arg("--projects")
    .arg(&projects)
    .args(["build", "Tool"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("build stopped at Tool"))
    .stderr(predicate::str::contains(
      "environment validation failed for Tool: PREREQ_TEST_UNSET_VAR environment variable is not defined",
    ));

  assert!(!env.prefix().join("prereq-env.sh").exists());
}

#[test]
fn cyclic_project_file_is_rejected() {
  let env = TestEnv::new();
  let projects = env.project_file(
    r#"[
      {"name": "A", "url": "https://example.invalid/a.git", "depends": ["B"]},
      {"name": "B", "url": "https://example.invalid/b.git", "depends": ["A"]}
    ]"#,
  );

  env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .args(["setup", "A"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cyclic dependency: A -> B -> A"));
}

#[test]
fn duplicate_project_name_is_rejected() {
  let env = TestEnv::new();
  let projects = env.project_file(r#"[{"name": "MPC", "url": "https://example.invalid/mpc.git"}]"#);

  env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .arg("list")
    .assert()
    .failure()
    .stderr(predicate::str::contains("project 'MPC' is already registered"));
}

#[test]
fn settings_file_supplies_projects_and_externals() {
  let env = TestEnv::new();
  let projects = env.project_file(
    r#"[{"name": "App", "url": "https://example.invalid/app.git", "depends": ["Boost"], "root_var": "APP_ROOT"}]"#,
  );
  env.write_file(
    "config/prereq/config.json",
    &format!(
      r#"{{"projects_file": {}, "external": ["Boost"], "shell": "bash"}}"#,
      serde_json::to_string(&projects).unwrap()
    ),
  );
  env.install("App");

  env
    .prereq_cmd()
    .args(["download", "App"])
    .assert()
    .success()
    .stdout(predicate::str::contains("App configured"));

  assert!(env.prefix().join("prereq-env.sh").exists());
}

#[test]
fn location_outside_prefix_is_rejected_before_download() {
  let env = TestEnv::new();
  let victim = env.write_file("victim/precious.txt", "keep");
  let projects = env.project_file(r#"[{"name": "Victim", "url": "https://example.invalid/v.git", "location": "../victim"}]"#);

  env
    .prereq_cmd()
    .arg("--projects")
    .arg(&projects)
    .args(["setup", "--force", "Victim"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("not a subdirectory of the install prefix"));

  assert!(victim.exists());
}
