//! End-to-end runs through the orchestrator with the real MPC workspace tool.
//!
//! Sources are "cloned" by [`LocalCheckout`] and the build tools are replaced
//! by commands that always succeed or always fail, so the tests exercise
//! feature files, log capture, and script generation without a network or a
//! compiler.

#![cfg(unix)]

use std::collections::BTreeSet;
use std::fs;

use tempfile::TempDir;

use prereq_lib::orchestrate::{OrchestrateError, StepOutcome};
use prereq_lib::project::declared::ProjectDecl;
use prereq_lib::project::{MpcProject, OasisProject, ProjectError};
use prereq_lib::script::Shell;
use prereq_lib::workspace::{BuildError, MpcWorkspace};
use prereq_lib::{Action, EnvironmentState, Orchestrator, Registry, RunContext, Services};

use super::common::LocalCheckout;

fn registry() -> Registry {
  let mut registry = Registry::new();
  registry.register("MPC", || Box::new(MpcProject::with_perl("true"))).unwrap();
  registry.register("OASIS", || Box::new(OasisProject::new())).unwrap();
  registry
}

fn tools(make: &str) -> MpcWorkspace {
  MpcWorkspace {
    perl: "true".to_string(),
    make: make.to_string(),
    msbuild: "false".to_string(),
  }
}

fn context(temp: &TempDir) -> RunContext {
  let mut ctx = RunContext::new(temp.path());
  ctx.build_type = "gnuace".to_string();
  ctx.threads = 2;
  ctx.external = ["Boost", "XercesC", "DOC", "ADBC"]
    .iter()
    .map(|s| s.to_string())
    .collect::<BTreeSet<_>>();
  ctx
}

#[test]
fn setup_oasis_writes_features_logs_and_script() {
  let temp = TempDir::new().unwrap();
  let ctx = context(&temp);
  let checkout = LocalCheckout::default();
  let workspace = tools("true");
  let registry = registry();
  let mut env = EnvironmentState::from_process();
  env.set("SSL_ROOT", "/usr");

  let report = Orchestrator::new(
    &registry,
    &ctx,
    Services {
      checkout: &checkout,
      workspace: &workspace,
    },
    Shell::Sh,
  )
  .run(Action::Setup, &["OASIS".to_string()], &mut env)
  .unwrap();

  assert_eq!(
    checkout.cloned.borrow().as_slice(),
    &["https://github.com/DOCGroup/MPC.git", "https://github.com/SEDS/OASIS.git"]
  );
  assert!(report.projects.iter().all(|p| p.outcome == StepOutcome::Built));

  let features = fs::read_to_string(temp.path().join("OASIS").join("default.features")).unwrap();
  assert!(features.contains("xerces3 = 1\n"));
  assert!(features.contains("openssl = 1\n"));
  assert!(features.contains("tena = 0\n"));

  let logs = temp.path().join(".prereq").join("logs");
  assert!(logs.join("OASIS-generate.log").exists());
  assert!(logs.join("OASIS-build.log").exists());

  let script = fs::read_to_string(&report.script).unwrap();
  assert!(script.contains(r#"export OASIS_ROOT="$PREREQ_THIS_DIR/OASIS""#));
  assert!(script.contains("$PREREQ_THIS_DIR/OASIS/bin"));
}

#[test]
fn failing_build_reports_project_and_log() {
  let temp = TempDir::new().unwrap();
  let ctx = context(&temp);
  let checkout = LocalCheckout::default();
  let workspace = tools("false");
  let registry = registry();
  let mut env = EnvironmentState::from_process();

  let err = Orchestrator::new(
    &registry,
    &ctx,
    Services {
      checkout: &checkout,
      workspace: &workspace,
    },
    Shell::Sh,
  )
  .run(Action::Build, &["OASIS".to_string()], &mut env)
  .unwrap_err();

  match err {
    OrchestrateError::Project {
      project,
      source: ProjectError::Build(BuildError::Failed { step, code, log }),
    } => {
      assert_eq!(project, "OASIS");
      assert_eq!(step, "build");
      assert_eq!(code, Some(1));
      assert_eq!(log, temp.path().join(".prereq").join("logs").join("OASIS-build.log"));
    }
    other => panic!("unexpected error: {other}"),
  }
  // MPC was configured before the failure and stays in place.
  assert!(env.contains("MPC_ROOT"));
  assert!(!temp.path().join("prereq-env.sh").exists());
}

#[test]
fn declared_project_builds_its_workspace() {
  let temp = TempDir::new().unwrap();
  let ctx = context(&temp);
  let checkout = LocalCheckout::default();
  let workspace = tools("true");
  let mut registry = registry();
  let decl: ProjectDecl = serde_json::from_str(
    r#"{
      "name": "XSC",
      "url": "https://example.invalid/XSC.git",
      "depends": ["MPC", "XercesC"],
      "root_var": "XSC_ROOT",
      "path": ["bin"],
      "workspace": "XSC.mwc",
      "features": "xerces3=1"
    }"#,
  )
  .unwrap();
  registry.register_declared(decl).unwrap();
  let mut env = EnvironmentState::from_process();

  let report = Orchestrator::new(
    &registry,
    &ctx,
    Services {
      checkout: &checkout,
      workspace: &workspace,
    },
    Shell::Bash,
  )
  .run(Action::Setup, &["XSC".to_string()], &mut env)
  .unwrap();

  let names: Vec<_> = report.projects.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["MPC", "XSC"]);
  assert!(temp.path().join(".prereq/logs/XSC-build.log").exists());
  assert_eq!(
    env.get("XSC_ROOT"),
    Some(temp.path().join("XSC").to_string_lossy().into_owned())
  );
}
