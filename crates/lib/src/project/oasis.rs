//! OASIS, the Open-source Architecture for Software Instrumentation of
//! Systems.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::{Project, ProjectError, Services, Validation, require_variable};
use crate::context::RunContext;
use crate::env::EnvironmentState;
use crate::script::GeneratedScript;
use crate::workspace::{FeatureSet, WorkspaceSpec};

pub const NAME: &str = "OASIS";
const LOCATION: &str = "OASIS";
const PUBLIC_URL: &str = "https://github.com/SEDS/OASIS.git";
const AFFILIATE_HTTPS_URL: &str = "https://github.iu.edu/SEDS/OASIS.git";
const AFFILIATE_SSH_URL: &str = "git@github.iu.edu:SEDS/OASIS.git";
const DEPENDS: &[&str] = &["Boost", "MPC", "XercesC", "DOC", "ADBC"];
const BASE_FEATURES: &str =
  "xerces3=1,boost=1,tao=1,sqlite3=1,tests=0,performance_tests=0,build=0,examples=0,snmp=0,noinline=0";

/// What the feature set is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturePurpose {
  Build,
  Clean,
}

/// Feature toggles for the OASIS workspace.
///
/// Optional middleware is switched on by the presence of its root variable.
/// The clean pass also considers the Pin instrumentation tool.
pub fn features(env: &EnvironmentState, ctx: &RunContext, purpose: FeaturePurpose) -> FeatureSet {
  let mut set = FeatureSet::parse(BASE_FEATURES);
  set.set("tena", env.contains("TENA_HOME"));
  set.set("openssl", env.contains("SSL_ROOT"));
  if purpose == FeaturePurpose::Clean {
    set.set("pintool", env.contains("PIN_ROOT"));
  }
  if ctx.versioned_namespace {
    set.set("versioned_namespace", true);
  }
  set
}

#[derive(Debug, Default)]
pub struct OasisProject;

impl OasisProject {
  pub fn new() -> Self {
    Self
  }

  /// Repository URL for the run.
  ///
  /// The public host only serves HTTPS; an SSH request falls back with a
  /// warning.
  pub fn url(ctx: &RunContext) -> &'static str {
    if ctx.affiliate {
      if ctx.use_https() { AFFILIATE_HTTPS_URL } else { AFFILIATE_SSH_URL }
    } else {
      if !ctx.use_https() {
        warn!("GitHub only supports HTTPS checkouts for OASIS");
      }
      PUBLIC_URL
    }
  }

  fn root(env: &EnvironmentState) -> Result<PathBuf, ProjectError> {
    env
      .get("OASIS_ROOT")
      .map(PathBuf::from)
      .ok_or_else(|| ProjectError::MissingVariable("OASIS_ROOT".to_string()))
  }

  fn workspace_spec(ctx: &RunContext, env: &EnvironmentState, purpose: FeaturePurpose) -> Result<WorkspaceSpec, ProjectError> {
    let root = Self::root(env)?;
    let spec = WorkspaceSpec::new(NAME, root.join("OASIS.mwc"), ctx, features(env, ctx, purpose));
    Ok(match purpose {
      FeaturePurpose::Build => spec.with_feature_file(root.join("default.features")),
      FeaturePurpose::Clean => spec,
    })
  }
}

impl Project for OasisProject {
  fn name(&self) -> &str {
    NAME
  }

  fn location(&self) -> &str {
    LOCATION
  }

  fn depends(&self) -> Vec<String> {
    DEPENDS.iter().map(|d| d.to_string()).collect()
  }

  fn download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    let dest = ctx.install_dir(LOCATION);
    services.checkout.checkout(Self::url(ctx), &dest, None, ctx.force)?;
    Ok(())
  }

  fn verify_download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    services.checkout.verify(Self::url(ctx), &ctx.install_dir(LOCATION), None)?;
    Ok(())
  }

  fn set_env_variables(&self, prefix: &Path, env: &mut EnvironmentState) {
    let root = prefix.join(LOCATION);
    env.set("OASIS_ROOT", root.to_string_lossy());
    env.append_path(root.join("bin"));
    env.append_libpath(root.join("lib"));
  }

  fn validate_environment(&self, env: &EnvironmentState) -> Result<Validation, ProjectError> {
    Ok(require_variable(env, "OASIS_ROOT"))
  }

  fn update_script(&self, prefix: &Path, script: &mut GeneratedScript) {
    if !prefix.join(LOCATION).exists() {
      return;
    }

    let location = script.this_path(&[LOCATION]);
    script.begin_section(NAME);
    script.write_env_variable("OASIS_ROOT", &location);
    script.append_path_variable(&format!("{}/bin", location));
    script.append_libpath_variable(&format!("{}/lib", location));
  }

  fn build(&self, ctx: &RunContext, env: &EnvironmentState, services: &Services<'_>) -> Result<(), ProjectError> {
    let spec = Self::workspace_spec(ctx, env, FeaturePurpose::Build)?;
    services.workspace.generate_and_build(&spec, env)?;
    Ok(())
  }

  fn clean(&self, ctx: &RunContext, env: &EnvironmentState, services: &Services<'_>) -> Result<(), ProjectError> {
    let spec = Self::workspace_spec(ctx, env, FeaturePurpose::Clean)?;
    services.workspace.clean(&spec, env)?;
    Ok(())
  }
}
