//! MPC, the Makefile, Project and Workspace Creator.
//!
//! MPC itself needs no build: it is a set of Perl scripts other projects use
//! to generate their build files.

use std::path::Path;

use tracing::error;

use super::{Project, ProjectError, Services, Validation, require_variable};
use crate::context::RunContext;
use crate::env::EnvironmentState;
use crate::process::{ToolCommand, ToolError, run_captured};
use crate::script::GeneratedScript;

pub const NAME: &str = "MPC";
const LOCATION: &str = "MPC";
const HTTPS_URL: &str = "https://github.com/DOCGroup/MPC.git";
const SSH_URL: &str = "git@github.com:DOCGroup/MPC.git";
const RELEASE_TAG: &str = "ACE+TAO+CIAO-6_3_2";

pub struct MpcProject {
  /// Interpreter used for the validation smoke test.
  perl: String,
}

impl Default for MpcProject {
  fn default() -> Self {
    Self::new()
  }
}

impl MpcProject {
  pub fn new() -> Self {
    Self::with_perl("perl")
  }

  pub fn with_perl(perl: impl Into<String>) -> Self {
    Self { perl: perl.into() }
  }

  /// Repository URL for the run's transport.
  pub fn url(ctx: &RunContext) -> &'static str {
    if ctx.use_https() { HTTPS_URL } else { SSH_URL }
  }

  /// Tag to check out, `None` for trunk.
  pub fn tag(ctx: &RunContext) -> Option<&'static str> {
    if ctx.use_trunk() { None } else { Some(RELEASE_TAG) }
  }
}

impl Project for MpcProject {
  fn name(&self) -> &str {
    NAME
  }

  fn location(&self) -> &str {
    LOCATION
  }

  fn download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    let dest = ctx.install_dir(LOCATION);
    services.checkout.checkout(Self::url(ctx), &dest, Self::tag(ctx), ctx.force)?;
    Ok(())
  }

  fn verify_download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    let dest = ctx.install_dir(LOCATION);
    services.checkout.verify(Self::url(ctx), &dest, Self::tag(ctx))?;
    Ok(())
  }

  fn set_env_variables(&self, prefix: &Path, env: &mut EnvironmentState) {
    let root = prefix.join(LOCATION);
    env.set("MPC_ROOT", root.to_string_lossy());
    env.append_path(&root);
  }

  fn validate_environment(&self, env: &EnvironmentState) -> Result<Validation, ProjectError> {
    let found = require_variable(env, "MPC_ROOT");
    if !found.is_satisfied() {
      return Ok(found);
    }

    match run_captured(&ToolCommand::new(&self.perl).arg("-v"), env) {
      Ok(_) => Ok(Validation::Satisfied),
      Err(ToolError::NotFound { tool }) => {
        error!("{} is required by MPC but was not found", tool);
        Ok(Validation::Unsatisfied(format!("{} is not installed", tool)))
      }
      Err(ToolError::Failed { tool, code, .. }) => Err(ProjectError::ToolInvocation { tool, code }),
      Err(source) => Err(ProjectError::ToolSpawn {
        tool: self.perl.clone(),
        source,
      }),
    }
  }

  fn update_script(&self, prefix: &Path, script: &mut GeneratedScript) {
    if !prefix.join(LOCATION).exists() {
      return;
    }

    let location = script.this_path(&[LOCATION]);
    script.begin_section(NAME);
    script.write_env_variable("MPC_ROOT", &location);
    script.append_path_variable(&location);
  }
}
