//! The project capability contract.
//!
//! A project knows how to fetch one dependency, describe the environment it
//! needs, check its prerequisites, record itself in the generated script,
//! and build or clean itself. Projects are created by name through the
//! [`registry::Registry`].

pub mod declared;
pub mod mpc;
pub mod oasis;
pub mod registry;

use std::path::Path;

use thiserror::Error;

use crate::context::RunContext;
use crate::env::EnvironmentState;
use crate::process::ToolError;
use crate::script::GeneratedScript;
use crate::vcs::{Checkout, DownloadError};
use crate::workspace::{BuildError, WorkspaceTool};

pub use declared::DeclaredProject;
pub use mpc::MpcProject;
pub use oasis::OasisProject;
pub use registry::{Registry, RegistryError};

/// Errors raised by a single project step.
#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("download failed: {0}")]
  Download(#[from] DownloadError),

  /// A smoke-test tool ran and exited unsuccessfully.
  #[error("tool '{tool}' exited with code {code:?}")]
  ToolInvocation { tool: String, code: Option<i32> },

  /// A smoke-test tool could not be started for a reason other than absence.
  #[error("tool '{tool}' could not be run: {source}")]
  ToolSpawn {
    tool: String,
    #[source]
    source: ToolError,
  },

  #[error("build failed: {0}")]
  Build(#[from] BuildError),

  /// A variable another step relies on is not defined.
  #[error("{0} environment variable is not defined")]
  MissingVariable(String),
}

/// Outcome of checking a project's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
  Satisfied,
  /// A prerequisite is missing; the string names it.
  Unsatisfied(String),
}

impl Validation {
  pub fn is_satisfied(&self) -> bool {
    matches!(self, Validation::Satisfied)
  }
}

/// Collaborators a project calls out to.
pub struct Services<'a> {
  pub checkout: &'a dyn Checkout,
  pub workspace: &'a dyn WorkspaceTool,
}

/// A pluggable, buildable unit.
pub trait Project {
  /// Stable identifier, unique within a registry.
  fn name(&self) -> &str;

  /// Install subdirectory under the prefix.
  fn location(&self) -> &str;

  /// Projects that must be fully processed before this one.
  fn depends(&self) -> Vec<String> {
    Vec::new()
  }

  /// Whether the install directory exists under `prefix`.
  fn is_installed(&self, prefix: &Path) -> bool {
    prefix.join(self.location()).exists()
  }

  /// Materialize the source tree at `prefix/location`.
  fn download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError>;

  /// Check that an installed source tree is at the revision `download`
  /// would fetch.
  fn verify_download(&self, _ctx: &RunContext, _services: &Services<'_>) -> Result<(), ProjectError> {
    Ok(())
  }

  /// Record the variables this project provides.
  fn set_env_variables(&self, prefix: &Path, env: &mut EnvironmentState);

  /// Check prerequisites. Missing pieces are reported, not raised.
  fn validate_environment(&self, env: &EnvironmentState) -> Result<Validation, ProjectError>;

  /// Append this project's section to the script, if it is installed.
  fn update_script(&self, prefix: &Path, script: &mut GeneratedScript);

  fn build(&self, _ctx: &RunContext, _env: &EnvironmentState, _services: &Services<'_>) -> Result<(), ProjectError> {
    Ok(())
  }

  fn clean(&self, _ctx: &RunContext, _env: &EnvironmentState, _services: &Services<'_>) -> Result<(), ProjectError> {
    Ok(())
  }
}

/// Require a variable to be present, reporting it otherwise.
pub fn require_variable(env: &EnvironmentState, key: &str) -> Validation {
  if env.contains(key) {
    Validation::Satisfied
  } else {
    tracing::error!("{} environment variable is not defined", key);
    Validation::Unsatisfied(format!("{} environment variable is not defined", key))
  }
}
