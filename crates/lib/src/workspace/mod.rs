//! Workspace generation and building.
//!
//! Projects that compile describe their build as a [`WorkspaceSpec`] and hand
//! it to a [`WorkspaceTool`]. [`MpcWorkspace`] is the production tool: it
//! generates build files with MPC's `mwc.pl` and drives the native builder.

pub mod features;
pub mod mpc;

use std::path::PathBuf;

use thiserror::Error;

use crate::consts::STATE_DIR;
use crate::context::RunContext;
use crate::env::EnvironmentState;
use crate::process::ToolError;

pub use features::FeatureSet;
pub use mpc::MpcWorkspace;

/// Errors from generating, building, or cleaning a workspace.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A build step ran and exited unsuccessfully.
  #[error("{step} failed with exit code {code:?} (see {})", log.display())]
  Failed {
    step: String,
    code: Option<i32>,
    log: PathBuf,
  },

  /// A build step could not be started.
  #[error("cannot run {step}: {source}")]
  Tool {
    step: String,
    #[source]
    source: ToolError,
  },

  /// `MPC_ROOT` is needed to locate `mwc.pl`.
  #[error("MPC_ROOT is not set; configure the MPC project first")]
  MissingMpcRoot,

  /// No native builder is known for the build type.
  #[error("unsupported build type '{0}'")]
  UnsupportedType(String),

  /// Failed to write the default feature file.
  #[error("failed to write feature file '{path}': {source}")]
  FeatureFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl BuildError {
  /// Convert a tool error raised while running `step`.
  pub fn from_tool(step: &str, err: ToolError) -> Self {
    match err {
      ToolError::Failed {
        code, log: Some(log), ..
      } => BuildError::Failed {
        step: step.to_string(),
        code,
        log,
      },
      source => BuildError::Tool {
        step: step.to_string(),
        source,
      },
    }
  }
}

/// Everything the workspace tool needs for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSpec {
  /// Project name, used to name log files.
  pub project: String,
  /// Workspace descriptor (`.mwc`).
  pub workspace: PathBuf,
  pub build_type: String,
  pub config: String,
  pub threads: usize,
  pub features: FeatureSet,
  /// Written before generation when set.
  pub feature_file: Option<PathBuf>,
  /// Directory receiving tool output.
  pub log_dir: PathBuf,
}

impl WorkspaceSpec {
  pub fn new(project: &str, workspace: impl Into<PathBuf>, ctx: &RunContext, features: FeatureSet) -> Self {
    Self {
      project: project.to_string(),
      workspace: workspace.into(),
      build_type: ctx.build_type.clone(),
      config: ctx.config.clone(),
      threads: ctx.threads.max(1),
      features,
      feature_file: None,
      log_dir: ctx.prefix.join(STATE_DIR).join("logs"),
    }
  }

  pub fn with_feature_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.feature_file = Some(path.into());
    self
  }

  /// Log file for one step of this project.
  pub fn log_path(&self, step: &str) -> PathBuf {
    self.log_dir.join(format!("{}-{}.log", self.project, step))
  }
}

/// External workspace generator/builder.
pub trait WorkspaceTool {
  /// Generate build files for the workspace, then build it.
  fn generate_and_build(&self, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<(), BuildError>;

  /// Remove build products of the workspace.
  fn clean(&self, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<(), BuildError>;
}
