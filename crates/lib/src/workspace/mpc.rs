//! MPC-driven workspaces.

use std::path::Path;

use tracing::{debug, info};

use super::{BuildError, WorkspaceSpec, WorkspaceTool};
use crate::env::EnvironmentState;
use crate::process::{ToolCommand, run_logged};

/// Native builder behind an MPC project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builder {
  Make,
  MsBuild,
}

impl Builder {
  /// Pick the builder for an MPC `-type` value.
  pub fn for_type(build_type: &str) -> Option<Self> {
    let t = build_type.to_lowercase();
    if t == "gnuace" || t == "make" {
      Some(Builder::Make)
    } else if t.starts_with("vs") || t.starts_with("vc") {
      Some(Builder::MsBuild)
    } else {
      None
    }
  }
}

/// Runs `mwc.pl` from `$MPC_ROOT` and then `make` or `msbuild`.
#[derive(Debug, Clone)]
pub struct MpcWorkspace {
  pub perl: String,
  pub make: String,
  pub msbuild: String,
}

impl Default for MpcWorkspace {
  fn default() -> Self {
    Self {
      perl: "perl".to_string(),
      make: "make".to_string(),
      msbuild: "msbuild".to_string(),
    }
  }
}

impl MpcWorkspace {
  /// `perl $MPC_ROOT/mwc.pl ...` for the spec.
  pub fn generate_command(&self, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<ToolCommand, BuildError> {
    let mpc_root = env.get("MPC_ROOT").ok_or(BuildError::MissingMpcRoot)?;
    let mwc = Path::new(&mpc_root).join("mwc.pl");

    let mut cmd = ToolCommand::new(&self.perl)
      .arg(mwc.to_string_lossy())
      .args(["-type", spec.build_type.as_str()]);
    if !spec.features.is_empty() {
      cmd = cmd.args(["-features".to_string(), spec.features.to_string()]);
    }
    if let Some(file) = &spec.feature_file {
      cmd = cmd.args(["-feature_file".to_string(), file.to_string_lossy().into_owned()]);
    }
    Ok(cmd.arg(spec.workspace.to_string_lossy()).current_dir(workspace_dir(spec)))
  }

  /// Native build (or clean) command for the spec.
  pub fn builder_command(&self, spec: &WorkspaceSpec, clean: bool) -> Result<ToolCommand, BuildError> {
    let builder = Builder::for_type(&spec.build_type).ok_or_else(|| BuildError::UnsupportedType(spec.build_type.clone()))?;
    let cmd = match builder {
      Builder::Make => {
        let cmd = ToolCommand::new(&self.make).arg(format!("-j{}", spec.threads));
        if clean { cmd.arg("clean") } else { cmd }
      }
      Builder::MsBuild => {
        let solution = spec.workspace.with_extension("sln");
        ToolCommand::new(&self.msbuild)
          .arg(solution.to_string_lossy())
          .arg(format!("/m:{}", spec.threads))
          .arg(format!("/p:Configuration={}", spec.config))
          .arg(if clean { "/t:Clean" } else { "/t:Build" })
      }
    };
    Ok(cmd.current_dir(workspace_dir(spec)))
  }

  fn run(&self, step: &str, cmd: &ToolCommand, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<(), BuildError> {
    run_logged(cmd, env, &spec.log_path(step)).map_err(|e| BuildError::from_tool(step, e))
  }
}

impl WorkspaceTool for MpcWorkspace {
  fn generate_and_build(&self, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<(), BuildError> {
    if let Some(path) = &spec.feature_file {
      debug!(path = %path.display(), "writing default feature file");
      spec.features.write_feature_file(path).map_err(|source| BuildError::FeatureFile {
        path: path.clone(),
        source,
      })?;
    }

    info!(project = %spec.project, workspace = %spec.workspace.display(), "generating workspace");
    let generate = self.generate_command(spec, env)?;
    self.run("generate", &generate, spec, env)?;

    info!(project = %spec.project, threads = spec.threads, "building workspace");
    let build = self.builder_command(spec, false)?;
    self.run("build", &build, spec, env)
  }

  fn clean(&self, spec: &WorkspaceSpec, env: &EnvironmentState) -> Result<(), BuildError> {
    info!(project = %spec.project, workspace = %spec.workspace.display(), "cleaning workspace");
    let clean = self.builder_command(spec, true)?;
    self.run("clean", &clean, spec, env)
  }
}

fn workspace_dir(spec: &WorkspaceSpec) -> &Path {
  spec.workspace.parent().unwrap_or(Path::new("."))
}
