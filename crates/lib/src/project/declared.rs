//! Projects described in a JSON project file.
//!
//! ```json
//! {
//!   "projects": [
//!     {
//!       "name": "XSC",
//!       "url": "https://github.com/SEDS/XSC.git",
//!       "ssh_url": "git@github.com:SEDS/XSC.git",
//!       "depends": ["MPC"],
//!       "root_var": "XSC_ROOT",
//!       "path": ["bin"],
//!       "libpath": ["lib"],
//!       "workspace": "XSC.mwc",
//!       "features": "xerces3=1,boost=1"
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::{Project, ProjectError, Services, Validation, require_variable};
use crate::config::ConfigError;
use crate::context::RunContext;
use crate::env::EnvironmentState;
use crate::script::GeneratedScript;
use crate::workspace::{FeatureSet, WorkspaceSpec};

/// One project entry of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDecl {
  pub name: String,
  /// Install subdirectory; defaults to the name.
  #[serde(default)]
  pub location: Option<String>,
  /// HTTPS clone URL.
  pub url: String,
  /// SSH clone URL; HTTPS is used when absent.
  #[serde(default)]
  pub ssh_url: Option<String>,
  /// Release tag checked out unless trunk is requested.
  #[serde(default)]
  pub tag: Option<String>,
  #[serde(default)]
  pub depends: Vec<String>,
  /// Variable set to the install directory.
  #[serde(default)]
  pub root_var: Option<String>,
  /// Install subdirectories appended to `PATH`.
  #[serde(default)]
  pub path: Vec<String>,
  /// Install subdirectories appended to the library path.
  #[serde(default)]
  pub libpath: Vec<String>,
  /// Variables that must be defined for validation to pass.
  #[serde(default)]
  pub requires: Vec<String>,
  /// MPC workspace file, relative to the install directory.
  #[serde(default)]
  pub workspace: Option<String>,
  #[serde(default)]
  pub features: Option<String>,
}

impl ProjectDecl {
  /// Install subdirectory under the prefix.
  pub fn location(&self) -> &str {
    self.location.as_deref().unwrap_or(&self.name)
  }

  /// True when the location is a relative path of plain names, so the
  /// install directory cannot leave the prefix.
  pub fn location_is_contained(&self) -> bool {
    let location = Path::new(self.location());
    location.components().next().is_some() && location.components().all(|c| matches!(c, Component::Normal(_)))
  }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFile {
  projects: Vec<ProjectDecl>,
}

/// Parse a project file.
pub fn load_project_file(path: &Path) -> Result<Vec<ProjectDecl>, ConfigError> {
  let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let file: ProjectFile = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(file.projects)
}

/// A [`Project`] driven by a [`ProjectDecl`].
#[derive(Debug, Clone)]
pub struct DeclaredProject {
  decl: ProjectDecl,
}

impl DeclaredProject {
  pub fn new(decl: ProjectDecl) -> Self {
    Self { decl }
  }

  fn url(&self, ctx: &RunContext) -> &str {
    match (&self.decl.ssh_url, ctx.use_https()) {
      (Some(ssh), false) => ssh,
      _ => &self.decl.url,
    }
  }

  fn tag(&self, ctx: &RunContext) -> Option<&str> {
    if ctx.use_trunk() {
      None
    } else {
      self.decl.tag.as_deref()
    }
  }
}

impl Project for DeclaredProject {
  fn name(&self) -> &str {
    &self.decl.name
  }

  fn location(&self) -> &str {
    self.decl.location()
  }

  fn depends(&self) -> Vec<String> {
    self.decl.depends.clone()
  }

  fn download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    let dest = ctx.install_dir(self.location());
    services.checkout.checkout(self.url(ctx), &dest, self.tag(ctx), ctx.force)?;
    Ok(())
  }

  fn verify_download(&self, ctx: &RunContext, services: &Services<'_>) -> Result<(), ProjectError> {
    let dest = ctx.install_dir(self.location());
    services.checkout.verify(self.url(ctx), &dest, self.tag(ctx))?;
    Ok(())
  }

  fn set_env_variables(&self, prefix: &Path, env: &mut EnvironmentState) {
    let root = prefix.join(self.location());
    if let Some(var) = &self.decl.root_var {
      env.set(var.as_str(), root.to_string_lossy());
    }
    for dir in &self.decl.path {
      env.append_path(root.join(dir));
    }
    for dir in &self.decl.libpath {
      env.append_libpath(root.join(dir));
    }
  }

  fn validate_environment(&self, env: &EnvironmentState) -> Result<Validation, ProjectError> {
    for var in self.decl.root_var.iter().chain(&self.decl.requires) {
      let found = require_variable(env, var);
      if !found.is_satisfied() {
        return Ok(found);
      }
    }
    Ok(Validation::Satisfied)
  }

  fn update_script(&self, prefix: &Path, script: &mut GeneratedScript) {
    if !prefix.join(self.location()).exists() {
      return;
    }

    let location = script.this_path(&[self.location()]);
    script.begin_section(&self.decl.name);
    if let Some(var) = &self.decl.root_var {
      script.write_env_variable(var, &location);
    }
    for dir in &self.decl.path {
      script.append_path_variable(&format!("{}/{}", location, dir));
    }
    for dir in &self.decl.libpath {
      script.append_libpath_variable(&format!("{}/{}", location, dir));
    }
  }

  fn build(&self, ctx: &RunContext, env: &EnvironmentState, services: &Services<'_>) -> Result<(), ProjectError> {
    if let Some(spec) = self.workspace_spec(ctx) {
      services.workspace.generate_and_build(&spec, env)?;
    }
    Ok(())
  }

  fn clean(&self, ctx: &RunContext, env: &EnvironmentState, services: &Services<'_>) -> Result<(), ProjectError> {
    if let Some(spec) = self.workspace_spec(ctx) {
      services.workspace.clean(&spec, env)?;
    }
    Ok(())
  }
}

impl DeclaredProject {
  fn workspace_spec(&self, ctx: &RunContext) -> Option<WorkspaceSpec> {
    let workspace = self.decl.workspace.as_ref()?;
    let root = ctx.install_dir(self.location());
    let features = self.decl.features.as_deref().map(FeatureSet::parse).unwrap_or_default();
    Some(WorkspaceSpec::new(&self.decl.name, root.join(workspace), ctx, features))
  }
}
