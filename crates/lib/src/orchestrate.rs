//! Dependency-ordered execution of project steps.
//!
//! The orchestrator is the main entry point for a run. It:
//! 1. Resolves the requested projects and their dependencies into one order
//! 2. Walks that order, running download, set-environment, validate, and the
//!    requested action for each project
//! 3. Records every project in the generated script and writes it once
//!
//! Resolution happens before any project step, so a cycle or an unknown name
//! leaves the prefix untouched. The first failing step stops the run and
//! nothing is rolled back.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::context::{Action, RunContext};
use crate::env::EnvironmentState;
use crate::project::{Project, ProjectError, Registry, Services, Validation};
use crate::resolve::{ResolveError, resolve, resolve_registry};
use crate::script::{GeneratedScript, Shell, script_path};

#[derive(Debug, Error)]
pub enum OrchestrateError {
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error("environment validation failed for {project}: {reason}")]
  EnvironmentValidation { project: String, reason: String },

  #[error("{project}: {source}")]
  Project {
    project: String,
    #[source]
    source: ProjectError,
  },

  #[error("failed to write environment script {path}: {source}")]
  Script {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl OrchestrateError {
  /// Name of the project the error belongs to, if any.
  pub fn project(&self) -> Option<&str> {
    match self {
      OrchestrateError::EnvironmentValidation { project, .. } | OrchestrateError::Project { project, .. } => {
        Some(project)
      }
      _ => None,
    }
  }
}

/// What the requested action did to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
  /// Downloaded and configured only.
  Configured,
  Built,
  Cleaned,
  /// Clean was requested but nothing is installed.
  NotInstalled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectOutcome {
  pub name: String,
  /// Whether the source was fetched during this run.
  pub fetched: bool,
  pub outcome: StepOutcome,
  #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub action: Action,
  pub projects: Vec<ProjectOutcome>,
  /// The environment script written at the end of the run.
  pub script: PathBuf,
  #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(duration.as_millis() as u64)
}

/// Runs actions across registered projects.
pub struct Orchestrator<'a> {
  registry: &'a Registry,
  ctx: &'a RunContext,
  services: Services<'a>,
  shell: Shell,
}

impl<'a> Orchestrator<'a> {
  pub fn new(registry: &'a Registry, ctx: &'a RunContext, services: Services<'a>, shell: Shell) -> Self {
    Self {
      registry,
      ctx,
      services,
      shell,
    }
  }

  /// Order in which `roots` would be processed.
  pub fn plan(&self, roots: &[String]) -> Result<Vec<String>, ResolveError> {
    resolve_registry(self.registry, roots, &self.ctx.external)
  }

  /// Run `action` for `roots` and everything they depend on.
  ///
  /// `env` is read by validation and the build tools and is updated by
  /// every processed project; it is not restored on failure.
  pub fn run(
    &self,
    action: Action,
    roots: &[String],
    env: &mut EnvironmentState,
  ) -> Result<RunReport, OrchestrateError> {
    let started = Instant::now();
    let order = self.plan(roots)?;
    info!(action = %action, projects = order.len(), "starting run");

    let mut projects = Vec::with_capacity(order.len());
    for name in &order {
      let project = self.instantiate(name)?;
      let outcome = self.process(action, project.as_ref(), env).map_err(|e| {
        error!(project = %name, error = %e, "project failed");
        e
      })?;
      projects.push(outcome);
    }

    let script = self.write_script_for(&order)?;
    info!(action = %action, script = %script.display(), "run complete");

    Ok(RunReport {
      action,
      projects,
      script,
      elapsed: started.elapsed(),
    })
  }

  /// Regenerate the environment script without running any project step.
  ///
  /// With no `roots`, every registered project is included. Dependencies
  /// that are not registered are left out of the script.
  pub fn write_script(&self, roots: &[String]) -> Result<PathBuf, OrchestrateError> {
    let roots: Vec<String> = if roots.is_empty() {
      self.registry.names().map(str::to_string).collect()
    } else {
      roots.to_vec()
    };

    let order = resolve(&roots, &self.ctx.external, |name| {
      self.registry.create(name).map(|project| {
        project
          .depends()
          .into_iter()
          .filter(|dep| self.registry.contains(dep))
          .collect()
      })
    })?;
    self.write_script_for(&order)
  }

  fn instantiate(&self, name: &str) -> Result<Box<dyn Project>, OrchestrateError> {
    self.registry.create(name).ok_or_else(|| {
      OrchestrateError::Resolve(ResolveError::Unresolved {
        name: name.to_string(),
        required_by: None,
      })
    })
  }

  fn process(
    &self,
    action: Action,
    project: &dyn Project,
    env: &mut EnvironmentState,
  ) -> Result<ProjectOutcome, OrchestrateError> {
    let started = Instant::now();
    let name = project.name().to_string();
    let prefix = self.ctx.prefix.as_path();
    let wrap = |source: ProjectError| OrchestrateError::Project {
      project: name.clone(),
      source,
    };

    let installed = project.is_installed(prefix);
    let fetched = action.fetches() && (!installed || self.ctx.force);
    if fetched {
      info!(project = %name, "downloading");
      project.download(self.ctx, &self.services).map_err(wrap)?;
    } else if action.fetches() {
      debug!(project = %name, "verifying installed sources");
      project.verify_download(self.ctx, &self.services).map_err(wrap)?;
    } else {
      debug!(project = %name, installed, "skipping download");
    }

    project.set_env_variables(prefix, env);

    match project.validate_environment(env).map_err(wrap)? {
      Validation::Satisfied => {}
      Validation::Unsatisfied(reason) => {
        return Err(OrchestrateError::EnvironmentValidation {
          project: name.clone(),
          reason,
        });
      }
    }

    let outcome = match action {
      Action::Download => StepOutcome::Configured,
      Action::Build | Action::Setup => {
        info!(project = %name, "building");
        project.build(self.ctx, env, &self.services).map_err(wrap)?;
        StepOutcome::Built
      }
      Action::Clean if installed => {
        info!(project = %name, "cleaning");
        project.clean(self.ctx, env, &self.services).map_err(wrap)?;
        StepOutcome::Cleaned
      }
      Action::Clean => {
        debug!(project = %name, "not installed, nothing to clean");
        StepOutcome::NotInstalled
      }
    };

    Ok(ProjectOutcome {
      name,
      fetched,
      outcome,
      elapsed: started.elapsed(),
    })
  }

  fn write_script_for(&self, order: &[String]) -> Result<PathBuf, OrchestrateError> {
    let prefix = self.ctx.prefix.as_path();
    let mut script = GeneratedScript::new();
    for name in order {
      self.instantiate(name)?.update_script(prefix, &mut script);
    }

    script.write(prefix, self.shell).map_err(|source| OrchestrateError::Script {
      path: script_path(prefix, self.shell),
      source,
    })
  }
}
