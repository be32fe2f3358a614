//! Settings file handling.
//!
//! Settings are read from `config.json` in the platform config directory (see
//! [`crate::platform::paths::config_file`]) or from an explicit path. Every
//! field is optional; command-line flags are layered on top with
//! [`Settings::merge`] before a [`RunContext`] is built.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::context::{Revision, RunContext, Transport, default_build_type, default_threads};
use crate::platform::paths::{config_file, expand_path};
use crate::script::Shell;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("thread count must be at least 1")]
  InvalidThreads,
}

/// Persistent defaults for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
  /// Install prefix; `~` and relative paths are expanded.
  pub prefix: Option<String>,
  pub transport: Option<Transport>,
  pub revision: Option<Revision>,
  pub build_type: Option<String>,
  pub config: Option<String>,
  pub threads: Option<usize>,
  pub affiliate: Option<bool>,
  pub versioned_namespace: Option<bool>,
  pub force: Option<bool>,
  /// Dependency names satisfied outside of this tool.
  pub external: Vec<String>,
  /// JSON file with additional project declarations.
  pub projects_file: Option<String>,
  /// Shell the environment script is rendered for.
  pub shell: Option<Shell>,
}

impl Settings {
  /// Read settings from `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
  }

  /// Read settings from the default location, or defaults if there is none.
  pub fn load_default() -> Result<Self, ConfigError> {
    let path = config_file();
    if path.exists() {
      Self::load(&path)
    } else {
      debug!(path = %path.display(), "no settings file");
      Ok(Self::default())
    }
  }

  /// Layer `overrides` on top of `self`. External names accumulate.
  pub fn merge(self, overrides: Settings) -> Settings {
    let mut external = self.external;
    for name in overrides.external {
      if !external.contains(&name) {
        external.push(name);
      }
    }

    Settings {
      prefix: overrides.prefix.or(self.prefix),
      transport: overrides.transport.or(self.transport),
      revision: overrides.revision.or(self.revision),
      build_type: overrides.build_type.or(self.build_type),
      config: overrides.config.or(self.config),
      threads: overrides.threads.or(self.threads),
      affiliate: overrides.affiliate.or(self.affiliate),
      versioned_namespace: overrides.versioned_namespace.or(self.versioned_namespace),
      force: overrides.force.or(self.force),
      external,
      projects_file: overrides.projects_file.or(self.projects_file),
      shell: overrides.shell.or(self.shell),
    }
  }

  /// Absolute install prefix. Defaults to `cwd`.
  pub fn prefix(&self, cwd: &Path) -> PathBuf {
    let path = match &self.prefix {
      Some(prefix) => expand_path(prefix, cwd),
      None => cwd.to_path_buf(),
    };
    dunce::canonicalize(&path).unwrap_or(path)
  }

  pub fn projects_file(&self, cwd: &Path) -> Option<PathBuf> {
    self.projects_file.as_deref().map(|p| expand_path(p, cwd))
  }

  /// Configured shell, or the one detected from the environment.
  pub fn shell(&self) -> Shell {
    self.shell.unwrap_or_else(Shell::detect)
  }

  /// Build the run context, filling gaps with defaults.
  pub fn run_context(&self, cwd: &Path) -> Result<RunContext, ConfigError> {
    let threads = self.threads.unwrap_or_else(default_threads);
    if threads == 0 {
      return Err(ConfigError::InvalidThreads);
    }

    let mut ctx = RunContext::new(self.prefix(cwd));
    ctx.transport = self.transport.unwrap_or_default();
    ctx.revision = self.revision.unwrap_or_default();
    ctx.build_type = self.build_type.clone().unwrap_or_else(|| default_build_type().to_string());
    if let Some(config) = &self.config {
      ctx.config = config.clone();
    }
    ctx.threads = threads;
    ctx.affiliate = self.affiliate.unwrap_or(false);
    ctx.versioned_namespace = self.versioned_namespace.unwrap_or(false);
    ctx.force = self.force.unwrap_or(false);
    ctx.external = self.external.iter().cloned().collect();
    Ok(ctx)
  }
}
