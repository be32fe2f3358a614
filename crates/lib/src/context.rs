//! Per-run configuration shared by every project.
//!
//! A [`RunContext`] is built once per invocation (from settings and CLI
//! flags) and is read-only afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Network transport used for repository URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
  #[default]
  Https,
  Ssh,
}

/// Which source revision to check out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
  /// The release tag each project pins.
  #[default]
  Tagged,
  /// The default branch of the upstream repository.
  Trunk,
}

/// Top-level action requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Download,
  Build,
  Clean,
  /// Download, configure, validate, then build.
  Setup,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Download => "download",
      Action::Build => "build",
      Action::Clean => "clean",
      Action::Setup => "setup",
    }
  }

  /// Whether missing sources are fetched before the action runs.
  pub fn fetches(&self) -> bool {
    !matches!(self, Action::Clean)
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
  /// Root directory all projects are installed under.
  pub prefix: PathBuf,
  pub transport: Transport,
  pub revision: Revision,
  /// MPC project type (e.g. `gnuace`, `vs2019`).
  pub build_type: String,
  /// Build configuration name (e.g. `Release`).
  pub config: String,
  /// Job count handed to the build tool.
  pub threads: usize,
  /// Fetch from the affiliate mirror instead of the public host.
  pub affiliate: bool,
  pub versioned_namespace: bool,
  /// Re-fetch sources even if the install directory exists.
  pub force: bool,
  /// Dependency names provided outside of this tool.
  pub external: BTreeSet<String>,
}

impl RunContext {
  /// Create a context with defaults for everything but the prefix.
  pub fn new(prefix: impl Into<PathBuf>) -> Self {
    Self {
      prefix: prefix.into(),
      transport: Transport::default(),
      revision: Revision::default(),
      build_type: default_build_type().to_string(),
      config: "Release".to_string(),
      threads: default_threads(),
      affiliate: false,
      versioned_namespace: false,
      force: false,
      external: BTreeSet::new(),
    }
  }

  pub fn use_https(&self) -> bool {
    self.transport == Transport::Https
  }

  pub fn use_trunk(&self) -> bool {
    self.revision == Revision::Trunk
  }

  /// Absolute install directory for a project location.
  pub fn install_dir(&self, location: &str) -> PathBuf {
    install_dir(&self.prefix, location)
  }
}

/// Install directory for `location` under `prefix`.
pub fn install_dir(prefix: &Path, location: &str) -> PathBuf {
  prefix.join(location)
}

/// Default MPC project type for the host.
pub fn default_build_type() -> &'static str {
  if cfg!(windows) { "vs2019" } else { "gnuace" }
}

/// Get the number of CPUs for default parallelism.
pub fn default_threads() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
