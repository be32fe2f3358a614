//! Install state of registered projects.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::context::RunContext;
use crate::project::Registry;
use crate::vcs::head_revision;

/// Install state of one project under the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
  pub name: String,
  pub path: PathBuf,
  pub installed: bool,
  /// Abbreviated `HEAD` commit when the install is a git checkout.
  pub revision: Option<String>,
  pub depends: Vec<String>,
  pub size_bytes: u64,
}

/// Status of every registered project, in name order.
pub fn collect(registry: &Registry, ctx: &RunContext) -> Vec<ProjectStatus> {
  registry
    .names()
    .filter_map(|name| registry.create(name))
    .map(|project| {
      let path = ctx.install_dir(project.location());
      let installed = project.is_installed(&ctx.prefix);
      ProjectStatus {
        name: project.name().to_string(),
        revision: if installed { head_revision(&path) } else { None },
        size_bytes: if installed { dir_size(&path) } else { 0 },
        depends: project.depends(),
        installed,
        path,
      }
    })
    .collect()
}

/// Total size of the regular files under `path`. Unreadable entries are skipped.
pub fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|entry| entry.file_type().is_file())
    .filter_map(|entry| entry.metadata().ok())
    .map(|meta| meta.len())
    .sum()
}
