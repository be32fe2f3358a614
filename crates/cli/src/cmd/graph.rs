use anyhow::{Context, Result};

use prereq_lib::config::Settings;
use prereq_lib::resolve::{dependency_graph, resolve, to_dot};

use super::{GlobalArgs, Session};

/// Print the dependency graph of `projects` (or every registered project).
///
/// Unregistered dependencies are drawn as leaves rather than rejected, so the
/// graph also shows what has to come from elsewhere.
pub fn cmd_graph(projects: &[String], global: &GlobalArgs) -> Result<()> {
  let session = Session::load(global, Settings::default())?;
  let registry = &session.registry;

  let roots: Vec<String> = if projects.is_empty() {
    registry.names().map(str::to_string).collect()
  } else {
    projects.to_vec()
  };

  let registered_deps = |name: &str| {
    registry.create(name).map(|project| {
      project
        .depends()
        .into_iter()
        .filter(|dep| registry.contains(dep))
        .collect()
    })
  };
  let order = resolve(&roots, &session.ctx.external, registered_deps).context("Failed to resolve projects")?;

  let graph = dependency_graph(&order, |name| registry.create(name).map(|project| project.depends()));
  print!("{}", to_dot(&graph));
  Ok(())
}
