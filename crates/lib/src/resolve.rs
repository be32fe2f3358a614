//! Dependency ordering.
//!
//! Projects are ordered by a depth-first walk with visiting/visited marks:
//! every dependency lands before its dependents, a diamond dependency appears
//! once at its first-discovered position, and ties follow declaration order
//! (roots as requested, dependencies as declared). Names listed as external
//! are treated as already satisfied and skipped.

use std::collections::{BTreeSet, HashMap};

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::{debug, trace};

use crate::project::Registry;

/// Errors found while ordering projects. Raised before any side effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// A name is neither registered nor external.
  #[error("unresolved dependency '{name}'{}", required_by.as_ref().map(|r| format!(" (required by '{}')", r)).unwrap_or_default())]
  Unresolved {
    name: String,
    required_by: Option<String>,
  },

  /// The dependency declarations form a cycle.
  #[error("cyclic dependency: {}", cycle.join(" -> "))]
  Cyclic { cycle: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
  Visiting,
  Done,
}

struct Walk<'a, F> {
  lookup: F,
  external: &'a BTreeSet<String>,
  marks: HashMap<String, Mark>,
  stack: Vec<String>,
  order: Vec<String>,
}

impl<F> Walk<'_, F>
where
  F: Fn(&str) -> Option<Vec<String>>,
{
  fn visit(&mut self, name: &str, required_by: Option<&str>) -> Result<(), ResolveError> {
    if self.external.contains(name) {
      trace!(project = name, "external, skipping");
      return Ok(());
    }

    match self.marks.get(name) {
      Some(Mark::Done) => return Ok(()),
      Some(Mark::Visiting) => {
        let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
        let mut cycle = self.stack[start..].to_vec();
        cycle.push(name.to_string());
        return Err(ResolveError::Cyclic { cycle });
      }
      None => {}
    }

    let deps = (self.lookup)(name).ok_or_else(|| ResolveError::Unresolved {
      name: name.to_string(),
      required_by: required_by.map(str::to_string),
    })?;

    self.marks.insert(name.to_string(), Mark::Visiting);
    self.stack.push(name.to_string());
    for dep in &deps {
      self.visit(dep, Some(name))?;
    }
    self.stack.pop();
    self.marks.insert(name.to_string(), Mark::Done);
    self.order.push(name.to_string());
    Ok(())
  }
}

/// Order `roots` and their transitive dependencies.
///
/// `lookup` returns a project's declared dependencies, or `None` if the
/// project is unknown.
pub fn resolve<F>(roots: &[String], external: &BTreeSet<String>, lookup: F) -> Result<Vec<String>, ResolveError>
where
  F: Fn(&str) -> Option<Vec<String>>,
{
  let mut walk = Walk {
    lookup,
    external,
    marks: HashMap::new(),
    stack: Vec::new(),
    order: Vec::new(),
  };
  for root in roots {
    walk.visit(root, None)?;
  }
  debug!(order = ?walk.order, "resolved project order");
  Ok(walk.order)
}

/// Order `roots` against the projects in `registry`.
pub fn resolve_registry(
  registry: &Registry,
  roots: &[String],
  external: &BTreeSet<String>,
) -> Result<Vec<String>, ResolveError> {
  resolve(roots, external, |name| registry.create(name).map(|p| p.depends()))
}

/// Graph of resolved projects with edges from dependency to dependent.
///
/// External dependencies appear as nodes too, so the graph shows what the
/// environment is expected to provide.
pub fn dependency_graph<F>(order: &[String], lookup: F) -> DiGraph<String, ()>
where
  F: Fn(&str) -> Option<Vec<String>>,
{
  let mut graph = DiGraph::new();
  let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

  let mut node = |graph: &mut DiGraph<String, ()>, name: &str| {
    *nodes
      .entry(name.to_string())
      .or_insert_with(|| graph.add_node(name.to_string()))
  };

  for name in order {
    let dependent = node(&mut graph, name);
    for dep in lookup(name).unwrap_or_default() {
      let dependency = node(&mut graph, &dep);
      graph.add_edge(dependency, dependent, ());
    }
  }
  graph
}

/// Render a dependency graph as Graphviz DOT.
pub fn to_dot(graph: &DiGraph<String, ()>) -> String {
  let dot = Dot::with_attr_getters(
    graph,
    &[Config::EdgeNoLabel, Config::NodeNoLabel],
    &|_, _| String::new(),
    &|_, (_, name)| format!("label = \"{}\" ", name),
  );
  format!("{:?}", dot)
}
