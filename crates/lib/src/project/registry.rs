//! Name-to-factory lookup for projects.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use super::declared::{DeclaredProject, ProjectDecl};
use super::{MpcProject, OasisProject, Project, mpc, oasis};

/// Creates a fresh project instance.
pub type Factory = Box<dyn Fn() -> Box<dyn Project>>;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("project '{0}' is already registered")]
  Duplicate(String),

  #[error("project '{project}' has location '{location}', which is not a subdirectory of the install prefix")]
  LocationOutsidePrefix { project: String, location: String },
}

/// Registered project factories, keyed by project name.
#[derive(Default)]
pub struct Registry {
  factories: BTreeMap<String, Factory>,
}

impl Registry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the built-in projects.
  pub fn builtin() -> Self {
    let mut registry = Self::new();
    registry.insert(mpc::NAME, || Box::new(MpcProject::new()));
    registry.insert(oasis::NAME, || Box::new(OasisProject::new()));
    registry
  }

  /// Register a factory under `name`. Names are unique.
  pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
  where
    F: Fn() -> Box<dyn Project> + 'static,
  {
    if self.factories.contains_key(name) {
      return Err(RegistryError::Duplicate(name.to_string()));
    }
    debug!(project = name, "registered project");
    self.insert(name, factory);
    Ok(())
  }

  fn insert<F>(&mut self, name: &str, factory: F)
  where
    F: Fn() -> Box<dyn Project> + 'static,
  {
    self.factories.insert(name.to_string(), Box::new(factory));
  }

  /// Register a project described in a project file.
  ///
  /// Locations that are absolute or climb out with `..` are rejected.
  pub fn register_declared(&mut self, decl: ProjectDecl) -> Result<(), RegistryError> {
    if !decl.location_is_contained() {
      return Err(RegistryError::LocationOutsidePrefix {
        project: decl.name.clone(),
        location: decl.location().to_string(),
      });
    }
    let name = decl.name.clone();
    self.register(&name, move || Box::new(DeclaredProject::new(decl.clone())))
  }

  /// Instantiate the project registered under `name`.
  pub fn create(&self, name: &str) -> Option<Box<dyn Project>> {
    self.factories.get(name).map(|factory| factory())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.factories.contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.factories.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.factories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }
}
