//! Explicit environment state threaded through a run.
//!
//! Projects never touch the real process environment. They record variables
//! and search-path additions here, later projects read them back, and child
//! processes receive the merged result as their complete environment.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::trace;

use crate::platform::library_path_var;

/// Variables that hold an ordered list of directories.
const PATH_LIST_VARS: &[&str] = &["PATH", "LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH"];

/// Environment variables plus ordered, deduplicated search-path lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentState {
  vars: BTreeMap<String, String>,
  paths: BTreeMap<String, Vec<PathBuf>>,
}

impl EnvironmentState {
  /// An empty environment.
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot the current process environment.
  ///
  /// Non-UTF-8 values are converted lossily.
  pub fn from_process() -> Self {
    Self::from_pairs(std::env::vars_os())
  }

  /// Build an environment from key/value pairs, splitting path-list variables.
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
  {
    let mut state = Self::new();
    for (key, value) in pairs {
      let key = key.into().to_string_lossy().into_owned();
      let value: OsString = value.into();
      if is_path_list(&key) {
        let entries: Vec<PathBuf> = std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()).collect();
        for entry in entries {
          state.push_unique(&key, entry);
        }
      } else {
        state.vars.insert(key, value.to_string_lossy().into_owned());
      }
    }
    state
  }

  /// Define (or overwrite) a variable.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();
    trace!(key = %key, value = %value, "set variable");
    self.paths.remove(&key);
    self.vars.insert(key, value);
  }

  /// Look up a variable, joining path lists with the platform separator.
  pub fn get(&self, key: &str) -> Option<String> {
    if let Some(value) = self.vars.get(key) {
      return Some(value.clone());
    }
    self.paths.get(key).map(|entries| join_paths(entries))
  }

  pub fn contains(&self, key: &str) -> bool {
    self.vars.contains_key(key) || self.paths.contains_key(key)
  }

  /// Append a directory to a path-list variable unless it is already listed.
  pub fn append_path_to(&mut self, key: &str, dir: impl AsRef<Path>) {
    if let Some(existing) = self.vars.remove(key) {
      for entry in std::env::split_paths(&existing) {
        self.push_unique(key, entry);
      }
    }
    self.push_unique(key, dir.as_ref().to_path_buf());
  }

  /// Append a directory to `PATH`.
  pub fn append_path(&mut self, dir: impl AsRef<Path>) {
    self.append_path_to("PATH", dir);
  }

  /// Append a directory to the platform's library search path.
  pub fn append_libpath(&mut self, dir: impl AsRef<Path>) {
    self.append_path_to(library_path_var(), dir);
  }

  /// Entries of a path-list variable, in order.
  pub fn path_list(&self, key: &str) -> &[PathBuf] {
    self.paths.get(key).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Flatten into plain key/value pairs.
  pub fn to_vars(&self) -> BTreeMap<String, String> {
    let mut out = self.vars.clone();
    for (key, entries) in &self.paths {
      out.insert(key.clone(), join_paths(entries));
    }
    out
  }

  /// Replace a command's environment with this state.
  pub fn apply_to(&self, command: &mut Command) {
    command.env_clear().envs(self.to_vars());
  }

  fn push_unique(&mut self, key: &str, entry: PathBuf) {
    let list = self.paths.entry(key.to_string()).or_default();
    if !list.contains(&entry) {
      trace!(key, entry = %entry.display(), "append search path");
      list.push(entry);
    }
  }
}

fn is_path_list(key: &str) -> bool {
  PATH_LIST_VARS.contains(&key)
}

fn join_paths(entries: &[PathBuf]) -> String {
  match std::env::join_paths(entries) {
    Ok(joined) => joined.to_string_lossy().into_owned(),
    Err(_) => {
      let sep = if cfg!(windows) { ";" } else { ":" };
      entries
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(sep)
    }
  }
}
