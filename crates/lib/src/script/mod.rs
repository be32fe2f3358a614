//! The generated environment script.
//!
//! Projects append named sections while a run finishes; the script is then
//! rendered for one shell and written under the prefix so users can restore
//! the configured environment without re-running downloads or builds. Values
//! are written relative to [`GeneratedScript::this_variable`], which the
//! rendered script binds to its own directory.

pub mod shell;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::consts::{SCRIPT_STEM, THIS_DIR_VAR};
use crate::platform::library_path_var;

pub use shell::Shell;

/// One statement inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
  Set { key: String, value: String },
  AppendPath { key: String, value: String },
}

/// A named group of statements, usually one per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  pub name: String,
  pub entries: Vec<Entry>,
}

/// Append-only script model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedScript {
  sections: Vec<Section>,
}

impl GeneratedScript {
  pub fn new() -> Self {
    Self::default()
  }

  /// Token standing for the directory that contains the written script.
  pub fn this_variable(&self) -> String {
    format!("${}", THIS_DIR_VAR)
  }

  /// `this_variable()` joined with relative path components, `/`-separated.
  pub fn this_path(&self, parts: &[&str]) -> String {
    let mut path = self.this_variable();
    for part in parts {
      path.push('/');
      path.push_str(part);
    }
    path
  }

  /// Start a new section; following statements belong to it.
  pub fn begin_section(&mut self, name: &str) {
    self.sections.push(Section {
      name: name.to_string(),
      entries: Vec::new(),
    });
  }

  pub fn write_env_variable(&mut self, key: &str, value: &str) {
    self.push(Entry::Set {
      key: key.to_string(),
      value: value.to_string(),
    });
  }

  /// Append a directory to `PATH`.
  pub fn append_path_variable(&mut self, value: &str) {
    self.append_to("PATH", value);
  }

  /// Append a directory to the library search path of the host OS.
  pub fn append_libpath_variable(&mut self, value: &str) {
    self.append_to(library_path_var(), value);
  }

  /// Append a directory to an arbitrary path-list variable.
  ///
  /// A value already appended to the same variable anywhere in the script is
  /// not repeated.
  pub fn append_to(&mut self, key: &str, value: &str) {
    let exists = self.sections.iter().flat_map(|s| &s.entries).any(|e| {
      matches!(e, Entry::AppendPath { key: k, value: v } if k == key && v == value)
    });
    if !exists {
      self.push(Entry::AppendPath {
        key: key.to_string(),
        value: value.to_string(),
      });
    }
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }

  /// Render the script for `shell`, to be written into `dir`.
  pub fn render(&self, shell: Shell, dir: &Path) -> String {
    let mut lines = vec![
      shell.header().to_string(),
      shell.comment("Generated by prereq. Source this file to configure the environment."),
      String::new(),
      shell.bind_script_dir(THIS_DIR_VAR, dir),
    ];

    for section in &self.sections {
      lines.push(String::new());
      if !section.name.is_empty() {
        lines.push(shell.comment(&section.name));
      }
      for entry in &section.entries {
        lines.push(match entry {
          Entry::Set { key, value } => shell.export_var(key, value),
          Entry::AppendPath { key, value } => shell.append_path(key, value),
        });
      }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
  }

  /// Render for `shell` and write to `<dir>/prereq-env.<ext>`.
  pub fn write(&self, dir: &Path, shell: Shell) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = script_path(dir, shell);
    fs::write(&path, self.render(shell, &dunce::canonicalize(dir)?))?;
    debug!(path = %path.display(), sections = self.sections.len(), "wrote environment script");
    Ok(path)
  }

  fn push(&mut self, entry: Entry) {
    if self.sections.is_empty() {
      self.begin_section("");
    }
    if let Some(section) = self.sections.last_mut() {
      section.entries.push(entry);
    }
  }
}

/// Where the script for `shell` lives under `dir`.
pub fn script_path(dir: &Path, shell: Shell) -> PathBuf {
  dir.join(format!("{}.{}", SCRIPT_STEM, shell.script_extension()))
}
