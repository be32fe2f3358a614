//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the settings directory,
/// the install prefix, and any project files.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Install prefix (created on first use).
  pub fn prefix(&self) -> PathBuf {
    let p = self.temp.path().join("prefix");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Mark a project as installed by creating its directory under the prefix.
  pub fn install(&self, location: &str) -> PathBuf {
    let dir = self.prefix().join(location);
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Write a project file declaring `projects` (a JSON array).
  pub fn project_file(&self, projects: &str) -> PathBuf {
    self.write_file("projects.json", &format!(r#"{{"projects": {}}}"#, projects))
  }

  /// Get a pre-configured Command for the prereq binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `XDG_CONFIG_HOME` / `APPDATA`: isolated settings directory
  /// - `PREREQ_PREFIX`: isolated install prefix
  pub fn prereq_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("prereq");
    cmd.env("XDG_CONFIG_HOME", self.temp.path().join("config"));
    cmd.env("APPDATA", self.temp.path().join("config"));
    cmd.env("PREREQ_PREFIX", self.prefix());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
