//! Test utilities for prereq-lib.
//!
//! Cross-platform command helpers plus recording fakes for the checkout and
//! workspace services, so orchestration can be tested without network access
//! or a real build tool.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::env::EnvironmentState;
use crate::process::ToolCommand;
use crate::vcs::{Checkout, DownloadError};
use crate::workspace::{BuildError, WorkspaceSpec, WorkspaceTool};

/// Returns a command that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  ToolCommand::new("/bin/sh").arg("-c").arg(script)
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  ToolCommand::new("cmd.exe").arg("/C").arg(script)
}

/// Returns a command that echoes an environment variable.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> ToolCommand {
  shell_cmd(&format!("echo \"${}\"", var))
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> ToolCommand {
  shell_cmd(&format!("echo %{}%", var))
}

/// The real process environment, so tools on `PATH` stay reachable.
pub fn host_env() -> EnvironmentState {
  EnvironmentState::from_process()
}

/// Shared, ordered log of calls made to fakes.
pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
  Rc::new(RefCell::new(Vec::new()))
}

/// Checkout fake that creates the destination directory and records the call.
pub struct FakeCheckout {
  pub calls: CallLog,
}

impl Checkout for FakeCheckout {
  fn checkout(&self, url: &str, dest: &Path, tag: Option<&str>, _force: bool) -> Result<(), DownloadError> {
    self
      .calls
      .borrow_mut()
      .push(format!("checkout {} {} {}", url, dest.display(), tag.unwrap_or("-")));
    std::fs::create_dir_all(dest).map_err(|e| DownloadError::CreateDir(dest.to_path_buf(), e))?;
    Ok(())
  }
}

/// Workspace fake that records requests and optionally fails.
pub struct FakeWorkspace {
  pub calls: CallLog,
  pub fail_with: Option<i32>,
}

impl FakeWorkspace {
  fn record(&self, verb: &str, spec: &WorkspaceSpec) -> Result<(), BuildError> {
    self.calls.borrow_mut().push(format!(
      "{} {} {}",
      verb,
      spec.workspace.display(),
      spec.features
    ));
    match self.fail_with {
      Some(code) => Err(BuildError::Failed {
        step: verb.to_string(),
        code: Some(code),
        log: PathBuf::from("fake.log"),
      }),
      None => Ok(()),
    }
  }
}

impl WorkspaceTool for FakeWorkspace {
  fn generate_and_build(&self, spec: &WorkspaceSpec, _env: &EnvironmentState) -> Result<(), BuildError> {
    self.record("build", spec)
  }

  fn clean(&self, spec: &WorkspaceSpec, _env: &EnvironmentState) -> Result<(), BuildError> {
    self.record("clean", spec)
  }
}
