//! Running external tools.
//!
//! Tools run with the [`EnvironmentState`] as their complete environment.
//! Output is either captured (short smoke tests) or streamed into a log file
//! whose path is reported on failure.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::env::EnvironmentState;

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
  /// The program could not be found on the search path.
  #[error("tool not found: {tool}")]
  NotFound { tool: String },

  /// The program exists but could not be started.
  #[error("failed to start {tool}: {source}")]
  Spawn {
    tool: String,
    #[source]
    source: io::Error,
  },

  /// The program exited unsuccessfully.
  #[error("{tool} failed with exit code {code:?}{}", log_hint(.log))]
  Failed {
    tool: String,
    code: Option<i32>,
    log: Option<PathBuf>,
  },

  /// The log file could not be created.
  #[error("failed to open log file {path}: {source}")]
  Log {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn log_hint(log: &Option<PathBuf>) -> String {
  match log {
    Some(path) => format!(" (see {})", path.display()),
    None => String::new(),
  }
}

/// A fully described tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
}

impl ToolCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Command line for logs and error messages.
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn to_command(&self, env: &EnvironmentState) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args).stdin(Stdio::null());
    env.apply_to(&mut command);
    if let Some(cwd) = &self.cwd {
      command.current_dir(cwd);
    }
    command
  }

  fn spawn_error(&self, err: io::Error) -> ToolError {
    if err.kind() == io::ErrorKind::NotFound {
      ToolError::NotFound {
        tool: self.program.clone(),
      }
    } else {
      ToolError::Spawn {
        tool: self.program.clone(),
        source: err,
      }
    }
  }
}

/// Run a tool and capture its stdout (trimmed).
pub fn run_captured(cmd: &ToolCommand, env: &EnvironmentState) -> Result<String, ToolError> {
  debug!(cmd = %cmd.display(), "running tool");

  let output = cmd
    .to_command(env)
    .output()
    .map_err(|e| cmd.spawn_error(e))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "tool stderr");
    }
    return Err(ToolError::Failed {
      tool: cmd.program.clone(),
      code: output.status.code(),
      log: None,
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a tool with stdout and stderr appended to `log`.
pub fn run_logged(cmd: &ToolCommand, env: &EnvironmentState, log: &Path) -> Result<(), ToolError> {
  info!(cmd = %cmd.display(), log = %log.display(), "running tool");

  let log_err = |source| ToolError::Log {
    path: log.to_path_buf(),
    source,
  };
  if let Some(parent) = log.parent() {
    fs::create_dir_all(parent).map_err(log_err)?;
  }
  let stdout = File::options().create(true).append(true).open(log).map_err(log_err)?;
  let stderr = stdout.try_clone().map_err(log_err)?;

  let status = cmd
    .to_command(env)
    .stdout(Stdio::from(stdout))
    .stderr(Stdio::from(stderr))
    .status()
    .map_err(|e| cmd.spawn_error(e))?;

  if !status.success() {
    return Err(ToolError::Failed {
      tool: cmd.program.clone(),
      code: status.code(),
      log: Some(log.to_path_buf()),
    });
  }
  Ok(())
}
