//! Shell detection and per-shell statement syntax.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported shell types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  #[serde(alias = "pwsh")]
  PowerShell,
  Sh,
}

impl Shell {
  /// Detect the current shell from environment
  ///
  /// Checks `$SHELL` on Unix, falls back to reasonable defaults.
  pub fn detect() -> Self {
    if let Ok(shell) = env::var("SHELL") {
      let shell_name = PathBuf::from(&shell)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

      return Self::from_name(&shell_name).unwrap_or_else(|| {
        if shell_name.contains("zsh") {
          Shell::Zsh
        } else if shell_name.contains("bash") {
          Shell::Bash
        } else if shell_name.contains("fish") {
          Shell::Fish
        } else {
          Shell::Sh
        }
      });
    }

    #[cfg(target_os = "windows")]
    return Shell::PowerShell;

    #[cfg(not(target_os = "windows"))]
    Shell::Sh
  }

  fn from_name(name: &str) -> Option<Self> {
    match name {
      "bash" => Some(Shell::Bash),
      "zsh" => Some(Shell::Zsh),
      "fish" => Some(Shell::Fish),
      "sh" => Some(Shell::Sh),
      "pwsh" | "powershell" => Some(Shell::PowerShell),
      _ => None,
    }
  }

  /// Get the shell name as a string
  pub fn as_str(&self) -> &'static str {
    match self {
      Shell::Bash => "bash",
      Shell::Zsh => "zsh",
      Shell::Fish => "fish",
      Shell::PowerShell => "powershell",
      Shell::Sh => "sh",
    }
  }

  /// Get the file extension for this shell's scripts
  pub fn script_extension(&self) -> &'static str {
    match self {
      Shell::Bash | Shell::Sh => "sh",
      Shell::Zsh => "zsh",
      Shell::Fish => "fish",
      Shell::PowerShell => "ps1",
    }
  }

  /// Quote a value so variable references inside it still expand.
  pub fn quote(&self, value: &str) -> String {
    match self {
      Shell::PowerShell => format!("\"{}\"", value.replace('`', "``").replace('"', "`\"")),
      Shell::Fish | Shell::Bash | Shell::Zsh | Shell::Sh => {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
      }
    }
  }

  /// Generate an export statement for setting an environment variable
  pub fn export_var(&self, name: &str, value: &str) -> String {
    let value = self.quote(value);
    match self {
      Shell::Fish => format!("set -gx {} {}", name, value),
      Shell::PowerShell => format!("$env:{} = {}", name, value),
      Shell::Bash | Shell::Zsh | Shell::Sh => format!("export {}={}", name, value),
    }
  }

  /// Generate an append statement for a PATH-like variable
  pub fn append_path(&self, name: &str, value: &str) -> String {
    let value = self.quote(value);
    match self {
      Shell::Fish => format!("set -gx {} ${} {}", name, name, value),
      Shell::PowerShell => format!(
        "$env:{} = $env:{} + [IO.Path]::PathSeparator + {}",
        name, name, value
      ),
      Shell::Bash | Shell::Zsh | Shell::Sh => {
        format!("export {}=\"${{{}:+${}:}}\"{}", name, name, name, value)
      }
    }
  }

  /// Statement binding `var` to the directory containing the script itself.
  ///
  /// POSIX `sh` cannot locate a sourced file, so `dir` (where the script is
  /// written) is baked in for it. The other shells look themselves up.
  pub fn bind_script_dir(&self, var: &str, dir: &Path) -> String {
    match self {
      Shell::Bash => format!("{}=\"$(cd \"$(dirname \"${{BASH_SOURCE[0]}}\")\" && pwd)\"", var),
      Shell::Zsh => format!("{}=\"${{0:A:h}}\"", var),
      Shell::Sh => format!("{}={}", var, self.quote(&dir.to_string_lossy())),
      Shell::Fish => format!("set -g {} (dirname (status --current-filename))", var),
      Shell::PowerShell => format!("${} = $PSScriptRoot", var),
    }
  }

  /// Command that loads the script at `path` into the current session.
  pub fn source_command(&self, path: &Path) -> String {
    let path = self.quote(&path.to_string_lossy());
    match self {
      Shell::Fish => format!("source {}", path),
      Shell::Bash | Shell::Zsh | Shell::Sh | Shell::PowerShell => format!(". {}", path),
    }
  }

  /// Generate a comment for this shell
  pub fn comment(&self, text: &str) -> String {
    format!("# {}", text)
  }

  /// Generate the script header/shebang
  pub fn header(&self) -> &'static str {
    match self {
      Shell::Bash => "#!/usr/bin/env bash",
      Shell::Zsh => "#!/usr/bin/env zsh",
      Shell::Fish => "# Fish shell environment",
      Shell::PowerShell => "# PowerShell environment",
      Shell::Sh => "#!/bin/sh",
    }
  }
}

impl fmt::Display for Shell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Shell {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_name(&s.to_lowercase())
      .ok_or_else(|| format!("unknown shell '{}'. Supported: bash, zsh, fish, sh, powershell", s))
  }
}
