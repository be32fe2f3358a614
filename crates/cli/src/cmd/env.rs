//! Implementation of `prereq env`.

use std::fs;

use anyhow::{Context, Result};

use prereq_lib::config::Settings;
use prereq_lib::vcs::GitCheckout;
use prereq_lib::workspace::MpcWorkspace;
use prereq_lib::{Orchestrator, Services};

use super::{GlobalArgs, Session};
use crate::output::{OutputFormat, print_info, print_json, print_success};

/// Rewrite the environment script from what is installed under the prefix.
pub fn cmd_env(projects: &[String], print: bool, global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let session = Session::load(global, Settings::default())?;
  let checkout = GitCheckout;
  let workspace = MpcWorkspace::default();
  let services = Services {
    checkout: &checkout,
    workspace: &workspace,
  };

  let path = Orchestrator::new(&session.registry, &session.ctx, services, session.shell)
    .write_script(projects)
    .context("Failed to generate environment script")?;

  if print {
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    print!("{}", content);
    return Ok(());
  }

  let source = session.shell.source_command(&path);
  if output.is_json() {
    print_json(&serde_json::json!({
      "script": path,
      "shell": session.shell,
      "source": source,
    }))?;
  } else {
    print_success(&format!("Wrote {}", path.display()));
    print_info("Load it into the current shell with:");
    println!("  {}", source);
  }
  Ok(())
}
