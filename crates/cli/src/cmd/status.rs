//! Status command implementation.
//!
//! Shows which registered projects are installed under the prefix, the
//! revision they are checked out at, and how much space they use.

use anyhow::Result;

use prereq_lib::config::Settings;
use prereq_lib::script::script_path;
use prereq_lib::status;

use super::{GlobalArgs, Session};
use crate::output::{OutputFormat, format_bytes, print_info, print_json, print_stat, print_success, print_warning, symbols};

pub fn cmd_status(global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let session = Session::load(global, Settings::default())?;
  let projects = status::collect(&session.registry, &session.ctx);
  let script = script_path(&session.ctx.prefix, session.shell);
  let usage: u64 = projects.iter().map(|p| p.size_bytes).sum();

  if output.is_json() {
    return print_json(&serde_json::json!({
      "prefix": session.ctx.prefix,
      "script": script.exists().then_some(&script),
      "projects": projects,
      "usage_bytes": usage,
    }));
  }

  print_info(&format!("Prefix: {}", session.ctx.prefix.display()));
  println!();
  for project in &projects {
    if project.installed {
      print_success(&project.name);
      print_stat("Path", &project.path.display().to_string());
      if let Some(revision) = &project.revision {
        print_stat("Revision", revision);
      }
      print_stat("Size", &format_bytes(project.size_bytes));
    } else {
      println!("{} {} (not installed)", symbols::ARROW, project.name);
    }
  }

  println!();
  if script.exists() {
    print_stat("Environment script", &script.display().to_string());
  } else {
    print_warning("No environment script yet; run 'prereq env' to write one");
  }
  print_stat("Total usage", &format_bytes(usage));
  Ok(())
}
