use anyhow::Result;
use serde::Serialize;

use prereq_lib::config::Settings;

use super::{GlobalArgs, Session};
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct ProjectEntry {
  name: String,
  location: String,
  depends: Vec<String>,
}

pub fn cmd_list(global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let session = Session::load(global, Settings::default())?;

  let entries: Vec<ProjectEntry> = session
    .registry
    .names()
    .filter_map(|name| session.registry.create(name))
    .map(|project| ProjectEntry {
      name: project.name().to_string(),
      location: project.location().to_string(),
      depends: project.depends(),
    })
    .collect();

  if output.is_json() {
    return print_json(&entries);
  }

  for entry in &entries {
    println!("{}", entry.name);
    print_stat("Location", &entry.location);
    if !entry.depends.is_empty() {
      let depends: Vec<String> = entry
        .depends
        .iter()
        .map(|dep| {
          if session.ctx.external.contains(dep) {
            format!("{} (external)", dep)
          } else {
            dep.clone()
          }
        })
        .collect();
      print_stat("Depends", &depends.join(", "));
    }
  }
  Ok(())
}
