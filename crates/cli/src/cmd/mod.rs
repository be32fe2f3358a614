mod env;
mod graph;
mod list;
mod run;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use prereq_lib::RunContext;
use prereq_lib::config::Settings;
use prereq_lib::consts::PREFIX_ENV;
use prereq_lib::project::Registry;
use prereq_lib::project::declared::load_project_file;
use prereq_lib::script::Shell;

pub use env::cmd_env;
pub use graph::cmd_graph;
pub use list::cmd_list;
pub use run::{RunArgs, cmd_run};
pub use status::cmd_status;

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
  /// Install prefix (default: current directory)
  #[arg(short, long, env = PREFIX_ENV, global = true)]
  pub prefix: Option<String>,

  /// Settings file (default: <config dir>/prereq/config.json)
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  /// JSON file declaring additional projects
  #[arg(long = "projects", global = true)]
  pub projects_file: Option<String>,

  /// Dependencies provided outside of prereq (comma separated)
  #[arg(long, value_delimiter = ',', global = true)]
  pub external: Vec<String>,

  /// Shell the environment script is written for (default: detected)
  #[arg(long, global = true)]
  pub shell: Option<Shell>,
}

impl GlobalArgs {
  fn to_settings(&self) -> Settings {
    Settings {
      prefix: self.prefix.clone(),
      projects_file: self.projects_file.clone(),
      external: self.external.clone(),
      shell: self.shell,
      ..Default::default()
    }
  }
}

/// Everything a command needs: merged settings, the run context, and the
/// project registry.
pub struct Session {
  pub ctx: RunContext,
  pub registry: Registry,
  pub shell: Shell,
}

impl Session {
  /// Load settings, apply `global` and `overrides` on top, and register
  /// declared projects.
  pub fn load(global: &GlobalArgs, overrides: Settings) -> Result<Self> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let file = match &global.config {
      Some(path) => Settings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))?,
      None => Settings::load_default().context("Failed to load settings")?,
    };
    let settings = file.merge(global.to_settings()).merge(overrides);
    let ctx = settings.run_context(&cwd).context("Invalid settings")?;

    let mut registry = Registry::builtin();
    if let Some(path) = settings.projects_file(&cwd) {
      let decls =
        load_project_file(&path).with_context(|| format!("Failed to load projects from {}", path.display()))?;
      for decl in decls {
        registry
          .register_declared(decl)
          .with_context(|| format!("Invalid project file {}", path.display()))?;
      }
    }

    debug!(prefix = %ctx.prefix.display(), projects = registry.len(), "session ready");
    Ok(Self {
      ctx,
      registry,
      shell: settings.shell(),
    })
  }
}
