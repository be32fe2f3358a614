//! Implementation of `prereq setup`, `download`, `build`, and `clean`.

use anyhow::{Context, Result};
use clap::Args;

use prereq_lib::config::Settings;
use prereq_lib::context::{Revision, Transport};
use prereq_lib::orchestrate::{RunReport, StepOutcome};
use prereq_lib::script::Shell;
use prereq_lib::vcs::GitCheckout;
use prereq_lib::workspace::MpcWorkspace;
use prereq_lib::{Action, EnvironmentState, Orchestrator, Services};

use super::{GlobalArgs, Session};
use crate::output::{OutputFormat, format_duration, print_error, print_info, print_json, print_success};

#[derive(Args, Debug)]
pub struct RunArgs {
  /// Projects to process; their dependencies are included
  #[arg(required = true)]
  pub projects: Vec<String>,

  /// Clone over SSH instead of HTTPS
  #[arg(long, overrides_with = "https")]
  pub ssh: bool,

  /// Clone over HTTPS (the default)
  #[arg(long, overrides_with = "ssh")]
  pub https: bool,

  /// Check out the default branch instead of release tags
  #[arg(long, overrides_with = "tagged")]
  pub trunk: bool,

  /// Check out release tags (the default)
  #[arg(long, overrides_with = "trunk")]
  pub tagged: bool,

  /// MPC project type (e.g. gnuace, vs2019)
  #[arg(long = "type")]
  pub build_type: Option<String>,

  /// Build configuration (e.g. Release, Debug)
  #[arg(long)]
  pub configuration: Option<String>,

  /// Parallel build jobs
  #[arg(short = 'j', long)]
  pub threads: Option<usize>,

  /// Fetch from the affiliate mirror
  #[arg(long, overrides_with = "no_affiliate")]
  pub affiliate: bool,

  /// Fetch from the public hosts even if the settings file asks for the mirror
  #[arg(long, overrides_with = "affiliate")]
  pub no_affiliate: bool,

  /// Build with versioned namespaces
  #[arg(long, overrides_with = "no_versioned_namespace")]
  pub versioned_namespace: bool,

  /// Build without versioned namespaces
  #[arg(long, overrides_with = "versioned_namespace")]
  pub no_versioned_namespace: bool,

  /// Re-fetch sources that are already installed
  #[arg(short, long, overrides_with = "no_force")]
  pub force: bool,

  /// Keep installed sources even if the settings file sets force
  #[arg(long, overrides_with = "force")]
  pub no_force: bool,
}

/// `--flag` gives `Some(true)`, `--no-flag` gives `Some(false)`, neither
/// leaves the setting to the settings file.
fn toggle(on: bool, off: bool) -> Option<bool> {
  match (on, off) {
    (true, _) => Some(true),
    (_, true) => Some(false),
    _ => None,
  }
}

impl RunArgs {
  /// Flags that were given, as settings overrides.
  fn to_settings(&self) -> Settings {
    Settings {
      transport: toggle(self.ssh, self.https).map(|ssh| if ssh { Transport::Ssh } else { Transport::Https }),
      revision: toggle(self.trunk, self.tagged).map(|trunk| if trunk { Revision::Trunk } else { Revision::Tagged }),
      build_type: self.build_type.clone(),
      config: self.configuration.clone(),
      threads: self.threads,
      affiliate: toggle(self.affiliate, self.no_affiliate),
      versioned_namespace: toggle(self.versioned_namespace, self.no_versioned_namespace),
      force: toggle(self.force, self.no_force),
      ..Default::default()
    }
  }
}

pub fn cmd_run(action: Action, args: &RunArgs, global: &GlobalArgs, output: OutputFormat) -> Result<()> {
  let session = Session::load(global, args.to_settings())?;
  let checkout = GitCheckout;
  let workspace = MpcWorkspace::default();
  let services = Services {
    checkout: &checkout,
    workspace: &workspace,
  };
  let orchestrator = Orchestrator::new(&session.registry, &session.ctx, services, session.shell);
  let mut env = EnvironmentState::from_process();

  let report = match orchestrator.run(action, &args.projects, &mut env) {
    Ok(report) => report,
    Err(err) => {
      if let Some(project) = err.project() {
        print_error(&format!("{} stopped at {}", action, project));
      }
      return Err(err).with_context(|| format!("{} failed", action));
    }
  };

  if output.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report, session.shell);
  }
  Ok(())
}

fn print_report(report: &RunReport, shell: Shell) {
  for project in &report.projects {
    let step = match project.outcome {
      StepOutcome::Configured => "configured",
      StepOutcome::Built => "built",
      StepOutcome::Cleaned => "cleaned",
      StepOutcome::NotInstalled => "not installed",
    };
    let fetched = if project.fetched { "fetched, " } else { "" };
    print_success(&format!(
      "{} {}{} ({})",
      project.name,
      fetched,
      step,
      format_duration(project.elapsed)
    ));
  }

  print_info(&format!("Environment script: {}", report.script.display()));
  println!("  {}", shell.source_command(&report.script));
  println!();
  print_success(&format!(
    "{} complete in {}",
    report.action,
    format_duration(report.elapsed)
  ));
}
