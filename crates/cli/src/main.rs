mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prereq_lib::Action;

use cmd::{GlobalArgs, RunArgs};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "prereq")]
#[command(author, version, about = "Fetch, configure, and build the projects a source tree depends on", long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text", global = true)]
  output: OutputFormat,

  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download, configure, validate, and build projects
  Setup(RunArgs),

  /// Download and configure projects without building
  Download(RunArgs),

  /// Build projects, downloading any that are missing
  Build(RunArgs),

  /// Clean the build output of installed projects
  Clean(RunArgs),

  /// Regenerate the environment script for installed projects
  Env {
    /// Projects to include (default: all registered projects)
    projects: Vec<String>,

    /// Print the script instead of the command that loads it
    #[arg(long)]
    print: bool,
  },

  /// List registered projects
  List,

  /// Print the dependency graph in Graphviz DOT format
  Graph {
    /// Projects to include (default: all registered projects)
    projects: Vec<String>,
  },

  /// Show install state of registered projects
  Status,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Setup(args) => cmd::cmd_run(Action::Setup, &args, &cli.global, cli.output),
    Commands::Download(args) => cmd::cmd_run(Action::Download, &args, &cli.global, cli.output),
    Commands::Build(args) => cmd::cmd_run(Action::Build, &args, &cli.global, cli.output),
    Commands::Clean(args) => cmd::cmd_run(Action::Clean, &args, &cli.global, cli.output),
    Commands::Env { projects, print } => cmd::cmd_env(&projects, print, &cli.global, cli.output),
    Commands::List => cmd::cmd_list(&cli.global, cli.output),
    Commands::Graph { projects } => cmd::cmd_graph(&projects, &cli.global),
    Commands::Status => cmd::cmd_status(&cli.global, cli.output),
  }
}
