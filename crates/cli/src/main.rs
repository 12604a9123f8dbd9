mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bake_lib::BakeError;

use crate::output::print_error;

/// bake - build container images from declarative bake files
#[derive(Parser)]
#[command(name = "bake")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build targets from bake files
  Build(cmd::BuildArgs),

  /// Print the resolved build definition without building
  Print(cmd::CommonArgs),

  /// List declared groups and targets
  List(cmd::ListArgs),
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Build(args) => cmd::cmd_build(args),
    Commands::Print(args) => cmd::cmd_print(args),
    Commands::List(args) => cmd::cmd_list(args),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      match e.downcast_ref::<BakeError>() {
        Some(bake) => print_error(&format!("{}: {:#}", bake.kind(), e)),
        None => print_error(&format!("{:#}", e)),
      }
      ExitCode::FAILURE
    }
  }
}
