//! Subcommands and the arguments they share.

mod build;
mod list;
mod print;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use bake_lib::overrides::Shorthands;
use bake_lib::plan::BuildPlan;
use bake_lib::source::{ConfigFile, RemoteInput, read_local_files, read_remote_files, split_positional};
use bake_lib::{BakeError, BakeOptions, CancelToken, load_plan, process_env};

pub use build::{BuildArgs, cmd_build};
pub use list::{ListArgs, cmd_list};
pub use print::cmd_print;

/// Where configuration files come from.
#[derive(Debug, Clone, Args)]
pub struct FileArgs {
  /// Build definition file (repeatable, `-` for stdin)
  #[arg(short = 'f', long = "file", env = "BAKE_FILE", value_delimiter = ',')]
  pub files: Vec<PathBuf>,
}

/// Arguments shared by every command that resolves targets.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
  #[command(flatten)]
  pub files: FileArgs,

  /// Override a target value (`pattern.field=value`, `=+` appends)
  #[arg(long = "set", value_name = "PATTERN.FIELD=VALUE")]
  pub set: Vec<String>,

  /// Push images to their registry
  #[arg(long)]
  pub push: bool,

  /// Load images into the local docker engine
  #[arg(long)]
  pub load: bool,

  /// Do not use cache when building (`--no-cache=false` turns it off)
  #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
  pub no_cache: Option<bool>,

  /// Always attempt to pull referenced images (`--pull=false` turns it off)
  #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
  pub pull: Option<bool>,

  /// [REMOTE [CONTEXT]] TARGET...
  #[arg(value_name = "TARGET")]
  pub targets: Vec<String>,
}

impl CommonArgs {
  fn shorthands(&self) -> Shorthands {
    Shorthands {
      push: self.push,
      load: self.load,
      no_cache: self.no_cache,
      pull: self.pull,
    }
  }
}

fn working_dir() -> Result<PathBuf> {
  let cwd = std::env::current_dir().context("Failed to determine working directory")?;
  Ok(dunce::canonicalize(&cwd).unwrap_or(cwd))
}

/// Read configuration files, locally or relative to a remote URL.
pub async fn read_files(files: &FileArgs, url: Option<&str>) -> Result<(Vec<ConfigFile>, Option<RemoteInput>)> {
  match url {
    Some(url) => {
      let names: Vec<String> = files.files.iter().map(|p| p.display().to_string()).collect();
      let (files, input) = read_remote_files(url, &names).await.map_err(BakeError::from)?;
      Ok((files, Some(input)))
    }
    None => {
      let files = read_local_files(&files.files, &working_dir()?).map_err(BakeError::from)?;
      Ok((files, None))
    }
  }
}

/// Read, resolve and compile the requested targets.
///
/// Conflicting shorthand flags are rejected before any file is read.
pub async fn load(args: &CommonArgs, cancel: &CancelToken) -> Result<BuildPlan> {
  args.shorthands().directives().map_err(BakeError::from)?;

  let positional = split_positional(&args.targets);
  let (files, input) = read_files(&args.files, positional.url.as_deref()).await?;
  debug!(
    files = ?files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
    "read configuration files"
  );

  let options = BakeOptions {
    targets: positional.targets,
    overrides: args.set.clone(),
    shorthands: args.shorthands(),
    cmd_context: positional.cmd_context,
    env: process_env(),
    working_dir: working_dir()?,
  };

  let plan = load_plan(&files, input.as_ref(), &options, cancel)?;
  Ok(plan)
}
