//! Implementation of the `bake build` command.
//!
//! Resolves and compiles the requested targets, builds them through the
//! docker engine and optionally writes per-target metadata.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::{debug, warn};

use bake_lib::execute::{DockerEngine, ExecuteConfig, execute_plan, write_metadata};
use bake_lib::{BakeError, CancelToken};

use super::{CommonArgs, load};
use crate::output::{print_error, print_info, print_stat, print_success, print_warning, symbols};

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
  #[command(flatten)]
  pub common: CommonArgs,

  /// Write build result metadata to a file
  #[arg(long, value_name = "PATH")]
  pub metadata_file: Option<PathBuf>,

  /// Maximum number of targets built in parallel
  #[arg(short = 'j', long, env = "BAKE_PARALLELISM")]
  pub parallelism: Option<usize>,

  /// buildx builder instance to use
  #[arg(long, env = "BAKE_BUILDER")]
  pub builder: Option<String>,

  /// Docker CLI binary
  #[arg(long, env = "BAKE_DOCKER", default_value = "docker")]
  pub docker: String,
}

fn round(duration: Duration) -> Duration {
  Duration::from_millis(duration.as_millis().try_into().unwrap_or(u64::MAX))
}

/// Execute the build command.
///
/// Prints one line per target, the plan digest and total elapsed time.
/// Ctrl-C cancels in-flight builds.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(run(args))
}

async fn run(args: BuildArgs) -> Result<()> {
  let started = Instant::now();
  let cancel = CancelToken::new();

  let plan = load(&args.common, &cancel).await?;
  print_info(&format!("Building {} target(s), plan {}", plan.len(), plan.hash));
  for (context, targets) in &plan.shared_snapshots {
    debug!(context = %context, targets = ?targets, "targets share a build context");
  }

  let signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling build");
      signal.cancel();
    }
  });

  let engine = Arc::new(DockerEngine::new(args.docker.clone(), args.builder.clone()));
  let config = ExecuteConfig {
    parallelism: args.parallelism.unwrap_or_else(|| ExecuteConfig::default().parallelism),
  };
  let result = execute_plan(&plan, engine, &config, &cancel)
    .await
    .map_err(BakeError::from)?;

  for name in &plan.order {
    if let Some(built) = result.built.get(name) {
      print_success(&format!("{} ({})", name, humantime::format_duration(round(built.duration))));
    }
  }
  for name in &result.skipped {
    print_warning(&format!("{} {} skipped", symbols::ARROW, name));
  }

  if let Some(path) = &args.metadata_file {
    write_metadata(path, &result.metadata())
      .with_context(|| format!("Failed to write metadata file: {}", path.display()))?;
    print_stat("Metadata", &path.display().to_string());
  }
  print_stat("Elapsed", &humantime::format_duration(round(started.elapsed())).to_string());

  match result.failed {
    Some((name, err)) => {
      print_error(&format!("{} failed", name));
      Err(BakeError::from(err).into())
    }
    None if !result.is_success() => bail!("{} target(s) did not build", result.skipped.len()),
    None => Ok(()),
  }
}
