//! Plan execution.
//!
//! This module drives a [`BuildEngine`] over a compiled plan:
//! - Parallel builds bounded by a semaphore
//! - Fail fast: the first failed target aborts the rest
//! - Cancellation aborts in-flight builds
//! - Projection of engine results into per-target metadata

pub mod docker;
pub mod metadata;
pub mod types;

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::plan::{BuildOptions, BuildPlan};

pub use docker::DockerEngine;
pub use metadata::write_metadata;
pub use types::{BuildResult, ExecuteConfig, ExecuteError, ExporterResponse, PlanResult};

/// Builds one compiled target.
///
/// Implementations must be safe to call concurrently for different targets.
pub trait BuildEngine: Send + Sync + 'static {
  /// Short name used in logs.
  fn name(&self) -> &str;

  fn build(&self, options: Arc<BuildOptions>) -> impl Future<Output = Result<BuildResult, ExecuteError>> + Send;
}

/// Execute every target in a plan.
///
/// Returns `Err(ExecuteError::Cancelled)` without starting anything when
/// `cancel` is already set, and after aborting in-flight builds when it is
/// set during execution. Build failures are reported in the [`PlanResult`].
pub async fn execute_plan<E: BuildEngine>(
  plan: &BuildPlan,
  engine: Arc<E>,
  config: &ExecuteConfig,
  cancel: &CancelToken,
) -> Result<PlanResult, ExecuteError> {
  if cancel.is_cancelled() {
    return Err(ExecuteError::Cancelled);
  }

  info!(
    targets = plan.len(),
    engine = engine.name(),
    parallelism = config.parallelism,
    "starting plan execution"
  );

  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut join_set = JoinSet::new();
  let mut names = HashMap::new();
  let mut pending: BTreeSet<String> = BTreeSet::new();

  for options in plan.iter() {
    let options = Arc::clone(options);
    let engine = Arc::clone(&engine);
    let semaphore = Arc::clone(&semaphore);
    let name = options.name.clone();

    let handle = join_set.spawn(async move {
      // Acquire semaphore permit inside the task
      let Ok(_permit) = semaphore.acquire().await else {
        return Err(ExecuteError::Task {
          target: options.name.clone(),
          message: "semaphore closed".to_string(),
        });
      };

      debug!(target = %options.name, "building target");
      let started = Instant::now();
      let mut result = engine.build(options).await?;
      result.duration = started.elapsed();
      Ok(result)
    });
    names.insert(handle.id(), name.clone());
    pending.insert(name);
  }

  let mut result = PlanResult::default();

  loop {
    let next = tokio::select! {
      _ = cancel.cancelled() => {
        join_set.abort_all();
        warn!(in_flight = pending.len(), "execution cancelled");
        return Err(ExecuteError::Cancelled);
      }
      next = join_set.join_next_with_id() => next,
    };

    let Some(joined) = next else { break };
    match joined {
      Ok((id, Ok(build))) => {
        let Some(name) = names.remove(&id) else { continue };
        info!(target = %name, elapsed = ?build.duration, "target built");
        pending.remove(&name);
        result.built.insert(name, build);
      }
      Ok((id, Err(e))) => {
        let Some(name) = names.remove(&id) else { continue };
        error!(target = %name, error = %e, "target failed");
        if result.failed.is_none() {
          pending.remove(&name);
          result.failed = Some((name, e));
          join_set.abort_all();
        }
      }
      Err(e) if e.is_cancelled() => {
        debug!(task = %e.id(), "build task aborted");
      }
      Err(e) => {
        let name = names.remove(&e.id()).unwrap_or_default();
        error!(target = %name, error = %e, "build task panicked");
        if result.failed.is_none() {
          pending.remove(&name);
          let message = e.to_string();
          result.failed = Some((name.clone(), ExecuteError::Task { target: name, message }));
          join_set.abort_all();
        }
      }
    }
  }

  result.skipped = plan
    .order
    .iter()
    .filter(|name| pending.contains(*name))
    .cloned()
    .collect();

  info!(
    built = result.built.len(),
    failed = result.failed.is_some(),
    skipped = result.skipped.len(),
    "plan execution complete"
  );

  Ok(result)
}
