//! Types for plan execution.
//!
//! This module defines the error types, result types, and configuration
//! for driving a build engine over a [`BuildPlan`](crate::plan::BuildPlan).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::error::ErrorKind;

/// Exporter metadata returned by the engine for one target.
pub type ExporterResponse = BTreeMap<String, String>;

/// Errors that can occur during plan execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Execution was cancelled before or while building.
  #[error("build cancelled")]
  Cancelled,

  /// The engine binary could not be started.
  #[error("failed to run '{engine}': {source}")]
  Spawn {
    engine: String,
    #[source]
    source: std::io::Error,
  },

  /// The engine reported a failed build.
  #[error("target '{target}' failed with exit code {code:?}")]
  BuildFailed { target: String, code: Option<i32> },

  /// The engine's metadata file could not be read back.
  #[error("invalid metadata for target '{target}' at {path}: {message}")]
  Metadata {
    target: String,
    path: PathBuf,
    message: String,
  },

  /// A build task ended without reporting a result.
  #[error("build task for '{target}' failed: {message}")]
  Task { target: String, message: String },

  /// I/O error during execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ExecuteError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Cancelled => ErrorKind::Cancelled,
      _ => ErrorKind::Build,
    }
  }
}

/// Result of building a single target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
  /// Exporter metadata reported by the engine.
  pub exporter_response: ExporterResponse,

  /// Wall-clock time spent in the engine.
  pub duration: Duration,
}

/// Result of executing a whole plan.
#[derive(Debug, Default)]
pub struct PlanResult {
  /// Targets that built successfully.
  pub built: BTreeMap<String, BuildResult>,

  /// Target that failed (at most one, stops execution).
  pub failed: Option<(String, ExecuteError)>,

  /// Targets that were aborted or never started after the failure.
  pub skipped: Vec<String>,
}

impl PlanResult {
  /// Returns true if every target built.
  pub fn is_success(&self) -> bool {
    self.failed.is_none() && self.skipped.is_empty()
  }

  /// Returns the total number of targets processed.
  pub fn total(&self) -> usize {
    self.built.len() + self.failed.iter().count() + self.skipped.len()
  }

  /// Per-target exporter metadata, keyed by target name.
  pub fn metadata(&self) -> BTreeMap<String, ExporterResponse> {
    self
      .built
      .iter()
      .map(|(name, result)| (name.clone(), result.exporter_response.clone()))
      .collect()
  }
}

/// Configuration for plan execution.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Maximum number of targets to build in parallel.
  pub parallelism: usize,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallelism: num_cpus(),
    }
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
