//! `docker buildx build` as a [`BuildEngine`].

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::debug;

use super::types::{BuildResult, ExecuteError, ExporterResponse};
use super::BuildEngine;
use crate::plan::{BuildOptions, ContextSource};

/// Runs each target through the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerEngine {
  /// Docker CLI binary.
  pub binary: String,
  /// buildx builder instance, `None` for the current one.
  pub builder: Option<String>,
}

impl Default for DockerEngine {
  fn default() -> Self {
    Self {
      binary: "docker".to_string(),
      builder: None,
    }
  }
}

impl DockerEngine {
  pub fn new(binary: impl Into<String>, builder: Option<String>) -> Self {
    Self {
      binary: binary.into(),
      builder,
    }
  }
}

/// Command-line arguments for building one target.
pub fn build_args(options: &BuildOptions, builder: Option<&str>, metadata_file: &Path) -> Vec<String> {
  let mut args = vec!["buildx".to_string(), "build".to_string()];
  let mut push = |flag: &str, value: String| {
    args.push(flag.to_string());
    args.push(value);
  };

  if let Some(builder) = builder {
    push("--builder", builder.to_string());
  }
  push("--file", options.dockerfile_path().display().to_string());
  for tag in &options.tags {
    push("--tag", tag.clone());
  }
  for (key, value) in &options.build_args {
    push("--build-arg", format!("{key}={value}"));
  }
  for (key, value) in &options.labels {
    push("--label", format!("{key}={value}"));
  }
  if let Some(stage) = &options.target {
    push("--target", stage.clone());
  }
  if !options.platforms.is_empty() {
    let platforms: Vec<String> = options.platforms.iter().map(ToString::to_string).collect();
    push("--platform", platforms.join(","));
  }
  for export in &options.exports {
    push("--output", export.to_string());
  }
  for cache in &options.cache_from {
    push("--cache-from", cache.to_string());
  }
  for cache in &options.cache_to {
    push("--cache-to", cache.to_string());
  }
  for secret in &options.secrets {
    push("--secret", secret.clone());
  }
  for ssh in &options.ssh {
    push("--ssh", ssh.clone());
  }
  if let Some(network) = &options.network {
    push("--network", network.clone());
  }
  push("--metadata-file", metadata_file.display().to_string());

  if options.pull {
    args.push("--pull".to_string());
  }
  if options.no_cache {
    args.push("--no-cache".to_string());
  }
  args.push(match &options.context {
    ContextSource::Local(dir) => dir.display().to_string(),
    ContextSource::Remote(url) => url.clone(),
  });
  args
}

/// Read the metadata file written by buildx.
///
/// String values are kept as they are; other JSON values are stored as their
/// JSON text. A missing file means the exporter reported nothing.
pub fn read_exporter_response(target: &str, path: &Path) -> Result<ExporterResponse, ExecuteError> {
  let data = match std::fs::read(path) {
    Ok(data) => data,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ExporterResponse::new()),
    Err(e) => return Err(ExecuteError::Io(e)),
  };
  if data.iter().all(u8::is_ascii_whitespace) {
    return Ok(ExporterResponse::new());
  }

  let value: serde_json::Value = serde_json::from_slice(&data).map_err(|e| ExecuteError::Metadata {
    target: target.to_string(),
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;
  let serde_json::Value::Object(map) = value else {
    return Err(ExecuteError::Metadata {
      target: target.to_string(),
      path: path.to_path_buf(),
      message: "expected a JSON object".to_string(),
    });
  };

  Ok(
    map
      .into_iter()
      .map(|(key, value)| match value {
        serde_json::Value::String(s) => (key, s),
        other => (key, other.to_string()),
      })
      .collect(),
  )
}

impl BuildEngine for DockerEngine {
  fn name(&self) -> &str {
    &self.binary
  }

  async fn build(&self, options: Arc<BuildOptions>) -> Result<BuildResult, ExecuteError> {
    let scratch = tempfile::tempdir()?;
    let metadata_file = scratch.path().join("metadata.json");
    let args = build_args(&options, self.builder.as_deref(), &metadata_file);

    debug!(target = %options.name, binary = %self.binary, args = ?args, "spawning engine");

    let status = Command::new(&self.binary)
      .args(&args)
      .stdin(Stdio::null())
      .kill_on_drop(true)
      .status()
      .await
      .map_err(|source| ExecuteError::Spawn {
        engine: self.binary.clone(),
        source,
      })?;

    if !status.success() {
      return Err(ExecuteError::BuildFailed {
        target: options.name.clone(),
        code: status.code(),
      });
    }

    let exporter_response = read_exporter_response(&options.name, &metadata_file)?;
    Ok(BuildResult {
      exporter_response,
      ..Default::default()
    })
  }
}
