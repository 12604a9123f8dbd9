//! Plan compilation: resolved targets to engine-ready build options.
//!
//! Compilation is all-or-nothing. Every target is expanded and validated
//! before a [`BuildPlan`] exists, so an invalid target never reaches the
//! engine alongside valid ones.

pub mod context;
pub mod options;
pub mod vars;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::Target;
use crate::platform::{Platform, PlatformError};
use crate::print::PrintDocument;
use crate::resolve::Resolution;
use crate::source::RemoteInput;
use crate::util::hash::{Hashable, ObjectHash};

pub use context::{ContextRef, SharingError};
pub use options::{BuildOptions, CacheEntry, ContextSource, EntryError, ExportEntry, ExportKind};
pub use vars::{VarError, Variables};

use context::{resolve_context, resolve_dockerfile, share_contexts};

#[derive(Debug, Error)]
pub enum CompileError {
  #[error("target '{target}': field '{field}': {source}")]
  Variable {
    target: String,
    field: &'static str,
    #[source]
    source: VarError,
  },

  #[error("target '{target}': {source}")]
  InvalidPlatform {
    target: String,
    #[source]
    source: PlatformError,
  },

  #[error("target '{target}': invalid output '{entry}': {source}")]
  InvalidOutput {
    target: String,
    entry: String,
    #[source]
    source: EntryError,
  },

  #[error("target '{target}': invalid cache entry '{entry}': {source}")]
  InvalidCache {
    target: String,
    entry: String,
    #[source]
    source: EntryError,
  },

  #[error("target '{target}': only one output is supported, got {count}")]
  MultipleOutputs { target: String, count: usize },

  #[error("target '{target}': docker output does not support multiple platforms")]
  DockerMultiPlatform { target: String },

  #[error("target '{target}': dockerfile '{dockerfile}' is outside the build context")]
  DockerfileEscapesContext { target: String, dockerfile: String },

  #[error("target '{target}': context references unknown target '{reference}'")]
  ContextTargetNotFound { target: String, reference: String },

  #[error("context cycle detected: {chain}")]
  ContextCycle { chain: String },

  #[error("failed to compute plan digest: {0}")]
  Digest(#[from] serde_json::Error),
}

/// Compiled build options for every resolved target.
///
/// Immutable once compiled: options are handed to the engine behind [`Arc`]
/// and never mutated.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  /// Compiled options keyed by target name.
  pub targets: BTreeMap<String, Arc<BuildOptions>>,
  /// Target names in resolution order.
  pub order: Vec<String>,
  /// Group reports for the dry-run document.
  pub groups: BTreeMap<String, Vec<String>>,
  /// Resolved target fields as printed by the dry-run document.
  pub resolved: BTreeMap<String, Target>,
  /// Local contexts used by more than one target, with their targets.
  pub shared_snapshots: BTreeMap<String, Vec<String>>,
  /// Digest of the dry-run document.
  pub hash: ObjectHash,
}

impl BuildPlan {
  pub fn get(&self, name: &str) -> Option<&Arc<BuildOptions>> {
    self.targets.get(name)
  }

  /// Compiled options in resolution order.
  pub fn iter(&self) -> impl Iterator<Item = &Arc<BuildOptions>> {
    self.order.iter().filter_map(|name| self.targets.get(name))
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  pub fn document(&self) -> PrintDocument {
    PrintDocument::from(self)
  }
}

fn expand_field(
  vars: &Variables,
  target: &str,
  field: &'static str,
  value: &mut String,
) -> Result<(), CompileError> {
  *value = vars.expand(value).map_err(|source| CompileError::Variable {
    target: target.to_string(),
    field,
    source,
  })?;
  Ok(())
}

/// Expand `${NAME}` references in every string field of a target.
pub fn expand_target(target: &Target, vars: &Variables) -> Result<Target, CompileError> {
  let mut out = target.clone();
  let name = target.name.as_str();

  for (field, value) in [
    ("context", out.context.as_mut()),
    ("dockerfile", out.dockerfile.as_mut()),
    ("target", out.target.as_mut()),
    ("network", out.network.as_mut()),
  ] {
    if let Some(value) = value {
      expand_field(vars, name, field, value)?;
    }
  }
  for (field, values) in [
    ("args", out.args.values_mut().collect::<Vec<_>>()),
    ("labels", out.labels.values_mut().collect::<Vec<_>>()),
  ] {
    for value in values {
      expand_field(vars, name, field, value)?;
    }
  }
  for (field, list) in [
    ("tags", &mut out.tags),
    ("cache-from", &mut out.cache_from),
    ("cache-to", &mut out.cache_to),
    ("secret", &mut out.secret),
    ("ssh", &mut out.ssh),
    ("platforms", &mut out.platforms),
    ("output", &mut out.output),
  ] {
    for value in list.iter_mut() {
      expand_field(vars, name, field, value)?;
    }
  }
  Ok(out)
}

fn compile_target(
  target: &Target,
  context: ContextSource,
  shared_context: Option<String>,
  working_dir: &Path,
) -> Result<BuildOptions, CompileError> {
  let name = target.name.clone();

  let dockerfile = resolve_dockerfile(target.dockerfile.as_deref(), working_dir).ok_or_else(|| {
    CompileError::DockerfileEscapesContext {
      target: name.clone(),
      dockerfile: target.dockerfile.clone().unwrap_or_default(),
    }
  })?;

  let platforms = target
    .platforms
    .iter()
    .map(|p| Platform::parse(p))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|source| CompileError::InvalidPlatform {
      target: name.clone(),
      source,
    })?;

  let mut exports = Vec::with_capacity(target.output.len());
  for entry in &target.output {
    exports.push(ExportEntry::parse(entry).map_err(|source| CompileError::InvalidOutput {
      target: name.clone(),
      entry: entry.clone(),
      source,
    })?);
  }
  if exports.len() > 1 {
    return Err(CompileError::MultipleOutputs {
      target: name,
      count: exports.len(),
    });
  }
  if platforms.len() > 1 && exports.iter().any(|e| e.kind == ExportKind::Docker) {
    return Err(CompileError::DockerMultiPlatform { target: name });
  }

  let parse_cache = |entries: &[String]| -> Result<Vec<CacheEntry>, CompileError> {
    entries
      .iter()
      .map(|entry| {
        CacheEntry::parse(entry).map_err(|source| CompileError::InvalidCache {
          target: name.clone(),
          entry: entry.clone(),
          source,
        })
      })
      .collect()
  };
  let cache_from = parse_cache(&target.cache_from)?;
  let cache_to = parse_cache(&target.cache_to)?;

  Ok(BuildOptions {
    name: name.clone(),
    context,
    shared_context,
    dockerfile,
    build_args: target.args.clone(),
    labels: target.labels.clone(),
    tags: target.tags.clone(),
    target: target.target.clone(),
    platforms,
    exports,
    cache_from,
    cache_to,
    secrets: target.secret.clone(),
    ssh: target.ssh.clone(),
    pull: target.pull.unwrap_or(false),
    no_cache: target.no_cache.unwrap_or(false),
    network: target.network.clone(),
  })
}

/// Compile a resolution into a [`BuildPlan`].
///
/// `working_dir` anchors relative local contexts and `cwd://` paths. With a
/// remote `input`, unset and relative contexts point into the remote source.
#[instrument(skip_all, fields(targets = resolution.order.len()))]
pub fn compile_plan(
  resolution: Resolution,
  input: Option<&RemoteInput>,
  vars: &Variables,
  working_dir: &Path,
) -> Result<BuildPlan, CompileError> {
  let Resolution { targets, order, groups } = resolution;

  let mut expanded = BTreeMap::new();
  for (name, target) in &targets {
    expanded.insert(name.clone(), expand_target(target, vars)?);
  }

  let mut contexts: BTreeMap<String, ContextSource> = BTreeMap::new();
  let mut refs: BTreeMap<String, String> = BTreeMap::new();
  for (name, target) in &expanded {
    match resolve_context(target.context.as_deref(), input, working_dir) {
      ContextRef::Source(source) => {
        contexts.insert(name.clone(), source);
      }
      ContextRef::Target(reference) => {
        refs.insert(name.clone(), reference);
      }
    }
  }

  let roots = share_contexts(&order, &refs).map_err(|e| match e {
    SharingError::UnknownTarget { target, reference } => CompileError::ContextTargetNotFound { target, reference },
    SharingError::Cycle { chain } => CompileError::ContextCycle { chain },
  })?;

  let mut compiled = BTreeMap::new();
  for (name, target) in &expanded {
    let (context, shared) = match roots.get(name) {
      Some(root) => (contexts.get(root).cloned(), Some(root.clone())),
      None => (contexts.get(name).cloned(), None),
    };
    // Every root has a classified context once sharing has resolved.
    let context = context.ok_or_else(|| CompileError::ContextTargetNotFound {
      target: name.clone(),
      reference: shared.clone().unwrap_or_default(),
    })?;
    let options = compile_target(target, context, shared, working_dir)?;
    debug!(target = %name, context = %options.context, "compiled target");
    compiled.insert(name.clone(), Arc::new(options));
  }

  let mut snapshots: BTreeMap<String, Vec<String>> = BTreeMap::new();
  for name in &order {
    if let Some(options) = compiled.get(name)
      && let Some(dir) = options.local_context()
    {
      snapshots.entry(dir.display().to_string()).or_default().push(name.clone());
    }
  }
  snapshots.retain(|_, names| names.len() > 1);

  let mut resolved = expanded;
  if input.is_some() {
    for (name, target) in resolved.iter_mut() {
      if let Some(ContextSource::Remote(url)) = contexts.get(name) {
        target.context = Some(url.clone());
      }
    }
  }

  let hash = PrintDocument::new(&groups, &resolved).compute_hash()?;
  info!(targets = compiled.len(), hash = %hash, "compiled build plan");

  Ok(BuildPlan {
    targets: compiled,
    order,
    groups,
    resolved,
    shared_snapshots: snapshots,
    hash,
  })
}
