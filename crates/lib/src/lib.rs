//! bake-lib: target resolution and build planning for bake files
//!
//! This crate turns bake configuration documents into a build plan:
//! - `source`: reading configuration documents from disk or a remote URL
//! - `config`: parsing documents into target and group declarations
//! - `overrides`: `pattern.field=value` directives and their application
//! - `resolve`: merging declarations and expanding groups into targets
//! - `plan`: compiling resolved targets into engine-ready build options
//! - `execute`: driving a build engine over a plan and projecting results

pub mod cancel;
pub mod config;
pub mod consts;
pub mod error;
pub mod execute;
pub mod overrides;
pub mod plan;
pub mod platform;
pub mod print;
pub mod resolve;
pub mod source;
pub mod util;

pub use cancel::CancelToken;
pub use error::{BakeError, ErrorKind};

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::parse_file;
use crate::overrides::{Shorthands, parse_overrides};
use crate::plan::{BuildPlan, Variables, compile_plan};
use crate::resolve::read_targets;
use crate::source::{ConfigFile, RemoteInput};

/// Everything needed to turn configuration documents into a plan.
#[derive(Debug, Clone, Default)]
pub struct BakeOptions {
  /// Requested target or group names. Empty means `default`.
  pub targets: Vec<String>,
  /// Raw `pattern.field=value` override strings, in the order given.
  pub overrides: Vec<String>,
  /// Flag-derived overrides (`--push`, `--load`, `--no-cache`, `--pull`).
  pub shorthands: Shorthands,
  /// Value of the `BAKE_CMD_CONTEXT` built-in.
  pub cmd_context: String,
  /// Environment snapshot available to `${NAME}` expansion.
  pub env: BTreeMap<String, String>,
  /// Directory that relative local contexts are resolved against.
  pub working_dir: PathBuf,
}

/// Snapshot the process environment for `${NAME}` expansion.
///
/// Variables that are not valid UTF-8 are skipped.
pub fn process_env() -> BTreeMap<String, String> {
  std::env::vars_os()
    .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
    .collect()
}

/// Resolve, override and compile configuration documents into a [`BuildPlan`].
///
/// Stages run strictly in order and any failure aborts the whole pipeline:
/// 1. Cancellation and mutually exclusive shorthands are checked
/// 2. Override strings are parsed (no target is touched on failure)
/// 3. Documents are parsed and merged in source order
/// 4. Requested names are expanded into targets, inheritance is applied
/// 5. Overrides are applied in input order
/// 6. Targets are compiled into build options
pub fn load_plan(
  files: &[ConfigFile],
  input: Option<&RemoteInput>,
  options: &BakeOptions,
  cancel: &CancelToken,
) -> Result<BuildPlan, BakeError> {
  if cancel.is_cancelled() {
    return Err(BakeError::Cancelled);
  }

  let shorthand = options.shorthands.directives()?;
  let mut directives = parse_overrides(&options.overrides)?;
  directives.extend(shorthand);
  debug!(count = directives.len(), "parsed override directives");

  let mut sources = Vec::with_capacity(files.len());
  for file in files {
    sources.push(parse_file(file)?);
  }

  let resolution = read_targets(&sources, &options.targets, &directives)?;
  info!(targets = resolution.order.len(), "resolved targets");

  if cancel.is_cancelled() {
    return Err(BakeError::Cancelled);
  }

  let vars = Variables::new(&options.cmd_context, &platform::default_platform_string(), &options.env);
  let plan = compile_plan(resolution, input, &vars, &options.working_dir)?;

  Ok(plan)
}
