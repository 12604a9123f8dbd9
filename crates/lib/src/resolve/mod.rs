//! Target resolution: merge declarations, expand requested names, apply
//! inheritance and overrides.

pub mod expand;
pub mod merge;
pub mod table;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{ConfigSource, Target};
use crate::consts::DEFAULT_GROUP;
use crate::overrides::{OverrideDirective, OverrideError, apply_overrides};

pub use expand::{Expander, Inheritance, expand_names};
pub use table::DeclarationTable;

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("failed to find target or group '{name}'")]
  NotFound { name: String },

  #[error("group '{group}' references unknown target or group '{member}'")]
  MemberNotFound { group: String, member: String },

  #[error("group cycle detected: {chain}")]
  Cycle { chain: String },

  #[error("'{name}' is declared as both a {first} and a {second}")]
  Conflict {
    name: String,
    first: &'static str,
    second: &'static str,
  },

  #[error("target '{target}' inherits from unknown target '{parent}'")]
  InheritsNotFound { target: String, parent: String },

  #[error("inheritance cycle detected: {chain}")]
  InheritsCycle { chain: String },

  #[error(transparent)]
  Override(#[from] OverrideError),
}

/// Resolved, overridden targets ready for compilation.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
  /// Resolved targets keyed by name.
  pub targets: BTreeMap<String, Target>,
  /// Target names in first-discovery order.
  pub order: Vec<String>,
  /// Group reports. Only `default` is populated, and only when no names were
  /// requested explicitly.
  pub groups: BTreeMap<String, Vec<String>>,
}

/// Resolve `names` against the merged declarations of `sources`.
///
/// An empty `names` requests the `default` group (or target). The reported
/// `default` group holds the flattened targets of that request, or the names
/// as requested when they were given explicitly.
#[instrument(skip_all, fields(sources = sources.len(), requested = names.len()))]
pub fn read_targets(
  sources: &[ConfigSource],
  names: &[String],
  directives: &[OverrideDirective],
) -> Result<Resolution, ResolveError> {
  let table = DeclarationTable::from_sources(sources)?;

  let implicit = names.is_empty();
  let requested = if implicit {
    vec![DEFAULT_GROUP.to_string()]
  } else {
    names.to_vec()
  };

  let order = expand_names(&table, &requested)?;
  debug!(targets = ?order, "expanded requested names");

  let mut inheritance = Inheritance::new(&table);
  let mut targets = BTreeMap::new();
  for name in &order {
    targets.insert(name.clone(), inheritance.resolve(name)?);
  }

  apply_overrides(&mut targets, directives)?;

  let reported = if implicit { order.clone() } else { requested };
  let groups = BTreeMap::from([(DEFAULT_GROUP.to_string(), reported)]);

  Ok(Resolution { targets, order, groups })
}
