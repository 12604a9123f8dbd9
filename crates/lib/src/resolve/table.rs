//! The merged declaration table.

use std::collections::BTreeMap;

use tracing::debug;

use super::ResolveError;
use super::merge::{merge_group, merge_target};
use crate::config::{ConfigSource, Declaration, Group, Target};

/// All declarations across every source, keyed by name.
///
/// Entries are only ever added or merged into. A name belongs to exactly one
/// kind: declaring it as both a target and a group is an error.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable {
  entries: BTreeMap<String, Declaration>,
}

impl DeclarationTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a table from sources, merging left to right in source order.
  pub fn from_sources(sources: &[ConfigSource]) -> Result<Self, ResolveError> {
    let mut table = Self::new();
    for source in sources {
      for declaration in &source.declarations {
        table.insert(declaration.clone())?;
      }
    }
    debug!(entries = table.entries.len(), "merged declarations");
    Ok(table)
  }

  /// Add a declaration, merging it into an existing one of the same name.
  pub fn insert(&mut self, declaration: Declaration) -> Result<(), ResolveError> {
    let name = declaration.name().to_string();
    match (self.entries.get_mut(&name), declaration) {
      (None, declaration) => {
        self.entries.insert(name, declaration);
      }
      (Some(Declaration::Target(existing)), Declaration::Target(incoming)) => {
        merge_target(existing, &incoming);
      }
      (Some(Declaration::Group(existing)), Declaration::Group(incoming)) => {
        merge_group(existing, &incoming);
      }
      (Some(existing), incoming) => {
        return Err(ResolveError::Conflict {
          name,
          first: existing.kind(),
          second: incoming.kind(),
        });
      }
    }
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&Declaration> {
    self.entries.get(name)
  }

  pub fn target(&self, name: &str) -> Option<&Target> {
    match self.entries.get(name) {
      Some(Declaration::Target(t)) => Some(t),
      _ => None,
    }
  }

  /// All groups, in name order.
  pub fn groups(&self) -> impl Iterator<Item = &Group> {
    self.entries.values().filter_map(|d| match d {
      Declaration::Group(g) => Some(g),
      Declaration::Target(_) => None,
    })
  }

  /// All targets, in name order.
  pub fn targets(&self) -> impl Iterator<Item = &Target> {
    self.entries.values().filter_map(|d| match d {
      Declaration::Target(t) => Some(t),
      Declaration::Group(_) => None,
    })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
