//! Group expansion and target inheritance.

use std::collections::{BTreeMap, HashSet};

use tracing::trace;

use super::ResolveError;
use super::merge::merge_target;
use super::table::DeclarationTable;
use crate::config::{Declaration, Target};

fn chain(stack: &[String], name: &str) -> String {
  let start = stack.iter().position(|n| n == name).unwrap_or(0);
  let mut parts: Vec<&str> = stack[start..].iter().map(String::as_str).collect();
  parts.push(name);
  parts.join(" -> ")
}

/// Expands requested names into target names.
///
/// Groups are flattened depth first; the result keeps first-discovery order
/// and lists each target once.
#[derive(Debug)]
pub struct Expander<'a> {
  table: &'a DeclarationTable,
  stack: Vec<String>,
  done: HashSet<String>,
  seen: HashSet<String>,
  order: Vec<String>,
}

impl<'a> Expander<'a> {
  pub fn new(table: &'a DeclarationTable) -> Self {
    Self {
      table,
      stack: Vec::new(),
      done: HashSet::new(),
      seen: HashSet::new(),
      order: Vec::new(),
    }
  }

  pub fn expand(&mut self, name: &str) -> Result<(), ResolveError> {
    match self.table.get(name) {
      None => match self.stack.last() {
        Some(group) => Err(ResolveError::MemberNotFound {
          group: group.clone(),
          member: name.to_string(),
        }),
        None => Err(ResolveError::NotFound { name: name.to_string() }),
      },
      Some(Declaration::Target(_)) => {
        if self.seen.insert(name.to_string()) {
          trace!(target = %name, "discovered target");
          self.order.push(name.to_string());
        }
        Ok(())
      }
      Some(Declaration::Group(group)) => {
        if self.stack.iter().any(|n| n == name) {
          return Err(ResolveError::Cycle {
            chain: chain(&self.stack, name),
          });
        }
        // A group already flattened contributed all its targets.
        if self.done.contains(name) {
          return Ok(());
        }
        self.stack.push(name.to_string());
        for member in &group.targets {
          self.expand(member)?;
        }
        self.stack.pop();
        self.done.insert(name.to_string());
        Ok(())
      }
    }
  }

  pub fn finish(self) -> Vec<String> {
    self.order
  }
}

/// Expand a list of names, see [`Expander`].
pub fn expand_names(table: &DeclarationTable, names: &[String]) -> Result<Vec<String>, ResolveError> {
  let mut expander = Expander::new(table);
  for name in names {
    expander.expand(name)?;
  }
  Ok(expander.finish())
}

/// Resolves `inherits` for targets, memoizing fully resolved parents.
#[derive(Debug)]
pub struct Inheritance<'a> {
  table: &'a DeclarationTable,
  resolved: BTreeMap<String, Target>,
  stack: Vec<String>,
}

impl<'a> Inheritance<'a> {
  pub fn new(table: &'a DeclarationTable) -> Self {
    Self {
      table,
      resolved: BTreeMap::new(),
      stack: Vec::new(),
    }
  }

  /// Resolve one target: parents left to right, then its own fields on top.
  pub fn resolve(&mut self, name: &str) -> Result<Target, ResolveError> {
    if let Some(target) = self.resolved.get(name) {
      return Ok(target.clone());
    }
    let table = self.table;
    let Some(own) = table.target(name) else {
      return Err(ResolveError::NotFound { name: name.to_string() });
    };
    if own.inherits.is_empty() {
      self.resolved.insert(name.to_string(), own.clone());
      return Ok(own.clone());
    }
    if self.stack.iter().any(|n| n == name) {
      return Err(ResolveError::InheritsCycle {
        chain: chain(&self.stack, name),
      });
    }

    self.stack.push(name.to_string());
    let mut target = Target::named(name);
    for parent in &own.inherits {
      if table.target(parent).is_none() {
        return Err(ResolveError::InheritsNotFound {
          target: name.to_string(),
          parent: parent.clone(),
        });
      }
      let base = self.resolve(parent)?;
      merge_target(&mut target, &base);
    }
    merge_target(&mut target, own);
    self.stack.pop();

    target.name = name.to_string();
    target.inherits.clear();
    trace!(target = %name, parents = own.inherits.len(), "resolved inheritance");
    self.resolved.insert(name.to_string(), target.clone());
    Ok(target)
  }
}
