//! Field merge rules shared by cross-source merging and inheritance.
//!
//! - Scalars: a later value overwrites an earlier one only when it is set.
//! - Lists: concatenated, keeping the first occurrence of each value.
//! - Mappings: merged key by key, later values winning.

use std::collections::BTreeMap;

use crate::config::{Group, Target};

/// Append values that are not already present, preserving order.
pub fn extend_unique(list: &mut Vec<String>, values: &[String]) {
  for value in values {
    if !list.contains(value) {
      list.push(value.clone());
    }
  }
}

fn merge_scalar<T: Clone>(into: &mut Option<T>, from: &Option<T>) {
  if from.is_some() {
    into.clone_from(from);
  }
}

fn merge_map(into: &mut BTreeMap<String, String>, from: &BTreeMap<String, String>) {
  for (key, value) in from {
    into.insert(key.clone(), value.clone());
  }
}

/// Merge `from` on top of `into`. The name of `into` is kept.
pub fn merge_target(into: &mut Target, from: &Target) {
  extend_unique(&mut into.inherits, &from.inherits);
  merge_scalar(&mut into.context, &from.context);
  merge_scalar(&mut into.dockerfile, &from.dockerfile);
  merge_map(&mut into.args, &from.args);
  merge_map(&mut into.labels, &from.labels);
  extend_unique(&mut into.tags, &from.tags);
  extend_unique(&mut into.cache_from, &from.cache_from);
  extend_unique(&mut into.cache_to, &from.cache_to);
  merge_scalar(&mut into.target, &from.target);
  extend_unique(&mut into.secret, &from.secret);
  extend_unique(&mut into.ssh, &from.ssh);
  extend_unique(&mut into.platforms, &from.platforms);
  extend_unique(&mut into.output, &from.output);
  merge_scalar(&mut into.pull, &from.pull);
  merge_scalar(&mut into.no_cache, &from.no_cache);
  merge_scalar(&mut into.network, &from.network);
}

/// Merge group members, keeping first-seen order.
pub fn merge_group(into: &mut Group, from: &Group) {
  extend_unique(&mut into.targets, &from.targets);
}
