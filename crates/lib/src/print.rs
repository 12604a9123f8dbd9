//! The dry-run document.
//!
//! Printed as `{"group": {"default": [...]}, "target": {...}}` where every
//! target carries its fully resolved fields under the same names used in
//! configuration documents. The document can be fed back in as a
//! configuration file; group member lists are accepted there as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Target;
use crate::plan::BuildPlan;
use crate::util::hash::Hashable;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintDocument {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub group: BTreeMap<String, Vec<String>>,
  #[serde(default)]
  pub target: BTreeMap<String, Target>,
}

impl Hashable for PrintDocument {}

impl PrintDocument {
  pub fn new(groups: &BTreeMap<String, Vec<String>>, targets: &BTreeMap<String, Target>) -> Self {
    Self {
      group: groups.clone(),
      target: targets.clone(),
    }
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}

impl From<&BuildPlan> for PrintDocument {
  fn from(plan: &BuildPlan) -> Self {
    Self::new(&plan.groups, &plan.resolved)
  }
}
