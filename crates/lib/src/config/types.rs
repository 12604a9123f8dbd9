//! Declaration types for bake configuration documents.
//!
//! Field names serialize exactly as they are written in configuration
//! documents, so a resolved target can be printed and read back unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A named build unit as declared in a configuration document.
///
/// Every field is optional: a declaration may set only the fields it cares
/// about and rely on merging, inheritance or overrides for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Target {
  /// The target's name (the key it was declared under).
  #[serde(skip)]
  pub name: String,

  /// Targets whose fields this target starts from.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub inherits: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dockerfile: Option<String>,

  #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "scalar_map")]
  pub args: BTreeMap<String, String>,

  #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "scalar_map")]
  pub labels: BTreeMap<String, String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub cache_from: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub cache_to: Vec<String>,

  /// Dockerfile stage to build.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target: Option<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub secret: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub ssh: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub platforms: Vec<String>,

  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub output: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pull: Option<bool>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub no_cache: Option<bool>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub network: Option<String>,
}

impl Target {
  /// Create an empty target with the given name.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::default()
    }
  }
}

/// A named, ordered collection of target and group references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
  #[serde(skip)]
  pub name: String,

  #[serde(default)]
  pub targets: Vec<String>,
}

impl Group {
  pub fn new(name: impl Into<String>, targets: Vec<String>) -> Self {
    Self {
      name: name.into(),
      targets,
    }
  }
}

/// A raw declaration: either a target or a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
  Target(Target),
  Group(Group),
}

impl Declaration {
  pub fn name(&self) -> &str {
    match self {
      Declaration::Target(t) => &t.name,
      Declaration::Group(g) => &g.name,
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Declaration::Target(_) => "target",
      Declaration::Group(_) => "group",
    }
  }
}

/// Accept strings, numbers and booleans as mapping values.
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Scalar {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
  }

  let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
  Ok(
    raw
      .into_iter()
      .map(|(k, v)| {
        let value = match v {
          Scalar::String(s) => s,
          Scalar::Bool(b) => b.to_string(),
          Scalar::Int(i) => i.to_string(),
          Scalar::Float(f) => f.to_string(),
        };
        (k, value)
      })
      .collect(),
  )
}
