//! Configuration document parsing.
//!
//! A document has two top-level maps, `group` and `target`. JSON and YAML are
//! supported; the format is picked from the file extension, and documents with
//! any other name are tried as JSON first, then YAML.

mod types;

pub use types::{Declaration, Group, Target};

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::source::ConfigFile;

/// Errors that can occur while parsing a configuration document.
#[derive(Debug, Error)]
pub enum ParseError {
  #[error("failed to parse {name} as JSON: {source}")]
  Json {
    name: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to parse {name} as YAML: {source}")]
  Yaml {
    name: String,
    #[source]
    source: serde_yaml::Error,
  },
}

/// The declarations read from one configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
  pub name: String,
  pub declarations: Vec<Declaration>,
}

#[derive(Debug, Default, Deserialize)]
struct Document {
  #[serde(default)]
  group: BTreeMap<String, GroupEntry>,
  #[serde(default)]
  target: BTreeMap<String, Target>,
}

/// A group is either `{ "targets": [..] }` or, as printed, a bare member list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupEntry {
  Members(Vec<String>),
  Declared(Group),
}

impl From<GroupEntry> for Group {
  fn from(entry: GroupEntry) -> Self {
    match entry {
      GroupEntry::Members(targets) => Group {
        targets,
        ..Default::default()
      },
      GroupEntry::Declared(group) => group,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
  Json,
  Yaml,
  Unknown,
}

impl Format {
  fn detect(name: &str) -> Self {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
      Some("json") => Format::Json,
      Some("yaml") | Some("yml") => Format::Yaml,
      _ => Format::Unknown,
    }
  }
}

/// Parse one configuration document into raw declarations.
///
/// Groups come first, then targets, each in name order.
pub fn parse_file(file: &ConfigFile) -> Result<ConfigSource, ParseError> {
  let document = if file.data.iter().all(u8::is_ascii_whitespace) {
    Document::default()
  } else {
    match Format::detect(&file.name) {
      Format::Json => parse_json(file)?,
      Format::Yaml => parse_yaml(file)?,
      Format::Unknown => match parse_json(file) {
        Ok(doc) => doc,
        Err(_) => parse_yaml(file)?,
      },
    }
  };

  let mut declarations = Vec::with_capacity(document.group.len() + document.target.len());
  for (name, entry) in document.group {
    let mut group = Group::from(entry);
    group.name = name;
    declarations.push(Declaration::Group(group));
  }
  for (name, mut target) in document.target {
    target.name = name;
    declarations.push(Declaration::Target(target));
  }

  debug!(file = %file.name, declarations = declarations.len(), "parsed config file");

  Ok(ConfigSource {
    name: file.name.clone(),
    declarations,
  })
}

fn parse_json(file: &ConfigFile) -> Result<Document, ParseError> {
  serde_json::from_slice(&file.data).map_err(|source| ParseError::Json {
    name: file.name.clone(),
    source,
  })
}

fn parse_yaml(file: &ConfigFile) -> Result<Document, ParseError> {
  serde_yaml::from_slice(&file.data).map_err(|source| ParseError::Yaml {
    name: file.name.clone(),
    source,
  })
}
