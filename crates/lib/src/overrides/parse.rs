//! Parsing `pattern.field=value` override strings.

use std::fmt;

use super::OverrideError;
use super::pattern::Pattern;

/// The target fields an override may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
  Context,
  Dockerfile,
  Args,
  Labels,
  Tags,
  CacheFrom,
  CacheTo,
  Target,
  Secret,
  Ssh,
  Platforms,
  Output,
  Pull,
  NoCache,
  Network,
}

/// How a field's value is shaped, which decides how overrides combine with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
  Scalar,
  Bool,
  List,
  Map,
}

impl FieldName {
  /// Look up a field by its configuration name or one of its aliases.
  pub fn parse(s: &str) -> Option<Self> {
    let field = match s {
      "context" => Self::Context,
      "dockerfile" => Self::Dockerfile,
      "args" => Self::Args,
      "labels" => Self::Labels,
      "tags" => Self::Tags,
      "cache-from" => Self::CacheFrom,
      "cache-to" => Self::CacheTo,
      "target" => Self::Target,
      "secret" | "secrets" => Self::Secret,
      "ssh" => Self::Ssh,
      "platforms" | "platform" => Self::Platforms,
      "output" | "outputs" => Self::Output,
      "pull" => Self::Pull,
      "no-cache" => Self::NoCache,
      "network" => Self::Network,
      _ => return None,
    };
    Some(field)
  }

  /// The configuration document name of this field.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Context => "context",
      Self::Dockerfile => "dockerfile",
      Self::Args => "args",
      Self::Labels => "labels",
      Self::Tags => "tags",
      Self::CacheFrom => "cache-from",
      Self::CacheTo => "cache-to",
      Self::Target => "target",
      Self::Secret => "secret",
      Self::Ssh => "ssh",
      Self::Platforms => "platforms",
      Self::Output => "output",
      Self::Pull => "pull",
      Self::NoCache => "no-cache",
      Self::Network => "network",
    }
  }

  pub fn shape(&self) -> FieldShape {
    match self {
      Self::Context | Self::Dockerfile | Self::Target | Self::Network => FieldShape::Scalar,
      Self::Pull | Self::NoCache => FieldShape::Bool,
      Self::Args | Self::Labels => FieldShape::Map,
      Self::Tags | Self::CacheFrom | Self::CacheTo | Self::Secret | Self::Ssh | Self::Platforms | Self::Output => {
        FieldShape::List
      }
    }
  }
}

impl fmt::Display for FieldName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Whether an override replaces a field or adds to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideMode {
  /// `field=value`: the field is overwritten.
  Replace,
  /// `field=+value`: entries are added, existing ones kept.
  Append,
}

/// A typed override value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideValue {
  Text(String),
  Bool(bool),
  List(Vec<String>),
  /// One entry of a mapping field.
  Entry { key: String, value: String },
}

/// A single parsed override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDirective {
  pub pattern: Pattern,
  pub field: FieldName,
  pub value: OverrideValue,
  pub mode: OverrideMode,
  /// The string this directive was parsed from.
  pub raw: String,
}

impl OverrideDirective {
  /// An override that applies to every target.
  pub fn wildcard(field: FieldName, value: OverrideValue, mode: OverrideMode, raw: impl Into<String>) -> Self {
    Self {
      pattern: Pattern::Any,
      field,
      value,
      mode,
      raw: raw.into(),
    }
  }
}

/// Parse override strings, in order.
///
/// Either the whole list parses or nothing is returned.
pub fn parse_overrides(entries: &[String]) -> Result<Vec<OverrideDirective>, OverrideError> {
  entries.iter().map(|entry| parse_override(entry)).collect()
}

/// Parse one override string.
///
/// Accepted forms:
/// - `<pattern>.<field>=<value>` and `<pattern>.<field>=+<value>`
/// - `<pattern>.args.<KEY>=<value>` (likewise `labels`)
/// - `<field>=<value>`, which applies to every target
pub fn parse_override(entry: &str) -> Result<OverrideDirective, OverrideError> {
  let syntax = |reason: &str| OverrideError::Syntax {
    entry: entry.to_string(),
    reason: reason.to_string(),
  };

  let (key, raw_value) = entry.split_once('=').ok_or_else(|| syntax("missing '='"))?;
  if key.is_empty() {
    return Err(syntax("missing key before '='"));
  }
  if key.starts_with('.') {
    return Err(syntax("empty target pattern"));
  }

  let parts: Vec<&str> = key.splitn(3, '.').collect();
  let (pattern, field, subkey) = if let Some(field) = parts.get(1).and_then(|f| FieldName::parse(f)) {
    (parts[0], field, parts.get(2).copied())
  } else if let Some(field) = FieldName::parse(parts[0]) {
    ("*", field, key.split_once('.').map(|(_, rest)| rest))
  } else if parts.len() >= 2 {
    return Err(OverrideError::UnknownField {
      field: parts[1].to_string(),
      pattern: parts[0].to_string(),
    });
  } else {
    return Err(OverrideError::UnknownField {
      field: parts[0].to_string(),
      pattern: "*".to_string(),
    });
  };

  let pattern = Pattern::new(pattern).map_err(|e| syntax(&format!("invalid pattern: {}", e)))?;

  let (mode, value) = match raw_value.strip_prefix('+') {
    Some(rest) => (OverrideMode::Append, rest),
    None => (OverrideMode::Replace, raw_value),
  };

  let invalid = |reason: &str| OverrideError::InvalidValue {
    entry: entry.to_string(),
    field: field.as_str().to_string(),
    reason: reason.to_string(),
  };

  let value = match (field.shape(), subkey) {
    (FieldShape::Map, Some(key)) if !key.is_empty() => OverrideValue::Entry {
      key: key.to_string(),
      value: value.to_string(),
    },
    (FieldShape::Map, _) => return Err(syntax("mapping field requires a key")),
    (_, Some(_)) => return Err(syntax(&format!("field '{}' does not take a key", field))),
    (FieldShape::Scalar | FieldShape::Bool, None) if mode == OverrideMode::Append => {
      return Err(invalid("append is only valid on list or mapping fields"));
    }
    (FieldShape::Scalar, None) => OverrideValue::Text(value.to_string()),
    (FieldShape::Bool, None) => OverrideValue::Bool(parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?),
    (FieldShape::List, None) if field == FieldName::Platforms => OverrideValue::List(
      value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect(),
    ),
    (FieldShape::List, None) => OverrideValue::List(vec![value.to_string()]),
  };

  Ok(OverrideDirective {
    pattern,
    field,
    value,
    mode,
    raw: entry.to_string(),
  })
}

/// Parse a boolean the way command-line flags usually accept them.
fn parse_bool(s: &str) -> Option<bool> {
  match s.to_ascii_lowercase().as_str() {
    "1" | "t" | "true" => Some(true),
    "0" | "f" | "false" => Some(false),
    _ => None,
  }
}
