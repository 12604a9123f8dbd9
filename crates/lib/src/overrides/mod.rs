//! Override directives.
//!
//! Overrides are `pattern.field=value` strings supplied at invocation time.
//! They are parsed up front (so a malformed entry aborts before any target is
//! touched) and then applied in order to every resolved target whose name
//! matches the pattern.

mod apply;
mod parse;
mod pattern;

pub use apply::apply_overrides;
pub use parse::{FieldName, FieldShape, OverrideDirective, OverrideMode, OverrideValue, parse_override, parse_overrides};
pub use pattern::Pattern;

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur while parsing overrides.
#[derive(Debug, Error)]
pub enum OverrideError {
  /// The entry is not of the form `pattern.field=value`.
  #[error("invalid override '{entry}': {reason}")]
  Syntax { entry: String, reason: String },

  /// The entry names a field targets do not have.
  #[error("unknown override field '{field}' for pattern '{pattern}'")]
  UnknownField { field: String, pattern: String },

  /// The value does not fit the field.
  #[error("invalid value in override '{entry}' for field '{field}': {reason}")]
  InvalidValue { entry: String, field: String, reason: String },

  /// `--push` and `--load` were both requested.
  #[error("push and load may not be set together")]
  PushAndLoad,
}

impl OverrideError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      OverrideError::Syntax { .. } => ErrorKind::OverrideSyntax,
      OverrideError::UnknownField { .. } | OverrideError::InvalidValue { .. } => ErrorKind::Validation,
      OverrideError::PushAndLoad => ErrorKind::MutualExclusion,
    }
  }
}

/// Overrides derived from top-level flags rather than `--set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shorthands {
  /// Push every target to its registry.
  pub push: bool,
  /// Load every target into the local engine.
  pub load: bool,
  /// Force `no-cache` on or off for every target.
  pub no_cache: Option<bool>,
  /// Force `pull` on or off for every target.
  pub pull: Option<bool>,
}

impl Shorthands {
  /// Convert the flags into wildcard directives.
  ///
  /// The result is meant to be appended after user overrides.
  pub fn directives(&self) -> Result<Vec<OverrideDirective>, OverrideError> {
    if self.push && self.load {
      return Err(OverrideError::PushAndLoad);
    }

    let mut directives = Vec::new();
    if self.push {
      directives.push(OverrideDirective::wildcard(
        FieldName::Output,
        OverrideValue::List(vec!["type=registry".to_string()]),
        OverrideMode::Replace,
        "--push",
      ));
    } else if self.load {
      directives.push(OverrideDirective::wildcard(
        FieldName::Output,
        OverrideValue::List(vec!["type=docker".to_string()]),
        OverrideMode::Replace,
        "--load",
      ));
    }
    if let Some(no_cache) = self.no_cache {
      directives.push(OverrideDirective::wildcard(
        FieldName::NoCache,
        OverrideValue::Bool(no_cache),
        OverrideMode::Replace,
        format!("--no-cache={}", no_cache),
      ));
    }
    if let Some(pull) = self.pull {
      directives.push(OverrideDirective::wildcard(
        FieldName::Pull,
        OverrideValue::Bool(pull),
        OverrideMode::Replace,
        format!("--pull={}", pull),
      ));
    }

    Ok(directives)
  }
}
