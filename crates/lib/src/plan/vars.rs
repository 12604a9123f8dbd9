//! `${NAME}` variable expansion for target field values.
//!
//! # Syntax
//!
//! - `${NAME}` - replaced by the value of `NAME`
//! - `$$` - a literal `$`
//!
//! A `$` not followed by `{` or `$` passes through unchanged, so shell-style
//! `$HOME` in a build arg reaches the build as written.
//!
//! # Example
//!
//! ```
//! use bake_lib::plan::vars::{parse, Segment};
//!
//! let segments = parse("${REGISTRY}/app:$$tag").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Variable("REGISTRY".to_string()),
//!     Segment::Literal("/app:$tag".to_string()),
//! ]);
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::consts::{VAR_CMD_CONTEXT, VAR_LOCAL_PLATFORM};

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text
  Literal(String),

  /// A variable reference by name
  Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarError {
  #[error("unclosed variable reference at position {0}")]
  Unclosed(usize),

  #[error("invalid variable name '{0}'")]
  InvalidName(String),

  #[error("undefined variable '{0}'")]
  Undefined(String),
}

/// Looks up variable values.
pub trait Resolver {
  fn resolve(&self, name: &str) -> Option<&str>;
}

fn valid_name(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
    _ => false,
  }
}

/// Parse a string containing variable references into segments.
pub fn parse(input: &str) -> Result<Vec<Segment>, VarError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();
        literal.push('$');
      }
      Some((_, '{')) => {
        chars.next();

        let mut name = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          name.push(c);
        }

        if !found_close {
          return Err(VarError::Unclosed(pos));
        }
        let name = name.trim().to_string();
        if !valid_name(&name) {
          return Err(VarError::InvalidName(name));
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(name));
      }
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse and substitute in one step.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, VarError> {
  // Fast path for the common case of plain values.
  if !input.contains('$') {
    return Ok(input.to_string());
  }
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, VarError> {
  let mut result = String::new();
  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Variable(name) => {
        let value = resolver.resolve(name).ok_or_else(|| VarError::Undefined(name.clone()))?;
        result.push_str(value);
      }
    }
  }
  Ok(result)
}

/// Built-in variables plus an environment snapshot.
///
/// Built-ins shadow environment entries of the same name.
#[derive(Debug, Clone, Default)]
pub struct Variables {
  builtins: BTreeMap<String, String>,
  env: BTreeMap<String, String>,
}

impl Variables {
  pub fn new(cmd_context: &str, local_platform: &str, env: &BTreeMap<String, String>) -> Self {
    let mut builtins = BTreeMap::new();
    builtins.insert(VAR_CMD_CONTEXT.to_string(), cmd_context.to_string());
    builtins.insert(VAR_LOCAL_PLATFORM.to_string(), local_platform.to_string());
    Self {
      builtins,
      env: env.clone(),
    }
  }

  pub fn expand(&self, input: &str) -> Result<String, VarError> {
    substitute(input, self)
  }
}

impl Resolver for Variables {
  fn resolve(&self, name: &str) -> Option<&str> {
    self
      .builtins
      .get(name)
      .or_else(|| self.env.get(name))
      .map(String::as_str)
  }
}
