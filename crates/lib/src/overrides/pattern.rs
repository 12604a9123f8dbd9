//! Target name patterns used by override directives.

use std::fmt;

use globset::{Glob, GlobMatcher};

/// A pattern selecting target names.
///
/// `*` matches every name, a plain name matches only itself, and a name with
/// glob metacharacters (`?`, `[`, `{`, or `*` inside a longer pattern) is
/// matched as a glob.
#[derive(Debug, Clone)]
pub enum Pattern {
  Any,
  Exact(String),
  Glob { raw: String, matcher: GlobMatcher },
}

impl Pattern {
  /// Compile a pattern string.
  pub fn new(raw: &str) -> Result<Self, globset::Error> {
    if raw == "*" {
      return Ok(Pattern::Any);
    }
    if raw.contains(['*', '?', '[', '{']) {
      let matcher = Glob::new(raw)?.compile_matcher();
      return Ok(Pattern::Glob {
        raw: raw.to_string(),
        matcher,
      });
    }
    Ok(Pattern::Exact(raw.to_string()))
  }

  pub fn matches(&self, name: &str) -> bool {
    match self {
      Pattern::Any => true,
      Pattern::Exact(exact) => exact == name,
      Pattern::Glob { matcher, .. } => matcher.is_match(name),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Pattern::Any => "*",
      Pattern::Exact(exact) => exact,
      Pattern::Glob { raw, .. } => raw,
    }
  }
}

impl PartialEq for Pattern {
  fn eq(&self, other: &Self) -> bool {
    self.as_str() == other.as_str()
  }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
