//! Crate-level error type and error classification.

use std::fmt;

use thiserror::Error;

use crate::config::ParseError;
use crate::execute::ExecuteError;
use crate::overrides::OverrideError;
use crate::plan::CompileError;
use crate::resolve::ResolveError;
use crate::source::SourceError;

/// The kind of failure, independent of which stage produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// A configuration source could not be read or fetched.
  ConfigSource,
  /// A configuration document is malformed.
  Parse,
  /// A `--set` entry is malformed.
  OverrideSyntax,
  /// An unknown target or group, a conflicting declaration, or a cycle.
  Resolution,
  /// An unknown override field or an invalid value in a resolved target.
  Validation,
  /// Shorthand overrides that cannot be combined were requested together.
  MutualExclusion,
  /// The invocation was cancelled.
  Cancelled,
  /// The build engine reported a failure.
  Build,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ConfigSource => "ConfigSourceError",
      Self::Parse => "ParseError",
      Self::OverrideSyntax => "OverrideSyntaxError",
      Self::Resolution => "ResolutionError",
      Self::Validation => "ValidationError",
      Self::MutualExclusion => "MutualExclusionError",
      Self::Cancelled => "Cancelled",
      Self::Build => "BuildError",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Any error surfaced by the resolve/compile/execute pipeline.
#[derive(Debug, Error)]
pub enum BakeError {
  #[error(transparent)]
  Source(#[from] SourceError),

  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error(transparent)]
  Override(#[from] OverrideError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Compile(#[from] CompileError),

  #[error(transparent)]
  Execute(#[from] ExecuteError),

  #[error("operation cancelled")]
  Cancelled,
}

impl BakeError {
  /// Classify this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      BakeError::Source(_) => ErrorKind::ConfigSource,
      BakeError::Parse(_) => ErrorKind::Parse,
      BakeError::Override(e) => e.kind(),
      BakeError::Resolve(ResolveError::Override(e)) => e.kind(),
      BakeError::Resolve(_) => ErrorKind::Resolution,
      BakeError::Compile(_) => ErrorKind::Validation,
      BakeError::Execute(e) => e.kind(),
      BakeError::Cancelled => ErrorKind::Cancelled,
    }
  }
}
