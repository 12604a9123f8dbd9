//! Configuration sources.
//!
//! A source is one configuration document, read either from the local
//! filesystem or fetched relative to a remote URL. Sources are immutable once
//! read; parsing happens in [`crate::config`].

mod local;
mod remote;

pub use local::read_local_files;
pub use remote::read_remote_files;

use thiserror::Error;

use crate::consts::DEFAULT_CMD_CONTEXT;

/// One configuration document and the name it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
  /// File path, `-` for stdin, or the fetched URL.
  pub name: String,
  /// Raw document bytes.
  pub data: Vec<u8>,
}

impl ConfigFile {
  pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
    Self {
      name: name.into(),
      data: data.into(),
    }
  }
}

/// The resolved remote location configuration files were fetched from.
///
/// Targets without an explicit context build from this location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInput {
  pub url: String,
}

/// Errors that can occur while reading configuration sources.
#[derive(Debug, Error)]
pub enum SourceError {
  /// An explicitly named file does not exist.
  #[error("config file not found: {path}")]
  NotFound { path: String },

  /// A file exists but could not be read.
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  /// No file was named and none of the default names exist.
  #[error("no config file found (tried {tried})")]
  NoDefaultFiles { tried: String },

  /// Fetching a remote document failed.
  #[error("failed to fetch {url}: {message}")]
  Fetch { url: String, message: String },

  /// The remote reference uses a scheme that cannot be fetched.
  #[error("unsupported remote reference: {url}")]
  UnsupportedRemote { url: String },
}

/// Positional arguments split into remote references and target names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalArgs {
  /// Remote URL to read configuration files from.
  pub url: Option<String>,
  /// Value for the `BAKE_CMD_CONTEXT` built-in.
  pub cmd_context: String,
  /// Remaining target and group names.
  pub targets: Vec<String>,
}

/// Split positional arguments the way the bake command reads them.
///
/// If the first argument is a remote reference it names the configuration
/// location. If the argument after it is also remote it becomes the command
/// context. Everything else is a target or group name.
pub fn split_positional(args: &[String]) -> PositionalArgs {
  let mut rest = args;
  let mut url = None;
  let mut cmd_context = DEFAULT_CMD_CONTEXT.to_string();

  if let Some((first, tail)) = rest.split_first()
    && is_remote_url(first)
  {
    url = Some(first.clone());
    rest = tail;
    if let Some((second, tail)) = rest.split_first()
      && is_remote_url(second)
    {
      cmd_context = second.clone();
      rest = tail;
    }
  }

  PositionalArgs {
    url,
    cmd_context,
    targets: rest.to_vec(),
  }
}

/// Check whether a string refers to a remote location rather than a name or path.
pub fn is_remote_url(s: &str) -> bool {
  s.starts_with("http://")
    || s.starts_with("https://")
    || s.starts_with("git://")
    || s.starts_with("ssh://")
    || s.starts_with("git@")
    || s.starts_with("github.com/")
}
