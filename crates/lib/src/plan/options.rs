//! Engine-ready build options and the exporter/cache entry parsers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
  #[error("empty entry")]
  Empty,

  #[error("field '{0}' is not of the form key=value")]
  Field(String),

  #[error("missing type")]
  MissingType,

  #[error("unknown type '{0}'")]
  UnknownType(String),

  #[error("type '{kind}' requires '{attr}'")]
  MissingAttr { kind: String, attr: &'static str },
}

/// Split `key=value,key=value` into a map. Returns the map and, if the first
/// field had no `=`, that bare value.
fn parse_csv(entry: &str) -> Result<(Option<String>, BTreeMap<String, String>), EntryError> {
  let entry = entry.trim();
  if entry.is_empty() {
    return Err(EntryError::Empty);
  }

  let mut attrs = BTreeMap::new();
  let mut bare = None;
  for (i, field) in entry.split(',').enumerate() {
    let field = field.trim();
    match field.split_once('=') {
      Some((key, value)) => {
        attrs.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
      }
      None if i == 0 && !entry.contains('=') => bare = Some(field.to_string()),
      None => return Err(EntryError::Field(field.to_string())),
    }
  }
  Ok((bare, attrs))
}

/// Exporter types accepted in `output` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
  Local,
  Tar,
  Oci,
  Docker,
  Image,
  CacheOnly,
}

impl ExportKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Local => "local",
      Self::Tar => "tar",
      Self::Oci => "oci",
      Self::Docker => "docker",
      Self::Image => "image",
      Self::CacheOnly => "cacheonly",
    }
  }
}

impl fmt::Display for ExportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One parsed `output` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
  pub kind: ExportKind,
  pub attrs: BTreeMap<String, String>,
}

impl ExportEntry {
  /// Parse an exporter entry.
  ///
  /// A bare path is a local export to that path, `-` a tar stream to stdout.
  /// `registry` is shorthand for `image` with `push=true`.
  pub fn parse(entry: &str) -> Result<Self, EntryError> {
    let (bare, mut attrs) = parse_csv(entry)?;
    if let Some(path) = bare {
      let kind = if path == "-" { ExportKind::Tar } else { ExportKind::Local };
      attrs.insert("dest".to_string(), path);
      return Ok(Self { kind, attrs });
    }

    let kind = attrs.remove("type").ok_or(EntryError::MissingType)?;
    let kind = match kind.as_str() {
      "local" => ExportKind::Local,
      "tar" => ExportKind::Tar,
      "oci" => ExportKind::Oci,
      "docker" => ExportKind::Docker,
      "image" => ExportKind::Image,
      "cacheonly" => ExportKind::CacheOnly,
      "registry" => {
        attrs.insert("push".to_string(), "true".to_string());
        ExportKind::Image
      }
      other => return Err(EntryError::UnknownType(other.to_string())),
    };

    if matches!(kind, ExportKind::Local | ExportKind::Tar) && !attrs.contains_key("dest") {
      return Err(EntryError::MissingAttr {
        kind: kind.to_string(),
        attr: "dest",
      });
    }

    Ok(Self { kind, attrs })
  }

  pub fn pushes(&self) -> bool {
    self.kind == ExportKind::Image && self.attrs.get("push").is_some_and(|v| v == "true")
  }
}

impl fmt::Display for ExportEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "type={}", self.kind)?;
    for (key, value) in &self.attrs {
      write!(f, ",{key}={value}")?;
    }
    Ok(())
  }
}

/// One parsed `cache-from`/`cache-to` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
  pub kind: String,
  pub attrs: BTreeMap<String, String>,
}

impl CacheEntry {
  /// Parse a cache entry. A bare value is a registry reference.
  pub fn parse(entry: &str) -> Result<Self, EntryError> {
    let (bare, mut attrs) = parse_csv(entry)?;
    if let Some(reference) = bare {
      attrs.insert("ref".to_string(), reference);
      return Ok(Self {
        kind: "registry".to_string(),
        attrs,
      });
    }

    let kind = attrs.remove("type").ok_or(EntryError::MissingType)?;
    if kind.is_empty() {
      return Err(EntryError::MissingType);
    }
    Ok(Self { kind, attrs })
  }
}

impl fmt::Display for CacheEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "type={}", self.kind)?;
    for (key, value) in &self.attrs {
      write!(f, ",{key}={value}")?;
    }
    Ok(())
  }
}

/// Where a build context comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextSource {
  /// A normalized local directory.
  Local(PathBuf),
  /// A URL the engine fetches itself.
  Remote(String),
}

impl fmt::Display for ContextSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Local(path) => write!(f, "{}", path.display()),
      Self::Remote(url) => write!(f, "{url}"),
    }
  }
}

/// Compiled options for building one target.
///
/// Built once by the compiler and shared read-only with the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
  pub name: String,
  pub context: ContextSource,
  /// Target whose context snapshot this build reuses, when declared with
  /// `target:<name>`.
  pub shared_context: Option<String>,
  /// Dockerfile path, relative to the context unless absolute.
  pub dockerfile: PathBuf,
  pub build_args: BTreeMap<String, String>,
  pub labels: BTreeMap<String, String>,
  pub tags: Vec<String>,
  pub target: Option<String>,
  pub platforms: Vec<Platform>,
  pub exports: Vec<ExportEntry>,
  pub cache_from: Vec<CacheEntry>,
  pub cache_to: Vec<CacheEntry>,
  pub secrets: Vec<String>,
  pub ssh: Vec<String>,
  pub pull: bool,
  pub no_cache: bool,
  pub network: Option<String>,
}

impl BuildOptions {
  /// Dockerfile location as the engine expects it.
  ///
  /// Local contexts get a path joined onto the context directory, remote
  /// contexts keep the path relative to the fetched context.
  pub fn dockerfile_path(&self) -> PathBuf {
    match &self.context {
      ContextSource::Local(dir) if self.dockerfile.is_relative() => dir.join(&self.dockerfile),
      _ => self.dockerfile.clone(),
    }
  }

  pub fn local_context(&self) -> Option<&Path> {
    match &self.context {
      ContextSource::Local(dir) => Some(dir),
      ContextSource::Remote(_) => None,
    }
  }
}
