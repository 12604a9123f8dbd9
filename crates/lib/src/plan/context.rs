//! Build context and Dockerfile location rules.
//!
//! Everything here is lexical: paths are normalized without touching the
//! filesystem.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::options::ContextSource;
use crate::consts::{CWD_PREFIX, DEFAULT_DOCKERFILE, TARGET_CONTEXT_PREFIX};
use crate::source::{RemoteInput, is_remote_url};

/// A context declaration after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextRef {
  Source(ContextSource),
  /// `target:<name>`: reuse another target's context.
  Target(String),
}

/// Normalize `.` and `..` components without resolving symlinks.
pub fn normalize(path: &Path) -> PathBuf {
  let mut out: Vec<Component<'_>> = Vec::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match out.last() {
        Some(Component::Normal(_)) => {
          out.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => out.push(component),
      },
      other => out.push(other),
    }
  }
  if out.is_empty() {
    return PathBuf::from(".");
  }
  out.iter().collect()
}

/// Classify a declared context.
pub fn resolve_context(raw: Option<&str>, input: Option<&RemoteInput>, working_dir: &Path) -> ContextRef {
  let raw = raw.map(str::trim).filter(|s| !s.is_empty());
  let source = match (raw, input) {
    (None, Some(input)) => ContextSource::Remote(input.url.clone()),
    (None, None) => ContextSource::Local(normalize(working_dir)),
    (Some(raw), _) if raw.starts_with(TARGET_CONTEXT_PREFIX) => {
      return ContextRef::Target(raw[TARGET_CONTEXT_PREFIX.len()..].to_string());
    }
    (Some(raw), _) if raw.starts_with(CWD_PREFIX) => {
      ContextSource::Local(normalize(&working_dir.join(&raw[CWD_PREFIX.len()..])))
    }
    (Some(raw), _) if is_remote_url(raw) => ContextSource::Remote(raw.to_string()),
    (Some(raw), Some(input)) if Path::new(raw).is_relative() => {
      let sub = normalize(Path::new(raw));
      if sub == Path::new(".") {
        ContextSource::Remote(input.url.clone())
      } else {
        ContextSource::Remote(format!("{}#:{}", input.url, sub.display()))
      }
    }
    (Some(raw), _) => ContextSource::Local(normalize(&working_dir.join(raw))),
  };
  ContextRef::Source(source)
}

/// Resolve a declared Dockerfile path.
///
/// Absolute and `cwd://` paths may point anywhere. Relative paths must stay
/// inside the context; `None` is returned when they escape it.
pub fn resolve_dockerfile(raw: Option<&str>, working_dir: &Path) -> Option<PathBuf> {
  let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_DOCKERFILE);
  if let Some(rest) = raw.strip_prefix(CWD_PREFIX) {
    return Some(normalize(&working_dir.join(rest)));
  }
  let path = Path::new(raw);
  if path.is_absolute() {
    return Some(normalize(path));
  }
  let relative = normalize(path);
  match relative.components().next() {
    Some(Component::ParentDir) => None,
    _ => Some(relative),
  }
}

/// Failure while linking `target:` contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingError {
  UnknownTarget { target: String, reference: String },
  Cycle { chain: String },
}

/// Resolve `target:` references to the target that owns the context.
///
/// `refs` maps a referring target to the target it names. The result maps
/// every referring target to the root of its chain.
pub fn share_contexts(
  names: &[String],
  refs: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, SharingError> {
  let mut graph: DiGraph<&str, ()> = DiGraph::new();
  let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();
  for name in names {
    nodes.insert(name.as_str(), graph.add_node(name.as_str()));
  }

  for (from, to) in refs {
    let (Some(&from_idx), Some(&to_idx)) = (nodes.get(from.as_str()), nodes.get(to.as_str())) else {
      return Err(SharingError::UnknownTarget {
        target: from.clone(),
        reference: to.clone(),
      });
    };
    // Edge from the owner to the borrower.
    graph.add_edge(to_idx, from_idx, ());
  }

  let sorted = toposort(&graph, None).map_err(|cycle| {
    let start = graph[cycle.node_id()];
    let mut chain = vec![start.to_string()];
    let mut current = start;
    while let Some(next) = refs.get(current) {
      chain.push(next.clone());
      if next == start || chain.len() > refs.len() + 1 {
        break;
      }
      current = next;
    }
    SharingError::Cycle { chain: chain.join(" -> ") }
  })?;

  let mut roots: BTreeMap<String, String> = BTreeMap::new();
  for idx in sorted {
    let name = graph[idx];
    if let Some(owner) = refs.get(name) {
      let root = roots.get(owner).cloned().unwrap_or_else(|| owner.clone());
      roots.insert(name.to_string(), root);
    }
  }
  Ok(roots)
}
