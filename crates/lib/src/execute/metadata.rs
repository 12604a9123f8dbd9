//! Persisting per-target exporter metadata.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::types::ExporterResponse;

/// Write `metadata` as pretty JSON to `path`.
///
/// The file is written to a temporary sibling and renamed into place, so
/// readers never observe a partial document.
pub fn write_metadata(path: &Path, metadata: &BTreeMap<String, ExporterResponse>) -> std::io::Result<()> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let json = serde_json::to_vec_pretty(metadata)?;
  let mut file = NamedTempFile::new_in(dir)?;
  file.write_all(&json)?;
  file.write_all(b"\n")?;
  file.as_file().sync_all()?;
  file.persist(path).map_err(|e| e.error)?;

  debug!(path = %path.display(), targets = metadata.len(), "wrote metadata file");
  Ok(())
}
