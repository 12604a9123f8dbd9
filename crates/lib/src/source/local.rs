//! Reading configuration documents from the local filesystem.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{ConfigFile, SourceError};
use crate::consts::DEFAULT_FILES;

/// Read configuration files in the order given.
///
/// `-` reads from stdin. With no names, the default file names are probed in
/// `dir` and missing ones are skipped; finding none is an error.
pub fn read_local_files(names: &[PathBuf], dir: &Path) -> Result<Vec<ConfigFile>, SourceError> {
  if names.is_empty() {
    return read_default_files(dir);
  }

  let mut files = Vec::with_capacity(names.len());
  for name in names {
    if name.as_os_str() == "-" {
      files.push(read_stdin()?);
      continue;
    }

    let path = if name.is_absolute() { name.clone() } else { dir.join(name) };
    if !path.exists() {
      return Err(SourceError::NotFound {
        path: name.display().to_string(),
      });
    }
    files.push(read_file(&path, &name.display().to_string())?);
  }

  Ok(files)
}

fn read_default_files(dir: &Path) -> Result<Vec<ConfigFile>, SourceError> {
  let mut files = Vec::new();
  for name in DEFAULT_FILES {
    let path = dir.join(name);
    if !path.is_file() {
      trace!(path = %path.display(), "default config file not present");
      continue;
    }
    files.push(read_file(&path, name)?);
  }

  if files.is_empty() {
    return Err(SourceError::NoDefaultFiles {
      tried: DEFAULT_FILES.join(", "),
    });
  }

  Ok(files)
}

fn read_file(path: &Path, name: &str) -> Result<ConfigFile, SourceError> {
  let data = fs::read(path).map_err(|source| SourceError::Read {
    path: path.display().to_string(),
    source,
  })?;
  debug!(file = %name, bytes = data.len(), "read config file");
  Ok(ConfigFile::new(name, data))
}

fn read_stdin() -> Result<ConfigFile, SourceError> {
  let mut data = Vec::new();
  std::io::stdin()
    .read_to_end(&mut data)
    .map_err(|source| SourceError::Read {
      path: "-".to_string(),
      source,
    })?;
  Ok(ConfigFile::new("-", data))
}
