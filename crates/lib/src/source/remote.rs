//! Fetching configuration documents relative to a remote URL.

use tracing::{debug, info};

use super::{ConfigFile, RemoteInput, SourceError};
use crate::consts::DEFAULT_FILES;

/// Fetch configuration files relative to `url`.
///
/// Each name is fetched as `<url>/<name>`. With no names the default file
/// names are tried and those the server does not have are skipped. The URL
/// itself is returned as the remote input that targets build from.
pub async fn read_remote_files(url: &str, names: &[String]) -> Result<(Vec<ConfigFile>, RemoteInput), SourceError> {
  if !(url.starts_with("http://") || url.starts_with("https://")) {
    return Err(SourceError::UnsupportedRemote { url: url.to_string() });
  }

  info!(url = %url, "fetching remote config files");

  let client = reqwest::Client::new();
  let base = url.trim_end_matches('/');
  let mut files = Vec::new();

  if names.is_empty() {
    for name in DEFAULT_FILES {
      if let Some(file) = fetch(&client, base, name, true).await? {
        files.push(file);
      }
    }
    if files.is_empty() {
      return Err(SourceError::NoDefaultFiles {
        tried: DEFAULT_FILES.join(", "),
      });
    }
  } else {
    for name in names {
      if let Some(file) = fetch(&client, base, name, false).await? {
        files.push(file);
      }
    }
  }

  Ok((files, RemoteInput { url: url.to_string() }))
}

/// Fetch one document, returning `None` for a 404 when `optional` is set.
async fn fetch(
  client: &reqwest::Client,
  base: &str,
  name: &str,
  optional: bool,
) -> Result<Option<ConfigFile>, SourceError> {
  let file_url = format!("{}/{}", base, name.trim_start_matches('/'));

  let response = client.get(&file_url).send().await.map_err(|e| SourceError::Fetch {
    url: file_url.clone(),
    message: e.to_string(),
  })?;

  if optional && response.status() == reqwest::StatusCode::NOT_FOUND {
    debug!(url = %file_url, "remote config file not present");
    return Ok(None);
  }

  if !response.status().is_success() {
    return Err(SourceError::Fetch {
      url: file_url,
      message: format!("HTTP {}", response.status()),
    });
  }

  let bytes = response.bytes().await.map_err(|e| SourceError::Fetch {
    url: file_url.clone(),
    message: e.to_string(),
  })?;

  debug!(url = %file_url, bytes = bytes.len(), "fetched remote config file");
  Ok(Some(ConfigFile::new(name, bytes.to_vec())))
}
