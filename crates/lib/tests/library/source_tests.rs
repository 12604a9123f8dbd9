use std::path::PathBuf;

use tempfile::TempDir;

use bake_lib::ErrorKind;
use bake_lib::source::{read_local_files, split_positional};
use bake_lib::{BakeError, consts};

use super::common::{load, options, strings};

#[test]
fn default_files_are_probed_in_order() {
  let dir = TempDir::new().unwrap();
  std::fs::write(
    dir.path().join("docker-bake.json"),
    r#"{"target": {"web": {"tags": ["web:1"]}}}"#,
  )
  .unwrap();
  std::fs::write(
    dir.path().join("docker-bake.override.yml"),
    "target:\n  web:\n    tags: [\"web:2\"]\n",
  )
  .unwrap();

  let files = read_local_files(&[], dir.path()).unwrap();
  assert_eq!(files.len(), 2);

  let plan = load(&files, &options(&["web"], &[])).unwrap();
  assert_eq!(plan.resolved["web"].tags, strings(&["web:1", "web:2"]));
}

#[test]
fn missing_named_file_is_a_source_error() {
  let dir = TempDir::new().unwrap();
  let err = read_local_files(&[PathBuf::from("nope.json")], dir.path()).unwrap_err();
  let err = BakeError::from(err);
  assert_eq!(err.kind(), ErrorKind::ConfigSource);
  assert!(err.to_string().contains("nope.json"));
}

#[test]
fn empty_directory_has_no_default_files() {
  let dir = TempDir::new().unwrap();
  let err = read_local_files(&[], dir.path()).unwrap_err();
  assert!(err.to_string().contains(consts::DEFAULT_FILES[0]));
}

#[test]
fn positional_remote_and_context() {
  let split = split_positional(&strings(&[
    "https://example.com/repo.git",
    "https://example.com/ctx.git",
    "web",
  ]));
  assert_eq!(split.url.as_deref(), Some("https://example.com/repo.git"));
  assert_eq!(split.cmd_context, "https://example.com/ctx.git");
  assert_eq!(split.targets, strings(&["web"]));
}
