//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary working directory holding its bake files.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create with a single `docker-bake.json`.
  pub fn with_config(content: &str) -> Self {
    let env = Self::empty();
    env.write_file("docker-bake.json", content);
    env
  }

  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Canonical path of the working directory.
  pub fn root_path(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Absolute path of a file in the working directory.
  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.root_path().join(relative_path)
  }

  /// Command for the bake binary, run from the working directory.
  pub fn bake_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("bake");
    cmd
      .current_dir(self.temp.path())
      .env_remove("BAKE_FILE")
      .env_remove("BAKE_PARALLELISM")
      .env_remove("BAKE_BUILDER")
      .env_remove("BAKE_DOCKER");
    cmd
  }

  /// Run `bake print` and parse its JSON output.
  pub fn print_json(&self, args: &[&str]) -> serde_json::Value {
    let output = self.bake_cmd().arg("print").args(args).output().unwrap();
    assert!(
      output.status.success(),
      "print failed: {}",
      String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
  }
}
