//! Build command integration tests.
//!
//! The docker binary is replaced with `true`/`false` so builds run without an
//! engine.

#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use serial_test::serial;

use super::common::TestEnv;

const APP: &str = r#"{
  "group": {"default": {"targets": ["web", "api"]}},
  "target": {"web": {}, "api": {}}
}"#;

#[test]
fn build_succeeds_and_writes_metadata() {
  let env = TestEnv::with_config(APP);

  env
    .bake_cmd()
    .args(["build", "--docker", "true", "--metadata-file", "meta.json"])
    .assert()
    .success()
    .stderr(predicate::str::contains("web"))
    .stderr(predicate::str::contains("api"));

  let content = std::fs::read_to_string(env.path("meta.json")).unwrap();
  let metadata: serde_json::Value = serde_json::from_str(&content).unwrap();
  assert_eq!(metadata, json!({ "api": {}, "web": {} }));
}

#[test]
fn build_failure_exits_nonzero() {
  let env = TestEnv::with_config(APP);

  env
    .bake_cmd()
    .args(["build", "--docker", "false", "-j", "1", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("BuildError"))
    .stderr(predicate::str::contains("web failed"));
}

#[test]
#[serial]
fn build_settings_from_environment() {
  let env = TestEnv::with_config(APP);

  let output = temp_env::with_vars([("BAKE_PARALLELISM", Some("1")), ("BAKE_DOCKER", Some("true"))], || {
    cargo_bin_cmd!("bake")
      .current_dir(env.temp.path())
      .env_remove("BAKE_FILE")
      .env_remove("BAKE_BUILDER")
      .args(["build", "--metadata-file", "meta.json"])
      .output()
      .unwrap()
  });

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  assert!(env.path("meta.json").exists());
}

#[test]
#[serial]
fn build_invalid_parallelism_from_environment() {
  let env = TestEnv::with_config(APP);

  let output = temp_env::with_var("BAKE_PARALLELISM", Some("many"), || {
    cargo_bin_cmd!("bake")
      .current_dir(env.temp.path())
      .args(["build", "--docker", "true"])
      .output()
      .unwrap()
  });

  assert!(!output.status.success());
}

#[test]
fn build_missing_docker_binary() {
  let env = TestEnv::with_config(APP);

  env
    .bake_cmd()
    .args(["build", "--docker", "/nonexistent/docker", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("BuildError"));
}

#[test]
fn build_resolution_error_runs_nothing() {
  let env = TestEnv::with_config(APP);

  env
    .bake_cmd()
    .args(["build", "--docker", "true", "--metadata-file", "meta.json", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ResolutionError"));

  assert!(!env.path("meta.json").exists());
}
