//! Print command integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use serial_test::serial;

use super::common::TestEnv;

const APP: &str = r#"{
  "group": {"default": {"targets": ["web", "api"]}},
  "target": {
    "web": {"tags": ["acme/web:latest"], "args": {"MODE": "prod"}},
    "api": {"dockerfile": "api.Dockerfile", "platforms": ["linux/amd64"]}
  }
}"#;

#[test]
fn print_default_group() {
  let env = TestEnv::with_config(APP);
  let doc = env.print_json(&[]);

  assert_eq!(doc["group"]["default"], json!(["web", "api"]));
  assert!(doc["group"]["default"].is_array());
  assert_eq!(doc["target"]["web"]["tags"], json!(["acme/web:latest"]));
  assert_eq!(doc["target"]["api"]["dockerfile"], json!("api.Dockerfile"));
}

#[test]
fn print_explicit_target_reports_requested_names() {
  let env = TestEnv::with_config(APP);
  let doc = env.print_json(&["api"]);

  assert_eq!(doc["group"], json!({ "default": ["api"] }));
  assert!(doc["target"].get("web").is_none());
  assert_eq!(doc["target"]["api"]["platforms"], json!(["linux/amd64"]));
}

#[test]
fn print_applies_set_overrides() {
  let env = TestEnv::with_config(APP);
  let doc = env.print_json(&["--set", "*.args.MODE=dev", "--set", "web.tags=+acme/web:dev", "web"]);

  assert_eq!(doc["target"]["web"]["args"]["MODE"], json!("dev"));
  assert_eq!(doc["target"]["web"]["tags"], json!(["acme/web:latest", "acme/web:dev"]));
}

#[test]
fn print_push_sets_registry_output() {
  let env = TestEnv::with_config(APP);
  let doc = env.print_json(&["--push", "web"]);

  assert_eq!(doc["target"]["web"]["output"], json!(["type=registry"]));
}

#[test]
fn print_merges_files_in_order() {
  let env = TestEnv::with_config(APP);
  env.write_file(
    "override.json",
    r#"{"target": {"web": {"tags": ["acme/web:next"], "args": {"MODE": "ci"}}}}"#,
  );
  let doc = env.print_json(&["-f", "docker-bake.json", "-f", "override.json", "web"]);

  assert_eq!(doc["target"]["web"]["args"]["MODE"], json!("ci"));
  assert_eq!(doc["target"]["web"]["tags"], json!(["acme/web:latest", "acme/web:next"]));
}

#[test]
fn print_reads_yaml_override_file() {
  let env = TestEnv::with_config(APP);
  env.write_file("docker-bake.override.yml", "target:\n  web:\n    target: release\n");
  let doc = env.print_json(&["web"]);

  assert_eq!(doc["target"]["web"]["target"], json!("release"));
}

#[test]
#[serial]
fn print_expands_environment_variables() {
  let env = TestEnv::with_config(r#"{"target": {"web": {"tags": ["acme/web:${TAG}"]}}}"#);
  let doc = temp_env::with_var("TAG", Some("1.2.3"), || env.print_json(&["web"]));

  assert_eq!(doc["target"]["web"]["tags"], json!(["acme/web:1.2.3"]));
}

#[test]
#[serial]
fn print_reads_files_from_environment() {
  let env = TestEnv::empty();
  env.write_file("ci.json", r#"{"target": {"web": {"tags": ["acme/web:ci"]}}}"#);

  let output = temp_env::with_var("BAKE_FILE", Some("ci.json"), || {
    cargo_bin_cmd!("bake")
      .current_dir(env.temp.path())
      .args(["print", "web"])
      .output()
      .unwrap()
  });

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(doc["target"]["web"]["tags"], json!(["acme/web:ci"]));
}

#[test]
fn print_no_cache_false_overrides_file() {
  let env = TestEnv::with_config(r#"{"target": {"web": {"no-cache": true, "pull": true}}}"#);

  let doc = env.print_json(&["--no-cache=false", "--pull=false", "web"]);
  assert_eq!(doc["target"]["web"]["no-cache"], json!(false));
  assert_eq!(doc["target"]["web"]["pull"], json!(false));

  let doc = env.print_json(&["--no-cache", "web"]);
  assert_eq!(doc["target"]["web"]["no-cache"], json!(true));

  let doc = env.print_json(&["web"]);
  assert_eq!(doc["target"]["web"]["no-cache"], json!(true));
}

#[test]
fn print_push_and_load_conflict() {
  let env = TestEnv::with_config(APP);
  env
    .bake_cmd()
    .args(["print", "--push", "--load", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("MutualExclusionError"));
}

#[test]
fn print_push_and_load_conflict_without_config() {
  let env = TestEnv::empty();
  env
    .bake_cmd()
    .args(["print", "--push", "--load", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("MutualExclusionError"))
    .stderr(predicate::str::contains("ConfigSourceError").not());
}

#[test]
fn print_malformed_override() {
  let env = TestEnv::with_config(APP);
  env
    .bake_cmd()
    .args(["print", "--set", "web.tags", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("OverrideSyntaxError"));
}

#[test]
fn print_unknown_target() {
  let env = TestEnv::with_config(APP);
  env
    .bake_cmd()
    .args(["print", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ResolutionError"))
    .stderr(predicate::str::contains("nope"));
}

#[test]
fn print_group_cycle() {
  let env = TestEnv::with_config(r#"{"group": {"a": {"targets": ["b"]}, "b": {"targets": ["a"]}}}"#);
  env
    .bake_cmd()
    .args(["print", "a"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn print_invalid_json() {
  let env = TestEnv::with_config("{ not json");
  env
    .bake_cmd()
    .args(["print", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("ParseError"));
}

#[test]
fn print_missing_explicit_file() {
  let env = TestEnv::with_config(APP);
  env
    .bake_cmd()
    .args(["print", "-f", "missing.json", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing.json"));
}
