//! List command integration tests.

use predicates::prelude::*;
use serde_json::json;

use super::common::TestEnv;

const APP: &str = r#"{
  "group": {"default": {"targets": ["web"]}, "all": {"targets": ["web", "api"]}},
  "target": {"web": {}, "api": {}}
}"#;

#[test]
fn list_text_output() {
  let env = TestEnv::with_config(APP);
  env
    .bake_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("GROUPS"))
    .stdout(predicate::str::contains("TARGETS"))
    .stdout(predicate::str::contains("web, api"));
}

#[test]
fn list_json_output() {
  let env = TestEnv::with_config(APP);
  let output = env.bake_cmd().args(["list", "--format", "json"]).output().unwrap();

  assert!(output.status.success());
  let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(doc["groups"]["all"], json!(["web", "api"]));
  assert_eq!(doc["targets"], json!(["api", "web"]));
}

#[test]
fn list_empty_document() {
  let env = TestEnv::with_config("{}");
  env
    .bake_cmd()
    .arg("list")
    .assert()
    .success()
    .stderr(predicate::str::contains("No groups or targets"));
}

#[test]
fn list_reports_name_conflict() {
  let env = TestEnv::with_config(r#"{"group": {"web": {"targets": []}}, "target": {"web": {}}}"#);
  env
    .bake_cmd()
    .arg("list")
    .assert()
    .failure()
    .stderr(predicate::str::contains("ResolutionError"));
}
