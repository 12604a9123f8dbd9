use serde_json::json;

use bake_lib::ErrorKind;
use bake_lib::config::{Declaration, parse_file};
use bake_lib::print::PrintDocument;
use bake_lib::source::ConfigFile;

use super::common::{json, load, options, strings};

#[test]
fn overlapping_groups_build_each_target_once() {
  let files = [json(
    "docker-bake.json",
    json!({
      "group": {
        "default": {"targets": ["frontend", "backend", "web"]},
        "frontend": {"targets": ["web", "assets"]},
        "backend": {"targets": ["api", "web"]}
      },
      "target": {"web": {}, "assets": {}, "api": {}}
    }),
  )];
  let plan = load(&files, &options(&[], &[])).unwrap();

  assert_eq!(plan.order, strings(&["web", "assets", "api"]));
  assert_eq!(plan.len(), 3);
  assert_eq!(plan.groups["default"], plan.order);
}

#[test]
fn group_cycles_are_resolution_errors() {
  for groups in [
    json!({"a": {"targets": ["a"]}}),
    json!({"a": {"targets": ["b"]}, "b": {"targets": ["a"]}}),
    json!({"a": {"targets": ["b"]}, "b": {"targets": ["c"]}, "c": {"targets": ["web", "a"]}}),
  ] {
    let files = [json("docker-bake.json", json!({"group": groups, "target": {"web": {}}}))];
    let err = load(&files, &options(&["a"], &[])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("cycle"));
  }
}

#[test]
fn unknown_name_is_a_resolution_error() {
  let files = [json("docker-bake.json", json!({"target": {"web": {}}}))];
  let err = load(&files, &options(&["nope"], &[])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Resolution);
  assert!(err.to_string().contains("nope"));
}

#[test]
fn empty_overrides_are_a_no_op() {
  let doc = json!({
    "target": {
      "web": {
        "context": "app",
        "tags": ["web:1", "web:1"],
        "args": {"A": "1"},
        "platforms": ["linux/amd64"],
        "no-cache": false
      }
    }
  });
  let files = [json("docker-bake.json", doc.clone())];
  let plan = load(&files, &options(&["web"], &[])).unwrap();

  let parsed = parse_file(&files[0]).unwrap();
  let Some(Declaration::Target(declared)) = parsed.declarations.into_iter().next() else {
    panic!("expected a target declaration");
  };
  assert_eq!(plan.resolved["web"], declared);
}

#[test]
fn default_target_without_group_reports_synthetic_group() {
  let files = [json("docker-bake.json", json!({"target": {"default": {}}}))];
  let plan = load(&files, &options(&[], &[])).unwrap();

  let printed = serde_json::to_value(plan.document()).unwrap();
  assert_eq!(printed["group"]["default"], json!(["default"]));
  assert!(printed["target"]["default"].is_object());
}

#[test]
fn explicit_targets_print_requested_names() {
  let files = [json(
    "docker-bake.json",
    json!({"group": {"default": {"targets": ["web"]}}, "target": {"web": {}}}),
  )];
  let plan = load(&files, &options(&["web"], &[])).unwrap();
  let printed = serde_json::to_value(plan.document()).unwrap();
  assert_eq!(printed["group"], json!({ "default": ["web"] }));
}

#[test]
fn printed_document_round_trips() {
  let files = [json(
    "docker-bake.json",
    json!({
      "target": {
        "web": {
          "context": "app",
          "dockerfile": "web.Dockerfile",
          "tags": ["acme/web:1", "acme/web:latest"],
          "args": {"VERSION": 1, "DEBUG": false},
          "labels": {"org.opencontainers.image.title": "web"},
          "platforms": ["linux/amd64", "linux/arm64"],
          "cache-from": ["acme/web:cache"],
          "secret": ["id=npm,src=.npmrc"],
          "pull": true,
          "network": "host"
        }
      }
    }),
  )];
  let plan = load(&files, &options(&["web"], &["web.tags=+acme/web:ci"])).unwrap();

  let printed = plan.document().to_json().unwrap();
  let reparsed = parse_file(&ConfigFile::new("printed.json", printed.clone())).unwrap();
  let Some(web) = reparsed.declarations.into_iter().find_map(|d| match d {
    Declaration::Target(t) => Some(t),
    Declaration::Group(_) => None,
  }) else {
    panic!("expected a target declaration");
  };
  assert_eq!(web, plan.resolved["web"]);
  assert_eq!(web.args["VERSION"], "1");

  let doc: PrintDocument = serde_json::from_str(&printed).unwrap();
  assert_eq!(doc, plan.document());
}

#[test]
fn invalid_platform_fails_the_whole_plan() {
  let files = [json(
    "docker-bake.json",
    json!({"target": {"web": {}, "api": {"platforms": ["linux/amd64", "solaris"]}}}),
  )];
  let err = load(&files, &options(&["web", "api"], &[])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(err.to_string().contains("api"));
}

#[test]
fn malformed_document_is_a_parse_error() {
  let files = [ConfigFile::new("docker-bake.json", "{\"target\": ")];
  let err = load(&files, &options(&[], &[])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Parse);
}
