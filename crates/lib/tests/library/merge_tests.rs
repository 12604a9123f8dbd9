use serde_json::json;

use bake_lib::ErrorKind;

use super::common::{json, load, options, strings};

#[test]
fn args_merge_key_by_key_across_sources() {
  let files = [
    json("a.json", json!({"target": {"web": {"args": {"A": "1"}}}})),
    json("b.json", json!({"target": {"web": {"args": {"B": "2"}}}})),
  ];
  let plan = load(&files, &options(&["web"], &[])).unwrap();

  let args = &plan.get("web").unwrap().build_args;
  assert_eq!(args.len(), 2);
  assert_eq!(args["A"], "1");
  assert_eq!(args["B"], "2");
}

#[test]
fn later_sources_win_for_set_scalars_only() {
  let files = [
    json(
      "docker-bake.json",
      json!({"target": {"web": {"dockerfile": "a.Dockerfile", "target": "release"}}}),
    ),
    json("docker-bake.override.json", json!({"target": {"web": {"dockerfile": "b.Dockerfile"}}})),
  ];
  let plan = load(&files, &options(&["web"], &[])).unwrap();

  let web = &plan.resolved["web"];
  assert_eq!(web.dockerfile.as_deref(), Some("b.Dockerfile"));
  assert_eq!(web.target.as_deref(), Some("release"));
}

#[test]
fn tags_concatenate_and_deduplicate_across_sources() {
  let files = [
    json("a.json", json!({"target": {"web": {"tags": ["web:1", "web:latest"]}}})),
    json("b.json", json!({"target": {"web": {"tags": ["web:latest", "web:2"]}}})),
  ];
  let plan = load(&files, &options(&["web"], &[])).unwrap();
  assert_eq!(plan.resolved["web"].tags, strings(&["web:1", "web:latest", "web:2"]));
}

#[test]
fn group_members_merge_across_sources() {
  let files = [
    json(
      "a.json",
      json!({"group": {"default": {"targets": ["web"]}}, "target": {"web": {}, "api": {}}}),
    ),
    json("b.json", json!({"group": {"default": {"targets": ["api", "web"]}}})),
  ];
  let plan = load(&files, &options(&[], &[])).unwrap();
  assert_eq!(plan.order, strings(&["web", "api"]));
  assert_eq!(plan.groups["default"], strings(&["web", "api"]));
}

#[test]
fn inherits_builds_on_parent_targets() {
  let files = [json(
    "docker-bake.yaml",
    json!({
      "target": {
        "_common": {"args": {"BASE": "alpine"}, "platforms": ["linux/amd64"]},
        "web": {"inherits": ["_common"], "args": {"APP": "web"}}
      }
    }),
  )];
  let plan = load(&files, &options(&["web"], &[])).unwrap();

  let web = &plan.resolved["web"];
  assert!(web.inherits.is_empty());
  assert_eq!(web.args["BASE"], "alpine");
  assert_eq!(web.args["APP"], "web");
  assert_eq!(web.platforms, strings(&["linux/amd64"]));
  assert!(!plan.targets.contains_key("_common"));
}

#[test]
fn target_and_group_sharing_a_name_is_a_resolution_error() {
  let files = [
    json("a.json", json!({"target": {"app": {}}})),
    json("b.json", json!({"group": {"app": {"targets": []}}})),
  ];
  let err = load(&files, &options(&["app"], &[])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Resolution);
  assert!(err.to_string().contains("app"));
}
