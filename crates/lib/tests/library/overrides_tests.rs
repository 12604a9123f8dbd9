use serde_json::json;

use bake_lib::ErrorKind;
use bake_lib::overrides::Shorthands;
use bake_lib::plan::ExportKind;

use super::common::{json, load, options, strings};

fn web_and_api() -> Vec<bake_lib::source::ConfigFile> {
  vec![json(
    "docker-bake.json",
    json!({
      "group": {"default": {"targets": ["web", "api"]}},
      "target": {"web": {"tags": ["web:dev"]}, "api": {}}
    }),
  )]
}

#[test]
fn wildcard_replace_then_append() {
  let plan = load(&web_and_api(), &options(&[], &["*.tags=latest", "web.tags=+v2"])).unwrap();
  assert_eq!(plan.resolved["api"].tags, strings(&["latest"]));
  assert_eq!(plan.resolved["web"].tags, strings(&["latest", "v2"]));
}

#[test]
fn last_scalar_override_wins() {
  let plan = load(
    &web_and_api(),
    &options(&[], &["*.dockerfile=a.Dockerfile", "web.dockerfile=b.Dockerfile"]),
  )
  .unwrap();
  assert_eq!(plan.resolved["web"].dockerfile.as_deref(), Some("b.Dockerfile"));
  assert_eq!(plan.resolved["api"].dockerfile.as_deref(), Some("a.Dockerfile"));
}

#[test]
fn bare_field_applies_to_every_target() {
  let plan = load(&web_and_api(), &options(&[], &["args.MODE=ci"])).unwrap();
  assert_eq!(plan.resolved["web"].args["MODE"], "ci");
  assert_eq!(plan.resolved["api"].args["MODE"], "ci");
}

#[test]
fn glob_patterns_select_targets() {
  let files = [json(
    "docker-bake.json",
    json!({"target": {"svc-a": {}, "svc-b": {}, "web": {}}}),
  )];
  let plan = load(&files, &options(&["svc-a", "svc-b", "web"], &["svc-*.target=release"])).unwrap();
  assert_eq!(plan.resolved["svc-a"].target.as_deref(), Some("release"));
  assert_eq!(plan.resolved["svc-b"].target.as_deref(), Some("release"));
  assert_eq!(plan.resolved["web"].target, None);
}

#[test]
fn malformed_override_touches_nothing() {
  let err = load(&web_and_api(), &options(&[], &["*.tags=ok", "web.tags"])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::OverrideSyntax);
  assert!(err.to_string().contains("web.tags"));
}

#[test]
fn unknown_field_names_field_and_pattern() {
  let err = load(&web_and_api(), &options(&[], &["web.colour=blue"])).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  let message = err.to_string();
  assert!(message.contains("colour"));
  assert!(message.contains("web"));
}

#[test]
fn push_and_load_are_mutually_exclusive() {
  let mut opts = options(&[], &["this is not an override"]);
  opts.shorthands = Shorthands {
    push: true,
    load: true,
    ..Default::default()
  };
  let err = load(&web_and_api(), &opts).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::MutualExclusion);
}

#[test]
fn push_forces_a_registry_output() {
  let mut opts = options(&[], &["*.output=type=local,dest=out"]);
  opts.shorthands.push = true;
  let plan = load(&web_and_api(), &opts).unwrap();

  for name in ["web", "api"] {
    let exports = &plan.get(name).unwrap().exports;
    assert_eq!(exports.len(), 1);
    assert!(exports[0].pushes());
  }
}

#[test]
fn load_forces_a_docker_output() {
  let mut opts = options(&[], &[]);
  opts.shorthands.load = true;
  let plan = load(&web_and_api(), &opts).unwrap();
  assert_eq!(plan.get("web").unwrap().exports[0].kind, ExportKind::Docker);
}

#[test]
fn no_cache_and_pull_shorthands() {
  let mut opts = options(&[], &[]);
  opts.shorthands.no_cache = Some(true);
  opts.shorthands.pull = Some(true);
  let plan = load(&web_and_api(), &opts).unwrap();

  let web = plan.get("web").unwrap();
  assert!(web.no_cache);
  assert!(web.pull);
  assert_eq!(plan.resolved["api"].no_cache, Some(true));
}
