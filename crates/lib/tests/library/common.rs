//! Shared helpers for library integration tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use bake_lib::plan::BuildPlan;
use bake_lib::source::ConfigFile;
use bake_lib::{BakeError, BakeOptions, CancelToken, consts, load_plan};

/// A JSON configuration document.
pub fn json(name: &str, value: serde_json::Value) -> ConfigFile {
  ConfigFile::new(name, value.to_string())
}

pub fn strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|s| s.to_string()).collect()
}

/// Options with a fixed working directory and no environment.
pub fn options(targets: &[&str], overrides: &[&str]) -> BakeOptions {
  BakeOptions {
    targets: strings(targets),
    overrides: strings(overrides),
    cmd_context: consts::DEFAULT_CMD_CONTEXT.to_string(),
    env: BTreeMap::new(),
    working_dir: PathBuf::from("/work"),
    ..Default::default()
  }
}

pub fn load(files: &[ConfigFile], options: &BakeOptions) -> Result<BuildPlan, BakeError> {
  load_plan(files, None, options, &CancelToken::new())
}
