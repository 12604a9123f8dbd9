//! Implementation of the `bake print` command.
//!
//! Resolves targets and prints the build definition as JSON without
//! building anything.

use anyhow::{Context, Result};

use bake_lib::CancelToken;

use super::{CommonArgs, load};
use crate::output::print_json;

pub fn cmd_print(args: CommonArgs) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let plan = rt.block_on(load(&args, &CancelToken::new()))?;
  print_json(&plan.document())
}
