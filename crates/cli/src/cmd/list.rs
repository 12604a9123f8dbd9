//! Implementation of the `bake list` command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::{OwoColorize, Stream};

use bake_lib::BakeError;
use bake_lib::config::parse_file;
use bake_lib::resolve::DeclarationTable;
use bake_lib::source::split_positional;

use super::{FileArgs, read_files};
use crate::output::{OutputFormat, print_info, print_json};

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
  #[command(flatten)]
  pub files: FileArgs,

  /// Output format
  #[arg(long, value_enum, default_value_t)]
  pub format: OutputFormat,

  /// Remote location to read bake files from
  #[arg(value_name = "REMOTE")]
  pub remote: Option<String>,
}

pub fn cmd_list(args: ListArgs) -> Result<()> {
  let positional = split_positional(args.remote.as_slice());
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let (files, _) = rt.block_on(read_files(&args.files, positional.url.as_deref()))?;

  let mut sources = Vec::with_capacity(files.len());
  for file in &files {
    sources.push(parse_file(file).map_err(BakeError::from)?);
  }
  let table = DeclarationTable::from_sources(&sources).map_err(BakeError::from)?;

  let groups: BTreeMap<&str, &[String]> = table.groups().map(|g| (g.name.as_str(), g.targets.as_slice())).collect();
  let targets: Vec<&str> = table.targets().map(|t| t.name.as_str()).collect();

  if args.format.is_json() {
    return print_json(&serde_json::json!({ "groups": groups, "targets": targets }));
  }

  if groups.is_empty() && targets.is_empty() {
    print_info("No groups or targets declared.");
    return Ok(());
  }

  if !groups.is_empty() {
    println!("{}", "GROUPS".if_supports_color(Stream::Stdout, |s| s.bold()));
    for (name, members) in &groups {
      println!(
        "  {} {}",
        name,
        members.join(", ").if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
    }
  }
  if !targets.is_empty() {
    if !groups.is_empty() {
      println!();
    }
    println!("{}", "TARGETS".if_supports_color(Stream::Stdout, |s| s.bold()));
    for name in &targets {
      println!("  {}", name);
    }
  }

  Ok(())
}
