//! Applying override directives to resolved targets.

use std::collections::BTreeMap;

use tracing::trace;

use super::OverrideError;
use super::parse::{FieldName, OverrideDirective, OverrideMode, OverrideValue};
use crate::config::Target;
use crate::resolve::merge::extend_unique;

/// Apply directives to targets, strictly in directive order.
///
/// Each directive mutates every target whose name matches its pattern, so for
/// a given target and field the last matching replace wins. A directive whose
/// value does not fit its field is rejected rather than skipped.
pub fn apply_overrides(targets: &mut BTreeMap<String, Target>, directives: &[OverrideDirective]) -> Result<(), OverrideError> {
  for directive in directives {
    for (name, target) in targets.iter_mut() {
      if directive.pattern.matches(name) {
        trace!(target = %name, directive = %directive.raw, "applying override");
        apply_one(target, directive)?;
      }
    }
  }
  Ok(())
}

fn apply_one(target: &mut Target, directive: &OverrideDirective) -> Result<(), OverrideError> {
  let mismatch = || OverrideError::InvalidValue {
    entry: directive.raw.clone(),
    field: directive.field.to_string(),
    reason: format!("{} value does not fit the field", value_kind(&directive.value)),
  };

  match directive.field {
    FieldName::Context => target.context = Some(text(&directive.value).ok_or_else(mismatch)?),
    FieldName::Dockerfile => target.dockerfile = Some(text(&directive.value).ok_or_else(mismatch)?),
    FieldName::Target => target.target = Some(text(&directive.value).ok_or_else(mismatch)?),
    FieldName::Network => target.network = Some(text(&directive.value).ok_or_else(mismatch)?),
    FieldName::Pull => target.pull = Some(boolean(&directive.value).ok_or_else(mismatch)?),
    FieldName::NoCache => target.no_cache = Some(boolean(&directive.value).ok_or_else(mismatch)?),
    FieldName::Args => {
      let (key, value) = entry(&directive.value).ok_or_else(mismatch)?;
      target.args.insert(key, value);
    }
    FieldName::Labels => {
      let (key, value) = entry(&directive.value).ok_or_else(mismatch)?;
      target.labels.insert(key, value);
    }
    FieldName::Tags => apply_list(&mut target.tags, directive).ok_or_else(mismatch)?,
    FieldName::CacheFrom => apply_list(&mut target.cache_from, directive).ok_or_else(mismatch)?,
    FieldName::CacheTo => apply_list(&mut target.cache_to, directive).ok_or_else(mismatch)?,
    FieldName::Secret => apply_list(&mut target.secret, directive).ok_or_else(mismatch)?,
    FieldName::Ssh => apply_list(&mut target.ssh, directive).ok_or_else(mismatch)?,
    FieldName::Platforms => apply_list(&mut target.platforms, directive).ok_or_else(mismatch)?,
    FieldName::Output => apply_list(&mut target.output, directive).ok_or_else(mismatch)?,
  }
  Ok(())
}

fn text(value: &OverrideValue) -> Option<String> {
  match value {
    OverrideValue::Text(s) => Some(s.clone()),
    _ => None,
  }
}

fn boolean(value: &OverrideValue) -> Option<bool> {
  match value {
    OverrideValue::Bool(b) => Some(*b),
    _ => None,
  }
}

fn entry(value: &OverrideValue) -> Option<(String, String)> {
  match value {
    OverrideValue::Entry { key, value } => Some((key.clone(), value.clone())),
    _ => None,
  }
}

fn apply_list(list: &mut Vec<String>, directive: &OverrideDirective) -> Option<()> {
  let OverrideValue::List(values) = &directive.value else {
    return None;
  };
  if directive.mode == OverrideMode::Replace {
    list.clear();
  }
  extend_unique(list, values);
  Some(())
}

fn value_kind(value: &OverrideValue) -> &'static str {
  match value {
    OverrideValue::Text(_) => "text",
    OverrideValue::Bool(_) => "boolean",
    OverrideValue::List(_) => "list",
    OverrideValue::Entry { .. } => "mapping entry",
  }
}
