use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quotewise_core::domain::inputs::{Currency, ProjectInputs};
use serde_json::Value;

/// Reads project inputs from a JSON or TOML file (chosen by extension).
///
/// A missing `currency` falls back to `default_currency`. Numeric fields are
/// clamped before the inputs are returned.
pub fn load_inputs(path: &Path, default_currency: Currency) -> Result<ProjectInputs> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read input file `{}`", path.display()))?;

    let mut document = if is_toml(path) {
        toml::from_str::<Value>(&raw)
            .with_context(|| format!("could not parse TOML input `{}`", path.display()))?
    } else {
        serde_json::from_str::<Value>(&raw)
            .with_context(|| format!("could not parse JSON input `{}`", path.display()))?
    };

    let Some(fields) = document.as_object_mut() else {
        bail!("input `{}` must be a table of project fields", path.display());
    };
    fields
        .entry("currency")
        .or_insert_with(|| Value::String(default_currency.code().to_string()));

    let inputs = serde_json::from_value::<ProjectInputs>(document)
        .with_context(|| format!("invalid project inputs in `{}`", path.display()))?;
    Ok(inputs.clamped())
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
