//! Configuration utility functions.

use std::path::{Path, PathBuf};

use crate::matcher::PathMatcher;

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["bale.toml", "bale.properties"];

/// Find the config file for a project
///
/// Looks directly in the project root first, then anywhere below it
/// (e.g. `src/main/resources/bale.toml`). Returns the first match.
///
/// # Example
/// ```text
/// /home/user/shop/                          ← root
/// /home/user/shop/src/main/resources/bale.toml ← found!
/// ```
pub fn find_config_file(root: &Path, matcher: &dyn PathMatcher) -> Option<PathBuf> {
    for name in CONFIG_FILE_NAMES {
        let candidate = root.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    CONFIG_FILE_NAMES
        .iter()
        .find_map(|name| matcher.find(&format!("**/{name}"), root).into_iter().next())
}

/// Flatten a TOML table into dotted keys
///
/// `[js.asset] vendor = [..]` and `"js.asset.vendor" = [..]` both produce
/// `js.asset.vendor`. Scalars are stringified; arrays become lists.
/// Returns the offending key when an array holds tables or nested arrays.
pub fn flatten_toml(
    prefix: &str,
    table: &toml::Table,
    out: &mut Vec<(String, super::ConfigValue)>,
) -> Result<(), String> {
    use super::ConfigValue;
    use toml::Value;

    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(inner) => flatten_toml(&full, inner, out)?,
            Value::Array(items) => {
                let items = items
                    .iter()
                    .map(toml_scalar)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| full.clone())?;
                out.push((full, ConfigValue::List(items)));
            }
            other => {
                let scalar = toml_scalar(other).ok_or_else(|| full.clone())?;
                out.push((full, ConfigValue::Scalar(scalar)));
            }
        }
    }
    Ok(())
}

fn toml_scalar(value: &toml::Value) -> Option<String> {
    use toml::Value;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// Parse a Java-style properties document
///
/// Supports `key = value` and `key: value`, `#`/`!` comments, trailing `\`
/// line continuations and comma-separated lists. Repeated keys append.
/// Errors carry the 1-based line number.
pub fn parse_properties(
    source: &str,
    out: &mut Vec<(String, super::ConfigValue)>,
) -> Result<(), (usize, String)> {
    use super::ConfigValue;

    let mut pending = String::new();
    let mut start_line = 0;

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if pending.is_empty() {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            start_line = idx + 1;
        }

        if let Some(body) = line.strip_suffix('\\') {
            pending.push_str(body);
            continue;
        }
        pending.push_str(line);
        let logical = std::mem::take(&mut pending);

        let Some(split) = logical.find(['=', ':']) else {
            return Err((start_line, format!("expected `key = value`, found `{logical}`")));
        };
        let key = logical[..split].trim();
        if key.is_empty() {
            return Err((start_line, "missing key".into()));
        }
        let raw_value = logical[split + 1..].trim();
        let value = if raw_value.contains(',') {
            ConfigValue::List(
                raw_value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )
        } else {
            ConfigValue::Scalar(raw_value.to_string())
        };

        match out.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => existing.append(value),
            None => out.push((key.to_string(), value)),
        }
    }

    if !pending.is_empty() {
        return Err((start_line, "unterminated line continuation".into()));
    }
    Ok(())
}

// ============================================================================
// tests
// ============================================================================
