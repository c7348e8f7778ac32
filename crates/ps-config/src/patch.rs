//! Key-path resolution and replacement inside `serde_json::Value` documents.

use crate::{ConfigError, ConfigResult};
use ps_core::KeyPath;
use serde_json::Value;

fn step<'a>(node: &'a Value, path: &KeyPath, segment: &str) -> ConfigResult<&'a Value> {
    let next = match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => {
            return Err(ConfigError::NotAContainer {
                path: path.dotted(),
                segment: segment.to_string(),
            });
        }
    };
    next.ok_or_else(|| ConfigError::UnresolvedKeyPath {
        path: path.dotted(),
        segment: segment.to_string(),
    })
}

fn step_mut<'a>(node: &'a mut Value, path: &KeyPath, segment: &str) -> ConfigResult<&'a mut Value> {
    let next = match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(i) => items.get_mut(i),
            Err(_) => None,
        },
        _ => {
            return Err(ConfigError::NotAContainer {
                path: path.dotted(),
                segment: segment.to_string(),
            });
        }
    };
    next.ok_or_else(|| ConfigError::UnresolvedKeyPath {
        path: path.dotted(),
        segment: segment.to_string(),
    })
}

/// Follow `path` from `doc`. Every segment must exist.
pub fn resolve<'a>(doc: &'a Value, path: &KeyPath) -> ConfigResult<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |node, segment| step(node, path, segment))
}

/// Replace the existing value at `path` with `value`.
pub fn set_at(doc: &mut Value, path: &KeyPath, value: Value) -> ConfigResult<()> {
    let mut node = doc;
    for segment in path.segments() {
        node = step_mut(node, path, segment)?;
    }
    *node = value;
    Ok(())
}
