// src/core/commons.rs

// Helpers shared by the tree, the listings and the template renderer.

use serde_yaml::Value;

/// Renders attribute content the way it appears in listings and commands.
///
/// Strings are used verbatim, numbers and booleans through their textual form,
/// null as an empty string and lists as their items joined by single spaces.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Mapping(_) | Value::Tagged(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Returns true for content that can be printed on a single listing line.
pub fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

/// Returns the element name for a mapping key, or `None` for keys that
/// cannot name an element (mappings, lists, tagged values, null).
pub fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parses a command-line argument as YAML so that `3` becomes a number and
/// `true` a boolean. Anything that is not a plain scalar stays a string.
pub fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value) if is_scalar(&value) && !value.is_null() => value,
        _ => Value::String(raw.to_string()),
    }
}
