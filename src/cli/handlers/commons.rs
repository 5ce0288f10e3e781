// src/cli/handlers/commons.rs

// Shared helpers for the command handlers.

use crate::constants::{PLACEHOLDER_NAME, ROOT_NODE_NAME};
use crate::core::commons::parse_scalar;
use crate::core::indexer::Target;
use crate::core::listing::Lines;
use crate::core::tree::Tree;
use scopeguard::ScopeGuard;
use serde_yaml::{Mapping, Value};

/// Listing output that reaches stdout when the handler returns, on success
/// and on error alike.
pub type Output = ScopeGuard<Lines, fn(Lines)>;

fn flush_lines(mut lines: Lines) {
    lines.flush();
}

pub fn output() -> Output {
    scopeguard::guard(Lines::new(), flush_lines as fn(Lines))
}

/// Turns `-c` values into element content: one value is a scalar, several a
/// list, none a fresh node holding only the placeholder.
pub fn parse_content(values: &[String]) -> Value {
    match values {
        [] => {
            let mut mapping = Mapping::new();
            mapping.insert(
                Value::String(PLACEHOLDER_NAME.to_string()),
                Value::String(String::new()),
            );
            Value::Mapping(mapping)
        }
        [single] => parse_scalar(single),
        many => Value::Sequence(many.iter().map(|v| parse_scalar(v)).collect()),
    }
}

/// A human-readable location for messages: `films/alien`, `films/alien/tags[2]`
/// or `(root)`.
pub fn describe_target(tree: &Tree, target: Target) -> String {
    let path = tree.path(target.elem());
    let base = if path.is_empty() {
        ROOT_NODE_NAME.to_string()
    } else {
        path.join("/")
    };
    match target {
        Target::Element(_) => base,
        Target::Item { index, .. } => format!("{}[{}]", base, index),
    }
}
