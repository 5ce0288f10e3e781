// src/core/listing.rs

//! Listing output.
//!
//! Listings never print directly. Every line goes into a [`Lines`] sink and
//! the caller decides when to flush it, which keeps the order of lines intact
//! even when a lookup fails halfway through a path.

use crate::constants::{DEFAULT_ATTR_NAME, INDENT_UNIT};
use crate::core::commons::render_value;
use crate::core::indexer::Target;
use crate::core::template::{TemplateError, expand_attribute};
use crate::core::tree::{ElemId, Tree, TreeError, ViewOptions};
use serde_yaml::Value;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Options shared by path resolution and listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Print the path leading to the target and indent by depth.
    pub show_path: bool,
    /// Render attribute templates before printing them.
    pub expand: bool,
    pub view: ViewOptions,
}

/// An ordered buffer of output lines.
#[derive(Debug, Default)]
pub struct Lines {
    lines: Vec<String>,
}

impl Lines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Writes every buffered line to `out` and empties the buffer.
    pub fn flush_to(&mut self, out: &mut impl Write) -> io::Result<()> {
        for line in self.lines.drain(..) {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }

    /// Flushes to stdout. Write errors (a closed pipe, say) are dropped.
    pub fn flush(&mut self) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = self.flush_to(&mut handle) {
            log::debug!("Could not write listing: {}", e);
        }
    }
}

pub(crate) fn indent(level: usize) -> String {
    INDENT_UNIT.repeat(level)
}

fn ordinal_width(count: usize) -> usize {
    count.to_string().len()
}

/// Emits the name of a non-root node, indented one level less than its
/// children.
pub fn path_header(tree: &Tree, node: ElemId, lines: &mut Lines) {
    if tree.is_root(node) {
        return;
    }
    let level = tree.level(node);
    lines.push(format!("{}{}", indent(level - 1), tree.name(node)));
}

/// Lists the children of a node as numbered lines.
pub fn list_node(
    tree: &mut Tree,
    node: ElemId,
    options: &ListOptions,
    lines: &mut Lines,
) -> Result<(), ListingError> {
    if options.show_path {
        path_header(tree, node, lines);
    }
    let prefix = if options.show_path {
        indent(tree.level(node))
    } else {
        String::new()
    };
    let elems = tree.list_view(node, &options.view)?;
    let width = ordinal_width(elems.len());
    for (num, elem) in elems.iter().enumerate() {
        lines.push(format!(
            "{}{:>width$} [{}] {}",
            prefix,
            num + 1,
            tree.kind_initial(*elem),
            tree.name(*elem),
            width = width
        ));
    }
    Ok(())
}

/// Lists the content of a whole attribute.
pub fn list_attribute(
    tree: &mut Tree,
    attr: ElemId,
    options: &ListOptions,
    lines: &mut Lines,
) -> Result<(), ListingError> {
    let prefix = if options.show_path {
        indent(tree.level(attr))
    } else {
        String::new()
    };
    let content = if options.expand {
        expand_attribute(tree, attr, DEFAULT_ATTR_NAME)?
    } else {
        tree.content(attr)
            .cloned()
            .ok_or_else(|| TreeError::NotAnAttribute(tree.name(attr).to_string()))?
    };
    let name = tree.name(attr);

    match &content {
        Value::Sequence(items) => {
            lines.push(format!("{}{}:", prefix, name));
            let width = ordinal_width(items.len());
            for (num, item) in items.iter().enumerate() {
                lines.push(format!(
                    "{}{}{:>width$} {}",
                    prefix,
                    INDENT_UNIT,
                    num + 1,
                    render_value(item),
                    width = width
                ));
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            lines.push(format!("{}{}: {}", prefix, name, render_value(&content)));
        }
        Value::Mapping(_) | Value::Tagged(_) => return Err(TreeError::UnknownAttributeContent.into()),
    }
    Ok(())
}

/// Lists whatever a path resolved to. A pinned item was already printed
/// while resolving, so it adds nothing.
pub fn list_target(
    tree: &mut Tree,
    target: Target,
    options: &ListOptions,
    lines: &mut Lines,
) -> Result<(), ListingError> {
    match target {
        Target::Item { .. } => Ok(()),
        Target::Element(id) if tree.is_node(id) => list_node(tree, id, options, lines),
        Target::Element(id) => list_attribute(tree, id, options, lines),
    }
}
