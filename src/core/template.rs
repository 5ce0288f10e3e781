// src/core/template.rs

//! Command templates.
//!
//! A template is plain text with placeholders:
//!
//! - `{}` stands for the default attribute (usually `path`)
//! - `{name}` stands for the attribute `name`
//! - `{{` and `}}` are literal braces
//!
//! Any other brace is kept as text, so `awk '{print $1}'` survives untouched.

use crate::core::commons::render_value;
use crate::core::tree::{ElemId, Tree, TreeError};
use serde_yaml::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("attribute \"{0}\" not found for template expansion")]
    MissingAttribute(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Attribute name to content, the values a template can refer to.
pub type Substitutions = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Default,
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while let Some(&c) = chars.get(i) {
            let next = chars.get(i + 1).copied();
            match (c, next) {
                ('{', Some('{')) | ('}', Some('}')) => {
                    text.push(c);
                    i += 2;
                }
                ('{', Some('}')) => {
                    flush_text(&mut text, &mut segments);
                    segments.push(Segment::Default);
                    i += 2;
                }
                ('{', _) => match placeholder_at(&chars, i + 1) {
                    Some((name, end)) => {
                        flush_text(&mut text, &mut segments);
                        segments.push(Segment::Placeholder(name));
                        i = end + 1;
                    }
                    None => {
                        text.push(c);
                        i += 1;
                    }
                },
                _ => {
                    text.push(c);
                    i += 1;
                }
            }
        }
        flush_text(&mut text, &mut segments);
        Self { segments }
    }

    /// True when the template refers to at least one attribute.
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Text(_)))
    }

    /// Renders the template, reading `{}` as `{default}`.
    pub fn render(&self, default: &str, subs: &Substitutions) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Default => out.push_str(&lookup(default, subs)?),
                Segment::Placeholder(name) => out.push_str(&lookup(name, subs)?),
            }
        }
        Ok(out)
    }
}

fn flush_text(text: &mut String, segments: &mut Vec<Segment>) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

/// Scans a placeholder name starting at `start`. Returns the name and the
/// index of the closing brace.
fn placeholder_at(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut name = String::new();
    let mut i = start;
    while let Some(&c) = chars.get(i) {
        match c {
            '}' if !name.is_empty() => return Some((name, i)),
            '{' | '}' => return None,
            c if c.is_whitespace() => return None,
            c => name.push(c),
        }
        i += 1;
    }
    None
}

fn lookup(name: &str, subs: &Substitutions) -> Result<String, TemplateError> {
    subs.get(name)
        .map(render_value)
        .ok_or_else(|| TemplateError::MissingAttribute(name.to_string()))
}

/// Shortcut for parsing and rendering a template string.
pub fn expand(source: &str, default: &str, subs: &Substitutions) -> Result<String, TemplateError> {
    Template::parse(source).render(default, subs)
}

/// True when `source` contains at least one placeholder.
pub fn is_expandable(source: &str) -> bool {
    Template::parse(source).has_placeholders()
}

/// The attributes of a node as a substitution map.
pub fn node_substitutions(tree: &mut Tree, node: ElemId) -> Result<Substitutions, TreeError> {
    Ok(tree.attributes(node)?.into_iter().collect())
}

/// Content of an attribute with every string (or string item) rendered
/// against the attributes of its node, the attribute itself excluded.
pub fn expand_attribute(tree: &mut Tree, attr: ElemId, default: &str) -> Result<Value, TemplateError> {
    let content = tree
        .content(attr)
        .cloned()
        .ok_or_else(|| TreeError::NotAnAttribute(tree.name(attr).to_string()))?;
    let Some(node) = tree.parent(attr) else {
        return Ok(content);
    };
    let mut subs = node_substitutions(tree, node)?;
    subs.remove(tree.name(attr));

    let expand_one = |value: Value| -> Result<Value, TemplateError> {
        match value {
            Value::String(s) if is_expandable(&s) => Ok(Value::String(expand(&s, default, &subs)?)),
            other => Ok(other),
        }
    };
    match content {
        Value::Sequence(items) => Ok(Value::Sequence(
            items
                .into_iter()
                .map(expand_one)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => expand_one(other),
    }
}
