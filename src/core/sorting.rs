// src/core/sorting.rs

//! Sort keys and sorting terms.
//!
//! [`SortKey`] orders attribute content for `list_view(sort_by = ...)`.
//! [`SortTerm`] is the small sorting language used by plugins:
//!
//! - `a.<attr>`: the content of an attribute of the node
//! - `n.<prop>`: a node property (`name`, `path` or `level`)
//! - `f.<func>`: a counting function (`numnode`, `numattr` or `numelem`)
//!
//! Terms are applied in order as stable sorts, so the last term is the
//! primary key.

use crate::core::commons::render_value;
use crate::core::tree::{ElemId, Tree, TreeError};
use serde_yaml::Value;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SortingError {
    #[error("unknown sorting prefix \"{0}\"")]
    UnknownPrefix(String),
    #[error("invalid sorting term \"{0}\", expected <prefix>.<name>")]
    InvalidTerm(String),
    #[error("unknown sorting function \"{0}\"")]
    UnknownFunction(String),
    #[error("unknown node property \"{0}\"")]
    UnknownProperty(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// A comparable view of attribute content.
///
/// Values of different types order as booleans, numbers, text; `Missing`
/// always sorts after everything else.
#[derive(Debug, Clone)]
pub enum SortKey {
    Bool(bool),
    Number(f64),
    Text(String),
    Missing,
}

impl SortKey {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            other => Self::Text(render_value(other)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Missing => 3,
        }
    }

    /// Compares two keys, optionally descending, keeping `Missing` last.
    pub fn compare(&self, other: &Self, desc: bool) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            _ if desc => other.cmp(self),
            _ => self.cmp(other),
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A property of a node that is not stored in its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeProperty {
    Name,
    Path,
    Level,
}

impl FromStr for NodeProperty {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "path" => Ok(Self::Path),
            "level" => Ok(Self::Level),
            _ => Err(SortingError::UnknownProperty(s.to_string())),
        }
    }
}

impl NodeProperty {
    /// Reads the property of `id` as a YAML value.
    pub fn value(self, tree: &Tree, id: ElemId) -> Value {
        match self {
            Self::Name => Value::String(tree.name(id).to_string()),
            Self::Path => Value::String(tree.path(id).join("/")),
            Self::Level => Value::Number(tree.level(id).into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortFunction {
    NumNode,
    NumAttr,
    NumElem,
}

impl FromStr for SortFunction {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numnode" => Ok(Self::NumNode),
            "numattr" => Ok(Self::NumAttr),
            "numelem" => Ok(Self::NumElem),
            _ => Err(SortingError::UnknownFunction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortTerm {
    Attr(String),
    Node(NodeProperty),
    Function(SortFunction),
}

impl FromStr for SortTerm {
    type Err = SortingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, name) = s
            .split_once('.')
            .filter(|(_, name)| !name.is_empty())
            .ok_or_else(|| SortingError::InvalidTerm(s.to_string()))?;
        match prefix {
            "a" => Ok(Self::Attr(name.to_string())),
            "n" => Ok(Self::Node(name.parse()?)),
            "f" => Ok(Self::Function(name.parse()?)),
            _ => Err(SortingError::UnknownPrefix(prefix.to_string())),
        }
    }
}

impl SortTerm {
    /// Computes the key of a node for this term.
    pub fn key(&self, tree: &mut Tree, id: ElemId) -> Result<SortKey, TreeError> {
        match self {
            Self::Attr(name) => tree.sort_key(id, name),
            Self::Node(prop) => Ok(SortKey::from_value(&prop.value(tree, id))),
            Self::Function(func) => {
                let children = tree.children_of(id)?.to_vec();
                let count = match func {
                    SortFunction::NumElem => children.len(),
                    SortFunction::NumNode => children.iter().filter(|c| tree.is_node(**c)).count(),
                    SortFunction::NumAttr => {
                        children.iter().filter(|c| tree.is_attribute(**c)).count()
                    }
                };
                Ok(SortKey::Number(count as f64))
            }
        }
    }
}

/// Parses sorting terms, failing on the first invalid one.
pub fn parse_sorting_terms<S: AsRef<str>>(terms: &[S]) -> Result<Vec<SortTerm>, SortingError> {
    terms.iter().map(|t| t.as_ref().parse()).collect()
}

/// Sorts nodes in place by each term in turn.
pub fn sort_nodes(
    tree: &mut Tree,
    nodes: &mut Vec<ElemId>,
    terms: &[SortTerm],
    desc: bool,
) -> Result<(), SortingError> {
    for term in terms {
        let mut keyed = Vec::with_capacity(nodes.len());
        for id in nodes.iter().copied() {
            keyed.push((term.key(tree, id)?, id));
        }
        keyed.sort_by(|(a, _), (b, _)| a.compare(b, desc));
        *nodes = keyed.into_iter().map(|(_, id)| id).collect();
    }
    Ok(())
}
