// src/core/search.rs

//! Node search terms.
//!
//! A search term looks like a path: `a.genre=scifi&a.genre=horror/nx.level=2`.
//!
//! - `/` separates components; a node must match every component.
//! - `&` separates sub-terms inside a component; any one of them may match.
//! - A sub-term is `<prefix>.<name>=<value>` where the prefix is `a`
//!   (attribute content contains value), `ax` (attribute content equals
//!   value), `n` (node property contains value) or `nx` (node property
//!   equals value). Node properties are `name`, `path` and `level`.
//!
//! Boolean contents compare against `true/yes/1` and `false/no/0`; list
//! contents match when any item does.

use crate::core::commons::render_value;
use crate::core::sorting::NodeProperty;
use crate::core::tree::{ElemId, Tree, TreeError};
use serde_yaml::Value;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("unknown prefix {0}")]
    UnknownPrefix(String),
    #[error("no prefix specified")]
    NoPrefix,
    #[error("invalid search sub-term {0}")]
    InvalidSubTerm(String),
    #[error("unknown node property \"{0}\"")]
    UnknownProperty(String),
    #[error("empty search term")]
    EmptyTerm,
    #[error(transparent)]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Attr(String),
    Node(NodeProperty),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SubTerm {
    source: Source,
    value: String,
    exact: bool,
}

impl FromStr for SubTerm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| SearchError::InvalidSubTerm(s.to_string()))?;
        let (prefix, name) = key.split_once('.').ok_or(SearchError::NoPrefix)?;
        if name.is_empty() {
            return Err(SearchError::InvalidSubTerm(s.to_string()));
        }
        let (source, exact) = match prefix {
            "a" | "ax" => (Source::Attr(name.to_string()), prefix == "ax"),
            "n" | "nx" => {
                let prop = name
                    .parse()
                    .map_err(|_| SearchError::UnknownProperty(name.to_string()))?;
                (Source::Node(prop), prefix == "nx")
            }
            _ => return Err(SearchError::UnknownPrefix(prefix.to_string())),
        };
        Ok(Self {
            source,
            value: value.to_string(),
            exact,
        })
    }
}

impl SubTerm {
    fn matches(&self, tree: &mut Tree, node: ElemId, ignore_case: bool) -> Result<bool, TreeError> {
        let value = match &self.source {
            Source::Attr(name) => match tree.attribute(node, name)? {
                Some(attr) => tree.content(attr).cloned().unwrap_or(Value::Null),
                None => return Ok(false),
            },
            Source::Node(prop) => prop.value(tree, node),
        };
        Ok(match_value(&value, &self.value, self.exact, ignore_case))
    }
}

/// A parsed search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    components: Vec<Vec<SubTerm>>,
}

impl FromStr for SearchTerm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = Vec::new();
        for component in s.split('/') {
            let sub_terms = component
                .split('&')
                .map(str::trim)
                .filter(|sub| !sub.is_empty())
                .map(str::parse::<SubTerm>)
                .collect::<Result<Vec<SubTerm>, _>>()?;
            if !sub_terms.is_empty() {
                components.push(sub_terms);
            }
        }
        if components.is_empty() {
            return Err(SearchError::EmptyTerm);
        }
        Ok(Self { components })
    }
}

impl SearchTerm {
    /// True when the node satisfies every component.
    pub fn matches(&self, tree: &mut Tree, node: ElemId, ignore_case: bool) -> Result<bool, TreeError> {
        for component in &self.components {
            let mut any = false;
            for sub in component {
                if sub.matches(tree, node, ignore_case)? {
                    any = true;
                    break;
                }
            }
            if !any {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Finds every node below the root that matches `term`, breadth first.
pub fn search_nodes(tree: &mut Tree, term: &SearchTerm, ignore_case: bool) -> Result<Vec<ElemId>, SearchError> {
    let mut found = Vec::new();
    for node in tree.descendant_nodes()? {
        if term.matches(tree, node, ignore_case)? {
            found.push(node);
        }
    }
    log::debug!("Search matched {} nodes.", found.len());
    Ok(found)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn match_text(text: &str, wanted: &str, exact: bool, ignore_case: bool) -> bool {
    let (text, wanted) = if ignore_case {
        (text.to_lowercase(), wanted.to_lowercase())
    } else {
        (text.to_string(), wanted.to_string())
    };
    if exact {
        text == wanted
    } else {
        text.contains(&wanted)
    }
}

fn match_value(value: &Value, wanted: &str, exact: bool, ignore_case: bool) -> bool {
    match value {
        Value::Null | Value::Mapping(_) | Value::Tagged(_) => false,
        Value::Bool(b) => parse_bool(wanted) == Some(*b),
        Value::Sequence(items) => items
            .iter()
            .any(|item| !item.is_sequence() && match_value(item, wanted, exact, ignore_case)),
        scalar => match_text(&render_value(scalar), wanted, exact, ignore_case),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Tree {
        Tree::new(
            serde_yaml::from_str(
                r#"
                films:
                  inception: {year: 2010, genre: [scifi, thriller], seen: yes}
                  alien: {year: 1979, genre: [scifi, horror], seen: false}
                  heat: {year: 1995, genre: [crime]}
                books:
                  dune: {year: 1965, genre: [scifi]}
                "#,
            )
            .unwrap(),
        )
    }

    fn names(tree: &Tree, ids: &[ElemId]) -> Vec<String> {
        ids.iter().map(|id| tree.name(*id).to_string()).collect()
    }

    fn search(tree: &mut Tree, term: &str) -> Vec<String> {
        let term: SearchTerm = term.parse().unwrap();
        let found = search_nodes(tree, &term, false).unwrap();
        names(tree, &found)
    }

    #[test]
    fn test_components_are_and_sub_terms_are_or() {
        let mut tree = library();
        assert_eq!(
            search(&mut tree, "a.genre=thriller&a.genre=horror"),
            vec!["inception", "alien"]
        );
        assert_eq!(
            search(&mut tree, "a.genre=scifi/nx.level=2"),
            vec!["inception", "alien", "dune"]
        );
        assert_eq!(search(&mut tree, "a.genre=scifi/n.path=books"), vec!["dune"]);
    }

    #[test]
    fn test_exact_and_contains() {
        let mut tree = library();
        assert_eq!(search(&mut tree, "a.year=19"), vec!["alien", "heat", "dune"]);
        assert!(search(&mut tree, "ax.year=19").is_empty());
        assert_eq!(search(&mut tree, "ax.year=1995"), vec!["heat"]);
        assert_eq!(search(&mut tree, "nx.name=films"), vec!["films"]);
    }

    #[test]
    fn test_boolean_matching() {
        let mut tree = library();
        assert_eq!(search(&mut tree, "a.seen=yes"), vec!["inception"]);
        assert_eq!(search(&mut tree, "a.seen=0"), vec!["alien"]);
    }

    #[test]
    fn test_ignore_case() {
        let mut tree = library();
        let term: SearchTerm = "a.genre=SCIFI".parse().unwrap();
        assert!(search_nodes(&mut tree, &term, false).unwrap().is_empty());
        assert_eq!(search_nodes(&mut tree, &term, true).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "x.genre=scifi".parse::<SearchTerm>(),
            Err(SearchError::UnknownPrefix(p)) if p == "x"
        ));
        assert!(matches!(
            "genre=scifi".parse::<SearchTerm>(),
            Err(SearchError::NoPrefix)
        ));
        assert!(matches!(
            "a.genre".parse::<SearchTerm>(),
            Err(SearchError::InvalidSubTerm(_))
        ));
        assert!(matches!(
            "n.colour=red".parse::<SearchTerm>(),
            Err(SearchError::UnknownProperty(_))
        ));
        assert!(matches!("/".parse::<SearchTerm>(), Err(SearchError::EmptyTerm)));
    }
}
