// src/core/plugins.rs

//! Extra consumers of a bucket's tree, run with `momo pl <plugin> [args...]`.

use crate::core::bucket::Bucket;
use crate::core::indexer::{Target, locate};
use crate::core::listing::{ListOptions, ListingError, Lines};
use crate::core::search::{SearchError, SearchTerm, search_nodes};
use crate::core::sorting::{SortingError, parse_sorting_terms, sort_nodes};
use crate::core::tree::TreeError;
use crate::models::PluginConfig;
use clap::Parser;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("unknown plugin {0}")]
    UnknownPlugin(String),
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Sorting(#[from] SortingError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Plugin {
    fn name(&self) -> &'static str;

    /// Runs the plugin. Output goes into `lines`.
    fn run(
        &self,
        bucket: &mut Bucket,
        args: &[String],
        config: &PluginConfig,
        lines: &mut Lines,
    ) -> Result<(), PluginError>;
}

impl std::fmt::Debug for dyn Plugin + Sync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin").field("name", &self.name()).finish()
    }
}

// --- Registry ---

static PLUGIN_REGISTRY: &[&(dyn Plugin + Sync)] = &[&SearchPlugin, &JsonPlugin];

/// Finds a plugin by name.
pub fn find_plugin(name: &str) -> Result<&'static (dyn Plugin + Sync), PluginError> {
    PLUGIN_REGISTRY
        .iter()
        .copied()
        .find(|plugin| plugin.name() == name)
        .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))
}

pub fn plugin_names() -> impl Iterator<Item = &'static str> {
    PLUGIN_REGISTRY.iter().map(|plugin| plugin.name())
}

// --- search ---

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, name = "search")]
struct SearchArgs {
    /// The search term, e.g. `a.genre=scifi/nx.level=2`.
    term: String,

    /// Sorting term applied to the matches. Repeatable.
    #[arg(short = 's', long = "sort")]
    sort: Vec<String>,

    /// Sort in descending order.
    #[arg(short, long)]
    desc: bool,

    /// Match case-insensitively.
    #[arg(short, long)]
    ignore_case: bool,
}

/// Prints `<ordinal> <path>` for every node matching a search term.
#[derive(Debug)]
pub struct SearchPlugin;

impl Plugin for SearchPlugin {
    fn name(&self) -> &'static str {
        "search"
    }

    fn run(
        &self,
        bucket: &mut Bucket,
        args: &[String],
        config: &PluginConfig,
        lines: &mut Lines,
    ) -> Result<(), PluginError> {
        let args = SearchArgs::try_parse_from(args)?;
        let term: SearchTerm = args.term.parse()?;
        let sorting = if args.sort.is_empty() {
            parse_sorting_terms(&config.sorting_terms)?
        } else {
            parse_sorting_terms(&args.sort)?
        };

        let tree = bucket.tree_mut();
        let mut found = search_nodes(tree, &term, args.ignore_case || config.ignore_case)?;
        sort_nodes(tree, &mut found, &sorting, args.desc)?;

        let width = found.len().to_string().len();
        for (i, id) in found.iter().enumerate() {
            lines.push(format!(
                "{:>width$} {}",
                i + 1,
                tree.path(*id).join("/"),
                width = width
            ));
        }
        Ok(())
    }
}

// --- json ---

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, name = "json")]
struct JsonArgs {
    /// Path to the element to print. Empty prints the whole bucket.
    names: Vec<String>,
}

/// Prints the bucket, or one element of it, as pretty JSON.
#[derive(Debug)]
pub struct JsonPlugin;

impl Plugin for JsonPlugin {
    fn name(&self) -> &'static str {
        "json"
    }

    fn run(
        &self,
        bucket: &mut Bucket,
        args: &[String],
        _config: &PluginConfig,
        lines: &mut Lines,
    ) -> Result<(), PluginError> {
        let args = JsonArgs::try_parse_from(args)?;
        let tree = bucket.tree_mut();
        // Lines emitted while resolving are not part of the JSON output.
        let mut scratch = Lines::new();
        let resolution = locate(tree, &args.names, &ListOptions::default(), &mut scratch)?;

        let value = match resolution.target {
            Target::Element(id) if tree.is_node(id) => {
                tree.expand_all()?;
                tree.node_value(id)
            }
            Target::Element(id) => tree.content(id).cloned().unwrap_or(Value::Null),
            Target::Item { attr, index } => tree.item(attr, index)?.clone(),
        };
        lines.push(serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::YamlDocument;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn bucket(dir: &TempDir) -> Bucket {
        let path = dir.path().join("library.yml");
        fs::write(
            &path,
            r#"
films:
  inception: {year: 2010, genre: [scifi, thriller]}
  alien: {year: 1979, genre: [scifi, horror]}
  heat: {year: 1995, genre: [crime]}
books:
  dune: {year: 1965, genre: [scifi]}
"#,
        )
        .unwrap();
        Bucket::open(Box::new(YamlDocument::new("library", &path)), true).unwrap()
    }

    fn run(plugin: &str, args: &[&str], config: &PluginConfig) -> Vec<String> {
        let dir = tempdir().unwrap();
        let mut bucket = bucket(&dir);
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut lines = Lines::new();
        find_plugin(plugin)
            .unwrap()
            .run(&mut bucket, &args, config, &mut lines)
            .unwrap();
        lines.as_slice().to_vec()
    }

    #[test]
    fn test_search_prints_ordinals_and_paths() {
        let lines = run("search", &["a.genre=scifi"], &PluginConfig::default());
        assert_eq!(
            lines,
            vec!["1 films/inception", "2 films/alien", "3 books/dune"]
        );
    }

    #[test]
    fn test_search_sorting_from_args_and_config() {
        let lines = run(
            "search",
            &["a.genre=scifi", "-s", "a.year", "-d"],
            &PluginConfig::default(),
        );
        assert_eq!(
            lines,
            vec!["1 films/inception", "2 films/alien", "3 books/dune"]
        );

        let config = PluginConfig {
            ignore_case: true,
            sorting_terms: vec!["a.year".to_string()],
        };
        let lines = run("search", &["a.genre=SCIFI"], &config);
        assert_eq!(
            lines,
            vec!["1 books/dune", "2 films/alien", "3 films/inception"]
        );
    }

    #[test]
    fn test_json_prints_subtree() {
        let lines = run("json", &["films", "heat"], &PluginConfig::default());
        let parsed: serde_json::Value = serde_json::from_str(&lines.join("\n")).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"year": 1995, "genre": ["crime"]})
        );

        let lines = run("json", &["films", "alien", "genre", "2"], &PluginConfig::default());
        assert_eq!(lines, vec!["\"horror\""]);
    }

    #[test]
    fn test_unknown_plugin() {
        let err = find_plugin("web").unwrap_err();
        assert_eq!(err.to_string(), "unknown plugin web");
        assert_eq!(plugin_names().collect::<Vec<_>>(), vec!["search", "json"]);
    }

    #[test]
    fn test_bad_search_term_is_reported() {
        let dir = tempdir().unwrap();
        let mut bucket = bucket(&dir);
        let mut lines = Lines::new();
        let err = SearchPlugin
            .run(
                &mut bucket,
                &["q.x=1".to_string()],
                &PluginConfig::default(),
                &mut lines,
            )
            .unwrap_err();
        assert!(matches!(err, PluginError::Search(SearchError::UnknownPrefix(_))));
    }
}
