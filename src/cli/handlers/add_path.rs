// src/cli/handlers/add_path.rs

use crate::cli::handlers::commons::describe_target;
use crate::constants::DEFAULT_ATTR_NAME;
use crate::core::indexer::{Target, locate};
use crate::core::listing::{ListOptions, Lines};
use crate::core::paths::expand_path;
use crate::core::tree::{Tree, TreeError};
use crate::state::AppState;
use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct AddPathArgs {
    /// Names or numbers identifying the node to add to.
    pub names: Vec<String>,

    /// The path to record. `~` and environment variables are expanded.
    #[arg(short, long)]
    pub path: String,

    /// Name of the new node. Defaults to the last component of the path.
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Adds a node holding an absolute `path` attribute under the resolved node.
pub fn add_path(tree: &mut Tree, args: &AddPathArgs) -> Result<String> {
    let path = expand_path(&args.path)?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => default_name(&path)
            .ok_or_else(|| anyhow!(t!("add_path.error.no_name"), path = args.path))?,
    };

    let mut scratch = Lines::new();
    let resolution = locate(tree, &args.names, &ListOptions::default(), &mut scratch)?;
    let node = match resolution.target {
        Target::Element(id) if tree.is_node(id) => id,
        target => {
            return Err(TreeError::NotANode(tree.name(target.elem()).to_string()).into());
        }
    };

    let mut content = Mapping::new();
    content.insert(
        Value::String(DEFAULT_ATTR_NAME.to_string()),
        Value::String(path.display().to_string()),
    );
    let child = tree.add(node, &name, Value::Mapping(content))?;
    Ok(describe_target(tree, Target::Element(child)))
}

fn default_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let add_args = AddPathArgs::try_parse_from(&args)?;
    log::debug!("add-path args: {:?}", add_args);

    let added = add_path(state.bucket()?.tree_mut(), &add_args)?;
    println!(
        "{} {}",
        "✔".green(),
        format_args!(t!("add.success"), path = added.cyan())
    );
    Ok(())
}
