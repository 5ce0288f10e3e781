// src/cli/handlers/remove.rs

use crate::cli::handlers::commons::describe_target;
use crate::core::indexer::{Resolution, Target, locate};
use crate::core::listing::{ListOptions, Lines};
use crate::core::tree::Tree;
use crate::state::AppState;
use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct RemoveArgs {
    /// Names or numbers identifying the element to remove.
    pub names: Vec<String>,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Resolves the element to remove. The root cannot be removed.
fn resolve(tree: &mut Tree, names: &[String]) -> Result<Resolution> {
    let mut scratch = Lines::new();
    let resolution = locate(tree, names, &ListOptions::default(), &mut scratch)?;
    if resolution.parent.is_none() {
        return Err(anyhow!(t!("remove.error.root")));
    }
    Ok(resolution)
}

/// Removes a resolved element from its parent, or an item from its list.
fn remove(tree: &mut Tree, resolution: Resolution) -> Result<()> {
    match (resolution.target, resolution.parent) {
        (Target::Item { attr, index }, _) => {
            tree.delete_item(attr, index)?;
        }
        (Target::Element(id), Some(parent)) => {
            let name = tree.name(id).to_string();
            tree.delete(parent, &name)?;
        }
        (Target::Element(_), None) => return Err(anyhow!(t!("remove.error.root"))),
    }
    Ok(())
}

/// Encapsulates the logic for user confirmation.
fn confirm_remove(label: &str) -> Result<bool> {
    let prompt = format!(t!("remove.prompt.are_you_sure"), path = label);
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}", t!("common.info.operation_cancelled"));
    }
    Ok(confirmed)
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let remove_args = RemoveArgs::try_parse_from(&args)?;
    log::debug!("remove args: {:?}", remove_args);

    let tree = state.bucket()?.tree_mut();
    let resolution = resolve(tree, &remove_args.names)?;
    let label = describe_target(tree, resolution.target);

    if !remove_args.yes && !confirm_remove(&label)? {
        return Ok(());
    }
    remove(tree, resolution)?;
    println!(
        "{} {}",
        "✔".green(),
        format_args!(t!("remove.success"), path = label.cyan())
    );
    Ok(())
}
