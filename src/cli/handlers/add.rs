// src/cli/handlers/add.rs

use crate::cli::handlers::commons::{describe_target, parse_content};
use crate::core::commons::parse_scalar;
use crate::core::indexer::{Target, locate};
use crate::core::listing::{ListOptions, Lines};
use crate::core::tree::Tree;
use crate::state::AppState;
use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct AddArgs {
    /// Names or numbers identifying the node (or list attribute) to add to.
    pub names: Vec<String>,

    /// Name of the new element.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Content of the new element. Several values make a list.
    #[arg(short, long, num_args = 1..)]
    pub content: Vec<String>,
}

/// Adds to whatever `names` resolves to. Returns a description of the new
/// element for the success message.
pub fn add(tree: &mut Tree, args: &AddArgs) -> Result<String> {
    let mut scratch = Lines::new();
    let resolution = locate(tree, &args.names, &ListOptions::default(), &mut scratch)?;

    let id = match resolution.target {
        Target::Element(id) => id,
        Target::Item { .. } => return Err(anyhow!(t!("add.error.into_item"))),
    };

    if tree.is_node(id) {
        let name = args
            .name
            .as_deref()
            .ok_or_else(|| anyhow!(t!("add.error.name_required")))?;
        let child = tree.add(id, name, parse_content(&args.content))?;
        return Ok(describe_target(tree, Target::Element(child)));
    }

    if args.name.is_some() {
        return Err(anyhow!(t!("add.error.name_for_item")));
    }
    if args.content.is_empty() {
        return Err(anyhow!(t!("add.error.content_required")));
    }
    for value in &args.content {
        tree.add_item(id, parse_scalar(value))?;
    }
    Ok(describe_target(tree, Target::Element(id)))
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let add_args = AddArgs::try_parse_from(&args)?;
    log::debug!("add args: {:?}", add_args);

    let added = add(state.bucket()?.tree_mut(), &add_args)?;
    println!(
        "{} {}",
        "✔".green(),
        format_args!(t!("add.success"), path = added.cyan())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::TreeError;
    use serde_yaml::Value;

    fn films() -> Tree {
        Tree::new(
            serde_yaml::from_str(
                "films:\n  inception:\n    path: /movies/inception.mkv\n    tags: [scifi]\n",
            )
            .unwrap(),
        )
    }

    fn run(tree: &mut Tree, args: &[&str]) -> Result<String> {
        add(tree, &AddArgs::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_add_scalar_list_and_node() {
        let mut tree = films();
        assert_eq!(
            run(&mut tree, &["films", "inception", "-n", "year", "-c", "2010"]).unwrap(),
            "films/inception/year"
        );
        run(&mut tree, &["films", "inception", "-n", "cast", "-c", "a", "b"]).unwrap();
        run(&mut tree, &["films", "-n", "heat"]).unwrap();

        let expected: Value = serde_yaml::from_str(
            r#"
            films:
              inception:
                path: /movies/inception.mkv
                tags: [scifi]
                year: 2010
                cast: [a, b]
              heat:
                "(placeholder)": ""
            "#,
        )
        .unwrap();
        assert_eq!(tree.to_value(), expected);
    }

    #[test]
    fn test_add_items_to_list_attribute() {
        let mut tree = films();
        run(&mut tree, &["films", "inception", "tags", "-c", "thriller", "3"]).unwrap();
        let root = tree.root();
        let films = tree.get_by_name(root, "films").unwrap();
        let inception = tree.get_by_name(films, "inception").unwrap();
        let tags = tree.get_by_name(inception, "tags").unwrap();
        assert_eq!(
            tree.content(tags),
            Some(&serde_yaml::from_str::<Value>("[scifi, thriller, 3]").unwrap())
        );

        assert!(run(&mut tree, &["films", "inception", "tags", "-n", "x", "-c", "y"]).is_err());
        assert!(run(&mut tree, &["films", "inception", "tags"]).is_err());
    }

    #[test]
    fn test_duplicate_name_leaves_tree_unchanged() {
        let mut tree = films();
        let before = tree.to_value();
        let err = run(&mut tree, &["films", "-n", "inception", "-c", "x"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TreeError>(),
            Some(TreeError::AlreadyExists { .. })
        ));
        assert_eq!(tree.to_value(), before);
    }

    #[test]
    fn test_add_to_scalar_attribute_fails() {
        let mut tree = films();
        let err = run(&mut tree, &["films", "inception", "path", "-c", "x"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TreeError>(),
            Some(TreeError::NotListForAdd)
        ));
    }

    #[test]
    fn test_node_requires_name() {
        let mut tree = films();
        assert!(run(&mut tree, &["films", "-c", "x"]).is_err());
    }
}
