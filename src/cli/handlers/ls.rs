// src/cli/handlers/ls.rs

use crate::cli::handlers::commons;
use crate::core::actions::{Action, perform};
use crate::core::indexer::{Target, locate};
use crate::core::listing::ListOptions;
use crate::core::tree::{ElemType, ViewOptions};
use crate::state::AppState;
use crate::system::executor::SystemLauncher;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct LsArgs {
    /// Names or numbers identifying the element.
    pub names: Vec<String>,

    /// Show the full path.
    #[arg(short, long)]
    pub path: bool,

    /// Open the element.
    #[arg(short, long, conflicts_with_all = ["run", "cmd"])]
    pub open: bool,

    /// Run a command on the element. Without COMMAND the default content runs.
    #[arg(short, long, value_name = "COMMAND", conflicts_with = "cmd")]
    pub run: Option<Option<String>>,

    /// Execute the saved command NUM, or all of them.
    #[arg(short, long, value_name = "NUM")]
    pub cmd: Option<Option<usize>>,

    /// Expand attribute templates in listings.
    #[arg(short = 'x', long)]
    pub expand: bool,

    /// Only list elements of this type (file, directory, node, attribute).
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub elem_type: Option<ElemType>,

    /// Sort by the content of this attribute.
    #[arg(short, long, value_name = "ATTR")]
    pub sort_by: Option<String>,

    /// Keep document order.
    #[arg(short, long)]
    pub unordered: bool,
}

impl LsArgs {
    fn list_options(&self) -> ListOptions {
        ListOptions {
            show_path: self.path,
            expand: self.expand,
            view: ViewOptions {
                sort_by: self.sort_by.clone(),
                unordered: self.unordered,
                elem_type: self.elem_type,
            },
        }
    }

    /// `-c` alone runs every saved command of a whole element, but only one
    /// for a pinned item.
    fn action(&self, target: Target) -> Action {
        if self.open {
            Action::Open
        } else if let Some(cmd) = &self.run {
            Action::Run(cmd.clone())
        } else if let Some(num) = self.cmd {
            match (num, target) {
                (None, Target::Element(_)) => Action::Cmds,
                (num, _) => Action::Cmd(num),
            }
        } else {
            Action::List
        }
    }
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let ls_args = LsArgs::try_parse_from(&args)?;
    log::debug!("ls args: {:?}", ls_args);

    let options = ls_args.list_options();
    let mut launcher = SystemLauncher::new(state.settings().opener());
    let mut out = commons::output();

    let tree = state.bucket()?.tree_mut();
    let resolution = locate(tree, &ls_args.names, &options, &mut out)?;
    let action = ls_args.action(resolution.target);
    perform(tree, &resolution, &action, &options, &mut out, &mut launcher)?;
    Ok(())
}
