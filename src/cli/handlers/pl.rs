// src/cli/handlers/pl.rs

use crate::cli::handlers::commons;
use crate::core::plugins::{find_plugin, plugin_names};
use crate::state::AppState;
use anyhow::{Result, anyhow};
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct PlArgs {
    /// The plugin to run.
    pub plugin: String,

    /// Arguments passed to the plugin.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let pl_args = PlArgs::try_parse_from(&args)?;
    log::debug!("pl args: {:?}", pl_args);

    let plugin = find_plugin(&pl_args.plugin).map_err(|e| {
        anyhow!(
            t!("pl.error.unknown"),
            error = e,
            available = plugin_names().collect::<Vec<_>>().join(", ")
        )
    })?;
    let config = state.settings().plugin_config(plugin.name());

    let mut out = commons::output();
    plugin.run(state.bucket()?, &pl_args.args, &config, &mut out)?;
    Ok(())
}
