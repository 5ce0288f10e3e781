// src/bin/momo.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use momo::{
    cli::{Cli, dispatcher},
    core::plugins::PluginError,
    state::AppState,
};

/// The main entry point of the `momo` application.
/// It sets up logging, parses arguments, dispatches to the command handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Argument errors of a command or plugin (including `--help`) are
        // printed by clap itself, with clap's exit code.
        let clap_err = e.downcast_ref::<clap::Error>().or_else(|| {
            match e.downcast_ref::<PluginError>() {
                Some(PluginError::Args(err)) => Some(err),
                _ => None,
            }
        });
        if let Some(clap_err) = clap_err {
            clap_err.exit();
        }

        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    if cli.args.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let mut state = AppState::load(cli.bucket)?;
    dispatcher::dispatch(cli.args, &mut state)
}
