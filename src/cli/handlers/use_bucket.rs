// src/cli/handlers/use_bucket.rs

use crate::state::AppState;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct UseArgs {
    /// Name of a configured bucket.
    pub bucket: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let use_args = UseArgs::try_parse_from(&args)?;
    log::debug!("use args: {:?}", use_args);

    state
        .settings_mut()
        .set_default_bucket(&use_args.bucket)
        .with_context(|| format!(t!("use.error.failed"), name = use_args.bucket))?;
    println!(
        "{} {}",
        "✔".green(),
        format_args!(t!("use.success"), name = use_args.bucket.cyan())
    );
    Ok(())
}
