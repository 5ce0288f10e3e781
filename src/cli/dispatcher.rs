// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};

use crate::{cli::handlers, state::AppState};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppState) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "ls",
        aliases: &["l"],
        handler: handlers::ls::handle,
    },
    CommandDefinition {
        name: "add",
        aliases: &[],
        handler: handlers::add::handle,
    },
    CommandDefinition {
        name: "add-path",
        aliases: &[],
        handler: handlers::add_path::handle,
    },
    CommandDefinition {
        name: "remove",
        aliases: &["rm"],
        handler: handlers::remove::handle,
    },
    CommandDefinition {
        name: "use",
        aliases: &[],
        handler: handlers::use_bucket::handle,
    },
    CommandDefinition {
        name: "pl",
        aliases: &[],
        handler: handlers::pl::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Runs the command named by the first argument and saves the bucket if the
/// command changed it.
pub fn dispatch(all_args: Vec<String>, state: &mut AppState) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(name) = args.next() else {
        return Err(anyhow!(t!("cli.error.no_command")));
    };
    let command =
        find_command(&name).ok_or_else(|| anyhow!(t!("cli.error.unknown_command"), name = name))?;

    log::debug!("Running command '{}'.", command.name);
    (command.handler)(args.collect(), state)?;

    if state.needs_saving() && state.commit()? {
        log::debug!("Bucket '{}' saved.", state.bucket_name());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command_by_name_and_alias() {
        assert_eq!(find_command("ls").map(|c| c.name), Some("ls"));
        assert_eq!(find_command("l").map(|c| c.name), Some("ls"));
        assert_eq!(find_command("rm").map(|c| c.name), Some("remove"));
        assert_eq!(find_command("add-path").map(|c| c.name), Some("add-path"));
        assert!(find_command("serve").is_none());
    }
}
