// src/system/executor.rs

use crate::system::opener::Opener;
use std::io::ErrorKind;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
}

/// Runs external programs on behalf of actions.
///
/// The system implementation spawns real processes; tests substitute a
/// recorder.
pub trait Launcher {
    /// Runs a full command line.
    fn run(&mut self, command_line: &str) -> Result<(), ExecutionError>;

    /// Opens a file, directory or URL with the configured opener.
    fn open(&mut self, target: &str) -> Result<(), ExecutionError>;
}

/// The [`Launcher`] that talks to the operating system.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    opener: Opener,
}

impl SystemLauncher {
    pub fn new(opener: Opener) -> Self {
        Self { opener }
    }
}

impl Launcher for SystemLauncher {
    fn run(&mut self, command_line: &str) -> Result<(), ExecutionError> {
        execute_command(command_line)
    }

    fn open(&mut self, target: &str) -> Result<(), ExecutionError> {
        let (program, args) = self.opener.command_for(target)?;
        execute_program(&program, &args)
    }
}

/// Splits a command line with shell quoting rules and runs it without a shell.
pub fn execute_command(command_line: &str) -> Result<(), ExecutionError> {
    let trimmed_command = command_line.trim();
    if trimmed_command.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let Some((program, args)) = parts.split_first() else {
        return Err(ExecutionError::EmptyCommand);
    };
    execute_program(program, args)
}

/// Runs `program` with `args`, inheriting stdio, and waits for it to finish.
pub fn execute_program(program: &str, args: &[String]) -> Result<(), ExecutionError> {
    let display = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    log::debug!("Executing: {}", display);

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Fallback logic for Windows built-in commands like `echo`.
    // We try to spawn directly first. If it fails with `NotFound`, we try with `cmd /C`.
    let status = match command.status() {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("Command '{}' not found. Retrying with cmd /C.", program);
            StdCommand::new("cmd")
                .arg("/C")
                .arg(program)
                .args(args)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| ExecutionError::CommandFailed(display.clone(), e))?
        }
        Err(e) => return Err(ExecutionError::CommandFailed(display, e)),
    };

    if !status.success() {
        return Err(ExecutionError::NonZeroExitStatus(display));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_unparsable_commands() {
        assert!(matches!(execute_command("   "), Err(ExecutionError::EmptyCommand)));
        assert!(matches!(
            execute_command("echo 'unterminated"),
            Err(ExecutionError::CommandParse(_))
        ));
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let result = execute_command("momo-test-no-such-program --flag");
        assert!(matches!(
            result,
            Err(ExecutionError::CommandFailed(_, _)) | Err(ExecutionError::NonZeroExitStatus(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_reported() {
        assert!(execute_command("true").is_ok());
        assert!(matches!(
            execute_command("false"),
            Err(ExecutionError::NonZeroExitStatus(cmd)) if cmd == "false"
        ));
    }
}
