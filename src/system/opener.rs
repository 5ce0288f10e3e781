// src/system/opener.rs

use crate::system::executor::ExecutionError;

/// Returns the platform program that opens files with their default application.
pub fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// The program used by the `open` action.
///
/// The configured value is a command line of its own (`"code -r"` works); the
/// target is always appended as a single, unsplit argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    command_line: String,
}

impl Opener {
    pub fn new(configured: Option<&str>) -> Self {
        let command_line = configured
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_opener());
        Self {
            command_line: command_line.to_string(),
        }
    }

    /// The program and arguments that open `target`.
    pub fn command_for(&self, target: &str) -> Result<(String, Vec<String>), ExecutionError> {
        let mut parts = shlex::split(&self.command_line)
            .ok_or_else(|| ExecutionError::CommandParse(self.command_line.clone()))?;
        if parts.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }
        let program = parts.remove(0);
        parts.push(target.to_string());
        Ok((program, parts))
    }
}
