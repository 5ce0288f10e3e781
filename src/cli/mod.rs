// src/cli/mod.rs

use clap::Parser;

pub mod dispatcher;
pub mod handlers;

/// Builds the color-aware full help string at runtime.
fn build_help_string() -> &'static str {
    // Replaces the semantic tags of the help template, like `<title>`, with
    // ANSI styles (or nothing when colors are off).
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let err = if use_colors { "\x1b[91m" } else { "" }; // Bright Red
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// momo: a command-line file manager over YAML buckets.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// Name of the bucket to use instead of the default one.
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// The command followed by its arguments. Parsed by the command's handler.
    #[arg()]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_flag_precedes_command() {
        let cli = Cli::try_parse_from(["momo", "-b", "films", "ls", "-p", "alien"]).unwrap();
        assert_eq!(cli.bucket.as_deref(), Some("films"));
        assert_eq!(cli.args, vec!["ls", "-p", "alien"]);
    }

    #[test]
    fn test_command_flags_are_left_to_the_handler() {
        let cli = Cli::try_parse_from(["momo", "add", "films", "-n", "heat", "-b", "x"]).unwrap();
        assert!(cli.bucket.is_none());
        assert_eq!(cli.args, vec!["add", "films", "-n", "heat", "-b", "x"]);
    }
}
