// src/core/actions.rs

//! Actions performed on a resolved path.
//!
//! Exactly one action runs per invocation. Everything that leaves the process
//! goes through a [`Launcher`], so the rules below are testable without
//! spawning anything.

use crate::constants::{CMDS_ATTR_NAME, DEFAULT_ATTR_NAME};
use crate::core::commons::render_value;
use crate::core::indexer::{Resolution, Target};
use crate::core::listing::{ListOptions, ListingError, Lines, list_target};
use crate::core::template::{self, Substitutions, TemplateError, node_substitutions};
use crate::core::tree::{ElemId, Tree, TreeError};
use crate::system::executor::{ExecutionError, Launcher};
use serde_yaml::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("unknown attribute content type as commands")]
    UnknownCommandsContent,
    #[error("command index out of range (1-{count})")]
    CommandIndexOutOfRange { count: usize },
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Action {
    /// Print the children or content of the target.
    #[default]
    List,
    /// Hand the default content to the opener.
    Open,
    /// Run a command line or template against the target.
    Run(Option<String>),
    /// Run one saved command (1-based, default 1).
    Cmd(Option<usize>),
    /// Run every saved command in order.
    Cmds,
}

/// What templates and the default placeholder resolve against.
#[derive(Debug)]
struct Subject {
    default_name: String,
    default: Result<Value, TreeError>,
    subs: Substitutions,
}

impl Subject {
    fn of_node(tree: &mut Tree, node: ElemId) -> Result<Self, TreeError> {
        let subs = node_substitutions(tree, node)?;
        let default = match subs.get(DEFAULT_ATTR_NAME) {
            Some(content) => Ok(content.clone()),
            None => tree.get_by_name(node, DEFAULT_ATTR_NAME).and_then(|found| {
                Err(TreeError::NotAnAttribute(tree.name(found).to_string()))
            }),
        };
        Ok(Self {
            default_name: DEFAULT_ATTR_NAME.to_string(),
            default,
            subs,
        })
    }

    fn of_target(tree: &mut Tree, target: Target) -> Result<Self, TreeError> {
        let attr = match target {
            Target::Element(id) if tree.is_node(id) => return Self::of_node(tree, id),
            other => other.elem(),
        };
        let name = tree.name(attr).to_string();
        let value = match target {
            Target::Item { index, .. } => tree.item(attr, index)?.clone(),
            Target::Element(_) => tree
                .content(attr)
                .cloned()
                .ok_or_else(|| TreeError::NotAnAttribute(name.clone()))?,
        };
        let mut subs = match tree.parent(attr) {
            Some(node) => node_substitutions(tree, node)?,
            None => Substitutions::new(),
        };
        subs.insert(name.clone(), value.clone());
        Ok(Self {
            default_name: name,
            default: Ok(value),
            subs,
        })
    }

    fn default_text(&self) -> Result<String, TreeError> {
        self.default.as_ref().map(render_value).map_err(Clone::clone)
    }

    /// Builds the command line for `run`.
    fn command_line(&self, cmd: Option<&str>) -> Result<String, ActionError> {
        let Some(cmd) = cmd else {
            return Ok(self.default_text()?);
        };
        let parsed = template::Template::parse(cmd);
        if parsed.has_placeholders() {
            return Ok(parsed.render(&self.default_name, &self.subs)?);
        }
        let default = self.default_text()?;
        let quoted = shlex::try_quote(&default)
            .map(|q| q.into_owned())
            .unwrap_or(default);
        Ok(format!("{} {}", cmd, quoted))
    }
}

/// Where the commands of `cmd` and `cmds` come from.
#[derive(Debug)]
enum Commands {
    /// A string attribute, run exactly as written.
    Direct(String),
    /// The `cmds` of a node, rendered against that node.
    Saved { node: ElemId, commands: Vec<String> },
}

fn commands_in(tree: &Tree, cmds: ElemId) -> Result<Vec<String>, ActionError> {
    match tree.content(cmds) {
        Some(Value::String(cmd)) => Ok(vec![cmd.clone()]),
        Some(Value::Sequence(items)) => Ok(items.iter().map(render_value).collect()),
        _ => Err(ActionError::UnknownCommandsContent),
    }
}

/// The commands reachable from a target. A list attribute, or an item of
/// one, stands for the `cmds` of the node that owns it.
fn saved_commands(tree: &mut Tree, target: Target) -> Result<Commands, ActionError> {
    let attr = match target {
        Target::Element(id) if tree.is_node(id) => {
            let cmds = tree.get_by_name(id, CMDS_ATTR_NAME)?;
            return Ok(Commands::Saved {
                node: id,
                commands: commands_in(tree, cmds)?,
            });
        }
        other => other.elem(),
    };
    if let (Target::Element(_), Some(Value::String(cmd))) = (target, tree.content(attr)) {
        return Ok(Commands::Direct(cmd.clone()));
    }
    if !matches!(tree.content(attr), Some(Value::Sequence(_))) {
        return Err(ActionError::UnknownCommandsContent);
    }
    let node = tree
        .parent(attr)
        .ok_or(ActionError::UnknownCommandsContent)?;
    match tree.find_child(node, CMDS_ATTR_NAME)? {
        Some(cmds) => Ok(Commands::Saved {
            node,
            commands: commands_in(tree, cmds)?,
        }),
        None => Err(ActionError::UnknownCommandsContent),
    }
}

fn run_saved(
    tree: &mut Tree,
    node: ElemId,
    cmd: &str,
    launcher: &mut dyn Launcher,
) -> Result<(), ActionError> {
    let command_line = Subject::of_node(tree, node)?.command_line(Some(cmd))?;
    launcher.run(&command_line)?;
    Ok(())
}

/// Performs `action` on a resolved path.
pub fn perform(
    tree: &mut Tree,
    resolution: &Resolution,
    action: &Action,
    options: &ListOptions,
    lines: &mut Lines,
    launcher: &mut dyn Launcher,
) -> Result<(), ActionError> {
    let target = resolution.target;
    log::debug!("Performing {:?} on {:?}.", action, target);

    match action {
        Action::List => list_target(tree, target, options, lines)?,
        Action::Open => {
            let subject = Subject::of_target(tree, target)?;
            launcher.open(&subject.default_text()?)?;
        }
        Action::Run(cmd) => {
            let subject = Subject::of_target(tree, target)?;
            let command_line = subject.command_line(cmd.as_deref())?;
            launcher.run(&command_line)?;
        }
        Action::Cmd(num) => match saved_commands(tree, target)? {
            Commands::Direct(cmd) => launcher.run(&cmd)?,
            Commands::Saved { node, commands } => {
                // A pinned item selects the node command at its own index.
                let num = match target {
                    Target::Item { index, .. } => index,
                    Target::Element(_) => num.unwrap_or(1),
                };
                let cmd = num
                    .checked_sub(1)
                    .and_then(|i| commands.get(i))
                    .ok_or(ActionError::CommandIndexOutOfRange {
                        count: commands.len(),
                    })?;
                run_saved(tree, node, cmd, launcher)?;
            }
        },
        Action::Cmds => match saved_commands(tree, target)? {
            Commands::Direct(cmd) => launcher.run(&cmd)?,
            Commands::Saved { node, commands } => {
                for cmd in &commands {
                    run_saved(tree, node, cmd, launcher)?;
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indexer::locate;

    // --- Setup ---

    /// Records launches instead of spawning processes.
    #[derive(Debug, Default)]
    struct RecordingLauncher {
        runs: Vec<String>,
        opens: Vec<String>,
        fail_on: Option<String>,
    }

    impl Launcher for RecordingLauncher {
        fn run(&mut self, command_line: &str) -> Result<(), ExecutionError> {
            self.runs.push(command_line.to_string());
            if self.fail_on.as_deref() == Some(command_line) {
                return Err(ExecutionError::NonZeroExitStatus(command_line.to_string()));
            }
            Ok(())
        }

        fn open(&mut self, target: &str) -> Result<(), ExecutionError> {
            self.opens.push(target.to_string());
            Ok(())
        }
    }

    fn films() -> Tree {
        Tree::new(
            serde_yaml::from_str(
                r#"
                films:
                  inception:
                    path: /movies/inception.mkv
                    tags: [scifi, thriller]
                    sub: /movies/inception.srt
                    cmds:
                      - mpv {} --sub-file={sub}
                      - echo done
                  alien:
                    path: /movies/alien movie.mkv
                    cmds: vlc {}
                "#,
            )
            .unwrap(),
        )
    }

    fn act(
        tree: &mut Tree,
        tokens: &[&str],
        action: Action,
        launcher: &mut RecordingLauncher,
    ) -> Result<Lines, ActionError> {
        let options = ListOptions::default();
        let mut lines = Lines::new();
        let resolution = locate(tree, tokens, &options, &mut lines)?;
        perform(tree, &resolution, &action, &options, &mut lines, launcher)?;
        Ok(lines)
    }

    // --- Open ---

    #[test]
    fn test_open_attribute_passes_exact_content() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "inception", "path"], Action::Open, &mut launcher).unwrap();
        assert_eq!(launcher.opens, vec!["/movies/inception.mkv"]);
    }

    #[test]
    fn test_open_node_uses_path_attribute() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "alien"], Action::Open, &mut launcher).unwrap();
        assert_eq!(launcher.opens, vec!["/movies/alien movie.mkv"]);

        let err = act(&mut tree, &["films"], Action::Open, &mut launcher).unwrap_err();
        assert_eq!(
            err.to_string(),
            "element \"path\" does not exist in this directory"
        );
    }

    #[test]
    fn test_open_item() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "inception", "tags", "2"], Action::Open, &mut launcher)
            .unwrap();
        assert_eq!(launcher.opens, vec!["thriller"]);
    }

    // --- Run ---

    #[test]
    fn test_run_template_on_path_attribute() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        let tokens = ["films", "inception", "path"];
        act(&mut tree, &tokens, Action::Run(Some("vlc {}".into())), &mut launcher).unwrap();
        assert_eq!(launcher.runs, vec!["vlc /movies/inception.mkv"]);
    }

    #[test]
    fn test_run_without_placeholders_appends_quoted_default() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "alien"], Action::Run(Some("vlc".into())), &mut launcher)
            .unwrap();
        let parts = shlex::split(launcher.runs.first().unwrap()).unwrap();
        assert_eq!(parts, vec!["vlc", "/movies/alien movie.mkv"]);
    }

    #[test]
    fn test_run_named_placeholders_and_missing_attribute() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        let run = Action::Run(Some("mpv {path} --sub-file={sub}".into()));
        act(&mut tree, &["films", "inception"], run, &mut launcher).unwrap();
        assert_eq!(
            launcher.runs,
            vec!["mpv /movies/inception.mkv --sub-file=/movies/inception.srt"]
        );

        let err = act(
            &mut tree,
            &["films", "alien"],
            Action::Run(Some("mpv {sub}".into())),
            &mut launcher,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Template(TemplateError::MissingAttribute(ref name)) if name == "sub"
        ));
    }

    #[test]
    fn test_run_without_command_runs_default_content() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "inception", "cmds", "2"], Action::Run(None), &mut launcher)
            .unwrap();
        assert_eq!(launcher.runs, vec!["echo done"]);
    }

    // --- Saved commands ---

    #[test]
    fn test_cmd_on_item_without_cmds_list_fails() {
        let mut tree =
            Tree::new(serde_yaml::from_str("n: {path: /m/x.mkv, tags: [scifi, thriller]}").unwrap());
        let mut launcher = RecordingLauncher::default();
        let err = act(&mut tree, &["n", "tags", "2"], Action::Cmd(None), &mut launcher)
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown attribute content type as commands");
        let err = act(&mut tree, &["n", "tags"], Action::Cmds, &mut launcher).unwrap_err();
        assert!(matches!(err, ActionError::UnknownCommandsContent));
        assert!(launcher.runs.is_empty());
    }

    #[test]
    fn test_list_attribute_delegates_to_node_cmds() {
        let mut tree = Tree::new(
            serde_yaml::from_str(
                "n: {path: /m/x.mkv, tags: [a, b], cmds: ['echo one {}', 'echo two {}']}",
            )
            .unwrap(),
        );
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["n", "tags", "2"], Action::Cmd(None), &mut launcher).unwrap();
        assert_eq!(launcher.runs, vec!["echo two /m/x.mkv"]);

        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["n", "tags"], Action::Cmds, &mut launcher).unwrap();
        act(&mut tree, &["n", "tags"], Action::Cmd(Some(2)), &mut launcher).unwrap();
        assert_eq!(
            launcher.runs,
            vec!["echo one /m/x.mkv", "echo two /m/x.mkv", "echo two /m/x.mkv"]
        );

        let err = act(&mut tree, &["n", "tags"], Action::Cmd(Some(3)), &mut launcher)
            .unwrap_err();
        assert!(matches!(err, ActionError::CommandIndexOutOfRange { count: 2 }));
    }

    #[test]
    fn test_cmd_on_string_attribute_runs_it_as_written() {
        let mut tree =
            Tree::new(serde_yaml::from_str("n: {path: /m/x.mkv, play: mpv}
m: {play: ls}").unwrap());
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["n", "play"], Action::Cmds, &mut launcher).unwrap();
        act(&mut tree, &["n", "play"], Action::Cmd(None), &mut launcher).unwrap();
        act(&mut tree, &["m", "play"], Action::Cmds, &mut launcher).unwrap();
        assert_eq!(launcher.runs, vec!["mpv", "mpv", "ls"]);
    }

    #[test]
    fn test_cmd_on_node_renders_against_node() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "inception"], Action::Cmd(None), &mut launcher).unwrap();
        act(&mut tree, &["films", "alien"], Action::Cmd(Some(1)), &mut launcher).unwrap();
        assert_eq!(
            launcher.runs,
            vec![
                "mpv /movies/inception.mkv --sub-file=/movies/inception.srt",
                "vlc /movies/alien movie.mkv",
            ]
        );
    }

    #[test]
    fn test_cmd_index_out_of_range() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        let err = act(&mut tree, &["films", "inception"], Action::Cmd(Some(3)), &mut launcher)
            .unwrap_err();
        assert!(matches!(err, ActionError::CommandIndexOutOfRange { count: 2 }));
        let err = act(&mut tree, &["films", "inception"], Action::Cmd(Some(0)), &mut launcher)
            .unwrap_err();
        assert!(matches!(err, ActionError::CommandIndexOutOfRange { count: 2 }));
    }

    #[test]
    fn test_cmd_on_cmds_item_uses_owning_node() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        act(
            &mut tree,
            &["films", "inception", "cmds", "1"],
            Action::Cmd(None),
            &mut launcher,
        )
        .unwrap();
        assert_eq!(
            launcher.runs,
            vec!["mpv /movies/inception.mkv --sub-file=/movies/inception.srt"]
        );
    }

    #[test]
    fn test_cmds_runs_all_and_stops_at_first_failure() {
        let mut tree = films();
        let mut launcher = RecordingLauncher {
            fail_on: Some("mpv /movies/inception.mkv --sub-file=/movies/inception.srt".into()),
            ..Default::default()
        };
        let err = act(&mut tree, &["films", "inception"], Action::Cmds, &mut launcher)
            .unwrap_err();
        assert!(matches!(err, ActionError::Execution(_)));
        assert_eq!(launcher.runs.len(), 1);

        let mut launcher = RecordingLauncher::default();
        act(&mut tree, &["films", "inception", "cmds"], Action::Cmds, &mut launcher).unwrap();
        assert_eq!(launcher.runs.len(), 2);
        assert_eq!(launcher.runs.last().unwrap(), "echo done /movies/inception.mkv");
    }

    #[test]
    fn test_cmd_on_scalar_attribute_that_is_not_a_string() {
        let mut tree = Tree::new(serde_yaml::from_str("n: {path: /x, year: 2010}").unwrap());
        let mut launcher = RecordingLauncher::default();
        let err = act(&mut tree, &["n", "year"], Action::Cmds, &mut launcher).unwrap_err();
        assert!(matches!(err, ActionError::UnknownCommandsContent));
    }

    // --- List ---

    #[test]
    fn test_list_is_the_default_action() {
        let mut tree = films();
        let mut launcher = RecordingLauncher::default();
        let lines = act(&mut tree, &["films"], Action::default(), &mut launcher).unwrap();
        assert_eq!(lines.as_slice(), ["1 [F] alien", "2 [F] inception"]);
        assert!(launcher.runs.is_empty() && launcher.opens.is_empty());
    }
}
