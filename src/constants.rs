// src/constants.rs

/// The reserved name of the synthetic root node of every bucket.
pub const ROOT_NODE_NAME: &str = "(root)";

/// One level of indentation in listings.
pub const INDENT_UNIT: &str = "  ";

/// The attribute used by `open` and `run` when no attribute is named.
pub const DEFAULT_ATTR_NAME: &str = "path";

/// The list attribute holding a node's saved commands.
pub const CMDS_ATTR_NAME: &str = "cmds";

/// The attribute inserted when a node loses its last child.
pub const PLACEHOLDER_NAME: &str = "(placeholder)";

/// The name of the bucket used when none is configured or requested.
pub const DEFAULT_BUCKET_NAME: &str = "default";

/// The name of the settings directory inside the home directory.
pub const SETTINGS_DIR_NAME: &str = ".momo";

/// The name of the settings file inside the settings directory.
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// The file stem of the default bucket inside the home directory (`~/.momo.yml`).
pub const DEFAULT_BUCKET_STEM: &str = ".momo";

/// Overrides the settings directory.
pub const ENV_SETTINGS_DIR: &str = "MOMO_SETTINGS_DIR";

/// Overrides the settings file.
pub const ENV_SETTINGS_FILE: &str = "MOMO_SETTINGS_FILE";

/// Overrides the path of the default bucket.
pub const ENV_DEFAULT_BUCKET: &str = "MOMO_DEFAULT_BUCKET";
