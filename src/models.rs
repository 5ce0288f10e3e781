// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- `settings.toml` MODELS (What is read from the settings file) ---

/// The name of the only document backend.
pub const YAML_BACKEND: &str = "yaml";

fn default_backend() -> String {
    YAML_BACKEND.to_string()
}

fn default_lazy_bucket() -> bool {
    true
}

/// Represents the deserialized structure of a `settings.toml` file.
///
/// Every key is optional; a missing file deserializes to [`SettingsFile::default`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// The document backend used to load and dump buckets.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Whether node children are materialized on first access (`true`) or
    /// the whole tree is expanded right after loading (`false`).
    #[serde(default = "default_lazy_bucket")]
    pub lazy_bucket: bool,

    /// The bucket used when `--bucket` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,

    /// The program used to open files. Defaults to the platform opener.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,

    /// Bucket name to document path. Paths may use `~` and `$VARS`.
    #[serde(default)]
    pub buckets: BTreeMap<String, String>,

    /// Per-plugin configuration tables, keyed by plugin name.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            lazy_bucket: default_lazy_bucket(),
            default_bucket: None,
            opener: None,
            buckets: BTreeMap::new(),
            plugins: BTreeMap::new(),
        }
    }
}

/// Options shared by the built-in plugins. Unknown keys are rejected so that
/// typos surface at load time.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Match search terms case-insensitively.
    #[serde(default)]
    pub ignore_case: bool,

    /// Sorting terms applied when none are given on the command line.
    #[serde(default)]
    pub sorting_terms: Vec<String>,
}
