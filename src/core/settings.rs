// src/core/settings.rs

use crate::constants::DEFAULT_BUCKET_NAME;
use crate::core::bucket::{Bucket, BucketError};
use crate::core::document::open_document;
use crate::core::paths::{Environment, PathError, expand_path};
use crate::models::{PluginConfig, SettingsFile};
use crate::system::opener::Opener;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write settings file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("bucket \"{0}\" is not configured")]
    BucketNotConfigured(String),
    #[error("default bucket is not found")]
    DefaultBucketNotFound,
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

/// The loaded settings file together with the environment it was resolved in.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    file: SettingsFile,
    env: Environment,
}

impl Settings {
    /// Loads the settings file that `env` points at. A missing file yields
    /// the defaults.
    pub fn load(env: Environment) -> Result<Self, SettingsError> {
        let path = env.settings_path()?;
        let file = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            log::debug!(
                "No settings file at '{}', using defaults.",
                path.display()
            );
            SettingsFile::default()
        };
        Ok(Self { path, file, env })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &SettingsFile {
        &self.file
    }

    /// The bucket to use: the explicit request, else `default_bucket`, else `default`.
    pub fn active_bucket_name(&self, requested: Option<&str>) -> String {
        requested
            .or(self.file.default_bucket.as_deref())
            .unwrap_or(DEFAULT_BUCKET_NAME)
            .to_string()
    }

    /// Resolves the document path of a bucket.
    pub fn bucket_path(&self, name: &str) -> Result<PathBuf, SettingsError> {
        if let Some(raw) = self.file.buckets.get(name) {
            return Ok(expand_path(raw)?);
        }
        if !self.file.buckets.is_empty() || name != DEFAULT_BUCKET_NAME {
            return Err(SettingsError::BucketNotConfigured(name.to_string()));
        }
        self.env
            .default_bucket_candidates()?
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or(SettingsError::DefaultBucketNotFound)
    }

    /// Builds and loads the named bucket.
    pub fn open_bucket(&self, name: &str) -> Result<Bucket, SettingsError> {
        let path = self.bucket_path(name)?;
        log::debug!("Opening bucket '{}' at '{}'.", name, path.display());
        let document =
            open_document(&self.file.backend, name, &path).map_err(BucketError::from)?;
        Ok(Bucket::open(document, self.file.lazy_bucket)?)
    }

    pub fn opener(&self) -> Opener {
        Opener::new(self.file.opener.as_deref())
    }

    pub fn plugin_config(&self, plugin: &str) -> PluginConfig {
        self.file.plugins.get(plugin).cloned().unwrap_or_default()
    }

    /// Records `name` as the default bucket in the settings file.
    ///
    /// Only `default_bucket` is rewritten; every other key in the file is kept
    /// as it was.
    pub fn set_default_bucket(&mut self, name: &str) -> Result<(), SettingsError> {
        let configured = self.file.buckets.contains_key(name)
            || (self.file.buckets.is_empty() && name == DEFAULT_BUCKET_NAME);
        if !configured {
            return Err(SettingsError::BucketNotConfigured(name.to_string()));
        }

        let mut table = if self.path.is_file() {
            let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
            content
                .parse::<toml::Table>()
                .map_err(|source| SettingsError::Parse {
                    path: self.path.display().to_string(),
                    source,
                })?
        } else {
            toml::Table::new()
        };
        table.insert(
            "default_bucket".to_string(),
            toml::Value::String(name.to_string()),
        );

        let write_err = |source| SettingsError::Write {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, toml::to_string(&table)?).map_err(write_err)?;
        log::debug!(
            "Default bucket set to '{}' in '{}'.",
            name,
            self.path.display()
        );

        self.file.default_bucket = Some(name.to_string());
        Ok(())
    }
}
