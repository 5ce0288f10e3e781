// src/state.rs

use crate::core::bucket::Bucket;
use crate::core::paths::Environment;
use crate::core::settings::{Settings, SettingsError};

/// The main application state: the settings and, once a command asks for it,
/// the active bucket.
///
/// The bucket is opened lazily so that commands like `use` never touch a
/// bucket file. Saving goes through [`AppState::commit`], which writes only
/// when the tree differs from what was loaded.
#[derive(Debug)]
pub struct AppState {
    settings: Settings,
    requested_bucket: Option<String>,
    bucket: Option<Bucket>,
}

impl AppState {
    pub fn new(settings: Settings, requested_bucket: Option<String>) -> Self {
        Self {
            settings,
            requested_bucket,
            bucket: None,
        }
    }

    /// Loads the settings from the process environment.
    pub fn load(requested_bucket: Option<String>) -> Result<Self, SettingsError> {
        let settings = Settings::load(Environment::from_process())?;
        Ok(Self::new(settings, requested_bucket))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The name of the bucket commands operate on.
    pub fn bucket_name(&self) -> String {
        self.settings
            .active_bucket_name(self.requested_bucket.as_deref())
    }

    /// Returns the active bucket, opening it on first use.
    pub fn bucket(&mut self) -> Result<&mut Bucket, SettingsError> {
        let bucket = match self.bucket.take() {
            Some(bucket) => bucket,
            None => self.settings.open_bucket(&self.bucket_name())?,
        };
        Ok(self.bucket.insert(bucket))
    }

    /// Checks whether an opened bucket changed since it was loaded.
    pub fn needs_saving(&self) -> bool {
        self.bucket.as_ref().is_some_and(Bucket::is_modified)
    }

    /// Saves the opened bucket if it changed. Returns whether a write happened.
    pub fn commit(&mut self) -> Result<bool, SettingsError> {
        match self.bucket.as_mut() {
            Some(bucket) => Ok(bucket.save()?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_bucket_is_opened_lazily_and_saved_on_change() {
        let dir = tempdir().unwrap();
        let bucket_path = dir.path().join(".momo.yml");
        fs::write(&bucket_path, "films: {alien: {path: /m/alien.mkv}}\n").unwrap();
        let env = Environment {
            home: Some(dir.path().to_path_buf()),
            ..Environment::default()
        };

        let mut state = AppState::new(Settings::load(env).unwrap(), None);
        assert_eq!(state.bucket_name(), "default");
        assert!(!state.needs_saving());
        assert!(!state.commit().unwrap());

        let tree = state.bucket().unwrap().tree_mut();
        let root = tree.root();
        let films = tree.get_by_name(root, "films").unwrap();
        tree.delete(films, "alien").unwrap();
        assert!(state.needs_saving());
        assert!(state.commit().unwrap());

        let saved = fs::read_to_string(&bucket_path).unwrap();
        assert!(saved.contains("(placeholder)"));
        assert!(!saved.contains("alien"));
    }
}
