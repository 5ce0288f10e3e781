// src/core/paths.rs

use crate::constants::{
    DEFAULT_BUCKET_STEM, ENV_DEFAULT_BUCKET, ENV_SETTINGS_DIR, ENV_SETTINGS_FILE,
    SETTINGS_DIR_NAME, SETTINGS_FILENAME,
};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find home directory.")]
    HomeDirNotFound,
    #[error("Could not expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
    #[error("Could not make path '{path}' absolute: {source}")]
    Absolute {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The process environment as seen by path resolution.
///
/// Captured once in `main`; tests build it by hand instead of mutating the
/// real environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub settings_file: Option<PathBuf>,
    pub settings_dir: Option<PathBuf>,
    pub default_bucket: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl Environment {
    pub fn from_process() -> Self {
        let var = |name: &str| {
            env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            settings_file: var(ENV_SETTINGS_FILE),
            settings_dir: var(ENV_SETTINGS_DIR),
            default_bucket: var(ENV_DEFAULT_BUCKET),
            home: dirs::home_dir(),
        }
    }

    fn home(&self) -> Result<&Path, PathError> {
        self.home.as_deref().ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path of `settings.toml`.
    ///
    /// `$MOMO_SETTINGS_FILE` wins over `$MOMO_SETTINGS_DIR`, which wins over
    /// `~/.momo/`.
    pub fn settings_path(&self) -> Result<PathBuf, PathError> {
        if let Some(file) = &self.settings_file {
            return Ok(file.clone());
        }
        if let Some(dir) = &self.settings_dir {
            return Ok(dir.join(SETTINGS_FILENAME));
        }
        Ok(self.home()?.join(SETTINGS_DIR_NAME).join(SETTINGS_FILENAME))
    }

    /// Candidate locations of the `default` bucket when no `[buckets]` table
    /// exists, in lookup order.
    pub fn default_bucket_candidates(&self) -> Result<Vec<PathBuf>, PathError> {
        if let Some(path) = &self.default_bucket {
            return Ok(vec![path.clone()]);
        }
        let home = self.home()?;
        Ok(["yml", "yaml"]
            .iter()
            .map(|ext| home.join(format!("{DEFAULT_BUCKET_STEM}.{ext}")))
            .collect())
    }
}

/// Expands `~` and environment variables, then makes the result absolute.
///
/// `shellexpand::full` handles both home dir and env vars across platforms.
pub fn expand_path(raw: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(raw).map_err(|e| PathError::Expansion {
        path: raw.to_string(),
        reason: e.to_string(),
    })?;
    let absolute =
        std::path::absolute(expanded.as_ref()).map_err(|source| PathError::Absolute {
            path: raw.to_string(),
            source,
        })?;
    Ok(dunce::simplified(&absolute).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_home(home: &str) -> Environment {
        Environment {
            home: Some(PathBuf::from(home)),
            ..Environment::default()
        }
    }

    #[test]
    fn test_settings_path_precedence() {
        let mut env = env_with_home("/home/ann");
        assert_eq!(
            env.settings_path().unwrap(),
            PathBuf::from("/home/ann/.momo/settings.toml")
        );

        env.settings_dir = Some(PathBuf::from("/etc/momo"));
        assert_eq!(
            env.settings_path().unwrap(),
            PathBuf::from("/etc/momo/settings.toml")
        );

        env.settings_file = Some(PathBuf::from("/tmp/custom.toml"));
        assert_eq!(env.settings_path().unwrap(), PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        let env = Environment::default();
        assert!(matches!(env.settings_path(), Err(PathError::HomeDirNotFound)));
        assert!(matches!(
            env.default_bucket_candidates(),
            Err(PathError::HomeDirNotFound)
        ));
    }

    #[test]
    fn test_default_bucket_candidates() {
        let mut env = env_with_home("/home/ann");
        assert_eq!(
            env.default_bucket_candidates().unwrap(),
            vec![
                PathBuf::from("/home/ann/.momo.yml"),
                PathBuf::from("/home/ann/.momo.yaml")
            ]
        );

        env.default_bucket = Some(PathBuf::from("/data/main.yml"));
        assert_eq!(
            env.default_bucket_candidates().unwrap(),
            vec![PathBuf::from("/data/main.yml")]
        );
    }

    #[test]
    fn test_expand_path_makes_relative_paths_absolute() {
        let expanded = expand_path("movies/alien.mkv").unwrap();
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("movies/alien.mkv"));
    }

    #[test]
    fn test_expand_path_rejects_unknown_variables() {
        let err = expand_path("$MOMO_SURELY_UNDEFINED_VAR/x").unwrap_err();
        assert!(matches!(err, PathError::Expansion { .. }));
    }
}
