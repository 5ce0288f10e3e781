// src/core/document.rs

use crate::models::YAML_BACKEND;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents errors that can occur while loading or dumping a bucket document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read bucket file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write bucket file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in bucket file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize bucket to YAML: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Bucket file '{0}' must hold a mapping at the top level.")]
    NotAMapping(String),
    #[error("Unknown bucket backend '{0}'.")]
    UnknownBackend(String),
}

/// A file-backed store for the content of one bucket.
pub trait Document: fmt::Debug {
    fn name(&self) -> &str;

    fn path(&self) -> &Path;

    /// Reads the whole document. The top level is always a mapping.
    fn load(&self) -> Result<Value, DocumentError>;

    /// Overwrites the document with `content`.
    fn dump(&self, content: &Value) -> Result<(), DocumentError>;
}

/// The YAML backend. Key order survives a load/dump cycle.
#[derive(Debug, Clone)]
pub struct YamlDocument {
    name: String,
    path: PathBuf,
}

impl YamlDocument {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl Document for YamlDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Value, DocumentError> {
        let text = fs::read_to_string(&self.path).map_err(|source| DocumentError::Read {
            path: self.display_path(),
            source,
        })?;
        let content: Value = serde_yaml::from_str(&text).map_err(|source| DocumentError::Parse {
            path: self.display_path(),
            source,
        })?;
        match content {
            // An empty file is an empty bucket.
            Value::Null => Ok(Value::Mapping(Mapping::new())),
            Value::Mapping(_) => Ok(content),
            _ => Err(DocumentError::NotAMapping(self.display_path())),
        }
    }

    fn dump(&self, content: &Value) -> Result<(), DocumentError> {
        let text = serde_yaml::to_string(content)?;
        fs::write(&self.path, text).map_err(|source| DocumentError::Write {
            path: self.display_path(),
            source,
        })
    }
}

/// Builds the document for a bucket with the named backend.
pub fn open_document(
    backend: &str,
    name: &str,
    path: &Path,
) -> Result<Box<dyn Document>, DocumentError> {
    match backend {
        YAML_BACKEND => Ok(Box::new(YamlDocument::new(name, path))),
        other => Err(DocumentError::UnknownBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_and_dump_preserve_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bucket.yml");
        fs::write(&path, "zeta: {path: /z}\nalpha: {path: /a}\n").unwrap();

        let doc = YamlDocument::new("films", &path);
        let content = doc.load().unwrap();
        doc.dump(&content).unwrap();

        let reloaded = doc.load().unwrap();
        let keys: Vec<_> = reloaded
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_file_is_empty_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        fs::write(&path, "").unwrap();
        let content = YamlDocument::new("empty", &path).load().unwrap();
        assert_eq!(content, Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = YamlDocument::new("missing", dir.path().join("nope.yml"));
        assert!(matches!(missing.load(), Err(DocumentError::Read { .. })));

        let path = dir.path().join("list.yml");
        fs::write(&path, "- a\n- b\n").unwrap();
        let list = YamlDocument::new("list", &path);
        assert!(matches!(list.load(), Err(DocumentError::NotAMapping(_))));

        let path = dir.path().join("broken.yml");
        fs::write(&path, "a: [unclosed\n").unwrap();
        let broken = YamlDocument::new("broken", &path);
        assert!(matches!(broken.load(), Err(DocumentError::Parse { .. })));
    }

    #[test]
    fn test_unknown_backend() {
        let err = open_document("json", "films", Path::new("/tmp/films.json")).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownBackend(b) if b == "json"));
    }
}
