// src/core/bucket.rs

use crate::core::document::{Document, DocumentError};
use crate::core::tree::{Tree, TreeError};
use crate::dev_utils::BlockTimer;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BucketError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// A named document together with the element tree built from it.
///
/// The bucket keeps the content it was loaded with, so saving can be skipped
/// when nothing changed.
#[derive(Debug)]
pub struct Bucket {
    document: Box<dyn Document>,
    tree: Tree,
    snapshot: Value,
}

impl Bucket {
    /// Loads the document. With `lazy` unset every node is expanded right away.
    pub fn open(document: Box<dyn Document>, lazy: bool) -> Result<Self, BucketError> {
        let _timer = BlockTimer::new(format!("load bucket '{}'", document.name()));
        let content = document.load()?;
        log::debug!(
            "Loaded bucket '{}' from '{}'.",
            document.name(),
            document.path().display()
        );
        let mut tree = Tree::new(content.clone());
        if !lazy {
            tree.expand_all()?;
        }
        Ok(Self {
            document,
            tree,
            snapshot: content,
        })
    }

    pub fn name(&self) -> &str {
        self.document.name()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// True when the tree no longer matches the loaded content.
    pub fn is_modified(&self) -> bool {
        self.tree.to_value() != self.snapshot
    }

    /// Writes the tree back when it changed. Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool, BucketError> {
        let content = self.tree.to_value();
        if content == self.snapshot {
            log::debug!("Bucket '{}' unchanged, not saving.", self.name());
            return Ok(false);
        }
        self.document.dump(&content)?;
        log::debug!(
            "Saved bucket '{}' to '{}'.",
            self.name(),
            self.document.path().display()
        );
        self.snapshot = content;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::YamlDocument;
    use std::fs;
    use tempfile::tempdir;

    fn write_bucket(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("films.yml");
        fs::write(&path, "films:\n  alien:\n    path: /m/alien.mkv\n").unwrap();
        path
    }

    #[test]
    fn test_save_skips_unchanged_bucket() {
        let dir = tempdir().unwrap();
        let path = write_bucket(dir.path());
        let mut bucket = Bucket::open(Box::new(YamlDocument::new("films", &path)), true).unwrap();

        let root = bucket.tree().root();
        bucket.tree_mut().children_of(root).unwrap();
        assert!(!bucket.is_modified());
        assert!(!bucket.save().unwrap());
    }

    #[test]
    fn test_save_writes_mutations() {
        let dir = tempdir().unwrap();
        let path = write_bucket(dir.path());
        let mut bucket = Bucket::open(Box::new(YamlDocument::new("films", &path)), false).unwrap();

        let tree = bucket.tree_mut();
        let root = tree.root();
        let films = tree.get_by_name(root, "films").unwrap();
        tree.add(films, "heat", serde_yaml::from_str("{path: /m/heat.mkv}").unwrap())
            .unwrap();
        assert!(bucket.is_modified());
        assert!(bucket.save().unwrap());
        assert!(!bucket.is_modified());

        let reopened = Bucket::open(Box::new(YamlDocument::new("films", &path)), true).unwrap();
        let expected: Value = serde_yaml::from_str(
            "films: {alien: {path: /m/alien.mkv}, heat: {path: /m/heat.mkv}}",
        )
        .unwrap();
        assert_eq!(reopened.tree().to_value(), expected);
    }
}
