//! Durable store backend: the key tree persisted as a TOML file.
//!
//! Every mutation rewrites the file atomically, so a reader never observes a
//! half-written tree.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::super::error::SetupError;
use super::super::file_ops::write_file_atomic;
use super::{ConfigStore, KeyNode, KeyPath, MemoryStore, StoreValue};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: &Path) -> Result<Self, SetupError> {
        let tree = if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| SetupError::ArtifactUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str::<KeyNode>(&text).map_err(|e| SetupError::ArtifactUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            debug!("Store file {} not found, starting empty", path.display());
            KeyNode::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_tree(tree),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `tree` to disk; the live tree is untouched until this succeeds
    fn persist(&self, tree: &KeyNode) -> Result<(), SetupError> {
        let text = toml::to_string_pretty(tree).map_err(|e| SetupError::StoreWrite {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SetupError::StoreWrite {
                path: self.path.clone(),
                source,
            })?;
        }

        write_file_atomic(&self.path, &text).map_err(|source| SetupError::StoreWrite {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for FileStore {
    fn key_exists(&self, path: &KeyPath) -> Result<bool, SetupError> {
        self.inner.key_exists(path)
    }

    fn value(&self, path: &KeyPath, name: &str) -> Result<Option<StoreValue>, SetupError> {
        self.inner.value(path, name)
    }

    fn set_value(
        &mut self,
        path: &KeyPath,
        name: &str,
        value: StoreValue,
    ) -> Result<(), SetupError> {
        if self.inner.value(path, name)?.as_ref() == Some(&value) {
            return Ok(());
        }
        let mut next = self.inner.clone();
        next.set_value(path, name, value)?;
        self.persist(next.tree())?;
        self.inner = next;
        Ok(())
    }

    fn delete_tree(&mut self, path: &KeyPath) -> Result<bool, SetupError> {
        let mut next = self.inner.clone();
        let removed = next.delete_tree(path)?;
        if removed {
            self.persist(next.tree())?;
            self.inner = next;
        }
        Ok(removed)
    }

    fn snapshot(&self, path: &KeyPath) -> Result<Option<KeyNode>, SetupError> {
        self.inner.snapshot(path)
    }
}
