//! In-memory store backend

use super::super::error::SetupError;
use super::{ConfigStore, KeyNode, KeyPath, StoreValue};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    root: KeyNode,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(root: KeyNode) -> Self {
        Self { root }
    }

    pub fn tree(&self) -> &KeyNode {
        &self.root
    }
}

impl ConfigStore for MemoryStore {
    fn key_exists(&self, path: &KeyPath) -> Result<bool, SetupError> {
        Ok(self.root.node(path).is_some())
    }

    fn value(&self, path: &KeyPath, name: &str) -> Result<Option<StoreValue>, SetupError> {
        Ok(self
            .root
            .node(path)
            .and_then(|node| node.values.get(name))
            .cloned())
    }

    fn set_value(
        &mut self,
        path: &KeyPath,
        name: &str,
        value: StoreValue,
    ) -> Result<(), SetupError> {
        self.root
            .node_mut_or_create(path)
            .values
            .insert(name.to_string(), value);
        Ok(())
    }

    fn delete_tree(&mut self, path: &KeyPath) -> Result<bool, SetupError> {
        Ok(self.root.remove(path).is_some())
    }

    fn snapshot(&self, path: &KeyPath) -> Result<Option<KeyNode>, SetupError> {
        Ok(self.root.node(path).cloned())
    }
}
