//! Persistent Config Store: a hierarchical key/value tree with registration indirection.
//!
//! Backends implement [`ConfigStore`] (plain tree operations). All plugin
//! specific navigation goes through [`RegistryConfiguration`], which resolves
//! the `Registration` pointer before touching any setting.

mod file;
mod memory;
mod registry;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SetupError;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use registry::RegistryConfiguration;

/// Backslash separated key path, e.g. `Software\Surfnet\...\LocalSP`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn parse(path: &str) -> Self {
        KeyPath(
            path.split('\\')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.extend(KeyPath::parse(segment).0);
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\\"))
    }
}

/// Typed leaf value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Dword(u32),
    String(String),
}

impl StoreValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoreValue::String(s) => Some(s),
            StoreValue::Dword(_) => None,
        }
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::String(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::String(value)
    }
}

impl From<&url::Url> for StoreValue {
    fn from(value: &url::Url) -> Self {
        StoreValue::String(value.to_string())
    }
}

impl fmt::Display for StoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreValue::Dword(v) => write!(f, "{v}"),
            StoreValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// One key of the tree: its values and its subkeys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, StoreValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subkeys: BTreeMap<String, KeyNode>,
}

impl KeyNode {
    pub fn node(&self, path: &KeyPath) -> Option<&KeyNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.subkeys.get(segment))
    }

    /// Descend, creating missing keys on the way
    pub fn node_mut_or_create(&mut self, path: &KeyPath) -> &mut KeyNode {
        path.segments().iter().fold(self, |node, segment| {
            node.subkeys.entry(segment.clone()).or_default()
        })
    }

    /// Detach the key at `path`, returning it if it existed
    pub fn remove(&mut self, path: &KeyPath) -> Option<KeyNode> {
        let (last, parents) = path.segments().split_last()?;
        let parent = parents
            .iter()
            .try_fold(self, |node, segment| node.subkeys.get_mut(segment))?;
        parent.subkeys.remove(last)
    }
}

/// Tree operations a durable store backend provides.
///
/// Reads never create keys; `set_value` creates intermediate keys.
pub trait ConfigStore {
    fn key_exists(&self, path: &KeyPath) -> Result<bool, SetupError>;

    fn value(&self, path: &KeyPath, name: &str) -> Result<Option<StoreValue>, SetupError>;

    fn set_value(
        &mut self,
        path: &KeyPath,
        name: &str,
        value: StoreValue,
    ) -> Result<(), SetupError>;

    /// Delete a key and everything below it. Returns false if it did not exist.
    fn delete_tree(&mut self, path: &KeyPath) -> Result<bool, SetupError>;

    /// Copy of the key at `path` and everything below it
    fn snapshot(&self, path: &KeyPath) -> Result<Option<KeyNode>, SetupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_path_parses_and_joins() {
        let root = KeyPath::parse(r"Software\Surfnet\\Plugin\");
        assert_eq!(root.segments().len(), 3);
        let leaf = root.join(r"ADFS.SCSA\LocalSP");
        assert_eq!(leaf.to_string(), r"Software\Surfnet\Plugin\ADFS.SCSA\LocalSP");
    }

    #[test]
    fn node_create_and_remove() {
        let mut tree = KeyNode::default();
        let path = KeyPath::parse(r"a\b\c");
        tree.node_mut_or_create(&path)
            .values
            .insert("v".into(), StoreValue::Dword(1));

        assert!(tree.node(&KeyPath::parse(r"a\b")).is_some());
        let removed = tree.remove(&KeyPath::parse(r"a\b")).unwrap();
        assert!(removed.subkeys.contains_key("c"));
        assert!(tree.node(&KeyPath::parse(r"a\b")).is_none());
        assert!(tree.node(&KeyPath::parse("a")).is_some());
        assert!(tree.remove(&KeyPath::parse(r"x\y")).is_none());
    }
}
