//! Plugin configuration in the store.
//!
//! Root: `Software\Surfnet\Authentication\ADFS\Plugin`. Several registrations
//! (plugin identities) may live side by side under the root; the
//! `Registration` value at the root names the active one and defaults to
//! `ADFS.SCSA` when absent. Every read and write resolves that pointer first.

use log::debug;
use url::Url;

use super::super::constants::{internal_names, store as keys};
use super::super::error::SetupError;
use super::{ConfigStore, KeyNode, KeyPath, StoreValue};

/// Two-step resolver: registration name, then subsection
#[derive(Debug, Clone)]
pub struct RegistryConfiguration {
    root: KeyPath,
    /// Registration used instead of the `Registration` pointer
    pinned: Option<String>,
}

impl Default for RegistryConfiguration {
    fn default() -> Self {
        Self::new(keys::ROOT_KEY)
    }
}

impl RegistryConfiguration {
    pub fn new(root: &str) -> Self {
        Self {
            root: KeyPath::parse(root),
            pinned: None,
        }
    }

    /// Resolver that ignores the `Registration` pointer and uses `name`.
    /// Used to read the store as it will be after a pointer repair.
    pub fn pinned_to(&self, name: &str) -> Self {
        Self {
            root: self.root.clone(),
            pinned: Some(name.to_string()),
        }
    }

    pub fn root(&self) -> &KeyPath {
        &self.root
    }

    /// Explicit `Registration` pointer, if any. Errors when the root is missing.
    pub fn registration_pointer(
        &self,
        store: &dyn ConfigStore,
    ) -> Result<Option<String>, SetupError> {
        if !store.key_exists(&self.root)? {
            return Err(SetupError::StoreRootMissing {
                root: self.root.to_string(),
            });
        }

        let pointer = store
            .value(&self.root, keys::REGISTRATION_VALUE)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|name| !name.trim().is_empty());
        Ok(pointer)
    }

    /// Step one of every read: the active registration name
    pub fn registration_name(&self, store: &dyn ConfigStore) -> Result<String, SetupError> {
        let pointer = self.registration_pointer(store)?;
        let name = match &self.pinned {
            Some(pinned) => pinned.clone(),
            None => pointer.unwrap_or_else(|| keys::DEFAULT_REGISTRATION_NAME.to_string()),
        };
        debug!("Resolved registration {name} under {}", self.root);
        Ok(name)
    }

    /// Registration name for writing: a missing root means the default registration
    fn registration_name_for_write(&self, store: &dyn ConfigStore) -> Result<String, SetupError> {
        match self.registration_name(store) {
            Err(SetupError::StoreRootMissing { .. }) => {
                Ok(keys::DEFAULT_REGISTRATION_NAME.to_string())
            }
            other => other,
        }
    }

    /// Path of the active registration sub-tree, which must exist
    pub fn registration_path(&self, store: &dyn ConfigStore) -> Result<KeyPath, SetupError> {
        let name = self.registration_name(store)?;
        let path = self.root.join(&name);
        if !store.key_exists(&path)? {
            return Err(SetupError::RegistrationMissing {
                root: self.root.to_string(),
                registration: name,
            });
        }
        Ok(path)
    }

    /// Read a leaf, failing with a distinct error for each missing level
    pub fn read(
        &self,
        store: &dyn ConfigStore,
        subsection: &str,
        key: &str,
    ) -> Result<StoreValue, SetupError> {
        let section = self.registration_path(store)?.join(subsection);
        if !store.key_exists(&section)? {
            return Err(SetupError::SubsectionMissing {
                path: section.to_string(),
            });
        }

        store
            .value(&section, key)?
            .ok_or_else(|| SetupError::ValueMissing {
                path: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Like [`read`](Self::read), but a missing subsection or leaf is `None`.
    /// Missing root or registration still fail.
    pub fn read_optional(
        &self,
        store: &dyn ConfigStore,
        subsection: &str,
        key: &str,
    ) -> Result<Option<StoreValue>, SetupError> {
        match self.read(store, subsection, key) {
            Ok(v) => Ok(Some(v)),
            Err(SetupError::SubsectionMissing { .. } | SetupError::ValueMissing { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a leaf, creating the registration and subsection if needed
    pub fn write(
        &self,
        store: &mut dyn ConfigStore,
        subsection: &str,
        key: &str,
        value: StoreValue,
    ) -> Result<(), SetupError> {
        let name = self.registration_name_for_write(store)?;
        let section = self.root.join(&name).join(subsection);
        store.set_value(&section, key, value)
    }

    /// Point the root at `name`
    pub fn set_registration(
        &self,
        store: &mut dyn ConfigStore,
        name: &str,
    ) -> Result<(), SetupError> {
        store.set_value(&self.root, keys::REGISTRATION_VALUE, name.into())
    }

    /// Does a registration sub-tree named `name` exist
    pub fn has_registration(&self, store: &dyn ConfigStore, name: &str) -> Result<bool, SetupError> {
        store.key_exists(&self.root.join(name))
    }

    /// Remove the active registration sub-tree. Siblings and the root pointer stay.
    pub fn remove_registration(&self, store: &mut dyn ConfigStore) -> Result<bool, SetupError> {
        let name = match self.registration_name(store) {
            Ok(name) => name,
            Err(SetupError::StoreRootMissing { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        store.delete_tree(&self.root.join(&name))
    }

    /// Copy of the active registration sub-tree with its resolved name
    pub fn snapshot(
        &self,
        store: &dyn ConfigStore,
    ) -> Result<Option<(String, KeyNode)>, SetupError> {
        let name = match self.registration_name(store) {
            Ok(name) => name,
            Err(SetupError::StoreRootMissing { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(store
            .snapshot(&self.root.join(&name))?
            .map(|tree| (name, tree)))
    }

    pub fn minimal_loa(&self, store: &dyn ConfigStore) -> Result<Url, SetupError> {
        let value = self.read(store, keys::LOCAL_SP, internal_names::MINIMAL_LOA)?;
        let text = value.to_string();
        Url::parse(&text).map_err(|e| SetupError::InvalidValue {
            key: internal_names::MINIMAL_LOA.to_string(),
            value: text,
            reason: e.to_string(),
        })
    }

    pub fn set_minimal_loa(
        &self,
        store: &mut dyn ConfigStore,
        minimal_loa: &Url,
    ) -> Result<(), SetupError> {
        self.write(
            store,
            keys::LOCAL_SP,
            internal_names::MINIMAL_LOA,
            minimal_loa.into(),
        )
    }
}
