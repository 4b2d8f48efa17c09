//! Fix: narrow repairs of known-bad store states

use std::fmt;

use log::{info, warn};
use url::Url;

use super::super::constants::{defaults, internal_names, store as keys};
use super::super::core::SetupContext;
use super::super::error::SetupError;

/// A known-bad state and its repair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Root exists without a `Registration` value: write the default name
    MissingRegistrationPointer,
    /// `Registration` names an absent sub-tree while the default one exists
    DanglingRegistrationPointer { pointer: String },
    /// Active registration has no usable `LocalSP\MinimalLoa`
    MissingMinimalLoa { registration: String },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::MissingRegistrationPointer => {
                write!(f, "missing {} value under the store root", keys::REGISTRATION_VALUE)
            }
            Repair::DanglingRegistrationPointer { pointer } => write!(
                f,
                "{} points at missing registration '{pointer}'",
                keys::REGISTRATION_VALUE
            ),
            Repair::MissingMinimalLoa { registration } => write!(
                f,
                "registration '{registration}' has no valid {}\\{}",
                keys::LOCAL_SP,
                internal_names::MINIMAL_LOA
            ),
        }
    }
}

impl Repair {
    /// Registration the pointer will name once this repair is applied
    pub fn repointed_registration(&self) -> Option<&'static str> {
        match self {
            Repair::MissingRegistrationPointer | Repair::DanglingRegistrationPointer { .. } => {
                Some(keys::DEFAULT_REGISTRATION_NAME)
            }
            Repair::MissingMinimalLoa { .. } => None,
        }
    }
}

/// Find repairable states without changing anything
pub fn diagnose(ctx: &SetupContext) -> Result<Vec<Repair>, SetupError> {
    let registry = ctx.registry();
    let store = ctx.store();
    let mut repairs = Vec::new();

    let pointer = match registry.registration_pointer(store) {
        Ok(pointer) => pointer,
        Err(e) if e.is_not_installed() => return Ok(repairs),
        Err(e) => return Err(e),
    };

    let active = match pointer {
        None => {
            repairs.push(Repair::MissingRegistrationPointer);
            keys::DEFAULT_REGISTRATION_NAME.to_string()
        }
        Some(name) if registry.has_registration(store, &name)? => name,
        Some(name) => {
            if !registry.has_registration(store, keys::DEFAULT_REGISTRATION_NAME)? {
                warn!("Registration '{name}' is missing and there is no default to fall back to");
                return Ok(repairs);
            }
            repairs.push(Repair::DanglingRegistrationPointer { pointer: name });
            keys::DEFAULT_REGISTRATION_NAME.to_string()
        }
    };

    if registry.has_registration(store, &active)? {
        let section = registry.root().join(&active).join(keys::LOCAL_SP);
        let loa = store.value(&section, internal_names::MINIMAL_LOA)?;
        let usable = loa
            .as_ref()
            .and_then(|v| v.as_str())
            .is_some_and(|v| Url::parse(v).is_ok());
        if !usable {
            repairs.push(Repair::MissingMinimalLoa {
                registration: active,
            });
        }
    }

    Ok(repairs)
}

fn expected_minimal_loa(ctx: &SetupContext) -> Result<Url, SetupError> {
    let value = ctx
        .overrides()
        .get(internal_names::MINIMAL_LOA)
        .map(String::as_str)
        .unwrap_or(defaults::MINIMAL_LOA);
    Url::parse(value).map_err(|e| SetupError::InvalidValue {
        key: internal_names::MINIMAL_LOA.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Apply every repair [`diagnose`] finds, touching nothing else
pub fn run(ctx: &mut SetupContext) -> Result<Vec<Repair>, SetupError> {
    let repairs = diagnose(ctx)?;
    if repairs.is_empty() {
        info!("Nothing to fix");
        return Ok(repairs);
    }

    let registry = ctx.registry().clone();
    for repair in &repairs {
        info!("Fixing: {repair}");
        match repair {
            Repair::MissingRegistrationPointer | Repair::DanglingRegistrationPointer { .. } => {
                registry.set_registration(ctx.store_mut(), keys::DEFAULT_REGISTRATION_NAME)?;
            }
            Repair::MissingMinimalLoa { .. } => {
                let loa = expected_minimal_loa(ctx)?;
                registry.set_minimal_loa(ctx.store_mut(), &loa)?;
            }
        }
    }

    Ok(repairs)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::super::super::file_ops::{DirectoryLayout, FsFileService};
    use super::super::super::signing::SignatureSupport;
    use super::super::super::store::{ConfigStore, MemoryStore, RegistryConfiguration};
    use super::*;

    fn context(root: &Path, store: MemoryStore) -> SetupContext {
        let files = FsFileService::new(DirectoryLayout {
            config: root.join("config"),
            adfs: root.join("adfs"),
            dist: root.join("dist"),
            backup: root.join("backup"),
        });
        SetupContext::new(Box::new(files), Box::new(store), SignatureSupport::enable())
    }

    #[test]
    fn empty_store_needs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), MemoryStore::new());
        assert!(run(&mut ctx).unwrap().is_empty());
        assert!(!ctx.store().key_exists(ctx.registry().root()).unwrap());
    }

    #[test]
    fn dangling_pointer_and_loa_are_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RegistryConfiguration::default();
        let mut store = MemoryStore::new();
        registry
            .write(&mut store, keys::LOCAL_SP, internal_names::ENTITY_ID, "https://sp".into())
            .unwrap();
        registry.set_registration(&mut store, "Gone").unwrap();

        let mut ctx = context(dir.path(), store);
        let repairs = run(&mut ctx).unwrap();
        assert_eq!(
            repairs,
            vec![
                Repair::DanglingRegistrationPointer {
                    pointer: "Gone".into()
                },
                Repair::MissingMinimalLoa {
                    registration: keys::DEFAULT_REGISTRATION_NAME.into()
                },
            ]
        );

        assert_eq!(
            ctx.registry().registration_name(ctx.store()).unwrap(),
            keys::DEFAULT_REGISTRATION_NAME
        );
        assert_eq!(
            ctx.registry().minimal_loa(ctx.store()).unwrap().as_str(),
            defaults::MINIMAL_LOA
        );
        // untouched
        assert_eq!(
            ctx.registry()
                .read(ctx.store(), keys::LOCAL_SP, internal_names::ENTITY_ID)
                .unwrap()
                .to_string(),
            "https://sp"
        );
        assert!(diagnose(&ctx).unwrap().is_empty());
    }

    #[test]
    fn missing_pointer_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RegistryConfiguration::default();
        let mut store = MemoryStore::new();
        registry
            .write(
                &mut store,
                keys::LOCAL_SP,
                internal_names::MINIMAL_LOA,
                defaults::MINIMAL_LOA.into(),
            )
            .unwrap();

        let mut ctx = context(dir.path(), store);
        assert_eq!(run(&mut ctx).unwrap(), vec![Repair::MissingRegistrationPointer]);
        assert_eq!(
            ctx.registry().registration_pointer(ctx.store()).unwrap().as_deref(),
            Some(keys::DEFAULT_REGISTRATION_NAME)
        );
    }
}
