//! Uninstall: remove the detected release's host files and its registration.
//!
//! Only the active registration sub-tree is removed; sibling registrations and
//! the `Registration` pointer stay.

use log::info;

use super::super::constants::{internal_names, store as keys};
use super::super::core::SetupContext;
use super::super::detection::Detection;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, check_status};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallSummary {
    pub version: Option<&'static str>,
    pub removed_metadata: Option<String>,
    pub removed_registration: bool,
}

/// Metadata filename the active registration recorded, if it resolves
fn recorded_metadata(ctx: &SetupContext) -> Result<Option<String>, SetupError> {
    match ctx.registry().read_optional(
        ctx.store(),
        keys::STEPUP_IDP,
        internal_names::IDP_METADATA_FILENAME,
    ) {
        Ok(value) => Ok(value.map(|v| v.to_string())),
        Err(e) if e.is_store_resolution() => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn run(ctx: &mut SetupContext, detection: &Detection) -> Result<UninstallSummary, SetupError> {
    let mut summary = UninstallSummary::default();

    match detection.version {
        Some(version) => {
            info!("Uninstalling version {}", version.version);
            for component in version.components {
                component.uninstall(ctx.files())?;
            }
            summary.version = Some(version.version);
        }
        None => info!("No installed files to remove"),
    }

    if let Some(metadata) = recorded_metadata(ctx)? {
        let rc = ctx.files().remove_file(FileDirectory::AdfsDir, &metadata);
        check_status(rc, ctx.files().path(FileDirectory::AdfsDir, &metadata))?;
        summary.removed_metadata = Some(metadata);
    }

    let registry = ctx.registry().clone();
    summary.removed_registration = registry.remove_registration(ctx.store_mut())?;
    if summary.removed_registration {
        info!("Removed active registration under {}", registry.root());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::super::super::detection::detect_installation;
    use super::super::super::file_ops::{DirectoryLayout, FileService, FsFileService};
    use super::super::super::signing::SignatureSupport;
    use super::super::super::store::{ConfigStore, MemoryStore, RegistryConfiguration};
    use super::super::super::versions::V2_1_0;
    use super::*;

    fn service(root: &Path) -> FsFileService {
        FsFileService::new(DirectoryLayout {
            config: root.join("config"),
            adfs: root.join("adfs"),
            dist: root.join("dist"),
            backup: root.join("backup"),
        })
    }

    #[test]
    fn removes_files_and_active_registration_only() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        for name in V2_1_0.files() {
            svc.write_file(FileDirectory::AdfsDir, name, "x");
        }
        svc.write_file(FileDirectory::AdfsDir, "unrelated.dll", "x");
        svc.write_file(FileDirectory::AdfsDir, "md.xml", "<md/>");

        let registry = RegistryConfiguration::default();
        let mut store = MemoryStore::new();
        registry
            .write(&mut store, keys::LOCAL_SP, "k", "default".into())
            .unwrap();
        registry.set_registration(&mut store, "Active").unwrap();
        registry
            .write(
                &mut store,
                keys::STEPUP_IDP,
                internal_names::IDP_METADATA_FILENAME,
                "md.xml".into(),
            )
            .unwrap();

        let detection = detect_installation(&svc);
        let mut ctx = SetupContext::new(
            Box::new(svc.clone()),
            Box::new(store),
            SignatureSupport::enable(),
        );
        let summary = run(&mut ctx, &detection).unwrap();

        assert!(summary.removed_registration);
        assert_eq!(summary.removed_metadata.as_deref(), Some("md.xml"));
        for name in V2_1_0.files() {
            assert!(!svc.exists(FileDirectory::AdfsDir, name));
        }
        assert!(svc.exists(FileDirectory::AdfsDir, "unrelated.dll"));
        assert!(!svc.exists(FileDirectory::AdfsDir, "md.xml"));

        let registry = ctx.registry();
        assert!(!registry.has_registration(ctx.store(), "Active").unwrap());
        assert!(
            registry
                .has_registration(ctx.store(), keys::DEFAULT_REGISTRATION_NAME)
                .unwrap()
        );
        assert_eq!(
            ctx.store()
                .value(registry.root(), keys::REGISTRATION_VALUE)
                .unwrap()
                .map(|v| v.to_string())
                .as_deref(),
            Some("Active")
        );
    }
}
