//! Two-stage extractor of the "from Metadata" release.
//!
//! Stage one is the plain Sustainsys extraction. Stage two stages the IdP
//! metadata file named by the extracted settings from the configuration source
//! directory into the host directory. A failing copy leaves the settings of
//! stage one in place and is reported on the extraction.

use log::{info, warn};

use super::super::constants::internal_names;
use super::super::error::{STATUS_OK, SetupError};
use super::super::file_ops::FileDirectory;
use super::super::settings::SettingRegistry;
use super::extractor::{ExtractContext, ExtractMode, Extraction, MetadataCopy, VersionExtractor};
use super::sustainsys::SustainsysExtractor;

#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor {
    inner: SustainsysExtractor,
}

impl MetadataExtractor {
    pub const fn new(inner: SustainsysExtractor) -> Self {
        Self { inner }
    }
}

impl VersionExtractor for MetadataExtractor {
    fn name(&self) -> &'static str {
        "Sustainsys.Saml2 XML from Metadata"
    }

    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        settings: &mut SettingRegistry,
    ) -> Result<Extraction, SetupError> {
        let mut extraction = self.inner.extract(ctx, settings)?;

        if ctx.mode == ExtractMode::ReadOnly {
            return Ok(extraction);
        }

        let filename = extraction
            .settings
            .iter()
            .find(|s| s.name() == internal_names::IDP_METADATA_FILENAME)
            .and_then(|s| s.found_value().or(s.expected_value()))
            .map(str::to_string);

        let Some(filename) = filename else {
            warn!("No IdP metadata filename configured, nothing to stage");
            return Ok(extraction);
        };

        let status = ctx
            .files
            .copy_file(FileDirectory::Config, FileDirectory::AdfsDir, &filename);
        if status == STATUS_OK {
            info!("Staged IdP metadata {filename}");
        } else {
            warn!("Staging IdP metadata {filename} failed with status {status}");
        }

        extraction.metadata_copy = Some(MetadataCopy { filename, status });
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::super::constants::files;
    use super::super::super::file_ops::{DirectoryLayout, FileService, FsFileService};
    use super::super::super::settings::ALL_SETTINGS;
    use super::super::super::signing::SignatureSupport;
    use super::super::super::store::{MemoryStore, RegistryConfiguration};
    use super::super::extractor::ArtifactLocation;
    use super::*;

    const CONFIG: &str = r#"<configuration>
  <sustainsys.saml2 entityId="https://sp.example.org">
    <serviceCertificates><add findValue="AB12" /></serviceCertificates>
    <identityProviders><add entityId="https://idp" metadataLocation="idp.xml" /></identityProviders>
  </sustainsys.saml2>
</configuration>"#;

    fn run(root: &std::path::Path, mode: ExtractMode) -> (FsFileService, Extraction) {
        let svc = FsFileService::new(DirectoryLayout {
            config: root.join("config"),
            adfs: root.join("adfs"),
            dist: root.join("dist"),
            backup: root.join("backup"),
        });
        svc.write_file(FileDirectory::AdfsDir, files::SUSTAINSYS_CONFIG, CONFIG);

        let names: Vec<_> = ALL_SETTINGS.iter().map(|d| d.name).collect();
        let mut settings =
            SettingRegistry::new(&names, &BTreeMap::new(), &SignatureSupport::enable()).unwrap();
        let store = MemoryStore::new();
        let registry = RegistryConfiguration::default();
        let ctx = ExtractContext {
            files: &svc,
            store: &store,
            registry: &registry,
            mode,
        };
        let extractor = MetadataExtractor::new(SustainsysExtractor::new(ArtifactLocation::new(
            FileDirectory::AdfsDir,
            files::SUSTAINSYS_CONFIG,
        )));
        let extraction = extractor.extract(&ctx, &mut settings).unwrap();
        (svc, extraction)
    }

    #[test]
    fn stages_metadata_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join("config").join("idp.xml"), "<md/>").unwrap();

        let (svc, extraction) = run(dir.path(), ExtractMode::Stage);
        assert_eq!(
            extraction.metadata_copy,
            Some(MetadataCopy {
                filename: "idp.xml".into(),
                status: STATUS_OK
            })
        );
        assert!(svc.exists(FileDirectory::AdfsDir, "idp.xml"));
    }

    #[test]
    fn failed_copy_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let (_, extraction) = run(dir.path(), ExtractMode::Stage);
        assert_eq!(extraction.settings.len(), 4);
        let copy = extraction.metadata_copy.unwrap();
        assert_ne!(copy.status, STATUS_OK);
    }

    #[test]
    fn read_only_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, extraction) = run(dir.path(), ExtractMode::ReadOnly);
        assert!(extraction.metadata_copy.is_none());
        assert!(!svc.exists(FileDirectory::AdfsDir, "idp.xml"));
    }
}
