//! Known plugin releases.
//!
//! A release is described by its components, the settings it knows and the
//! extractors that read its configuration schema. The release being installed
//! is [`target`]; the others exist so an upgrade can read what they left behind.

pub mod components;
pub mod extractor;
pub mod kentor;
pub mod metadata;
pub mod store_schema;
pub mod sustainsys;

use super::constants::{files, internal_names, xml};
use super::file_ops::FileDirectory;
use super::settings::SIGNING_ALGORITHM;
use components::StepupComponent;
use extractor::{ArtifactLocation, VersionExtractor};
use kentor::KentorExtractor;
use metadata::MetadataExtractor;
use store_schema::StoreSchemaExtractor;
use sustainsys::SustainsysExtractor;

pub use components::AssemblySpec;
pub use extractor::{ExtractContext, ExtractMode, Extraction, MetadataCopy};

/// Configuration schema of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSchema {
    /// Kentor sections in the servicehost configuration
    Kentor,
    /// Sustainsys XML plus store subsections
    Sustainsys,
    /// As [`ConfigSchema::Sustainsys`], with the IdP configured from a metadata file
    SustainsysMetadata,
}

/// Attribute that tells releases with identical files apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigMarker {
    pub filename: &'static str,
    pub section: &'static str,
    pub list: &'static str,
    pub attribute: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginVersion {
    pub version: &'static str,
    pub components: &'static [StepupComponent],
    pub settings: &'static [&'static str],
    pub schema: ConfigSchema,
    pub marker: Option<ConfigMarker>,
}

const SUSTAINSYS_LOCATION: ArtifactLocation =
    ArtifactLocation::new(FileDirectory::AdfsDir, files::SUSTAINSYS_CONFIG);

const SERVICEHOST_LOCATION: ArtifactLocation =
    ArtifactLocation::new(FileDirectory::AdfsDir, files::ADFS_SERVICEHOST_CONFIG);

/// Settings 2.x keeps in the store instead of the Sustainsys XML
const STORE_SETTINGS: &[&str] = &[
    internal_names::SCHAC_HOME_ORGANIZATION,
    internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
    internal_names::CERTIFICATE_STORE_NAME,
    internal_names::CERTIFICATE_LOCATION,
    internal_names::FIND_BY,
    internal_names::MINIMAL_LOA,
];

const V1_SETTINGS: &[&str] = &[
    internal_names::ENTITY_ID,
    internal_names::CERTIFICATE_THUMBPRINT,
    internal_names::CERTIFICATE_STORE_NAME,
    internal_names::CERTIFICATE_LOCATION,
    internal_names::FIND_BY,
    internal_names::IDP_ENTITY_ID,
    internal_names::SCHAC_HOME_ORGANIZATION,
    internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
    internal_names::MINIMAL_LOA,
];

const V2_SETTINGS: &[&str] = &[
    internal_names::ENTITY_ID,
    internal_names::CERTIFICATE_THUMBPRINT,
    internal_names::IDP_ENTITY_ID,
    internal_names::IDP_METADATA_FILENAME,
    internal_names::SCHAC_HOME_ORGANIZATION,
    internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
    internal_names::CERTIFICATE_STORE_NAME,
    internal_names::CERTIFICATE_LOCATION,
    internal_names::FIND_BY,
    internal_names::MINIMAL_LOA,
];

const V2_1_SETTINGS: &[&str] = &[
    internal_names::ENTITY_ID,
    internal_names::CERTIFICATE_THUMBPRINT,
    internal_names::IDP_ENTITY_ID,
    internal_names::IDP_METADATA_FILENAME,
    internal_names::SCHAC_HOME_ORGANIZATION,
    internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
    internal_names::CERTIFICATE_STORE_NAME,
    internal_names::CERTIFICATE_LOCATION,
    internal_names::FIND_BY,
    internal_names::MINIMAL_LOA,
    SIGNING_ALGORITHM,
];

pub const V1_0_1: PluginVersion = PluginVersion {
    version: "1.0.1",
    components: components::v1::COMPONENTS,
    settings: V1_SETTINGS,
    schema: ConfigSchema::Kentor,
    marker: None,
};

pub const V2_0_0: PluginVersion = PluginVersion {
    version: "2.0.0",
    components: components::v2::COMPONENTS_2_0,
    settings: V2_SETTINGS,
    schema: ConfigSchema::Sustainsys,
    marker: None,
};

pub const V2_1_0: PluginVersion = PluginVersion {
    version: "2.1.0",
    components: components::v2::COMPONENTS_2_1,
    settings: V2_1_SETTINGS,
    schema: ConfigSchema::SustainsysMetadata,
    marker: Some(ConfigMarker {
        filename: files::SUSTAINSYS_CONFIG,
        section: xml::SUSTAINSYS_SECTION,
        list: xml::IDENTITY_PROVIDERS,
        attribute: xml::METADATA_LOCATION,
    }),
};

/// Known releases, newest first
pub const KNOWN_VERSIONS: &[PluginVersion] = &[V2_1_0, V2_0_0, V1_0_1];

/// The release this setup installs
pub fn target() -> &'static PluginVersion {
    &KNOWN_VERSIONS[0]
}

pub fn by_version(version: &str) -> Option<&'static PluginVersion> {
    KNOWN_VERSIONS.iter().find(|v| v.version == version)
}

impl PluginVersion {
    /// Extractors that together read this release's configuration, in order
    pub fn extractors(&self) -> Vec<Box<dyn VersionExtractor>> {
        match self.schema {
            ConfigSchema::Kentor => vec![Box::new(KentorExtractor::new(SERVICEHOST_LOCATION))],
            ConfigSchema::Sustainsys => vec![
                Box::new(SustainsysExtractor::new(SUSTAINSYS_LOCATION)),
                Box::new(StoreSchemaExtractor::new(STORE_SETTINGS)),
            ],
            ConfigSchema::SustainsysMetadata => vec![
                Box::new(MetadataExtractor::new(SustainsysExtractor::new(
                    SUSTAINSYS_LOCATION,
                ))),
                Box::new(StoreSchemaExtractor::new(STORE_SETTINGS)),
            ],
        }
    }

    /// Install also stages the IdP metadata file
    pub fn uses_metadata(&self) -> bool {
        self.schema == ConfigSchema::SustainsysMetadata
    }

    /// Files this release owns in the host directory
    pub fn files(&self) -> Vec<&'static str> {
        self.components.iter().flat_map(|c| c.files()).collect()
    }

    pub fn assembly_count(&self) -> usize {
        self.components.iter().map(|c| c.assemblies.len()).sum()
    }
}
