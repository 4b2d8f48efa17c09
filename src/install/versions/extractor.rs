//! Version-specific configuration extractors.
//!
//! Every release stores its settings in its own schema. An extractor knows one
//! schema, reads it through the file service or the store, and records what it
//! found into the Setting Registry.

use std::path::PathBuf;

use log::{debug, warn};
use roxmltree::{Document, Node};

use super::super::constants::xml;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, FileService};
use super::super::settings::{Setting, SettingRegistry};
use super::super::store::{ConfigStore, RegistryConfiguration};

/// Whether an extraction pass may stage files for the install step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Inspect only, nothing is touched
    ReadOnly,
    /// Reconfigure: side artifacts (IdP metadata) are staged into the host directory
    Stage,
}

/// Where a file based schema lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub dir: FileDirectory,
    pub filename: &'static str,
}

impl ArtifactLocation {
    pub const fn new(dir: FileDirectory, filename: &'static str) -> Self {
        Self { dir, filename }
    }
}

/// Everything an extractor may read from
pub struct ExtractContext<'a> {
    pub files: &'a dyn FileService,
    pub store: &'a dyn ConfigStore,
    pub registry: &'a RegistryConfiguration,
    pub mode: ExtractMode,
}

/// Outcome of staging the IdP metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCopy {
    pub filename: String,
    pub status: i32,
}

/// Settings one extractor populated, in extraction order
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub settings: Vec<Setting>,
    pub metadata_copy: Option<MetadataCopy>,
}

impl Extraction {
    pub(super) fn push(&mut self, setting: Option<Setting>) {
        if let Some(setting) = setting {
            self.settings.push(setting);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.settings.iter().map(Setting::name).collect()
    }
}

pub trait VersionExtractor {
    /// Schema name for log lines
    fn name(&self) -> &'static str;

    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        settings: &mut SettingRegistry,
    ) -> Result<Extraction, SetupError>;
}

/// Raw artifact text with its resolved path
pub(super) struct Artifact {
    pub path: PathBuf,
    pub text: String,
}

impl Artifact {
    pub fn read(files: &dyn FileService, location: ArtifactLocation) -> Result<Self, SetupError> {
        let path = files.path(location.dir, location.filename);
        debug!("Reading configuration artifact {}", path.display());

        let text = files
            .read_to_string(location.dir, location.filename)
            .map_err(|e| SetupError::ArtifactUnreadable {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { path, text })
    }

    pub fn parse(&self) -> Result<Document<'_>, SetupError> {
        Document::parse(&self.text).map_err(|e| {
            warn!("Malformed XML in {}: {e}", self.path.display());
            SetupError::ArtifactUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// First element named `section` anywhere in the document
    pub fn section<'a, 'input>(
        &self,
        doc: &'a Document<'input>,
        section: &str,
    ) -> Result<Node<'a, 'input>, SetupError> {
        first_element(doc.root(), section).ok_or_else(|| SetupError::ArtifactUnreadable {
            path: self.path.clone(),
            reason: format!("no <{section}> section"),
        })
    }
}

/// First descendant element (depth first, document order) named `name`
pub(super) fn first_element<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.has_tag_name(name))
}

/// Attribute of the first `<add>` entry inside the first `list` element
pub(super) fn first_entry_attribute(node: Node<'_, '_>, list: &str, attribute: &str) -> Option<String> {
    first_element(node, list)
        .and_then(|l| first_element(l, xml::ADD))
        .and_then(|add| add.attribute(attribute))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_element_is_document_order() {
        let doc = Document::parse(
            r#"<c><a><add v="1"/></a><list><add v="2"/><add v="3"/></list></c>"#,
        )
        .unwrap();
        assert_eq!(
            first_entry_attribute(doc.root(), "list", "v").as_deref(),
            Some("2")
        );
        assert_eq!(first_entry_attribute(doc.root(), "missing", "v"), None);
    }
}
