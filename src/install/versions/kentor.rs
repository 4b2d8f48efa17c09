//! Kentor.AuthServices schema of the 1.x releases.
//!
//! Everything lives in the host's servicehost configuration: the SAML settings
//! in the `kentor.authServices` section and the plugin settings as attributes
//! of the StepUp `localSP` element.

use log::info;
use roxmltree::Node;

use super::super::constants::{internal_names, xml};
use super::super::error::SetupError;
use super::super::settings::SettingRegistry;
use super::extractor::{
    Artifact, ArtifactLocation, ExtractContext, Extraction, VersionExtractor, first_element,
};

fn attr(node: Option<Node<'_, '_>>, name: &str) -> Option<String> {
    node.and_then(|n| n.attribute(name)).map(str::to_string)
}

#[derive(Debug, Clone, Copy)]
pub struct KentorExtractor {
    location: ArtifactLocation,
}

impl KentorExtractor {
    pub const fn new(location: ArtifactLocation) -> Self {
        Self { location }
    }
}

impl VersionExtractor for KentorExtractor {
    fn name(&self) -> &'static str {
        "Kentor.AuthServices XML"
    }

    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        settings: &mut SettingRegistry,
    ) -> Result<Extraction, SetupError> {
        let artifact = Artifact::read(ctx.files, self.location)?;
        let doc = artifact.parse()?;
        let kentor = artifact.section(&doc, xml::KENTOR_SECTION)?;
        let stepup = artifact.section(&doc, xml::STEPUP_SECTION)?;

        let certificate = first_element(kentor, xml::SP_CERTIFICATES)
            .and_then(|certs| first_element(certs, xml::ADD));
        let idp = first_element(kentor, xml::IDENTITY_PROVIDERS)
            .and_then(|idps| first_element(idps, xml::ADD));
        let local_sp = first_element(stepup, xml::LOCAL_SP);

        let values = [
            (internal_names::ENTITY_ID, kentor.attribute(xml::ENTITY_ID).map(str::to_string)),
            (internal_names::CERTIFICATE_THUMBPRINT, attr(certificate, xml::FIND_VALUE)),
            (internal_names::CERTIFICATE_STORE_NAME, attr(certificate, "storeName")),
            (internal_names::CERTIFICATE_LOCATION, attr(certificate, "storeLocation")),
            (internal_names::FIND_BY, attr(certificate, "x509FindType")),
            (internal_names::IDP_ENTITY_ID, attr(idp, xml::ENTITY_ID)),
            (
                internal_names::SCHAC_HOME_ORGANIZATION,
                attr(local_sp, xml::SCHAC_HOME_ORGANIZATION),
            ),
            (
                internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
                attr(local_sp, xml::AD_USER_ID_ATTRIBUTE),
            ),
            (internal_names::MINIMAL_LOA, attr(local_sp, xml::MINIMAL_LOA)),
        ];

        let mut extraction = Extraction::default();
        for (name, value) in values {
            extraction.push(settings.record_found(name, value)?);
        }

        info!(
            "Extracted {} settings from {}",
            extraction.settings.len(),
            artifact.path.display()
        );
        Ok(extraction)
    }
}
