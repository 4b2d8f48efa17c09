//! Sustainsys.Saml2 configuration file: extraction and rendering

use log::info;

use super::super::constants::{internal_names, xml};
use super::super::error::SetupError;
use super::super::settings::{ReconciliationReport, SIGNING_ALGORITHM, SettingRegistry};
use super::extractor::{
    Artifact, ArtifactLocation, ExtractContext, Extraction, VersionExtractor, first_entry_attribute,
};

/// Reads SP entity, signing thumbprint, IdP entity and metadata filename
#[derive(Debug, Clone, Copy)]
pub struct SustainsysExtractor {
    location: ArtifactLocation,
}

impl SustainsysExtractor {
    pub const fn new(location: ArtifactLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> ArtifactLocation {
        self.location
    }
}

impl VersionExtractor for SustainsysExtractor {
    fn name(&self) -> &'static str {
        "Sustainsys.Saml2 XML"
    }

    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        settings: &mut SettingRegistry,
    ) -> Result<Extraction, SetupError> {
        let artifact = Artifact::read(ctx.files, self.location)?;
        let doc = artifact.parse()?;
        let section = artifact.section(&doc, xml::SUSTAINSYS_SECTION)?;

        let sp_entity_id = section.attribute(xml::ENTITY_ID).map(str::to_string);
        let thumbprint = first_entry_attribute(section, xml::SP_CERTIFICATES, xml::FIND_VALUE);
        let idp_entity_id = first_entry_attribute(section, xml::IDENTITY_PROVIDERS, xml::ENTITY_ID);
        let metadata =
            first_entry_attribute(section, xml::IDENTITY_PROVIDERS, xml::METADATA_LOCATION);

        let mut extraction = Extraction::default();
        extraction.push(settings.record_found(internal_names::ENTITY_ID, sp_entity_id)?);
        extraction.push(settings.record_found(internal_names::CERTIFICATE_THUMBPRINT, thumbprint)?);
        extraction.push(settings.record_found(internal_names::IDP_ENTITY_ID, idp_entity_id)?);
        extraction.push(settings.record_found(internal_names::IDP_METADATA_FILENAME, metadata)?);

        info!(
            "Extracted {} settings from {}",
            extraction.settings.len(),
            artifact.path.display()
        );
        Ok(extraction)
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn required(report: &ReconciliationReport, name: &'static str) -> Result<String, SetupError> {
    report
        .value(name)
        .map(escape_attribute)
        .ok_or_else(|| SetupError::ConfigurationGap {
            setting: name.to_string(),
        })
}

/// Render the Sustainsys configuration file from reconciled values.
///
/// The output reads back through [`SustainsysExtractor`] to the same values.
pub fn render_config(report: &ReconciliationReport) -> Result<String, SetupError> {
    let sp_entity_id = required(report, internal_names::ENTITY_ID)?;
    let thumbprint = required(report, internal_names::CERTIFICATE_THUMBPRINT)?;
    let store_name = required(report, internal_names::CERTIFICATE_STORE_NAME)?;
    let store_location = required(report, internal_names::CERTIFICATE_LOCATION)?;
    let find_by = required(report, internal_names::FIND_BY)?;
    let idp_entity_id = required(report, internal_names::IDP_ENTITY_ID)?;
    let metadata = required(report, internal_names::IDP_METADATA_FILENAME)?;

    let signing = report
        .value(SIGNING_ALGORITHM)
        .map(|algo| {
            let algo = escape_attribute(algo);
            format!(" outboundSigningAlgorithm=\"{algo}\" minIncomingSigningAlgorithm=\"{algo}\"")
        })
        .unwrap_or_default();

    Ok(format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <configSections>
    <section name="{section}" type="Sustainsys.Saml2.Configuration.SustainsysSaml2Section, Sustainsys.Saml2" />
  </configSections>
  <{section} {entity_attr}="{sp_entity_id}" modulePath="/Saml2"{signing}>
    <nameIdPolicy allowCreate="true" format="Unspecified" />
    <{certs}>
      <add use="Signing" storeName="{store_name}" storeLocation="{store_location}" x509FindType="{find_by}" {find_attr}="{thumbprint}" />
    </{certs}>
    <{idps}>
      <add {entity_attr}="{idp_entity_id}" {md_attr}="{metadata}" loadMetadata="true" allowUnsolicitedAuthnResponse="false" />
    </{idps}>
  </{section}>
</configuration>
"#,
        section = xml::SUSTAINSYS_SECTION,
        entity_attr = xml::ENTITY_ID,
        certs = xml::SP_CERTIFICATES,
        find_attr = xml::FIND_VALUE,
        idps = xml::IDENTITY_PROVIDERS,
        md_attr = xml::METADATA_LOCATION,
    ))
}
