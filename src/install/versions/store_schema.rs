//! Settings the 2.x releases keep in the Persistent Config Store

use log::info;

use super::super::error::SetupError;
use super::super::settings::{SettingRegistry, definition};
use super::extractor::{ExtractContext, Extraction, VersionExtractor};

/// Reads a fixed list of settings from their store subsections
#[derive(Debug, Clone, Copy)]
pub struct StoreSchemaExtractor {
    names: &'static [&'static str],
}

impl StoreSchemaExtractor {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }
}

impl VersionExtractor for StoreSchemaExtractor {
    fn name(&self) -> &'static str {
        "Persistent Config Store"
    }

    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        settings: &mut SettingRegistry,
    ) -> Result<Extraction, SetupError> {
        let mut extraction = Extraction::default();

        for name in self.names {
            let def = definition(name)
                .ok_or_else(|| SetupError::Config(format!("setting '{name}' has no definition")))?;
            let value = ctx
                .registry
                .read_optional(ctx.store, def.section.key(), def.name)?
                .map(|v| v.to_string());
            extraction.push(settings.record_found(def.name, value)?);
        }

        info!(
            "Extracted {} settings from the store under {}",
            extraction.settings.len(),
            ctx.registry.root()
        );
        Ok(extraction)
    }
}
