//! Setting definitions and the per-run Setting Registry

use std::collections::BTreeMap;

use super::super::constants::{defaults, files, friendly_names, internal_names};
use super::super::error::SetupError;
use super::super::signing::SignatureSupport;
use super::setting::{Carry, Requirement, Setting, SettingDef, StoreSection};

/// Internal name of the signing algorithm setting, new in 2.1
pub const SIGNING_ALGORITHM: &str = "signingAlgorithm";

/// Every setting any supported version knows, in canonical order.
pub const ALL_SETTINGS: &[SettingDef] = &[
    SettingDef {
        name: internal_names::ENTITY_ID,
        display_name: friendly_names::ENTITY_ID,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: None,
    },
    SettingDef {
        name: internal_names::CERTIFICATE_THUMBPRINT,
        display_name: friendly_names::CERTIFICATE_THUMBPRINT,
        requirement: Requirement::HardRequired,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: None,
    },
    SettingDef {
        name: internal_names::IDP_ENTITY_ID,
        display_name: friendly_names::IDP_ENTITY_ID,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::StepupIdp,
        default: Some(defaults::IDP_ENTITY_ID),
    },
    SettingDef {
        name: internal_names::IDP_METADATA_FILENAME,
        display_name: friendly_names::IDP_METADATA_FILENAME,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::StepupIdp,
        default: Some(files::DEFAULT_IDP_METADATA),
    },
    SettingDef {
        name: internal_names::SCHAC_HOME_ORGANIZATION,
        display_name: friendly_names::SCHAC_HOME_ORGANIZATION,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: None,
    },
    SettingDef {
        name: internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
        display_name: friendly_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: Some(defaults::AD_USER_ID_ATTRIBUTE),
    },
    SettingDef {
        name: internal_names::CERTIFICATE_STORE_NAME,
        display_name: friendly_names::CERTIFICATE_STORE_NAME,
        requirement: Requirement::Mandatory,
        carry: Carry::Expected,
        section: StoreSection::LocalSp,
        default: Some(defaults::CERTIFICATE_STORE_NAME),
    },
    SettingDef {
        name: internal_names::CERTIFICATE_LOCATION,
        display_name: friendly_names::CERTIFICATE_LOCATION,
        requirement: Requirement::Mandatory,
        carry: Carry::Expected,
        section: StoreSection::LocalSp,
        default: Some(defaults::CERTIFICATE_LOCATION),
    },
    SettingDef {
        name: internal_names::FIND_BY,
        display_name: friendly_names::FIND_BY,
        requirement: Requirement::Mandatory,
        carry: Carry::Expected,
        section: StoreSection::LocalSp,
        default: Some(defaults::FIND_BY),
    },
    SettingDef {
        name: internal_names::MINIMAL_LOA,
        display_name: friendly_names::MINIMAL_LOA,
        requirement: Requirement::Mandatory,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: Some(defaults::MINIMAL_LOA),
    },
    SettingDef {
        name: SIGNING_ALGORITHM,
        display_name: "SAML request signing algorithm",
        requirement: Requirement::Optional,
        carry: Carry::Introduced,
        section: StoreSection::LocalSp,
        default: None,
    },
];

/// Look up a definition by internal name
pub fn definition(name: &str) -> Option<&'static SettingDef> {
    ALL_SETTINGS.iter().find(|def| def.name == name)
}

/// Canonical set of settings for the version being installed.
///
/// Expected values come from the built-in defaults, the signing capability
/// and the operator overrides, all applied here at construction.
#[derive(Debug, Clone)]
pub struct SettingRegistry {
    settings: Vec<Setting>,
}

impl SettingRegistry {
    pub fn new(
        names: &[&'static str],
        overrides: &BTreeMap<String, String>,
        signature: &SignatureSupport,
    ) -> Result<Self, SetupError> {
        if let Some(unknown) = overrides.keys().find(|k| !names.iter().any(|n| *n == k.as_str())) {
            return Err(SetupError::Config(format!(
                "unknown setting '{unknown}' in operator settings"
            )));
        }

        let mut settings = Vec::with_capacity(names.len());
        for name in names {
            let def = definition(name).ok_or_else(|| {
                SetupError::Config(format!("setting '{name}' has no definition"))
            })?;

            let expected = match overrides.get(*name) {
                Some(v) => Some(v.clone()),
                None if def.name == SIGNING_ALGORITHM => Some(signature.algorithm().to_string()),
                None => def.default.map(str::to_string),
            };
            settings.push(Setting::new(*def, expected));
        }

        Ok(Self { settings })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name() == name)
    }

    /// Record an extracted value for `name` and return a copy of the updated setting.
    ///
    /// Settings this version does not know are ignored (`Ok(None)`).
    pub fn record_found(
        &mut self,
        name: &str,
        value: Option<String>,
    ) -> Result<Option<Setting>, SetupError> {
        match self.settings.iter_mut().find(|s| s.name() == name) {
            Some(setting) => {
                setting.record_found(value)?;
                Ok(Some(setting.clone()))
            }
            None => {
                log::debug!("Ignoring extracted value for unknown setting {name}");
                Ok(None)
            }
        }
    }

    /// Start a new extraction pass
    pub fn reset_found(&mut self) {
        for setting in &mut self.settings {
            setting.reset_found();
        }
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<&'static str> {
        ALL_SETTINGS.iter().map(|d| d.name).collect()
    }

    #[test]
    fn overrides_replace_builtin_expected() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            internal_names::MINIMAL_LOA.to_string(),
            "http://example.org/loa3".to_string(),
        );
        let registry =
            SettingRegistry::new(&names(), &overrides, &SignatureSupport::enable()).unwrap();

        let loa = registry.get(internal_names::MINIMAL_LOA).unwrap();
        assert_eq!(loa.expected_value(), Some("http://example.org/loa3"));
        let algo = registry.get(SIGNING_ALGORITHM).unwrap();
        assert_eq!(algo.expected_value(), Some(SignatureSupport::RSA_SHA256));
    }

    #[test]
    fn unknown_override_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("nope".to_string(), "x".to_string());
        let err = SettingRegistry::new(&names(), &overrides, &SignatureSupport::enable())
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn unknown_extracted_setting_is_ignored() {
        let mut registry = SettingRegistry::new(
            &[internal_names::ENTITY_ID],
            &BTreeMap::new(),
            &SignatureSupport::enable(),
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .record_found(internal_names::MINIMAL_LOA, Some("x".into()))
                .unwrap()
                .is_none()
        );
    }
}
