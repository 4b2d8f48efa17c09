//! Found-vs-expected reconciliation.
//!
//! Pure: the report is computed from the registry, nothing is persisted here.

use std::fmt;

use super::super::error::SetupError;
use super::catalog::SettingRegistry;
use super::setting::{Carry, Requirement, Setting, StoreSection};

/// Where a final value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Found,
    Expected,
    Missing,
}

/// Final value of one setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub name: &'static str,
    pub display_name: &'static str,
    pub section: StoreSection,
    pub requirement: Requirement,
    pub found: Option<String>,
    pub expected: Option<String>,
    pub value: Option<String>,
    pub source: ValueSource,
    /// An extractor looked for this setting in the installed release
    pub extracted: bool,
}

impl Reconciled {
    /// Found and expected are both present and disagree
    pub fn differs(&self) -> bool {
        matches!((&self.found, &self.expected), (Some(f), Some(e)) if f != e)
    }

    /// Looked for in the installed release but not found there
    pub fn not_found(&self) -> bool {
        self.extracted && self.found.is_none()
    }
}

/// A non-optional setting the installed release did not provide.
///
/// `value` is what the run will use instead, if anything. Only a hard-required
/// setting left without any value blocks persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationGap {
    pub setting: &'static str,
    pub display_name: &'static str,
    pub hard: bool,
    pub value: Option<String>,
}

impl ConfigurationGap {
    pub fn to_error(&self) -> SetupError {
        SetupError::ConfigurationGap {
            setting: self.setting.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub entries: Vec<Reconciled>,
    pub gaps: Vec<ConfigurationGap>,
}

impl ReconciliationReport {
    pub fn entry(&self, name: &str) -> Option<&Reconciled> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.entry(name).and_then(|e| e.value.as_deref())
    }

    pub fn hard_gaps(&self) -> impl Iterator<Item = &ConfigurationGap> {
        self.gaps.iter().filter(|g| g.hard)
    }

    /// Fail on the first hard-required gap; soft gaps are left to the caller to report
    pub fn ensure_persistable(&self) -> Result<(), SetupError> {
        match self.hard_gaps().next() {
            Some(gap) => Err(gap.to_error()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.entries {
            let found = e.found.as_deref().unwrap_or("-");
            let value = e.value.as_deref().unwrap_or("<missing>");
            let marker = match e.source {
                ValueSource::Found => "found",
                ValueSource::Expected => "expected",
                ValueSource::Missing => "GAP",
            };
            writeln!(
                f,
                "  {:<32} {:<10} {} (found: {})",
                e.display_name, marker, value, found
            )?;
        }
        Ok(())
    }
}

fn reconcile_one(setting: &Setting) -> Reconciled {
    let def = setting.def();
    let found = setting.found_value().map(str::to_string);
    let expected = setting.expected_value().map(str::to_string);

    let (value, source) = match def.carry {
        Carry::Preserve => match (&found, &expected) {
            (Some(f), _) => (Some(f.clone()), ValueSource::Found),
            (None, Some(e)) => (Some(e.clone()), ValueSource::Expected),
            (None, None) => (None, ValueSource::Missing),
        },
        Carry::Expected => match (&expected, &found) {
            (Some(e), _) => (Some(e.clone()), ValueSource::Expected),
            (None, Some(f)) => (Some(f.clone()), ValueSource::Found),
            (None, None) => (None, ValueSource::Missing),
        },
        Carry::Introduced => match &expected {
            Some(e) => (Some(e.clone()), ValueSource::Expected),
            None => (None, ValueSource::Missing),
        },
    };

    Reconciled {
        name: def.name,
        display_name: def.display_name,
        section: def.section,
        requirement: def.requirement,
        found,
        expected,
        value,
        source,
        extracted: setting.is_extracted(),
    }
}

/// Compute the final value of every setting in the registry
pub fn reconcile(registry: &SettingRegistry) -> ReconciliationReport {
    let entries: Vec<Reconciled> = registry.iter().map(reconcile_one).collect();

    let gaps = entries
        .iter()
        .filter(|e| e.requirement != Requirement::Optional)
        .filter(|e| e.value.is_none() || e.not_found())
        .map(|e| ConfigurationGap {
            setting: e.name,
            display_name: e.display_name,
            hard: e.requirement == Requirement::HardRequired && e.value.is_none(),
            value: e.value.clone(),
        })
        .collect();

    ReconciliationReport { entries, gaps }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::catalog::SIGNING_ALGORITHM;
    use super::*;
    use crate::install::constants::{defaults, internal_names};
    use crate::install::signing::SignatureSupport;

    fn registry(overrides: &[(&str, &str)]) -> SettingRegistry {
        let names = [
            internal_names::ENTITY_ID,
            internal_names::CERTIFICATE_THUMBPRINT,
            internal_names::CERTIFICATE_STORE_NAME,
            internal_names::SCHAC_HOME_ORGANIZATION,
            SIGNING_ALGORITHM,
        ];
        let overrides: BTreeMap<String, String> = overrides
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SettingRegistry::new(&names, &overrides, &SignatureSupport::enable()).unwrap()
    }

    #[test]
    fn preserved_identity_survives_upgrade() {
        let mut reg = registry(&[(internal_names::ENTITY_ID, "https://default-sp")]);
        reg.record_found(internal_names::ENTITY_ID, Some("https://operator-sp".into()))
            .unwrap();

        let report = reconcile(&reg);
        let entry = report.entry(internal_names::ENTITY_ID).unwrap();
        assert_eq!(entry.value.as_deref(), Some("https://operator-sp"));
        assert_eq!(entry.source, ValueSource::Found);
        assert!(entry.differs());
    }

    #[test]
    fn version_dictated_value_wins_over_found() {
        let mut reg = registry(&[]);
        reg.record_found(internal_names::CERTIFICATE_STORE_NAME, Some("Legacy".into()))
            .unwrap();

        let report = reconcile(&reg);
        assert_eq!(report.value(internal_names::CERTIFICATE_STORE_NAME), Some("My"));
    }

    #[test]
    fn introduced_setting_uses_expected_verbatim() {
        let mut reg = registry(&[]);
        reg.record_found(SIGNING_ALGORITHM, Some("sha1".into())).unwrap();

        let report = reconcile(&reg);
        assert_eq!(
            report.value(SIGNING_ALGORITHM),
            Some(SignatureSupport::RSA_SHA256)
        );
    }

    #[test]
    fn missing_thumbprint_is_a_hard_gap() {
        let reg = registry(&[]);
        let report = reconcile(&reg);

        let hard: Vec<_> = report.hard_gaps().map(|g| g.setting).collect();
        assert_eq!(hard, vec![internal_names::CERTIFICATE_THUMBPRINT]);
        assert!(
            report
                .gaps
                .iter()
                .any(|g| g.setting == internal_names::SCHAC_HOME_ORGANIZATION && !g.hard)
        );

        match report.ensure_persistable() {
            Err(SetupError::ConfigurationGap { setting }) => {
                assert_eq!(setting, internal_names::CERTIFICATE_THUMBPRINT)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn setting_not_found_is_reported_with_its_default() {
        let names = [internal_names::IDP_ENTITY_ID, internal_names::CERTIFICATE_THUMBPRINT];
        let mut overrides = BTreeMap::new();
        overrides.insert(internal_names::CERTIFICATE_THUMBPRINT.to_string(), "FEED".to_string());
        let mut reg = SettingRegistry::new(&names, &overrides, &SignatureSupport::enable()).unwrap();
        reg.record_found(internal_names::IDP_ENTITY_ID, None).unwrap();
        reg.record_found(internal_names::CERTIFICATE_THUMBPRINT, None).unwrap();

        let report = reconcile(&reg);
        let idp = report
            .gaps
            .iter()
            .find(|g| g.setting == internal_names::IDP_ENTITY_ID)
            .unwrap();
        assert!(!idp.hard);
        assert_eq!(idp.value.as_deref(), Some(defaults::IDP_ENTITY_ID));
        assert_eq!(report.value(internal_names::IDP_ENTITY_ID), Some(defaults::IDP_ENTITY_ID));

        let thumbprint = report
            .gaps
            .iter()
            .find(|g| g.setting == internal_names::CERTIFICATE_THUMBPRINT)
            .unwrap();
        assert!(!thumbprint.hard);
        assert!(report.ensure_persistable().is_ok());
    }

    #[test]
    fn unextracted_default_is_not_a_gap() {
        let reg = SettingRegistry::new(
            &[internal_names::IDP_ENTITY_ID],
            &BTreeMap::new(),
            &SignatureSupport::enable(),
        )
        .unwrap();
        assert!(reconcile(&reg).gaps.is_empty());
    }

    #[test]
    fn reconciliation_is_repeatable() {
        let mut reg = registry(&[]);
        reg.record_found(internal_names::CERTIFICATE_THUMBPRINT, Some("ABCD".into()))
            .unwrap();
        assert_eq!(reconcile(&reg), reconcile(&reg));
    }
}
