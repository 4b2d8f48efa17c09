//! A single named configuration value with found and expected sides

use super::super::error::SetupError;

/// How strictly a setting must end up with a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// May stay empty, nothing is written for it
    Optional,
    /// Reported as a configuration gap when empty
    Mandatory,
    /// A gap aborts the run before anything is persisted
    HardRequired,
}

/// Which side wins during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carry {
    /// Operator-chosen identity: a found value always survives the upgrade
    Preserve,
    /// The version dictates the value; found is only a fallback
    Expected,
    /// New in this version, no legacy equivalent exists
    Introduced,
}

/// Store subsection a setting is persisted under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSection {
    LocalSp,
    StepupIdp,
}

impl StoreSection {
    pub fn key(self) -> &'static str {
        use super::super::constants::store;
        match self {
            StoreSection::LocalSp => store::LOCAL_SP,
            StoreSection::StepupIdp => store::STEPUP_IDP,
        }
    }
}

/// Static definition of a setting known to a plugin version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDef {
    pub name: &'static str,
    pub display_name: &'static str,
    pub requirement: Requirement,
    pub carry: Carry,
    pub section: StoreSection,
    /// Built-in expected value, if the version has one
    pub default: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Found {
    #[default]
    NotExtracted,
    Absent,
    Present(String),
}

/// Setting instance of one install run.
///
/// Identity and expected value are fixed at construction; the found value
/// is written at most once per extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    def: SettingDef,
    expected: Option<String>,
    found: Found,
}

impl Setting {
    pub fn new(def: SettingDef, expected: Option<String>) -> Self {
        Self {
            def,
            expected,
            found: Found::NotExtracted,
        }
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn display_name(&self) -> &'static str {
        self.def.display_name
    }

    pub fn def(&self) -> &SettingDef {
        &self.def
    }

    pub fn expected_value(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn found_value(&self) -> Option<&str> {
        match &self.found {
            Found::Present(v) => Some(v),
            Found::NotExtracted | Found::Absent => None,
        }
    }

    /// True once an extractor looked for this setting, even if nothing was found
    pub fn is_extracted(&self) -> bool {
        self.found != Found::NotExtracted
    }

    /// Record what an extractor found. Blank strings count as absent.
    pub fn record_found(&mut self, value: Option<String>) -> Result<(), SetupError> {
        if self.is_extracted() {
            return Err(SetupError::SettingAlreadyExtracted {
                setting: self.def.name.to_string(),
            });
        }

        self.found = match value {
            Some(v) if !v.trim().is_empty() => Found::Present(v),
            _ => Found::Absent,
        };
        Ok(())
    }

    /// Forget the found value before a new extraction pass
    pub(crate) fn reset_found(&mut self) {
        self.found = Found::NotExtracted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEF: SettingDef = SettingDef {
        name: "entityId",
        display_name: "SFOMfaExtensionEntityId",
        requirement: Requirement::HardRequired,
        carry: Carry::Preserve,
        section: StoreSection::LocalSp,
        default: None,
    };

    #[test]
    fn found_is_written_once_per_pass() {
        let mut setting = Setting::new(DEF, None);
        assert!(!setting.is_extracted());

        setting.record_found(Some("https://sp".into())).unwrap();
        assert_eq!(setting.found_value(), Some("https://sp"));

        let err = setting.record_found(Some("other".into())).unwrap_err();
        assert!(matches!(err, SetupError::SettingAlreadyExtracted { .. }));
        assert_eq!(setting.found_value(), Some("https://sp"));

        setting.reset_found();
        setting.record_found(None).unwrap();
        assert!(setting.is_extracted());
        assert_eq!(setting.found_value(), None);
    }

    #[test]
    fn blank_found_is_absent() {
        let mut setting = Setting::new(DEF, Some("x".into()));
        setting.record_found(Some("   ".into())).unwrap();
        assert_eq!(setting.found_value(), None);
        assert_eq!(setting.expected_value(), Some("x"));
    }
}
