//! Setup context: the collaborators and settings one run works with

use std::collections::BTreeMap;

use log::{error, info};

use super::super::error::SetupError;
use super::super::file_ops::FileService;
use super::super::settings::SettingRegistry;
use super::super::signing::SignatureSupport;
use super::super::store::{ConfigStore, RegistryConfiguration};
use super::super::versions::{ExtractContext, ExtractMode, PluginVersion};
use super::progress::InstallProgress;

/// Setup context
pub struct SetupContext {
    files: Box<dyn FileService>,
    store: Box<dyn ConfigStore>,
    registry: RegistryConfiguration,
    signature: SignatureSupport,
    overrides: BTreeMap<String, String>,
    enforce_backup: bool,
    journal: Vec<InstallProgress>,
}

impl SetupContext {
    pub fn new(
        files: Box<dyn FileService>,
        store: Box<dyn ConfigStore>,
        signature: SignatureSupport,
    ) -> Self {
        Self {
            files,
            store,
            registry: RegistryConfiguration::default(),
            signature,
            overrides: BTreeMap::new(),
            enforce_backup: true,
            journal: Vec::new(),
        }
    }

    /// Use a different store root
    pub fn with_registry(mut self, registry: RegistryConfiguration) -> Self {
        self.registry = registry;
        self
    }

    /// Operator supplied expected values, keyed by setting name
    pub fn with_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Attempt Backup before any mutating phase even when it was not requested
    pub fn with_enforced_backup(mut self, enforce: bool) -> Self {
        self.enforce_backup = enforce;
        self
    }

    pub fn files(&self) -> &dyn FileService {
        self.files.as_ref()
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ConfigStore {
        self.store.as_mut()
    }

    pub fn registry(&self) -> &RegistryConfiguration {
        &self.registry
    }

    pub fn signature(&self) -> &SignatureSupport {
        &self.signature
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }

    pub fn enforce_backup(&self) -> bool {
        self.enforce_backup
    }

    /// Fresh Setting Registry for `version` with this run's expected values
    pub fn setting_registry(&self, version: &PluginVersion) -> Result<SettingRegistry, SetupError> {
        SettingRegistry::new(version.settings, &self.overrides, &self.signature)
    }

    pub fn extract_context(&self, mode: ExtractMode) -> ExtractContext<'_> {
        ExtractContext {
            files: self.files.as_ref(),
            store: self.store.as_ref(),
            registry: &self.registry,
            mode,
        }
    }

    /// Record progress in the journal and the log
    pub fn report(&mut self, progress: InstallProgress) {
        if progress.is_error {
            error!("[{}] {}", progress.step, progress.message);
        } else {
            info!("[{}] {}", progress.step, progress.message);
        }
        self.journal.push(progress);
    }

    pub fn journal(&self) -> &[InstallProgress] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<InstallProgress> {
        std::mem::take(&mut self.journal)
    }
}
