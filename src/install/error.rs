//! Setup error taxonomy and the status codes they translate to.

use std::path::PathBuf;

use thiserror::Error;

/// Status code of a successful phase or run.
pub const STATUS_OK: i32 = 0;

/// Errors raised while detecting, migrating or installing the plugin
#[derive(Debug, Error)]
pub enum SetupError {
    /// A mandatory setting has no usable value after extraction and reconciliation
    #[error("configuration gap: setting '{setting}' has no value")]
    ConfigurationGap { setting: String },

    /// The legacy configuration artifact is missing or malformed
    #[error("cannot read configuration artifact {}: {reason}", path.display())]
    ArtifactUnreadable { path: PathBuf, reason: String },

    /// The store root key does not exist: the plugin was never registered
    #[error("missing plugin configuration root '{root}' in the store")]
    StoreRootMissing { root: String },

    /// The root exists but the (indirected) registration sub-tree does not
    #[error("missing registration '{registration}' under '{root}'")]
    RegistrationMissing { root: String, registration: String },

    /// The registration exists but the requested subsection does not
    #[error("missing subsection '{path}' in the store")]
    SubsectionMissing { path: String },

    /// The subsection exists but the leaf value does not
    #[error("missing setting '{key}' in '{path}'")]
    ValueMissing { path: String, key: String },

    /// A value is present but cannot be interpreted
    #[error("invalid value for '{key}': '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A copy, write or removal through the file service failed
    #[error("file operation failed on {} (status {code})", path.display())]
    FileOperation { path: PathBuf, code: i32 },

    /// Backup did not produce a complete, verified copy
    #[error("backup incomplete in {}: {reason}", dir.display())]
    BackupIncomplete { dir: PathBuf, reason: String },

    /// The durable store could not be persisted
    #[error("failed to persist store {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A setting's found value was recorded twice in one extraction pass
    #[error("setting '{setting}' was already extracted in this pass")]
    SettingAlreadyExtracted { setting: String },

    /// Setup configuration is inconsistent
    #[error("setup configuration error: {0}")]
    Config(String),
}

/// Status codes of the error classes.
///
/// They sit clear of the low codes file services report. A file operation
/// code inside [`CLASS_RANGE`] is reported as [`FILE_OPERATION`].
pub mod status {
    pub const CONFIGURATION_GAP: i32 = 201;
    pub const ARTIFACT_UNREADABLE: i32 = 202;
    pub const STORE_RESOLUTION: i32 = 203;
    pub const INVALID_VALUE: i32 = 204;
    pub const FILE_OPERATION: i32 = 205;
    pub const BACKUP_INCOMPLETE: i32 = 206;
    pub const STORE_WRITE: i32 = 207;
    pub const SETTING_ALREADY_EXTRACTED: i32 = 208;
    pub const CONFIG: i32 = 209;

    /// Codes reserved for the error classes
    pub const CLASS_RANGE: std::ops::RangeInclusive<i32> = CONFIGURATION_GAP..=CONFIG;
}

impl SetupError {
    /// Stable non-zero status code for this error class.
    ///
    /// File operations keep the code reported by the file service so that the
    /// operator sees exactly what the failing step returned. A code that
    /// collides with a class code is reported as [`status::FILE_OPERATION`].
    pub fn status_code(&self) -> i32 {
        match self {
            SetupError::ConfigurationGap { .. } => status::CONFIGURATION_GAP,
            SetupError::ArtifactUnreadable { .. } => status::ARTIFACT_UNREADABLE,
            SetupError::StoreRootMissing { .. }
            | SetupError::RegistrationMissing { .. }
            | SetupError::SubsectionMissing { .. }
            | SetupError::ValueMissing { .. } => status::STORE_RESOLUTION,
            SetupError::InvalidValue { .. } => status::INVALID_VALUE,
            SetupError::FileOperation { code, .. }
                if *code != STATUS_OK && !status::CLASS_RANGE.contains(code) =>
            {
                *code
            }
            SetupError::FileOperation { .. } => status::FILE_OPERATION,
            SetupError::BackupIncomplete { .. } => status::BACKUP_INCOMPLETE,
            SetupError::StoreWrite { .. } => status::STORE_WRITE,
            SetupError::SettingAlreadyExtracted { .. } => status::SETTING_ALREADY_EXTRACTED,
            SetupError::Config(_) => status::CONFIG,
        }
    }

    /// True when the store says "never installed" rather than "installed incorrectly".
    pub fn is_not_installed(&self) -> bool {
        matches!(self, SetupError::StoreRootMissing { .. })
    }

    /// A level of the store path could not be resolved on read
    pub fn is_store_resolution(&self) -> bool {
        matches!(
            self,
            SetupError::StoreRootMissing { .. }
                | SetupError::RegistrationMissing { .. }
                | SetupError::SubsectionMissing { .. }
                | SetupError::ValueMissing { .. }
        )
    }
}
