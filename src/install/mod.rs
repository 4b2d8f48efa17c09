//! StepUp ADFS plugin setup library
//!
//! Detects which plugin release is installed, migrates its configuration to
//! the release being installed and sequences the setup phases selected by
//! [`SetupFlags`]. The single entry point is [`run_setup`].

pub mod constants;
pub mod core;
pub mod detection;
pub mod error;
pub mod file_ops;
pub mod flags;
pub mod orchestration;
pub mod phases;
pub mod settings;
pub mod signing;
pub mod store;
pub mod versions;

// Public exports
pub use core::{InstallProgress, SetupContext};
pub use detection::{Detection, InstallationState, detect_installation};
pub use error::{STATUS_OK, SetupError, status};
pub use file_ops::{DirectoryLayout, FileDirectory, FileService, FsFileService};
pub use flags::SetupFlags;
pub use orchestration::{Phase, run_setup};
pub use signing::SignatureSupport;
pub use store::{ConfigStore, FileStore, MemoryStore, RegistryConfiguration};
