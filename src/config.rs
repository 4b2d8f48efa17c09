use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::install::constants::store;
use crate::install::file_ops::DirectoryLayout;

fn default_true() -> bool {
    true
}

/// Top‑level setup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Run Backup before any mutating phase, requested or not
    #[serde(default = "default_true")]
    pub enforce_backup: bool,
    pub directories: DirectoriesConfig,
    pub store: StoreConfig,
    /// Operator supplied expected values keyed by setting name
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

/// The four directory roles of the file service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    /// Configuration source (operator supplied files, IdP metadata)
    pub config: PathBuf,
    /// Host runtime directory
    pub adfs: PathBuf,
    /// Distribution of the release being installed
    pub dist: PathBuf,
    /// Parent of the timestamped backup folders
    pub backup: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Durable store file
    pub path: PathBuf,
    /// Root key of the plugin registrations
    #[serde(default = "default_store_root")]
    pub root: String,
}

fn default_store_root() -> String {
    store::ROOT_KEY.to_string()
}

/// Base data directory of the setup
fn data_dir() -> PathBuf {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            std::env::var("ProgramData")
                .map(|p| PathBuf::from(p).join("SURFnet").join("StepUp"))
                .unwrap_or_else(|_| PathBuf::from("C:\\ProgramData\\SURFnet\\StepUp"))
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("stepup-setup")
        }
    }
}

/// Host directory the ADFS service reads its assemblies and configuration from
fn adfs_dir() -> PathBuf {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            std::env::var("windir")
                .map(|w| PathBuf::from(w).join("ADFS"))
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\ADFS"))
        } else {
            data_dir().join("adfs")
        }
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            enforce_backup: true,
            directories: DirectoriesConfig {
                config: data.join("config"),
                adfs: adfs_dir(),
                dist: data.join("dist"),
                backup: data.join("backup"),
            },
            store: StoreConfig {
                path: data.join("store").join("registry.toml"),
                root: default_store_root(),
            },
            settings: BTreeMap::new(),
        }
    }
}

impl SetupConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stepup-setup").join("setup.toml"))
    }

    /// Directory layout of one run, backing up into `backup/<stamp>`
    pub fn layout(&self, stamp: &str) -> DirectoryLayout {
        DirectoryLayout {
            config: self.directories.config.clone(),
            adfs: self.directories.adfs.clone(),
            dist: self.directories.dist.clone(),
            backup: self.directories.backup.join(stamp),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = SetupConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SetupConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let parsed: SetupConfig = toml::from_str(
            r#"
[directories]
config = "/srv/stepup/config"
adfs = "/srv/adfs"
dist = "/srv/stepup/dist"
backup = "/srv/stepup/backup"

[store]
path = "/srv/stepup/registry.toml"

[settings]
SpSigningCertificate = "ABCD1234"
"#,
        )
        .unwrap();

        assert!(parsed.enforce_backup);
        assert_eq!(parsed.store.root, store::ROOT_KEY);
        assert_eq!(parsed.settings["SpSigningCertificate"], "ABCD1234");
        assert_eq!(
            parsed.layout("20260101-000000").backup,
            PathBuf::from("/srv/stepup/backup/20260101-000000")
        );
    }
}
