//! Backup: copy the host artifacts and the active store sub-tree aside.
//!
//! The backup folder gets a manifest listing what was saved. The phase only
//! succeeds after every listed file was verified in the folder.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::super::constants::files;
use super::super::core::SetupContext;
use super::super::detection::Detection;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, check_status};
use super::super::store::KeyNode;
use super::super::versions::ConfigSchema;

/// Store sub-tree saved by a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub root: String,
    pub registration: String,
    pub tree: KeyNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub created: DateTime<Utc>,
    pub version: Option<String>,
    pub files: Vec<String>,
    pub store_snapshot: Option<String>,
}

fn serialize<T: Serialize>(value: &T, what: &str) -> Result<String, SetupError> {
    toml::to_string_pretty(value)
        .map_err(|e| SetupError::Config(format!("cannot serialize {what}: {e}")))
}

/// Host files of the detected release that exist and must be saved
fn files_to_save(ctx: &SetupContext, detection: &Detection) -> Vec<String> {
    let Some(version) = detection.version else {
        return Vec::new();
    };

    let mut names: Vec<String> = version.files().into_iter().map(str::to_string).collect();
    if version.schema == ConfigSchema::Kentor {
        names.push(files::ADFS_SERVICEHOST_CONFIG.to_string());
    }

    names
        .into_iter()
        .filter(|name| {
            let present = ctx.files().exists(FileDirectory::AdfsDir, name);
            if !present {
                debug!("Nothing to back up for {name}");
            }
            present
        })
        .collect()
}

pub fn run(ctx: &mut SetupContext, detection: &Detection) -> Result<BackupManifest, SetupError> {
    let backup_dir = ctx.files().path(FileDirectory::Backup, "");
    info!("Backing up to {}", backup_dir.display());

    let saved = files_to_save(ctx, detection);
    for name in &saved {
        let rc = ctx
            .files()
            .copy_file(FileDirectory::AdfsDir, FileDirectory::Backup, name);
        check_status(rc, ctx.files().path(FileDirectory::AdfsDir, name))?;
    }

    let store_snapshot = match ctx.registry().snapshot(ctx.store())? {
        Some((registration, tree)) => {
            let snapshot = StoreSnapshot {
                root: ctx.registry().root().to_string(),
                registration,
                tree,
            };
            let text = serialize(&snapshot, "store snapshot")?;
            let rc = ctx
                .files()
                .write_file(FileDirectory::Backup, files::BACKUP_STORE_SNAPSHOT, &text);
            check_status(rc, ctx.files().path(FileDirectory::Backup, files::BACKUP_STORE_SNAPSHOT))?;
            Some(files::BACKUP_STORE_SNAPSHOT.to_string())
        }
        None => {
            debug!("No registration in the store, nothing to snapshot");
            None
        }
    };

    let manifest = BackupManifest {
        created: Utc::now(),
        version: detection.version.map(|v| v.version.to_string()),
        files: saved,
        store_snapshot,
    };
    let text = serialize(&manifest, "backup manifest")?;
    let rc = ctx
        .files()
        .write_file(FileDirectory::Backup, files::BACKUP_MANIFEST, &text);
    check_status(rc, ctx.files().path(FileDirectory::Backup, files::BACKUP_MANIFEST))?;

    verify(ctx, &manifest)?;
    info!(
        "Backup complete: {} files{}",
        manifest.files.len(),
        if manifest.store_snapshot.is_some() { " and store snapshot" } else { "" }
    );
    Ok(manifest)
}

/// Every file the manifest lists must be present in the backup folder
fn verify(ctx: &SetupContext, manifest: &BackupManifest) -> Result<(), SetupError> {
    let expected = manifest
        .files
        .iter()
        .map(String::as_str)
        .chain(manifest.store_snapshot.as_deref())
        .chain(std::iter::once(files::BACKUP_MANIFEST));

    for name in expected {
        if !ctx.files().exists(FileDirectory::Backup, name) {
            return Err(SetupError::BackupIncomplete {
                dir: ctx.files().path(FileDirectory::Backup, ""),
                reason: format!("{name} missing after copy"),
            });
        }
    }
    Ok(())
}
