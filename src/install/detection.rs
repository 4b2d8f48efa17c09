//! Installation state detection
//!
//! Determines which plugin release is present in the host directory by
//! checking each known release's component assemblies. Releases that ship the
//! same files are told apart by a marker attribute in their configuration.

use log::{debug, info};
use roxmltree::Document;

use super::file_ops::{FileDirectory, FileService};
use super::versions::{ConfigMarker, KNOWN_VERSIONS, PluginVersion};

/// Installation state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// No component of any known release found
    NotInstalled,
    /// Some components of a release present but incomplete (repair needed)
    PartiallyInstalled,
    /// All assemblies of a release present
    FullyInstalled,
}

/// What detection found in the host directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub state: InstallationState,
    /// Best matching release, `None` when nothing is installed
    pub version: Option<&'static PluginVersion>,
    /// Assemblies of that release missing from the host directory
    pub missing: Vec<&'static str>,
}

impl Detection {
    pub fn not_installed() -> Self {
        Self {
            state: InstallationState::NotInstalled,
            version: None,
            missing: Vec::new(),
        }
    }

    pub fn describe(&self) -> String {
        match (self.state, self.version) {
            (InstallationState::FullyInstalled, Some(v)) => format!("version {} installed", v.version),
            (InstallationState::PartiallyInstalled, Some(v)) => format!(
                "version {} partially installed ({} assemblies missing)",
                v.version,
                self.missing.len()
            ),
            _ => "no installed version found".to_string(),
        }
    }
}

fn marker_present(files: &dyn FileService, marker: &ConfigMarker) -> bool {
    let Ok(text) = files.read_to_string(FileDirectory::AdfsDir, marker.filename) else {
        return false;
    };
    let Ok(doc) = Document::parse(&text) else {
        return false;
    };

    doc.descendants()
        .find(|n| n.is_element() && n.has_tag_name(marker.section))
        .and_then(|s| s.descendants().find(|n| n.has_tag_name(marker.list)))
        .and_then(|l| l.descendants().find(|n| n.has_tag_name("add")))
        .is_some_and(|add| add.attribute(marker.attribute).is_some())
}

fn missing_assemblies(files: &dyn FileService, version: &PluginVersion) -> Vec<&'static str> {
    version
        .components
        .iter()
        .flat_map(|c| c.assemblies.iter())
        .filter(|a| !files.exists(FileDirectory::AdfsDir, a.filename))
        .map(|a| a.filename)
        .collect()
}

/// Check current installation state against every known release
///
/// Returns:
/// - `FullyInstalled` for the newest release whose assemblies (and marker) are all present
/// - `NotInstalled` if no assembly of any release is found
/// - `PartiallyInstalled` with the release that has the most assemblies otherwise
pub fn detect_installation(files: &dyn FileService) -> Detection {
    let mut best: Option<(usize, bool, &'static PluginVersion)> = None;

    for version in KNOWN_VERSIONS {
        let present: usize = version
            .components
            .iter()
            .map(|c| c.present_assemblies(files))
            .sum();
        let marker_ok = version.marker.as_ref().is_none_or(|m| marker_present(files, m));
        debug!(
            "Version {}: {present}/{} assemblies, marker {}",
            version.version,
            version.assembly_count(),
            if marker_ok { "ok" } else { "absent" }
        );

        if present == version.assembly_count() && marker_ok {
            info!("Detected installed version {}", version.version);
            return Detection {
                state: InstallationState::FullyInstalled,
                version: Some(version),
                missing: Vec::new(),
            };
        }

        let better = match best {
            None => present > 0,
            Some((p, m, _)) => present > p || (present == p && marker_ok && !m),
        };
        if better {
            best = Some((present, marker_ok, version));
        }
    }

    match best {
        Some((_, _, version)) => {
            let missing = missing_assemblies(files, version);
            info!(
                "Version {} partially installed, missing: {}",
                version.version,
                missing.join(", ")
            );
            Detection {
                state: InstallationState::PartiallyInstalled,
                version: Some(version),
                missing,
            }
        }
        None => {
            info!("No installed plugin version found");
            Detection::not_installed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::super::constants::files as names;
    use super::super::file_ops::{DirectoryLayout, FsFileService};
    use super::super::versions::{V1_0_1, V2_0_0, V2_1_0};
    use super::*;

    fn service(root: &Path) -> FsFileService {
        FsFileService::new(DirectoryLayout {
            config: root.join("config"),
            adfs: root.join("adfs"),
            dist: root.join("dist"),
            backup: root.join("backup"),
        })
    }

    fn place(files: &FsFileService, version: &PluginVersion) {
        for name in version.files() {
            files.write_file(FileDirectory::AdfsDir, name, "bin");
        }
    }

    #[test]
    fn empty_host_is_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_installation(&service(dir.path())), Detection::not_installed());
    }

    #[test]
    fn marker_separates_sustainsys_releases() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());
        place(&files, &V2_0_0);
        files.write_file(
            FileDirectory::AdfsDir,
            names::SUSTAINSYS_CONFIG,
            r#"<configuration><sustainsys.saml2 entityId="x"><identityProviders><add entityId="y" /></identityProviders></sustainsys.saml2></configuration>"#,
        );
        let detection = detect_installation(&files);
        assert_eq!(detection.state, InstallationState::FullyInstalled);
        assert_eq!(detection.version, Some(&V2_0_0));

        files.write_file(
            FileDirectory::AdfsDir,
            names::SUSTAINSYS_CONFIG,
            r#"<configuration><sustainsys.saml2 entityId="x"><identityProviders><add entityId="y" metadataLocation="md.xml" /></identityProviders></sustainsys.saml2></configuration>"#,
        );
        assert_eq!(detect_installation(&files).version, Some(&V2_1_0));
    }

    #[test]
    fn missing_assembly_is_partial() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());
        place(&files, &V1_0_1);
        files.remove_file(FileDirectory::AdfsDir, "Kentor.AuthServices.dll");

        let detection = detect_installation(&files);
        assert_eq!(detection.state, InstallationState::PartiallyInstalled);
        assert_eq!(detection.version, Some(&V1_0_1));
        assert_eq!(detection.missing, vec!["Kentor.AuthServices.dll"]);
    }
}
