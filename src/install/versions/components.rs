//! Component descriptors and the per-release component tables

use log::{debug, info};

use super::super::constants::files;
use super::super::error::SetupError;
use super::super::file_ops::{FileDirectory, FileService, check_status};

/// One assembly a component needs in the host directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblySpec {
    pub filename: &'static str,
    pub version: &'static str,
}

/// Static metadata of a named plugin component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepupComponent {
    pub name: &'static str,
    pub assemblies: &'static [AssemblySpec],
    /// Configuration file of the component, if it has one
    pub config_filename: Option<&'static str>,
    /// The configuration file is rendered by setup instead of shipped in `Dist`
    pub config_generated: bool,
}

impl StepupComponent {
    /// Every file this component owns in the host directory
    pub fn files(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.assemblies
            .iter()
            .map(|a| a.filename)
            .chain(self.config_filename)
    }

    /// Copy the shipped files from the distribution into the host directory.
    ///
    /// Stops at the first non-zero status of the file service.
    pub fn install(&self, file_service: &dyn FileService) -> Result<(), SetupError> {
        info!("Installing component {}", self.name);

        let shipped = self.assemblies.iter().map(|a| a.filename).chain(
            self.config_filename
                .filter(|_| !self.config_generated),
        );

        for filename in shipped {
            let rc = file_service.copy_file(FileDirectory::Dist, FileDirectory::AdfsDir, filename);
            check_status(rc, file_service.path(FileDirectory::Dist, filename))?;
        }
        Ok(())
    }

    /// Remove every file the component owns from the host directory
    pub fn uninstall(&self, file_service: &dyn FileService) -> Result<(), SetupError> {
        info!("Removing component {}", self.name);

        for filename in self.files() {
            let rc = file_service.remove_file(FileDirectory::AdfsDir, filename);
            check_status(rc, file_service.path(FileDirectory::AdfsDir, filename))?;
        }
        Ok(())
    }

    /// Assemblies of this component present in the host directory
    pub fn present_assemblies(&self, file_service: &dyn FileService) -> usize {
        let present = self
            .assemblies
            .iter()
            .filter(|a| file_service.exists(FileDirectory::AdfsDir, a.filename))
            .count();
        debug!(
            "Component {}: {present}/{} assemblies present",
            self.name,
            self.assemblies.len()
        );
        present
    }
}

const LOG4NET_2_0_8: &[AssemblySpec] = &[AssemblySpec {
    filename: "log4net.dll",
    version: "2.0.8.0",
}];

const LOG4NET: StepupComponent = StepupComponent {
    name: "log4net",
    assemblies: LOG4NET_2_0_8,
    config_filename: Some(files::LOG4NET_CONFIG),
    config_generated: false,
};

/// Components of the 1.0.1 release (Kentor.AuthServices)
pub mod v1 {
    use super::*;

    pub const ADAPTER: StepupComponent = StepupComponent {
        name: "StepupAdapter",
        assemblies: &[AssemblySpec {
            filename: "SURFnet.Authentication.ADFS.MFA.Plugin.dll",
            version: "1.0.1.0",
        }],
        config_filename: None,
        config_generated: false,
    };

    pub const COMPONENTS: &[StepupComponent] = &[
        ADAPTER,
        StepupComponent {
            name: "Saml2",
            assemblies: &[AssemblySpec {
                filename: "Kentor.AuthServices.dll",
                version: "0.21.2",
            }],
            config_filename: None,
            config_generated: false,
        },
        LOG4NET,
    ];
}

/// Components of the 2.x releases (Sustainsys.Saml2 2.3)
pub mod v2 {
    use super::*;

    pub const ADAPTER: StepupComponent = StepupComponent {
        name: "StepupAdapter",
        assemblies: &[AssemblySpec {
            filename: "SURFnet.Authentication.Adfs.Plugin.dll",
            version: "2.0.0.0",
        }],
        config_filename: None,
        config_generated: false,
    };

    const SUSTAINSYS_2_3: &[AssemblySpec] = &[
        AssemblySpec {
            filename: "Sustainsys.Saml2.dll",
            version: "2.3.0.0",
        },
        AssemblySpec {
            filename: "Microsoft.IdentityModel.Tokens.Saml.dll",
            version: "5.2.4.0",
        },
        AssemblySpec {
            filename: "Microsoft.IdentityModel.Xml.dll",
            version: "5.2.4.0",
        },
    ];

    pub const SUSTAINSYS: StepupComponent = StepupComponent {
        name: "Sustainsys.Saml2 v2.3",
        assemblies: SUSTAINSYS_2_3,
        config_filename: Some(files::SUSTAINSYS_CONFIG),
        config_generated: true,
    };

    pub const SUSTAINSYS_FROM_METADATA: StepupComponent = StepupComponent {
        name: "Sustainsys.Saml2 v2.3 from Metadata",
        ..SUSTAINSYS
    };

    pub const COMPONENTS_2_0: &[StepupComponent] = &[ADAPTER, SUSTAINSYS, LOG4NET];

    pub const COMPONENTS_2_1: &[StepupComponent] = &[ADAPTER, SUSTAINSYS_FROM_METADATA, LOG4NET];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_include_config() {
        let names: Vec<_> = LOG4NET.files().collect();
        assert_eq!(names, vec!["log4net.dll", files::LOG4NET_CONFIG]);
        assert!(v1::ADAPTER.files().all(|f| f.ends_with(".dll")));
    }

    #[test]
    fn metadata_variant_owns_same_files() {
        let plain: Vec<_> = v2::SUSTAINSYS.files().collect();
        let md: Vec<_> = v2::SUSTAINSYS_FROM_METADATA.files().collect();
        assert_eq!(plain, md);
        assert_ne!(v2::SUSTAINSYS.name, v2::SUSTAINSYS_FROM_METADATA.name);
    }
}
