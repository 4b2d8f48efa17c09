#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use stepup_setup::install::constants::{files, internal_names, store as keys};
use stepup_setup::install::store::KeyPath;
use stepup_setup::install::versions::{self, PluginVersion, V1_0_1, V2_0_0};
use stepup_setup::install::{
    ConfigStore, DirectoryLayout, FileDirectory, FileService, FsFileService, MemoryStore,
    RegistryConfiguration, SetupContext, SignatureSupport,
};
use tempfile::TempDir;

pub const SP_ENTITY_ID: &str = "https://adfs.example.org/stepup";
pub const THUMBPRINT: &str = "ABCD1234";
pub const IDP_ENTITY_ID: &str = "https://sa-gw.example.org/second-factor-only/metadata";
pub const SCHAC: &str = "example.org";
pub const MINIMAL_LOA: &str = "http://example.org/assurance/loa2";

/// Host, distribution, configuration and backup directories in a tempdir
pub struct Host {
    pub dir: TempDir,
    pub layout: DirectoryLayout,
}

impl Host {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let layout = DirectoryLayout {
            config: root.join("config"),
            adfs: root.join("adfs"),
            dist: root.join("dist"),
            backup: root.join("backup").join("20260101-120000"),
        };
        Self { dir, layout }
    }

    pub fn files(&self) -> FsFileService {
        FsFileService::new(self.layout.clone())
    }

    pub fn path(&self, dir: FileDirectory, name: &str) -> PathBuf {
        self.layout.dir(dir).join(name)
    }

    pub fn put(&self, dir: FileDirectory, name: &str, contents: &str) {
        let path = self.path(dir, name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read(&self, dir: FileDirectory, name: &str) -> Option<String> {
        fs::read_to_string(self.path(dir, name)).ok()
    }

    pub fn exists(&self, dir: FileDirectory, name: &str) -> bool {
        self.path(dir, name).is_file()
    }

    fn place(&self, version: &PluginVersion) {
        for component in version.components {
            for assembly in component.assemblies {
                self.put(FileDirectory::AdfsDir, assembly.filename, assembly.version);
            }
            if let Some(config) = component.config_filename {
                self.put(FileDirectory::AdfsDir, config, "<config/>");
            }
        }
    }

    /// Distribution of the release being installed plus the IdP metadata
    pub fn ship_target(&self) {
        for component in versions::target().components {
            for assembly in component.assemblies {
                self.put(FileDirectory::Dist, assembly.filename, assembly.version);
            }
            if let Some(config) = component.config_filename.filter(|_| !component.config_generated)
            {
                self.put(FileDirectory::Dist, config, "<log4net/>");
            }
        }
        self.put(FileDirectory::Config, files::DEFAULT_IDP_METADATA, "<EntityDescriptor/>");
    }

    /// 2.0.0 installation: Sustainsys XML in the host directory, LocalSP in the store
    pub fn install_v2_0(&self, store: &mut MemoryStore, thumbprint: Option<&str>) {
        self.place(&V2_0_0);

        let certificate = thumbprint
            .map(|t| format!(r#"findValue="{t}""#))
            .unwrap_or_default();
        self.put(
            FileDirectory::AdfsDir,
            files::SUSTAINSYS_CONFIG,
            &format!(
                r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <sustainsys.saml2 entityId="{SP_ENTITY_ID}" modulePath="/Saml2">
    <serviceCertificates>
      <add use="Signing" storeName="My" storeLocation="LocalMachine" x509FindType="FindByThumbprint" {certificate} />
    </serviceCertificates>
    <identityProviders>
      <add entityId="{IDP_ENTITY_ID}" signOnUrl="https://sa-gw.example.org/second-factor-only/single-sign-on" allowUnsolicitedAuthnResponse="false">
        <signingCertificate storeName="Root" storeLocation="LocalMachine" x509FindType="FindBySubjectName" findValue="sa-gw.example.org" />
      </add>
    </identityProviders>
  </sustainsys.saml2>
</configuration>"#
            ),
        );

        let registry = RegistryConfiguration::default();
        for (key, value) in [
            (internal_names::SCHAC_HOME_ORGANIZATION, SCHAC),
            (internal_names::ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE, "employeeNumber"),
            (internal_names::MINIMAL_LOA, MINIMAL_LOA),
        ] {
            registry
                .write(store, keys::LOCAL_SP, key, value.into())
                .unwrap();
        }
    }

    /// 1.0.1 installation: everything in the servicehost configuration
    pub fn install_v1(&self) {
        self.place(&V1_0_1);
        self.put(
            FileDirectory::AdfsDir,
            files::ADFS_SERVICEHOST_CONFIG,
            &format!(
                r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <kentor.authServices entityId="{SP_ENTITY_ID}">
    <identityProviders>
      <add entityId="{IDP_ENTITY_ID}" signOnUrl="https://sa-gw.example.org/sso" />
    </identityProviders>
    <serviceCertificates>
      <add storeName="My" storeLocation="LocalMachine" x509FindType="FindByThumbprint" findValue="{THUMBPRINT}" />
    </serviceCertificates>
  </kentor.authServices>
  <SURFnet.Authentication.ADFS.StepUp>
    <localSP schacHomeOrganization="{SCHAC}" activeDirectoryUserIdAttribute="employeeNumber" minimalLoa="{MINIMAL_LOA}" />
  </SURFnet.Authentication.ADFS.StepUp>
</configuration>"#
            ),
        );
    }
}

pub fn context(files: impl FileService + 'static, store: MemoryStore) -> SetupContext {
    SetupContext::new(Box::new(files), Box::new(store), SignatureSupport::enable())
}

/// Whole plugin tree below the store root
pub fn store_tree(ctx: &SetupContext) -> Option<stepup_setup::install::store::KeyNode> {
    ctx.store()
        .snapshot(&KeyPath::parse(keys::ROOT_KEY))
        .unwrap()
}

pub fn read_setting(ctx: &SetupContext, section: &str, key: &str) -> Option<String> {
    ctx.registry()
        .read(ctx.store(), section, key)
        .ok()
        .map(|v| v.to_string())
}

/// File service wrapper recording every call, with injectable failures
#[derive(Clone)]
pub struct RecordingFiles {
    inner: FsFileService,
    pub calls: Rc<RefCell<Vec<String>>>,
    fail_copy_from: Option<(FileDirectory, i32)>,
    fail_copy_to: Option<(FileDirectory, i32)>,
}

impl RecordingFiles {
    pub fn new(inner: FsFileService) -> Self {
        Self {
            inner,
            calls: Rc::new(RefCell::new(Vec::new())),
            fail_copy_from: None,
            fail_copy_to: None,
        }
    }

    pub fn failing_copies_from(mut self, dir: FileDirectory, code: i32) -> Self {
        self.fail_copy_from = Some((dir, code));
        self
    }

    pub fn failing_copies_to(mut self, dir: FileDirectory, code: i32) -> Self {
        self.fail_copy_to = Some((dir, code));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl FileService for RecordingFiles {
    fn path(&self, dir: FileDirectory, filename: &str) -> PathBuf {
        self.inner.path(dir, filename)
    }

    fn copy_file(&self, from: FileDirectory, to: FileDirectory, filename: &str) -> i32 {
        self.record(format!("copy {from:?}->{to:?} {filename}"));
        match (self.fail_copy_from, self.fail_copy_to) {
            (Some((dir, code)), _) if dir == from => code,
            (_, Some((dir, code))) if dir == to => code,
            _ => self.inner.copy_file(from, to, filename),
        }
    }

    fn write_file(&self, dir: FileDirectory, filename: &str, contents: &str) -> i32 {
        self.record(format!("write {dir:?} {filename}"));
        self.inner.write_file(dir, filename, contents)
    }

    fn remove_file(&self, dir: FileDirectory, filename: &str) -> i32 {
        self.record(format!("remove {dir:?} {filename}"));
        self.inner.remove_file(dir, filename)
    }
}
