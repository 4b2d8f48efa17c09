//! Names shared by the setup program, the store and the host plugin

/// Canonical setting identifiers exposed to operators and config tooling
pub mod internal_names {
    pub const SCHAC_HOME_ORGANIZATION: &str = "schacHomeOrganization";
    pub const ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE: &str = "ActiveDirectoryUserIdAttribute";
    pub const ENTITY_ID: &str = "entityId";
    pub const CERTIFICATE_THUMBPRINT: &str = "SpSigningCertificate";
    pub const CERTIFICATE_STORE_NAME: &str = "storeName";
    pub const CERTIFICATE_LOCATION: &str = "storeLocation";
    pub const FIND_BY: &str = "x509FindType";

    // setup-internal
    pub const IDP_ENTITY_ID: &str = "IdPEntityId";
    pub const IDP_METADATA_FILENAME: &str = "IdPMdFilename";
    pub const MINIMAL_LOA: &str = "MinimalLoa";
}

/// Human readable names paired with [`internal_names`]
pub mod friendly_names {
    pub const SCHAC_HOME_ORGANIZATION: &str = "SFOMfaExtensionSchacHomeOrganization";
    pub const ACTIVE_DIRECTORY_USER_ID_ATTRIBUTE: &str =
        "SFOMfaExtensionactiveDirectoryUserIdAttribute";
    pub const ENTITY_ID: &str = "SFOMfaExtensionEntityId";
    pub const CERTIFICATE_THUMBPRINT: &str = "SFOMfaExtensionCertThumbprint";
    pub const CERTIFICATE_STORE_NAME: &str = "storeName";
    pub const CERTIFICATE_LOCATION: &str = "storeLocation";
    pub const FIND_BY: &str = "certificateIdType";

    pub const IDP_ENTITY_ID: &str = "StepUp IdP entityID";
    pub const IDP_METADATA_FILENAME: &str = "StepUp IdP metadata file";
    pub const MINIMAL_LOA: &str = "Minimal level of assurance";
}

/// Persistent Config Store layout
pub mod store {
    /// Root of all plugin registrations
    pub const ROOT_KEY: &str = r"Software\Surfnet\Authentication\ADFS\Plugin";

    /// Value under the root naming the active registration
    pub const REGISTRATION_VALUE: &str = "Registration";

    /// Registration used when no `Registration` value exists
    pub const DEFAULT_REGISTRATION_NAME: &str = "ADFS.SCSA";

    /// Subsection holding the local service provider settings
    pub const LOCAL_SP: &str = "LocalSP";

    /// Subsection holding the StepUp identity provider settings
    pub const STEPUP_IDP: &str = "StepupIdP";
}

/// Files the setup reads, writes or copies
pub mod files {
    /// Host servicehost configuration holding the 1.x Kentor sections
    pub const ADFS_SERVICEHOST_CONFIG: &str = "Microsoft.IdentityServer.Servicehost.exe.config";

    /// Sustainsys configuration written next to the 2.x adapter
    pub const SUSTAINSYS_CONFIG: &str = "SURFnet.Authentication.ADFS.Plugin.config.xml";

    /// log4net configuration shipped with the adapter
    pub const LOG4NET_CONFIG: &str = "SURFnet.Authentication.ADFS.MFA.Plugin.log4net";

    /// Default StepUp gateway metadata filename for metadata based installs
    pub const DEFAULT_IDP_METADATA: &str = "SURFnet.Authentication.ADFS.StepUp.IdP.metadata.xml";

    /// Backup bookkeeping
    pub const BACKUP_MANIFEST: &str = "backup-manifest.toml";
    pub const BACKUP_STORE_SNAPSHOT: &str = "store-snapshot.toml";
}

/// Element and attribute names in the legacy XML schemas
pub mod xml {
    pub const KENTOR_SECTION: &str = "kentor.authServices";
    pub const SUSTAINSYS_SECTION: &str = "sustainsys.saml2";
    pub const STEPUP_SECTION: &str = "SURFnet.Authentication.ADFS.StepUp";
    pub const LOCAL_SP: &str = "localSP";
    pub const SP_CERTIFICATES: &str = "serviceCertificates";
    pub const IDENTITY_PROVIDERS: &str = "identityProviders";
    pub const ADD: &str = "add";
    pub const ENTITY_ID: &str = "entityId";
    pub const FIND_VALUE: &str = "findValue";
    pub const METADATA_LOCATION: &str = "metadataLocation";
    pub const SCHAC_HOME_ORGANIZATION: &str = "schacHomeOrganization";
    pub const AD_USER_ID_ATTRIBUTE: &str = "activeDirectoryUserIdAttribute";
    pub const MINIMAL_LOA: &str = "minimalLoa";
}

/// Built-in expected values of the version being installed
pub mod defaults {
    pub const MINIMAL_LOA: &str = "http://stepup.surfconext.nl/assurance/sfo-level2";
    pub const AD_USER_ID_ATTRIBUTE: &str = "employeeNumber";
    pub const CERTIFICATE_STORE_NAME: &str = "My";
    pub const CERTIFICATE_LOCATION: &str = "LocalMachine";
    pub const FIND_BY: &str = "FindByThumbprint";
    pub const IDP_ENTITY_ID: &str = "https://sa-gw.surfconext.nl/second-factor-only/metadata";
}
