//! Signature algorithm capability

/// Proof that SHA-256 XML signature support was enabled for this process.
///
/// Created once during startup and handed to whatever needs to know the
/// signing algorithm, instead of a process-wide "already enabled" flag.
#[derive(Debug, Clone)]
pub struct SignatureSupport {
    algorithm: &'static str,
}

impl SignatureSupport {
    pub const RSA_SHA256: &'static str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// Enable RSA-SHA256 signatures
    pub fn enable() -> Self {
        log::debug!("SHA-256 signature support enabled");
        Self {
            algorithm: Self::RSA_SHA256,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }
}
