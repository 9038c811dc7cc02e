//! Localhost TLS Server Certificate Generation Module
//!
//! Generates the leaf certificate served by the local HTTPS endpoint. It is
//! signed by the local CA, so once the CA is trusted, browsers accept
//! connections to `https://localhost` and `https://127.0.0.1`.
//!
//! **Certificate Chain**: Fortify Local CA → fortifyapp.com
//!
//! # X.509 Extensions
//! Appended in this order:
//! 1. **Extended Key Usage** (critical): `serverAuth` (1.3.6.1.5.5.7.3.1) only
//! 2. **Subject Alternative Name**: DNS `localhost`, IP `127.0.0.1`
//! 3. **Basic Constraints**: CA=false
//!
//! # Example
//! ```rust,no_run
//! use fortify_ssl::crypto_provider::OpenSslProvider;
//! use fortify_ssl::generate_keypair::generate_key_pair;
//! use fortify_ssl::generate_localhost_cert::LocalhostCertBuilder;
//! # fn example(ca_keys: fortify_ssl::generate_keypair::KeyPair) -> Result<(), fortify_ssl::SslError> {
//! let provider = OpenSslProvider;
//! let leaf_keys = generate_key_pair(&provider)?;
//! let leaf_cert = LocalhostCertBuilder::new(&provider, ca_keys.private_key())
//!     .build(&leaf_keys)?;
//! # Ok(())
//! # }
//! ```

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use openssl::pkey::{PKeyRef, Private};
use openssl::x509::extension::{BasicConstraints, ExtendedKeyUsage, SubjectAlternativeName};

use crate::certificate::{
    sign_certificate, tbs_builder, Certificate, TbsFields, ValidityWindow, CA_COMMON_NAME,
    LEAF_COMMON_NAME,
};
use crate::crypto_provider::CryptoProvider;
use crate::generate_keypair::KeyPair;
use crate::SslError;

pub const LEAF_DNS_NAME: &str = "localhost";
pub const LEAF_IP_ADDRESS: Ipv4Addr = Ipv4Addr::LOCALHOST;

// ================= Localhost TLS Server Certificate Builder =================

/// Builder for the `fortifyapp.com` TLS server certificate signed by the local CA.
///
/// # Certificate Properties
/// - **Subject**: `CN=fortifyapp.com`
/// - **Issuer**: `CN=Fortify Local CA`
/// - **Public key**: the leaf's own key
/// - **Signature**: sha256WithRSAEncryption by the CA private key
///
/// The leaf key pair and the CA key are separate inputs: the leaf key only
/// contributes the subject public key, the CA key only signs.
pub struct LocalhostCertBuilder<'a> {
    provider: &'a dyn CryptoProvider,
    signing_key: &'a PKeyRef<Private>,
    issued_at: DateTime<Utc>,
}

impl<'a> LocalhostCertBuilder<'a> {
    /// # Arguments
    /// * `provider` - Source of serial number entropy
    /// * `ca_private_key` - CA private key that signs the leaf
    pub fn new(provider: &'a dyn CryptoProvider, ca_private_key: &'a PKeyRef<Private>) -> Self {
        Self {
            provider,
            signing_key: ca_private_key,
            issued_at: Utc::now(),
        }
    }

    /// Set the start of the validity window (defaults to now).
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Build the leaf certificate for `key_pair` and sign it with the CA key.
    ///
    /// # Errors
    /// - `SslError::CertificateBuild` if a name, validity or extension
    ///   cannot be constructed
    /// - `SslError::Signing` if the CA key is not an RSA key
    pub fn build(self, key_pair: &KeyPair) -> Result<Certificate, SslError> {
        let mut builder = tbs_builder(
            self.provider,
            TbsFields {
                subject_cn: LEAF_COMMON_NAME,
                issuer_cn: CA_COMMON_NAME,
                key_pair,
                validity: ValidityWindow::one_year_from(self.issued_at)?,
            },
        )?;

        let eku = ExtendedKeyUsage::new()
            .critical()
            .server_auth()
            .build()
            .map_err(|e| SslError::build("build ExtendedKeyUsage", e))?;
        builder
            .append_extension(eku)
            .map_err(|e| SslError::build("add ExtendedKeyUsage", e))?;

        let san = SubjectAlternativeName::new()
            .dns(LEAF_DNS_NAME)
            .ip(&LEAF_IP_ADDRESS.to_string())
            .build(&builder.x509v3_context(None, None))
            .map_err(|e| SslError::build("build SubjectAlternativeName", e))?;
        builder
            .append_extension(san)
            .map_err(|e| SslError::build("add SubjectAlternativeName", e))?;

        // CA=false, non-critical
        let bc = BasicConstraints::new()
            .build()
            .map_err(|e| SslError::build("build BasicConstraints", e))?;
        builder
            .append_extension(bc)
            .map_err(|e| SslError::build("add BasicConstraints", e))?;

        sign_certificate(builder, self.signing_key)
    }
}

/// Build the leaf certificate for `key_pair`, signed by `issuer_private_key`,
/// with the validity starting now.
pub fn build_leaf_certificate(
    provider: &dyn CryptoProvider,
    key_pair: &KeyPair,
    issuer_private_key: &PKeyRef<Private>,
) -> Result<Certificate, SslError> {
    LocalhostCertBuilder::new(provider, issuer_private_key).build(key_pair)
}
