//! Local CA Certificate Generation Module
//!
//! Builds the self-signed trust anchor that gets installed into the OS and
//! browser trust stores.
//!
//! ```text
//! Fortify Local CA (self-signed) ← This module
//!   └── fortifyapp.com (signed by the CA)
//! ```
//!
//! # Certificate Properties
//! - **Self-signed**: Issuer and subject are both `CN=Fortify Local CA`
//! - **Basic Constraints**: CA=true, pathlen=2, non-critical
//! - **Key Size**: RSA 2048-bit, SHA-256 signature
//! - **Validity**: one calendar year from generation
//! - **Version**: X.509v3
//!
//! # Example
//! ```rust,no_run
//! use fortify_ssl::crypto_provider::OpenSslProvider;
//! use fortify_ssl::generate_keypair::generate_key_pair;
//! use fortify_ssl::generate_root_ca::RootCaBuilder;
//! # fn example() -> Result<(), fortify_ssl::SslError> {
//!
//! let provider = OpenSslProvider;
//! let ca_keys = generate_key_pair(&provider)?;
//! let ca_cert = RootCaBuilder::new(&provider).build(&ca_keys)?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use openssl::x509::extension::BasicConstraints;

use crate::certificate::{
    sign_certificate, tbs_builder, Certificate, TbsFields, ValidityWindow, CA_COMMON_NAME,
};
use crate::crypto_provider::CryptoProvider;
use crate::generate_keypair::KeyPair;
use crate::SslError;

const CA_PATH_LENGTH: u32 = 2;

/// Builder for the self-signed local CA certificate.
///
/// The CA signs exactly one leaf per chain; its private key is never
/// exported, so a fresh CA is issued on every generation.
pub struct RootCaBuilder<'a> {
    provider: &'a dyn CryptoProvider,
    issued_at: DateTime<Utc>,
}

impl<'a> RootCaBuilder<'a> {
    pub fn new(provider: &'a dyn CryptoProvider) -> Self {
        Self {
            provider,
            issued_at: Utc::now(),
        }
    }

    /// Set the start of the validity window (defaults to now).
    ///
    /// The chain generator passes one clock reading to both builders so the
    /// CA and leaf windows are identical.
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Build and self-sign the CA certificate for `key_pair`.
    ///
    /// # Errors
    /// - `SslError::CertificateBuild` if a name, validity or extension
    ///   cannot be constructed
    /// - `SslError::Signing` if `key_pair` cannot sign with SHA-256/RSA
    pub fn build(self, key_pair: &KeyPair) -> Result<Certificate, SslError> {
        let mut builder = tbs_builder(
            self.provider,
            TbsFields {
                subject_cn: CA_COMMON_NAME,
                issuer_cn: CA_COMMON_NAME,
                key_pair,
                validity: ValidityWindow::one_year_from(self.issued_at)?,
            },
        )?;

        let bc = BasicConstraints::new()
            .ca()
            .pathlen(CA_PATH_LENGTH)
            .build()
            .map_err(|e| SslError::build("build BasicConstraints", e))?;
        builder
            .append_extension(bc)
            .map_err(|e| SslError::build("add BasicConstraints", e))?;

        // Self-signed: issuer key is the subject key
        sign_certificate(builder, key_pair.private_key())
    }
}

/// Build the self-signed CA certificate with the validity starting now.
pub fn build_ca_certificate(
    provider: &dyn CryptoProvider,
    key_pair: &KeyPair,
) -> Result<Certificate, SslError> {
    RootCaBuilder::new(provider).build(key_pair)
}
