//! Cryptographic provider seam
//!
//! Key generation and serial-number entropy go through a [`CryptoProvider`]
//! that is constructed once and handed to every builder, instead of being
//! pulled from process-wide state. [`OpenSslProvider`] is the production
//! implementation; tests substitute deterministic or failing providers.

use std::fmt;

use openssl::bn::BigNum;
use openssl::pkey::Private;
use openssl::rsa::Rsa;

use crate::SslError;

/// Source of RSA key material and random bytes.
pub trait CryptoProvider: Send + Sync + fmt::Debug {
    /// Generate an RSA private key with the given modulus size and public exponent.
    fn generate_rsa(&self, bits: u32, public_exponent: u32) -> Result<Rsa<Private>, SslError>;

    /// Fill `buf` from a cryptographically secure random source.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), SslError>;
}

/// Provider backed by the system OpenSSL library.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSslProvider;

impl CryptoProvider for OpenSslProvider {
    fn generate_rsa(&self, bits: u32, public_exponent: u32) -> Result<Rsa<Private>, SslError> {
        let exponent = BigNum::from_u32(public_exponent)
            .map_err(|e| SslError::key_generation("create public exponent", e))?;
        Rsa::generate_with_e(bits, &exponent)
            .map_err(|e| SslError::key_generation("generate RSA keypair", e))
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), SslError> {
        openssl::rand::rand_bytes(buf).map_err(|e| SslError::key_generation("read random bytes", e))
    }
}
