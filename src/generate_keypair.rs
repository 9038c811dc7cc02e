//! RSA key pair generation and key export
//!
//! Every certificate in the chain gets a fresh RSA-2048 key with public
//! exponent 65537; signatures are RSASSA-PKCS1-v1_5 over SHA-256.
//!
//! Only the leaf private key ever leaves process memory, exported once as
//! PKCS#1 PEM (`RSA PRIVATE KEY`). The CA key is used to sign the leaf and
//! is dropped with the generator's stack frame.

use std::fmt;

use openssl::pkey::{PKey, Private};
use secrecy::zeroize::Zeroizing;

use crate::crypto_provider::CryptoProvider;
use crate::pem::encode_pem;
use crate::SslError;

pub const RSA_MODULUS_BITS: u32 = 2048;
pub const RSA_PUBLIC_EXPONENT: u32 = 65537;

/// Which half of a key pair to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Private,
    Public,
}

impl KeyKind {
    /// PEM tag for the PKCS#1 encoding of this key half.
    pub fn pem_tag(self) -> &'static str {
        match self {
            KeyKind::Private => "RSA PRIVATE KEY",
            KeyKind::Public => "RSA PUBLIC KEY",
        }
    }
}

/// An RSA-2048 key pair held in memory.
pub struct KeyPair {
    private_key: PKey<Private>,
}

impl KeyPair {
    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// DER `SubjectPublicKeyInfo` of the public half.
    pub fn public_key_der(&self) -> Result<Vec<u8>, SslError> {
        self.private_key
            .public_key_to_der()
            .map_err(|e| SslError::Encoding(format!("failed to export public key: {e}")))
    }

    /// Export one half of the pair as PKCS#1 PEM.
    ///
    /// The DER body always matches the tag: `RSA PRIVATE KEY` wraps an
    /// `RSAPrivateKey` structure and `RSA PUBLIC KEY` an `RSAPublicKey`.
    pub fn export_pem(&self, kind: KeyKind) -> Result<String, SslError> {
        let rsa = self
            .private_key
            .rsa()
            .map_err(|e| SslError::Encoding(format!("key is not an RSA key: {e}")))?;
        let der = match kind {
            KeyKind::Private => Zeroizing::new(
                rsa.private_key_to_der()
                    .map_err(|e| SslError::Encoding(format!("failed to export private key: {e}")))?,
            ),
            KeyKind::Public => Zeroizing::new(
                rsa.public_key_to_der_pkcs1()
                    .map_err(|e| SslError::Encoding(format!("failed to export public key: {e}")))?,
            ),
        };
        encode_pem(&der, kind.pem_tag())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &"RSA")
            .field("bits", &self.private_key.bits())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh RSA-2048 / e=65537 key pair from `provider`.
pub fn generate_key_pair(provider: &dyn CryptoProvider) -> Result<KeyPair, SslError> {
    let rsa = provider.generate_rsa(RSA_MODULUS_BITS, RSA_PUBLIC_EXPONENT)?;
    let private_key =
        PKey::from_rsa(rsa).map_err(|e| SslError::key_generation("create private key", e))?;
    Ok(KeyPair { private_key })
}
