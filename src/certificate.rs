//! Shared X.509 construction
//!
//! Both certificate roles start from the same to-be-signed skeleton:
//! X.509v3, a 10-byte random serial, CN-only subject and issuer names,
//! and a one-calendar-year validity window. Role-specific extensions are
//! appended by [`crate::generate_root_ca`] and
//! [`crate::generate_localhost_cert`] before [`sign_certificate`] runs.

use chrono::{DateTime, Datelike, Days, Months, Utc};
use openssl::asn1::{Asn1Time, Asn1Type};
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{Id, PKeyRef, Private};
use openssl::x509::{X509Builder, X509Name, X509};

use crate::crypto_provider::CryptoProvider;
use crate::generate_keypair::KeyPair;
use crate::pem::{encode_pem, CERTIFICATE_TAG};
use crate::SslError;

pub const CA_COMMON_NAME: &str = "Fortify Local CA";
pub const LEAF_COMMON_NAME: &str = "fortifyapp.com";

const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2
const SERIAL_NUMBER_LEN: usize = 10;
const VALIDITY_MONTHS: u32 = 12;

/// A signed X.509v3 certificate.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
}

impl Certificate {
    pub fn x509(&self) -> &X509 {
        &self.x509
    }

    pub fn to_der(&self) -> Result<Vec<u8>, SslError> {
        self.x509
            .to_der()
            .map_err(|e| SslError::Encoding(format!("failed to serialize certificate: {e}")))
    }

    /// PEM text under the `CERTIFICATE` tag.
    pub fn to_pem(&self) -> Result<String, SslError> {
        encode_pem(&self.to_der()?, CERTIFICATE_TAG)
    }

    /// Serial number as uppercase hex.
    pub fn serial_hex(&self) -> Result<String, SslError> {
        let serial = self
            .x509
            .serial_number()
            .to_bn()
            .and_then(|bn| bn.to_hex_str().map(|hex| hex.to_string()))
            .map_err(|e| SslError::Encoding(format!("failed to read serial number: {e}")))?;
        Ok(serial)
    }

    /// SHA-256 fingerprint of the DER encoding, colon-separated hex.
    pub fn sha256_fingerprint(&self) -> Result<String, SslError> {
        let digest = self
            .x509
            .digest(MessageDigest::sha256())
            .map_err(|e| SslError::Encoding(format!("failed to digest certificate: {e}")))?;
        Ok(digest
            .iter()
            .map(|byte| format!("{byte:02X}"))
            .collect::<Vec<_>>()
            .join(":"))
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("serial", &self.serial_hex().ok())
            .field("not_before", &self.x509.not_before().to_string())
            .field("not_after", &self.x509.not_after().to_string())
            .finish()
    }
}

/// Start/end of a certificate's validity, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl ValidityWindow {
    /// `[issued_at, issued_at + 1 calendar year]`.
    ///
    /// A window starting on 29 February ends on 1 March of the next year.
    pub fn one_year_from(issued_at: DateTime<Utc>) -> Result<Self, SslError> {
        let not_before = DateTime::from_timestamp(issued_at.timestamp(), 0)
            .ok_or_else(|| SslError::build("compute not_before", "timestamp out of range"))?;
        let mut not_after = not_before
            .checked_add_months(Months::new(VALIDITY_MONTHS))
            .ok_or_else(|| SslError::build("compute not_after", "timestamp out of range"))?;
        // checked_add_months clamps 29 Feb to 28 Feb; roll over instead
        if not_after.day() != not_before.day() {
            not_after = not_after
                .checked_add_days(Days::new(1))
                .ok_or_else(|| SslError::build("compute not_after", "timestamp out of range"))?;
        }
        Ok(Self {
            not_before,
            not_after,
        })
    }
}

/// Build a subject/issuer name carrying only a Common Name (OID 2.5.4.3),
/// encoded as PrintableString.
pub(crate) fn common_name(cn: &str) -> Result<X509Name, SslError> {
    let mut name_builder =
        X509Name::builder().map_err(|e| SslError::build("create name builder", e))?;
    name_builder
        .append_entry_by_nid_with_type(Nid::COMMONNAME, cn, Asn1Type::PRINTABLESTRING)
        .map_err(|e| SslError::build("set CN", e))?;
    Ok(name_builder.build())
}

/// Fields shared by every certificate role, before extensions are added.
pub(crate) struct TbsFields<'a> {
    pub subject_cn: &'a str,
    pub issuer_cn: &'a str,
    pub key_pair: &'a KeyPair,
    pub validity: ValidityWindow,
}

/// Populate version, serial, names, validity and subject public key.
pub(crate) fn tbs_builder(
    provider: &dyn CryptoProvider,
    fields: TbsFields<'_>,
) -> Result<X509Builder, SslError> {
    let mut builder = X509::builder().map_err(|e| SslError::build("create X509 builder", e))?;

    builder
        .set_version(X509_VERSION_3)
        .map_err(|e| SslError::build("set version", e))?;

    let mut serial_bytes = [0u8; SERIAL_NUMBER_LEN];
    provider.fill_random(&mut serial_bytes)?;
    let serial = BigNum::from_slice(&serial_bytes)
        .and_then(|bn| bn.to_asn1_integer())
        .map_err(|e| SslError::build("create serial number", e))?;
    builder
        .set_serial_number(&serial)
        .map_err(|e| SslError::build("set serial number", e))?;

    let subject = common_name(fields.subject_cn)?;
    builder
        .set_subject_name(&subject)
        .map_err(|e| SslError::build("set subject", e))?;
    let issuer = common_name(fields.issuer_cn)?;
    builder
        .set_issuer_name(&issuer)
        .map_err(|e| SslError::build("set issuer", e))?;

    let not_before = Asn1Time::from_unix(fields.validity.not_before.timestamp())
        .map_err(|e| SslError::build("create not_before", e))?;
    builder
        .set_not_before(&not_before)
        .map_err(|e| SslError::build("set not_before", e))?;
    let not_after = Asn1Time::from_unix(fields.validity.not_after.timestamp())
        .map_err(|e| SslError::build("create not_after", e))?;
    builder
        .set_not_after(&not_after)
        .map_err(|e| SslError::build("set not_after", e))?;

    // The certificate carries its own public key, never the issuer's
    builder
        .set_pubkey(fields.key_pair.private_key())
        .map_err(|e| SslError::build("set public key", e))?;

    Ok(builder)
}

/// Sign the TBS structure with RSASSA-PKCS1-v1_5 / SHA-256.
pub(crate) fn sign_certificate(
    mut builder: X509Builder,
    signing_key: &PKeyRef<Private>,
) -> Result<Certificate, SslError> {
    if signing_key.id() != Id::RSA {
        return Err(SslError::Signing(format!(
            "signing key type {:?} is incompatible with sha256WithRSAEncryption",
            signing_key.id()
        )));
    }
    builder
        .sign(signing_key, MessageDigest::sha256())
        .map_err(|e| SslError::Signing(e.to_string()))?;
    Ok(Certificate {
        x509: builder.build(),
    })
}
