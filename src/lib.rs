//! Fortify SSL - Local Certificate Authority for localhost TLS
//!
//! Generates a self-signed local CA and a `localhost` server certificate
//! signed by it, exports both (plus the server private key) as PEM, and
//! installs the CA into the OS and browser trust stores so that the local
//! HTTPS endpoint is trusted without manual user action.
//!
//! # Overview
//!
//! ```text
//! Fortify Local CA (self-signed, CA=true, pathlen=2)
//!   └── fortifyapp.com (signed by the CA, CA=false)
//!         SAN: DNS localhost, IP 127.0.0.1
//!         EKU: serverAuth (critical)
//! ```
//!
//! - **RSA-2048 / SHA-256** keys and signatures throughout
//! - **One calendar year** validity for both certificates
//! - **Fresh keys and serials** on every generation; nothing is reused
//! - **CA key never leaves memory**; only the leaf key is exported
//!
//! # Quick Start
//!
//! ```no_run
//! use fortify_ssl::configs::OutputConfig;
//! use fortify_ssl::ssl_chain::generate_chain;
//! use fortify_ssl::trust_store::{install_trusted_certificate, Platform};
//! use fortify_ssl::configs::TrustConfig;
//!
//! # async fn example() -> Result<(), fortify_ssl::SslError> {
//! let chain = generate_chain().await?;
//! let paths = chain.write_to_dir(&OutputConfig::default())?;
//! install_trusted_certificate(&paths.root, &Platform::current(), &TrustConfig::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Overview
//!
//! - [`crypto_provider`]: injectable source of RSA keys and random bytes
//! - [`generate_keypair`]: RSA-2048 key pairs and PKCS#1 PEM export
//! - [`pem`]: PEM encoding (64-column, CRLF) and decoding
//! - [`certificate`]: shared X.509v3 construction and signing
//! - [`generate_root_ca`]: the self-signed local CA
//! - [`generate_localhost_cert`]: the CA-signed localhost server certificate
//! - [`ssl_chain`]: the generation sequence and artifact persistence
//! - [`trust_store`]: platform trust store installation
//! - [`configs`]: TOML configuration
//!
//! # Error Handling
//!
//! Library operations return [`SslError`], whose variants name the step
//! that failed. A failure anywhere in chain generation aborts the chain.

pub mod certificate;
pub mod configs;
pub mod crypto_provider;
mod errors;
pub mod generate_keypair;
pub mod generate_localhost_cert;
pub mod generate_root_ca;
pub mod pem;
pub mod ssl_chain;
pub mod trust_store;

pub use errors::SslError;
pub use ssl_chain::{generate_chain, ChainGenerator, ChainPaths, SslChain};
