use std::fmt::Display;

use thiserror::Error;

/// Failures of chain generation and trust installation.
///
/// Every variant names the step that failed so callers can render a
/// user-facing message without inspecting the source error.
#[derive(Debug, Error)]
pub enum SslError {
    #[error("key generation failed during {step}: {detail}")]
    KeyGeneration { step: &'static str, detail: String },
    #[error("certificate build failed during {step}: {detail}")]
    CertificateBuild { step: &'static str, detail: String },
    #[error("certificate signing failed: {0}")]
    Signing(String),
    #[error("PEM encoding failed: {0}")]
    Encoding(String),
    #[error("unsupported OS platform '{0}'")]
    UnsupportedPlatform(String),
    #[error("trust installation failed during {operation}: {detail}")]
    Installation { operation: String, detail: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SslError {
    pub(crate) fn key_generation(step: &'static str, error: impl Display) -> Self {
        SslError::KeyGeneration {
            step,
            detail: error.to_string(),
        }
    }

    pub(crate) fn build(step: &'static str, error: impl Display) -> Self {
        SslError::CertificateBuild {
            step,
            detail: error.to_string(),
        }
    }

    pub(crate) fn installation(operation: &str, detail: impl Into<String>) -> Self {
        SslError::Installation {
            operation: operation.to_string(),
            detail: detail.into(),
        }
    }
}
