use std::path::Path;

use super::TrustStore;
use crate::SslError;

/// Platforms without an installation routine (Linux included) fail fast.
#[derive(Debug, Clone)]
pub struct UnsupportedTrustStore {
    platform: String,
}

impl UnsupportedTrustStore {
    pub(crate) fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl TrustStore for UnsupportedTrustStore {
    fn install(&self, _cert_path: &Path) -> Result<(), SslError> {
        Err(SslError::UnsupportedPlatform(self.platform.clone()))
    }
}
