use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::command::{command_failure, CommandRunner};
use super::firefox::{path_arg, restart_firefox, FirefoxProfiles};
use super::{ensure_cert_file, TrustStore};
use crate::SslError;

/// Windows: Firefox profiles first, then the current user's root store.
pub struct WindowsTrustStore {
    runner: Arc<dyn CommandRunner>,
    firefox: Option<FirefoxProfiles>,
    restart_firefox: bool,
}

impl WindowsTrustStore {
    pub(crate) fn new(
        runner: Arc<dyn CommandRunner>,
        firefox: Option<FirefoxProfiles>,
        restart_firefox: bool,
    ) -> Self {
        Self {
            runner,
            firefox,
            restart_firefox,
        }
    }
}

impl TrustStore for WindowsTrustStore {
    fn install(&self, cert_path: &Path) -> Result<(), SslError> {
        ensure_cert_file(cert_path)?;
        let cert_arg = path_arg("windows_root_store", cert_path)?;

        if let Some(firefox) = &self.firefox {
            let updated = firefox.import(self.runner.as_ref(), cert_arg)?;
            if updated > 0 && self.restart_firefox {
                restart_firefox(self.runner.as_ref());
            }
        }

        let args = [
            "-addstore".to_string(),
            "-user".to_string(),
            "root".to_string(),
            cert_arg.to_string(),
        ];
        let outcome = self.runner.run("windows_root_store", "certutil", &args)?;
        if !outcome.success {
            return Err(command_failure("windows_root_store", &outcome));
        }

        info!(cert = %cert_path.display(), "CA installed into Windows user root store");
        Ok(())
    }
}
