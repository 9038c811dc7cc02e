use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::command::{command_failure, CommandRunner};
use super::firefox::{path_arg, FirefoxProfiles};
use super::{ensure_cert_file, TrustStore};
use crate::SslError;

const SYSTEM_KEYCHAIN: &str = "/Library/Keychains/System.keychain";

/// macOS: trust the CA in the System keychain through an administrator
/// prompt, then import it into Firefox profiles.
pub struct MacOsTrustStore {
    runner: Arc<dyn CommandRunner>,
    prompt_name: String,
    firefox: Option<FirefoxProfiles>,
}

impl MacOsTrustStore {
    pub(crate) fn new(
        runner: Arc<dyn CommandRunner>,
        prompt_name: String,
        firefox: Option<FirefoxProfiles>,
    ) -> Self {
        Self {
            runner,
            prompt_name,
            firefox,
        }
    }

    /// AppleScript that runs `security add-trusted-cert` with administrator privileges.
    fn elevated_script(&self, cert_arg: &str) -> String {
        let command = format!(
            "/usr/bin/security add-trusted-cert -d -r trustRoot -k {} {}",
            shell_quote(SYSTEM_KEYCHAIN),
            shell_quote(cert_arg)
        );
        let prompt = format!("{} wants to trust its local certificate authority.", self.prompt_name);
        format!(
            "do shell script \"{}\" with prompt \"{}\" with administrator privileges",
            applescript_escape(&command),
            applescript_escape(&prompt)
        )
    }
}

impl TrustStore for MacOsTrustStore {
    fn install(&self, cert_path: &Path) -> Result<(), SslError> {
        ensure_cert_file(cert_path)?;
        let cert_arg = path_arg("macos_system_keychain", cert_path)?;

        let args = ["-e".to_string(), self.elevated_script(cert_arg)];
        let outcome = self.runner.run("macos_system_keychain", "osascript", &args)?;
        if !outcome.success {
            return Err(command_failure("macos_system_keychain", &outcome));
        }
        info!(cert = %cert_path.display(), "CA trusted in macOS System keychain");

        if let Some(firefox) = &self.firefox {
            firefox.import(self.runner.as_ref(), cert_arg)?;
        }
        Ok(())
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn applescript_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
