//! Trust store installation
//!
//! Registers the generated CA certificate with the operating system and
//! with browsers that keep their own certificate databases. The platform is
//! probed once with [`Platform::current`] and mapped to a [`TrustStore`]
//! implementation; all platform tools run through a [`CommandRunner`].
//!
//! | Platform | Routine |
//! |----------|---------|
//! | macOS    | `security add-trusted-cert` in the System keychain (admin prompt), Firefox profiles |
//! | Windows  | Firefox profiles via NSS `certutil`, then `certutil -addstore -user root` |
//! | other    | [`SslError::UnsupportedPlatform`] |
//!
//! Nothing is retried; the first failing step is reported to the caller.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::configs::TrustConfig;
use crate::SslError;

mod command;
mod firefox;
mod macos;
mod unsupported;
mod windows;

pub use command::{CommandOutcome, CommandRunner, SystemCommandRunner};
pub use macos::MacOsTrustStore;
pub use unsupported::UnsupportedTrustStore;
pub use windows::WindowsTrustStore;

use firefox::FirefoxProfiles;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other(String),
}

impl Platform {
    /// The platform this process runs on.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Installs a PEM certificate file as a trusted root.
pub trait TrustStore: Send + Sync {
    fn install(&self, cert_path: &Path) -> Result<(), SslError>;
}

/// Select the trust store for `platform`.
pub fn trust_store_for(
    platform: &Platform,
    settings: &TrustConfig,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn TrustStore> {
    match platform {
        Platform::MacOs => Box::new(MacOsTrustStore::new(
            runner,
            settings.prompt_name.clone(),
            firefox_profiles(platform, settings),
        )),
        Platform::Windows => Box::new(WindowsTrustStore::new(
            runner,
            firefox_profiles(platform, settings),
            settings.restart_firefox,
        )),
        Platform::Other(name) => Box::new(UnsupportedTrustStore::new(name.clone())),
    }
}

/// Install the certificate at `cert_path` into the trust stores of `platform`.
pub fn install_trusted_certificate(
    cert_path: &Path,
    platform: &Platform,
    settings: &TrustConfig,
) -> Result<(), SslError> {
    trust_store_for(platform, settings, Arc::new(SystemCommandRunner)).install(cert_path)
}

pub(crate) fn ensure_cert_file(cert_path: &Path) -> Result<(), SslError> {
    if cert_path.is_file() {
        return Ok(());
    }
    Err(SslError::installation(
        "locate_certificate",
        format!("certificate file {} does not exist", cert_path.display()),
    ))
}

fn firefox_profiles(platform: &Platform, settings: &TrustConfig) -> Option<FirefoxProfiles> {
    let profiles_dir = settings
        .firefox_profiles_dir
        .clone()
        .or_else(|| default_profiles_dir(platform))?;
    let certutil = settings
        .nss_certutil_path
        .clone()
        .or_else(|| bundled_certutil(platform))?;
    Some(FirefoxProfiles {
        certutil,
        profiles_dir,
        nickname: settings.certificate_nickname.clone(),
    })
}

fn default_profiles_dir(platform: &Platform) -> Option<PathBuf> {
    match platform {
        Platform::Windows => std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("USERPROFILE")
                    .map(|home| PathBuf::from(home).join("AppData").join("Roaming"))
            })
            .map(|roaming| roaming.join("Mozilla").join("Firefox").join("Profiles")),
        Platform::MacOs => std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("Firefox")
                .join("Profiles")
        }),
        Platform::Other(_) => None,
    }
}

/// NSS `certutil` shipped next to the executable.
fn bundled_certutil(platform: &Platform) -> Option<PathBuf> {
    let file_name = match platform {
        Platform::Windows => "certutil.exe",
        _ => "certutil",
    };
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(file_name))
}
