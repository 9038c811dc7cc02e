use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the generated PEM files are written.
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_root_file_name")]
    pub root_file_name: String,
    #[serde(default = "default_cert_file_name")]
    pub cert_file_name: String,
    #[serde(default = "default_key_file_name")]
    pub key_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            root_file_name: default_root_file_name(),
            cert_file_name: default_cert_file_name(),
            key_file_name: default_key_file_name(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("ssl")
}

fn default_root_file_name() -> String {
    "ca.pem".to_string()
}

fn default_cert_file_name() -> String {
    "cert.pem".to_string()
}

fn default_key_file_name() -> String {
    "key.pem".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrustConfig {
    /// Install the CA into the trust stores right after generation
    #[serde(default)]
    pub install: bool,
    /// Nickname used for the CA inside browser certificate databases
    #[serde(default = "default_certificate_nickname")]
    pub certificate_nickname: String,
    /// Application name shown in the macOS elevation prompt
    #[serde(default = "default_prompt_name")]
    pub prompt_name: String,
    /// NSS `certutil` used for Firefox profiles; defaults to one shipped
    /// next to the executable
    #[serde(default)]
    pub nss_certutil_path: Option<PathBuf>,
    #[serde(default)]
    pub firefox_profiles_dir: Option<PathBuf>,
    #[serde(default = "default_restart_firefox")]
    pub restart_firefox: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            install: false,
            certificate_nickname: default_certificate_nickname(),
            prompt_name: default_prompt_name(),
            nss_certutil_path: None,
            firefox_profiles_dir: None,
            restart_firefox: default_restart_firefox(),
        }
    }
}

fn default_certificate_nickname() -> String {
    crate::certificate::CA_COMMON_NAME.to_string()
}

fn default_prompt_name() -> String {
    "Fortify application".to_string()
}

fn default_restart_firefox() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig =
            toml::from_str(&config_str).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load `config.toml` from the working directory, or defaults if it is absent
    pub fn load() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }
}
