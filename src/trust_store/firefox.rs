use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::command::{command_failure, CommandRunner};
use crate::SslError;

/// Firefox keeps its own NSS certificate database per profile, so the CA
/// has to be imported into each of them with NSS `certutil`.
#[derive(Debug, Clone)]
pub(crate) struct FirefoxProfiles {
    pub certutil: PathBuf,
    pub profiles_dir: PathBuf,
    pub nickname: String,
}

impl FirefoxProfiles {
    /// Profile directories in name order; empty if Firefox is not installed.
    pub(crate) fn profile_dirs(&self) -> Result<Vec<PathBuf>, SslError> {
        let entries = match fs::read_dir(&self.profiles_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(SslError::Io(error)),
        };
        let mut dirs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Replace the CA in every profile. Returns the number of profiles updated.
    pub(crate) fn import(&self, runner: &dyn CommandRunner, cert_path: &str) -> Result<usize, SslError> {
        let profiles = self.profile_dirs()?;
        if profiles.is_empty() {
            debug!(dir = %self.profiles_dir.display(), "no Firefox profiles found");
            return Ok(0);
        }
        if !self.certutil.is_file() {
            warn!(
                certutil = %self.certutil.display(),
                "NSS certutil not available, skipping Firefox profiles"
            );
            return Ok(0);
        }
        let certutil = path_arg("firefox_profile_import", &self.certutil)?;

        for profile in &profiles {
            let profile_arg = path_arg("firefox_profile_import", profile)?;

            // Drop a CA left by an earlier run; absence is not an error
            let delete = [
                "-D".to_string(),
                "-n".to_string(),
                self.nickname.clone(),
                "-d".to_string(),
                profile_arg.to_string(),
            ];
            if let Err(error) = runner.run("firefox_profile_cleanup", certutil, &delete) {
                debug!(%error, profile = %profile.display(), "previous CA not removed");
            }

            let add = [
                "-A".to_string(),
                "-i".to_string(),
                cert_path.to_string(),
                "-n".to_string(),
                self.nickname.clone(),
                "-t".to_string(),
                "C,c,c".to_string(),
                "-d".to_string(),
                profile_arg.to_string(),
            ];
            let outcome = runner.run("firefox_profile_import", certutil, &add)?;
            if !outcome.success {
                return Err(command_failure("firefox_profile_import", &outcome));
            }
            debug!(profile = %profile.display(), "CA imported into Firefox profile");
        }
        Ok(profiles.len())
    }
}

/// Restart a running Firefox so it reloads its certificate databases.
/// Failures mean Firefox was not running and are ignored.
pub(crate) fn restart_firefox(runner: &dyn CommandRunner) {
    let kill = ["/F".to_string(), "/IM".to_string(), "firefox.exe".to_string()];
    match runner.run("firefox_restart", "taskkill", &kill) {
        Ok(outcome) if outcome.success => {}
        _ => {
            debug!("Firefox was not running");
            return;
        }
    }
    let start = ["/C".to_string(), "start".to_string(), "firefox".to_string()];
    if let Err(error) = runner.run("firefox_restart", "cmd", &start) {
        warn!(%error, "failed to start Firefox again");
    }
}

pub(crate) fn path_arg<'a>(operation: &str, path: &'a Path) -> Result<&'a str, SslError> {
    path.to_str()
        .ok_or_else(|| SslError::installation(operation, format!("invalid path {}", path.display())))
}
