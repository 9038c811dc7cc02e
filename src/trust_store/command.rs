use std::io;
use std::process::Command;
#[cfg(test)]
use std::sync::Mutex;

use crate::SslError;

/// Result of one external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Executes platform tools (`osascript`, `certutil`, `taskkill`, ...).
pub trait CommandRunner: Send + Sync {
    fn run(&self, operation: &str, program: &str, args: &[String]) -> Result<CommandOutcome, SslError>;
}

/// Runs commands with `std::process::Command` and waits for them to exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, operation: &str, program: &str, args: &[String]) -> Result<CommandOutcome, SslError> {
        let output = Command::new(program).args(args).output().map_err(|error| {
            if error.kind() == io::ErrorKind::NotFound {
                return SslError::installation(operation, format!("command '{program}' not found"));
            }
            if error.kind() == io::ErrorKind::PermissionDenied {
                return SslError::installation(
                    operation,
                    format!("permission denied running '{program}': {error}"),
                );
            }
            SslError::Io(error)
        })?;

        Ok(CommandOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

pub(crate) fn command_failure(operation: &str, outcome: &CommandOutcome) -> SslError {
    let code = outcome
        .exit_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "none".to_string());
    let stderr = outcome.stderr.trim();
    let detail = if stderr.is_empty() {
        outcome.stdout.trim()
    } else {
        stderr
    };
    SslError::installation(operation, format!("exit code {code}: {detail}"))
}

/// Records every invocation; commands whose arguments contain one of the
/// `failing` tokens exit with code 1.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    failing: Vec<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

#[cfg(test)]
impl RecordingRunner {
    pub(crate) fn failing_on(tokens: &[&str]) -> Self {
        Self {
            failing: tokens.iter().map(|token| token.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&self, _operation: &str, program: &str, args: &[String]) -> Result<CommandOutcome, SslError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        let fails = self.failing.iter().any(|token| call.contains(token));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(CommandOutcome {
            success: !fails,
            exit_code: Some(if fails { 1 } else { 0 }),
            stdout: String::new(),
            stderr: if fails { "simulated failure".to_string() } else { String::new() },
        })
    }
}
