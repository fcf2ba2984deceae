//! Local shell on a pseudo-terminal
//!
//! Spawns an interactive shell with the portable-pty crate and exposes the
//! master side as an [`Endpoint`].

use std::io::{Read, Write};
use std::path::Path;

use mcs_core::config::BashConfig;
use mcs_core::error::SetupError;
use mcs_core::traits::{SubprocessTerminal, TerminalProvider};
use mcs_core::{Endpoint, TerminalSize};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

/// Shells that may be spawned without consulting `/etc/shells`
const ALLOWED_SHELLS_UNIX: &[&str] = &[
    "/bin/sh",
    "/bin/bash",
    "/bin/zsh",
    "/bin/fish",
    "/bin/dash",
    "/bin/ksh",
    "/usr/bin/sh",
    "/usr/bin/bash",
    "/usr/bin/zsh",
    "/usr/bin/fish",
    "/usr/bin/dash",
    "/usr/bin/ksh",
    "/usr/local/bin/bash",
    "/usr/local/bin/zsh",
    "/usr/local/bin/fish",
    "/opt/homebrew/bin/bash",
    "/opt/homebrew/bin/zsh",
    "/opt/homebrew/bin/fish",
];

const ALLOWED_SHELLS_WINDOWS: &[&str] = &[
    "cmd.exe",
    "powershell.exe",
    "pwsh.exe",
    "C:\\Windows\\System32\\cmd.exe",
    "C:\\Windows\\System32\\WindowsPowerShell\\v1.0\\powershell.exe",
];

/// Check that `shell` is an allowed shell that exists on disk
fn validate_shell_path(shell: &str) -> Result<String, SetupError> {
    if cfg!(windows) {
        if ALLOWED_SHELLS_WINDOWS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(shell))
        {
            return Ok(shell.to_string());
        }
        return Err(SetupError::InvalidShell(format!(
            "'{}' is not an allowed shell",
            shell
        )));
    }

    let listed = ALLOWED_SHELLS_UNIX.contains(&shell) || listed_in_etc_shells(shell);
    if !listed {
        return Err(SetupError::InvalidShell(format!(
            "'{}' is not an allowed shell",
            shell
        )));
    }

    if !Path::new(shell).exists() {
        return Err(SetupError::InvalidShell(format!("'{}' does not exist", shell)));
    }

    Ok(shell.to_string())
}

fn listed_in_etc_shells(shell: &str) -> bool {
    std::fs::read_to_string("/etc/shells")
        .map(|shells| {
            shells.lines().any(|line| {
                let line = line.trim();
                !line.starts_with('#') && line == shell
            })
        })
        .unwrap_or(false)
}

/// Opens interactive shells on fresh PTYs
#[derive(Debug, Clone)]
pub struct PtyShellProvider {
    shell: Option<String>,
    env: Vec<(String, String)>,
}

impl PtyShellProvider {
    /// Create a provider for `shell` (or the login default when `None`)
    pub fn new(shell: Option<String>, env: Vec<(String, String)>) -> Self {
        Self { shell, env }
    }

    /// Create a provider from the `[bash]` config section
    pub fn from_config(config: &BashConfig) -> Self {
        Self::new(config.shell.clone(), config.env.clone())
    }

    /// The shell that will be spawned, before validation
    pub fn requested_shell(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| {
                if cfg!(windows) {
                    "cmd.exe".to_string()
                } else {
                    "/bin/sh".to_string()
                }
            })
    }

    /// Open a PTY and spawn the shell on it
    pub fn spawn(&self, size: TerminalSize) -> Result<PtyShell, SetupError> {
        let shell_path = validate_shell_path(&self.requested_shell())?;

        tracing::info!(
            "Spawning {} on a {}x{} PTY",
            shell_path,
            size.cols,
            size.rows
        );

        let pair = native_pty_system()
            .openpty(PtySize {
                rows: size.rows,
                cols: size.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SetupError::PtyAllocation(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&shell_path);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SetupError::Spawn(format!("{}: {}", shell_path, e)))?;

        // Our copy of the slave must go, or the master never sees hangup
        // when the shell exits.
        drop(pair.slave);

        let pid = child.process_id();
        tracing::info!("Spawned shell process with PID: {:?}", pid);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SetupError::Endpoint(format!("PTY reader: {}", e)))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| SetupError::Endpoint(format!("PTY writer: {}", e)))?;

        Ok(PtyShell {
            label: format!("pty:{}", shell_path),
            pid,
            _master: pair.master,
            child,
            reader: Some(reader),
            writer: Some(writer),
        })
    }
}

impl TerminalProvider for PtyShellProvider {
    fn open(&self, size: TerminalSize) -> Result<Box<dyn SubprocessTerminal>, SetupError> {
        Ok(Box::new(self.spawn(size)?))
    }
}

/// A shell running on a PTY
pub struct PtyShell {
    label: String,
    pid: Option<u32>,
    // Held so the PTY outlives the cloned reader and writer
    _master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    reader: Option<Box<dyn Read + Send>>,
    writer: Option<Box<dyn Write + Send>>,
}

impl SubprocessTerminal for PtyShell {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn take_endpoint(&mut self) -> Result<Endpoint, SetupError> {
        match (self.reader.take(), self.writer.take()) {
            (Some(reader), Some(writer)) => Ok(Endpoint::new(self.label.clone(), reader, writer)),
            _ => Err(SetupError::Endpoint(format!(
                "{} endpoint already taken",
                self.label
            ))),
        }
    }

    fn close(&mut self) -> Option<i32> {
        tracing::info!("Closing {} (PID {:?})", self.label, self.pid);

        if let Ok(Some(status)) = self.child.try_wait() {
            return Some(status.exit_code() as i32);
        }

        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => Some(status.exit_code() as i32),
            Err(e) => {
                tracing::warn!("Failed to reap {}: {}", self.label, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_validate_allows_bin_sh() {
        assert_eq!(validate_shell_path("/bin/sh").unwrap(), "/bin/sh");
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_rejects_unlisted_program() {
        assert!(matches!(
            validate_shell_path("/usr/bin/env"),
            Err(SetupError::InvalidShell(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_rejects_missing_shell() {
        assert!(matches!(
            validate_shell_path("/usr/local/bin/fish-that-is-not-installed"),
            Err(SetupError::InvalidShell(_))
        ));
    }

    #[test]
    fn test_configured_shell_wins() {
        let provider = PtyShellProvider::new(Some("/bin/zsh".to_string()), vec![]);
        assert_eq!(provider.requested_shell(), "/bin/zsh");
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_rejects_invalid_shell_before_allocating() {
        let provider = PtyShellProvider::new(Some("/usr/bin/env".to_string()), vec![]);
        assert!(matches!(
            provider.spawn(TerminalSize::default()),
            Err(SetupError::InvalidShell(_))
        ));
    }
}
