//! The local terminal as a bridge endpoint

use std::io::{self, IsTerminal};
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use std::time::Duration;

use mcs_core::endpoint::ByteSource;
use mcs_core::types::{ENV_COLUMNS, ENV_LINES, ENV_USER};
use mcs_core::{Endpoint, Environment};

/// How long a stdin read waits before giving the relay a chance to notice
/// cancellation
#[cfg(unix)]
const STDIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Puts the terminal in raw mode and restores it on drop.
///
/// Does nothing when stdin is not a terminal.
pub struct RawModeGuard {
    enabled: bool,
}

impl RawModeGuard {
    /// Enter raw mode if stdin is a terminal
    pub fn enable() -> io::Result<Self> {
        if !io::stdin().is_terminal() {
            return Ok(Self { enabled: false });
        }
        crossterm::terminal::enable_raw_mode()?;
        tracing::debug!("Terminal switched to raw mode");
        Ok(Self { enabled: true })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enabled {
            if let Err(e) = crossterm::terminal::disable_raw_mode() {
                tracing::warn!("Failed to restore terminal mode: {}", e);
            }
        }
    }
}

/// Endpoint over this process's stdin and stdout
pub fn local_terminal() -> Endpoint {
    Endpoint::new("terminal", stdin_source(), Box::new(io::stdout()))
}

#[cfg(unix)]
fn stdin_source() -> ByteSource {
    Box::new(PolledStdin {
        timeout: STDIN_POLL_INTERVAL,
    })
}

#[cfg(not(unix))]
fn stdin_source() -> ByteSource {
    Box::new(io::stdin())
}

/// Stdin reader that times out instead of blocking forever.
///
/// Reports `TimedOut` when no input arrived within `timeout`, which the
/// relay treats as "nothing yet" and uses to re-check cancellation.
#[cfg(unix)]
pub struct PolledStdin {
    timeout: Duration,
}

#[cfg(unix)]
impl Read for PolledStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = self.timeout.as_millis().min(i32::MAX as u128) as i32;

        let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Err(io::ErrorKind::TimedOut.into());
        }

        // Readable, hung up or in error: read() reports which.
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

/// Build the session environment for `user`.
///
/// The identity falls back to `$USER`, then to the OS account name. The
/// terminal size is taken from the controlling terminal when there is one.
pub fn session_environment(user: Option<String>) -> Environment {
    let user = user
        .or_else(|| std::env::var(ENV_USER).ok())
        .unwrap_or_else(whoami::username);

    let mut env = Environment::new().with_var(ENV_USER, user);
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        env.set(ENV_COLUMNS, cols.to_string());
        env.set(ENV_LINES, rows.to_string());
    }
    env
}
