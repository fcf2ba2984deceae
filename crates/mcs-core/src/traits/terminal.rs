//! Subprocess terminal traits

use crate::endpoint::Endpoint;
use crate::error::SetupError;
use crate::types::TerminalSize;

/// A running interactive subprocess attached to a terminal
pub trait SubprocessTerminal: Send {
    /// Process ID of the subprocess, if known
    fn pid(&self) -> Option<u32>;

    /// Take the endpoint connected to the subprocess.
    ///
    /// Can only succeed once per terminal.
    fn take_endpoint(&mut self) -> Result<Endpoint, SetupError>;

    /// Terminate the subprocess and reap it, returning its exit code
    fn close(&mut self) -> Option<i32>;
}

/// Supplies fresh subprocess terminals
pub trait TerminalProvider: Send + Sync {
    /// Start a new interactive subprocess on a terminal of the given size
    fn open(&self, size: TerminalSize) -> Result<Box<dyn SubprocessTerminal>, SetupError>;
}
