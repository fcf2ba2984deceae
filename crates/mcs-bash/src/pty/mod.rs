//! PTY-backed shell sessions

mod shell;

pub use shell::{PtyShell, PtyShellProvider};
