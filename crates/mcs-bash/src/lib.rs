//! mcs-bash: the `bash` command for mcshell
//!
//! Connects an operator's terminal to a freshly spawned local shell. The
//! heavy lifting is done by [`bridge::StreamBridge`], which relays bytes in
//! both directions on two blocking tasks and returns once both are done.

pub mod bridge;
pub mod command;
pub mod dispatch;
pub mod pty;

pub use bridge::{BridgeReport, CompletionGate, RelayOutcome, RelayTask, StreamBridge};
pub use command::BashCommand;
pub use dispatch::CommandRegistry;
pub use pty::PtyShellProvider;
