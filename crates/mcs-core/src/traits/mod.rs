//! Core trait definitions

mod command;
mod terminal;

pub use command::CommandFactory;
pub use terminal::{SubprocessTerminal, TerminalProvider};
