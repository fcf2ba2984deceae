//! mcs-cli: Command-line interface for mcshell
//!
//! Provides the `mcshell` binary, which runs shell commands against the
//! local terminal and manages configuration and the operator list.

pub mod commands;
pub mod output;
pub mod terminal;
