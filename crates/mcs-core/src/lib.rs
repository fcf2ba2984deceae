//! mcs-core: Core abstractions and configuration for mcshell
//!
//! This crate provides the shared types, the operator list, authorization,
//! collaborator traits, and configuration structures used by the `bash`
//! command and the CLI.

pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod oplist;
pub mod traits;
pub mod types;

pub use auth::is_authorized;
pub use endpoint::Endpoint;
pub use error::McsError;
pub use oplist::{OperatorEntry, OperatorList};
pub use types::{Environment, Identity, TerminalSize};
