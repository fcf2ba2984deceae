//! Core error types for mcshell

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for mcshell
#[derive(Error, Debug)]
pub enum McsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The subprocess terminal could not be set up
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    /// No registered command handles the requested token
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Failures while constructing the subprocess endpoint.
///
/// These are the only failures of a command invocation that reach the
/// caller; relay I/O failures are logged and absorbed by the bridge.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Requested shell is not allowed or does not exist
    #[error("Invalid shell: {0}")]
    InvalidShell(String),

    /// PTY allocation failed
    #[error("PTY allocation failed: {0}")]
    PtyAllocation(String),

    /// Shell process could not be spawned
    #[error("Failed to spawn shell: {0}")]
    Spawn(String),

    /// Reader or writer handles could not be obtained
    #[error("Endpoint unavailable: {0}")]
    Endpoint(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// JSON error (operator list)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
