//! `bash` command configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the `bash` command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BashConfig {
    /// Shell to spawn (falls back to `$SHELL`, then `/bin/sh`)
    pub shell: Option<String>,

    /// Environment variables for the spawned shell
    pub env: Vec<(String, String)>,

    /// Refuse to start a session for non-operators.
    ///
    /// When `false`, non-operators see the denial message but the session
    /// still starts.
    pub enforce_operator_check: bool,
}

impl Default for BashConfig {
    fn default() -> Self {
        Self {
            shell: None,
            env: vec![("TERM".to_string(), "xterm-256color".to_string())],
            enforce_operator_check: false,
        }
    }
}

/// Where to find the operator list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorsConfig {
    /// Path to the `ops.json` file
    pub path: PathBuf,
}

impl Default for OperatorsConfig {
    fn default() -> Self {
        Self {
            path: super::default_config_dir().join("ops.json"),
        }
    }
}
