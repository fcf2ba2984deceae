//! Core domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Environment key carrying the invoking user's name
pub const ENV_USER: &str = "USER";
/// Environment key carrying the terminal width
pub const ENV_COLUMNS: &str = "COLUMNS";
/// Environment key carrying the terminal height
pub const ENV_LINES: &str = "LINES";

/// Identity of the user invoking a command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl Identity {
    /// Create a new identity
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the raw name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Terminal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
    /// Number of columns
    pub cols: u16,
    /// Number of rows
    pub rows: u16,
}

impl TerminalSize {
    /// Create a new terminal size
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

/// Execution environment of a command invocation.
///
/// A key/value map in the style of a login session's environment. The
/// invoking identity is read from [`ENV_USER`].
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, returning `self` for chaining
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Identity of the invoking user, if present
    pub fn user(&self) -> Option<Identity> {
        self.get(ENV_USER).map(Identity::from)
    }

    /// Terminal size from `COLUMNS`/`LINES`, falling back to 80x24
    pub fn terminal_size(&self) -> TerminalSize {
        let default = TerminalSize::default();
        let cols = self
            .get(ENV_COLUMNS)
            .and_then(|v| v.trim().parse().ok())
            .filter(|c| *c > 0)
            .unwrap_or(default.cols);
        let rows = self
            .get(ENV_LINES)
            .and_then(|v| v.trim().parse().ok())
            .filter(|r| *r > 0)
            .unwrap_or(default.rows);
        TerminalSize { cols, rows }
    }

    /// All variables
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
