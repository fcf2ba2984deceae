//! Operator list management
//!
//! Operators are loaded from a JSON array of records in the `ops.json`
//! format:
//!
//! ```json
//! [
//!   { "uuid": "069a79f4-44e9-4726-a5be-fca90e38aaf5", "name": "Notch", "level": 4, "bypassesPlayerLimit": false }
//! ]
//! ```
//!
//! Only `name` is required. Entry order is preserved.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::ConfigError;

/// Default operator permission level
const DEFAULT_LEVEL: u8 = 4;

/// A single operator record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorEntry {
    /// Account UUID (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Name matched against the invoking identity
    pub name: String,
    /// Permission level
    #[serde(default = "default_level")]
    pub level: u8,
    /// Whether the operator bypasses the player limit
    #[serde(default)]
    pub bypasses_player_limit: bool,
}

fn default_level() -> u8 {
    DEFAULT_LEVEL
}

impl OperatorEntry {
    /// Create an entry with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: None,
            name: name.into(),
            level: DEFAULT_LEVEL,
            bypasses_player_limit: false,
        }
    }
}

/// Ordered list of operators, read-only once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorList(Vec<OperatorEntry>);

impl OperatorList {
    /// Create an empty operator list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an operator list from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<OperatorEntry> = serde_json::from_str(json)?;
        Ok(Self(entries))
    }

    /// Load the operator list from a file.
    ///
    /// A missing file yields an empty list, which authorizes nobody.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_home(path);

        if !path.exists() {
            tracing::warn!("Operator list not found: {:?}", path);
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Invalid(format!("Failed to read operator list: {}", e)))?;

        let list = Self::from_json(&content)?;
        tracing::info!("Loaded {} operators from {:?}", list.len(), path);
        Ok(list)
    }

    /// Check whether `identity` names an operator
    pub fn is_authorized(&self, identity: &str) -> bool {
        auth::is_authorized(identity, &self.0)
    }

    /// Entries in file order
    pub fn entries(&self) -> &[OperatorEntry] {
        &self.0
    }

    /// Number of operators
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no operators
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<OperatorEntry>> for OperatorList {
    fn from(entries: Vec<OperatorEntry>) -> Self {
        Self(entries)
    }
}

impl FromIterator<OperatorEntry> for OperatorList {
    fn from_iter<I: IntoIterator<Item = OperatorEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(path));
        }
    }
    path.to_path_buf()
}
