//! Loader configuration

use crate::types::FormatVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Metadata loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recover the header's (offset, size) pairing by chain-matching instead
    /// of trusting the declared field order
    pub reconstruct_header: bool,
    /// Skip sub-version disambiguation and decode with this version
    pub force_version: Option<FormatVersion>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reconstruct_header: true,
            force_version: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content).map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
