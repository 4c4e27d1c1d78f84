//! Vault configuration.
//!
//! A single `config.toml` inside the vault directory, written with defaults
//! at initialization. Missing file or missing sections fall back to defaults.

use crate::error::{Result, VaultError};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Snapshot-time settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Relative path prefixes excluded from working-tree enumeration,
    /// in addition to the vault directory itself.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl VaultConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(VaultError::PathUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        toml::from_str(&text).map_err(|e| VaultError::Config(e.to_string()))
    }

    /// Write the default configuration to `path`.
    pub fn write_default(path: &Path) -> Result<()> {
        let rendered = toml::to_string_pretty(&Self::default())
            .map_err(|e| VaultError::Config(e.to_string()))?;
        fs::write(path, rendered).map_err(|e| VaultError::PathUnwritable {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
