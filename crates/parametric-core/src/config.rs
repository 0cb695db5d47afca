//! System configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! debounce_ms = 32
//! persistence_key = "dashboard_state"
//! storage_dir = "/var/lib/parametric"
//! ```

use std::path::{Path, PathBuf};

use parametric_state::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_HISTORY, DEFAULT_PERSISTENCE_KEY, StateConfig,
};
use serde::{Deserialize, Serialize};

use crate::error::{ParametricError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Debounce window for batched updates, in milliseconds.
    pub debounce_ms: u64,

    /// Flush snapshots kept for undo.
    pub max_history: usize,

    /// Key the full state snapshot is persisted under.
    pub persistence_key: String,

    /// Persist after every state change.
    pub auto_persist: bool,

    /// Record a history snapshot at every flush.
    pub undo_enabled: bool,

    /// Directory a file-backed provider stores its keys in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Directory of `*.json` schema files registered at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_history: DEFAULT_MAX_HISTORY,
            persistence_key: DEFAULT_PERSISTENCE_KEY.to_string(),
            auto_persist: true,
            undo_enabled: true,
            storage_dir: None,
            schema_dir: None,
        }
    }
}

impl SystemConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ParametricError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config =
            Self::from_toml_str(&content).map_err(|source| ParametricError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// The state-manager subset of this configuration.
    pub fn state(&self) -> StateConfig {
        StateConfig {
            debounce_ms: self.debounce_ms,
            max_history: self.max_history,
            undo_enabled: self.undo_enabled,
            auto_persist: self.auto_persist,
            persistence_key: self.persistence_key.clone(),
        }
    }
}
