//! State manager configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default debounce window: one 60 Hz frame.
pub const DEFAULT_DEBOUNCE_MS: u64 = 16;

/// Default number of flush snapshots kept for undo.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Default key full-state snapshots are persisted under.
pub const DEFAULT_PERSISTENCE_KEY: &str = "parametric_state";

/// Configuration for batching, history and auto-persist behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Debounce delay in milliseconds.
    ///
    /// After a queued update, the manager waits this long before flushing.
    /// Additional updates reset the timer.
    pub debounce_ms: u64,

    /// Maximum number of flush snapshots kept for undo. Oldest are evicted.
    pub max_history: usize,

    /// Whether flushes record history snapshots.
    pub undo_enabled: bool,

    /// Whether state changes are written to the persistence provider.
    pub auto_persist: bool,

    /// Key the full state snapshot is stored under.
    pub persistence_key: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_history: DEFAULT_MAX_HISTORY,
            undo_enabled: true,
            auto_persist: true,
            persistence_key: DEFAULT_PERSISTENCE_KEY.to_string(),
        }
    }
}

impl StateConfig {
    /// Create a config that never writes to the provider on its own.
    pub fn without_persistence() -> Self {
        Self {
            auto_persist: false,
            ..Default::default()
        }
    }

    #[inline]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
