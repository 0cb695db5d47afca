//! State manager errors.

use parametric_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    /// No instance with this id is registered.
    #[error("Component not found: {component_id}")]
    ComponentNotFound { component_id: String },

    /// The instance has no such parameter key.
    #[error("Component '{component_id}' has no parameter '{parameter}'")]
    UnknownParameter {
        component_id: String,
        component_type: String,
        parameter: String,
    },

    /// Undo needs at least two history snapshots.
    #[error("Nothing to undo (history depth {depth})")]
    NothingToUndo { depth: usize },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;
