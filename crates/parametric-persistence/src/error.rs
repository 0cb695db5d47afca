//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be stored by this backend.
    #[error("Invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Backend refused or failed the operation.
    #[error("Storage backend failed to {operation} '{key}': {reason}")]
    Backend {
        operation: &'static str,
        key: String,
        reason: String,
    },

    /// Serialization error.
    #[error("Failed to serialize data for '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization error.
    #[error("Failed to deserialize data stored under '{key}'")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Blocking I/O task panicked or was cancelled.
    #[error("Storage task did not complete")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::InvalidKey { key, reason } => {
                format!("The storage key '{key}' cannot be used: {reason}.")
            }
            Self::Backend {
                operation, key, ..
            } => {
                format!("The storage backend could not {operation} '{key}'.")
            }
            Self::Serialization { .. } => "An error occurred while saving the data.".to_string(),
            Self::Deserialization { key, .. } => {
                format!("The data stored under '{key}' could not be read. It may be corrupted.")
            }
            Self::TaskFailed { .. } => {
                "A storage operation was interrupted before it finished.".to_string()
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::InvalidKey { .. } => {
                Some("Use only letters, digits, '_', '-' and '.' in keys.".into())
            }
            Self::Deserialization { .. } => {
                Some("Delete the stored entry or restore it from an export.".into())
            }
            Self::Backend { .. } | Self::Serialization { .. } | Self::TaskFailed { .. } => None,
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
