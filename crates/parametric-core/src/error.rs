//! Error types for the parametric system facade.

use std::path::PathBuf;

use parametric_persistence::PersistenceError;
use parametric_schema::{SchemaError, ValidationIssue, ValidationReport};
use parametric_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParametricError {
    /// A schema was rejected at registration.
    #[error("Invalid schema: {0}")]
    Configuration(#[from] SchemaError),

    /// One or more parameter values failed their type, range or option rule.
    #[error("Invalid parameters for '{component_type}': {report}")]
    Validation {
        component_type: String,
        report: ValidationReport,
    },

    #[error("Component not found: {component_id}")]
    ComponentNotFound { component_id: String },

    #[error("No schema registered for component type '{component_type}'")]
    SchemaNotFound { component_type: String },

    #[error("Preset not found: {preset_id}")]
    PresetNotFound { preset_id: String },

    #[error("Preset '{preset_id}' targets '{preset_type}', not '{component_type}'")]
    PresetMismatch {
        preset_id: String,
        preset_type: String,
        component_type: String,
    },

    #[error("Nothing to undo (history depth {depth})")]
    NothingToUndo { depth: usize },

    /// An export envelope could not be imported.
    #[error("Invalid configuration envelope: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("Failed to encode or decode configuration envelope")]
    EnvelopeFormat {
        #[source]
        source: serde_json::Error,
    },

    /// The persistence backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),

    #[error("Failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ParametricError {
    pub(crate) fn invalid(component_type: &str, report: ValidationReport) -> Self {
        Self::Validation {
            component_type: component_type.to_string(),
            report,
        }
    }

    pub(crate) fn invalid_value(component_type: &str, issue: ValidationIssue) -> Self {
        Self::invalid(component_type, ValidationReport::from(issue))
    }

    pub(crate) fn envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the persistence backend.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<StateError> for ParametricError {
    fn from(error: StateError) -> Self {
        match error {
            StateError::ComponentNotFound { component_id } => {
                Self::ComponentNotFound { component_id }
            }
            StateError::UnknownParameter {
                component_type,
                parameter,
                ..
            } => Self::Validation {
                component_type,
                report: ValidationReport::from(ValidationIssue::UnknownParameter { parameter }),
            },
            StateError::NothingToUndo { depth } => Self::NothingToUndo { depth },
            StateError::Persistence(source) => Self::Storage(source),
        }
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, ParametricError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_parameter_keeps_component_type() {
        let err = ParametricError::from(StateError::UnknownParameter {
            component_id: "card_1".into(),
            component_type: "card".into(),
            parameter: "title".into(),
        });
        assert!(err.to_string().contains("'card'"));
        match err {
            ParametricError::Validation {
                component_type,
                report,
            } => {
                assert_eq!(component_type, "card");
                assert!(report.has_issue_for("title"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
