//! Schema registration errors.

use thiserror::Error;

use crate::issue::ValidationIssue;

/// A schema was rejected at registration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("Schema id must not be empty")]
    EmptyId,

    #[error("Schema '{schema}' declares no parameters")]
    NoParameters { schema: String },

    #[error("Group '{group}' in schema '{schema}' references unknown parameter '{parameter}'")]
    UnknownGroupParameter {
        schema: String,
        group: String,
        parameter: String,
    },

    #[error("Default of '{parameter}' in schema '{schema}' fails its own type rule: {issue}")]
    InvalidDefault {
        schema: String,
        parameter: String,
        #[source]
        issue: ValidationIssue,
    },

    #[error("Parameter '{parameter}' in schema '{schema}' has min {min} greater than max {max}")]
    InvertedBounds {
        schema: String,
        parameter: String,
        min: f64,
        max: f64,
    },

    #[error("Dropdown '{parameter}' in schema '{schema}' declares no options")]
    MissingOptions { schema: String, parameter: String },

    #[error("Preset '{preset}' bundled in schema '{schema}' is invalid: {reason}")]
    InvalidPreset {
        schema: String,
        preset: String,
        reason: String,
    },

    #[error("Responsive config of schema '{schema}' references unknown parameter '{parameter}'")]
    UnknownAdaptiveParameter { schema: String, parameter: String },

    #[error("Failed to parse schema JSON")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for schema registration.
pub type Result<T> = std::result::Result<T, SchemaError>;
