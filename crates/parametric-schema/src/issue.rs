//! Validation issue types.
//!
//! The `ValidationIssue` enum provides type-safe issue creation where
//! each variant carries only its needed data.

use std::fmt;

use parametric_model::{ParamValue, ParameterType};
use serde::Serialize;
use thiserror::Error;

/// A single parameter that failed its type rule.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationIssue {
    /// Key is not declared by the schema.
    #[error("Unknown parameter '{parameter}'")]
    UnknownParameter { parameter: String },

    /// Value has the wrong runtime kind for the declared type.
    #[error("Parameter '{parameter}' ({expected}) expects a {expected_kind}, got {found}")]
    TypeMismatch {
        parameter: String,
        expected: ParameterType,
        expected_kind: &'static str,
        found: &'static str,
    },

    /// Slider value is NaN or infinite.
    #[error("Parameter '{parameter}' must be a finite number")]
    NotFinite { parameter: String },

    /// Slider value lies outside the declared bounds.
    #[error("Parameter '{parameter}' value {value} is outside [{}, {}]", fmt_bound(.min), fmt_bound(.max))]
    OutOfRange {
        parameter: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// Dropdown value is not one of the declared options.
    #[error("Parameter '{parameter}' value {value} is not one of the allowed options")]
    NotAnOption {
        parameter: String,
        value: ParamValue,
        options: Vec<ParamValue>,
    },
}

fn fmt_bound(bound: &Option<f64>) -> String {
    bound.map_or_else(|| "unbounded".to_string(), |b| b.to_string())
}

impl ValidationIssue {
    /// Parameter key (all issues have one).
    pub fn parameter(&self) -> &str {
        match self {
            Self::UnknownParameter { parameter }
            | Self::TypeMismatch { parameter, .. }
            | Self::NotFinite { parameter }
            | Self::OutOfRange { parameter, .. }
            | Self::NotAnOption { parameter, .. } => parameter,
        }
    }
}

/// Outcome of validating a set of parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable message for every issue, in detection order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// Whether any issue concerns the given key.
    pub fn has_issue_for(&self, parameter: &str) -> bool {
        self.issues.iter().any(|i| i.parameter() == parameter)
    }

    /// Convert into `Err(self)` when any issue was found.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return f.write_str("no issues");
        }
        f.write_str(&self.messages().join("; "))
    }
}

impl From<ValidationIssue> for ValidationReport {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}
