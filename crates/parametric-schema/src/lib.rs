//! Component schema registry and parameter validation.
//!
//! - [`SchemaRegistry`] stores validated [`ComponentSchema`](parametric_model::ComponentSchema)
//!   definitions by id.
//! - [`ParameterValidator`] applies the per-type rules (slider, color, toggle,
//!   dropdown, text) to one value or a whole parameter map.
//!
//! # Example
//!
//! ```
//! use parametric_model::{ComponentSchema, ParameterConfig, ParamValue};
//! use parametric_schema::{ParameterValidator, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         ComponentSchema::new("card", "Card")
//!             .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0)),
//!     )
//!     .unwrap();
//!
//! let schema = registry.get("card").unwrap();
//! assert!(ParameterValidator::validate_single(&schema, "opacity", &ParamValue::from(0.4)).is_ok());
//! assert!(ParameterValidator::validate_single(&schema, "opacity", &ParamValue::from(2.0)).is_err());
//! ```

mod error;
mod issue;
mod registry;
mod validator;

pub use error::{Result, SchemaError};
pub use issue::{ValidationIssue, ValidationReport};
pub use registry::SchemaRegistry;
pub use validator::{ParameterValidator, check_value};
