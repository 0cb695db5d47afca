//! Schema-driven state for configurable visual components.
//!
//! A host declares a [`ComponentSchema`] per component type, creates
//! instances from it, and mutates their parameters through a
//! [`ParametricSystem`]. Writes are validated before anything is stored,
//! rapid writes are batched into one event per parameter, flushes feed a
//! bounded undo history, and the whole state persists through a
//! [`PersistenceProvider`].
//!
//! # Example
//!
//! ```ignore
//! use parametric_core::{ComponentSchema, Dispatch, ParameterConfig, ParametricSystem, SystemConfig};
//! use parametric_core::MemoryProvider;
//!
//! let system = ParametricSystem::new(SystemConfig::default(), MemoryProvider::new());
//! system.register_schema(
//!     ComponentSchema::new("card", "Card")
//!         .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0)),
//! )?;
//!
//! let card = system.create_component("card", None).await?;
//! system.update_parameter(&card.id, "opacity", 0.4.into(), Dispatch::Debounced)?;
//! ```

mod config;
mod envelope;
mod error;
mod system;

pub use config::SystemConfig;
pub use envelope::{ENVELOPE_VERSION, ExportEnvelope};
pub use error::{ParametricError, Result};
pub use system::ParametricSystem;

// Re-exports so hosts depend on one crate.
pub use parametric_model::{
    ComponentInstance, ComponentSchema, EventKind, InstanceMetadata, ParamValue, ParameterConfig,
    ParameterGroup, ParameterMap, ParameterType, ParameterUpdateEvent, PresetConfig,
    PresetMetadata, RenderProps, ResponsiveConfig, StateEvent, StateSnapshot,
};
pub use parametric_persistence::{
    FileProvider, MemoryProvider, PersistenceError, PersistenceProvider,
};
pub use parametric_schema::{ParameterValidator, SchemaError, ValidationIssue, ValidationReport};
pub use parametric_state::{Dispatch, HandlerId, StateConfig};
