//! Data model for parametric components.
//!
//! This crate provides the plain data types shared by every layer of the
//! parameter-state system:
//! - **Schemas**: per-component-type declarations of configurable parameters
//! - **Instances**: live components with a fully populated parameter map
//! - **Presets**: named partial overlays applied at creation time
//! - **Snapshots**: the unit of persistence, export and undo
//! - **Events**: the closed set of state-change notifications
//!
//! # Module Organization
//!
//! - [`value`]: `ParamValue`, the dynamically typed parameter value
//! - [`schema`]: `ComponentSchema`, `ParameterConfig`, `PresetConfig`
//! - [`instance`]: `ComponentInstance`, `StateSnapshot`
//! - [`event`]: `StateEvent`, `EventKind`, `ParameterUpdateEvent`
//! - [`render`]: `RenderProps`, the read-only view handed to renderers
//!
//! All types serialize with camelCase field names so persisted state and
//! exported envelopes stay readable by non-Rust hosts.

pub mod event;
pub mod instance;
pub mod render;
pub mod schema;
pub mod value;

pub use event::{EventKind, ParameterUpdateEvent, StateEvent};
pub use instance::{ComponentInstance, InstanceMetadata, ParameterMap, StateSnapshot};
pub use render::RenderProps;
pub use schema::{
    ComponentSchema, ParameterConfig, ParameterGroup, ParameterType, PresetConfig, PresetMetadata,
    ResponsiveConfig,
};
pub use value::ParamValue;
