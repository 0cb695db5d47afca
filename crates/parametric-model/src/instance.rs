//! Component instances and state snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Parameter key to value.
pub type ParameterMap = BTreeMap<String, ParamValue>;

/// Creation and last-modification times of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstanceMetadata {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A live component of a registered type.
///
/// `parameters` always holds every key of the component's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub parameters: ParameterMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub metadata: InstanceMetadata,
}

impl ComponentInstance {
    pub fn new(
        id: impl Into<String>,
        component_type: impl Into<String>,
        parameters: ParameterMap,
    ) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            parameters,
            preset: None,
            metadata: InstanceMetadata::now(),
        }
    }

    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }
}

/// Full copy of component and global parameter state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub timestamp: DateTime<Utc>,
    pub components: BTreeMap<String, ComponentInstance>,
    #[serde(default)]
    pub global_parameters: ParameterMap,
}

impl StateSnapshot {
    pub fn empty() -> Self {
        Self {
            timestamp: Utc::now(),
            components: BTreeMap::new(),
            global_parameters: ParameterMap::new(),
        }
    }

    /// Whether two snapshots hold the same state, ignoring when they were taken.
    pub fn same_state(&self, other: &Self) -> bool {
        self.components == other.components && self.global_parameters == other.global_parameters
    }
}
