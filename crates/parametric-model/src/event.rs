//! State-change events.
//!
//! Every notification the system emits is one variant of [`StateEvent`];
//! subscribers pick the variants they care about by [`EventKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instance::ComponentInstance;
use crate::value::ParamValue;

/// One parameter write on one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdateEvent {
    pub component_id: String,
    pub component_type: String,
    pub parameter: String,
    pub old_value: ParamValue,
    pub new_value: ParamValue,
    pub timestamp: DateTime<Utc>,
}

impl ParameterUpdateEvent {
    /// Key used to coalesce debounced writes to the same parameter.
    pub fn queue_key(&self) -> (String, String) {
        (self.component_id.clone(), self.parameter.clone())
    }

    /// `componentId.parameter`, for logs and display.
    pub fn path(&self) -> String {
        format!("{}.{}", self.component_id, self.parameter)
    }
}

/// Fieldless discriminant of [`StateEvent`], used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ComponentRegistered,
    ComponentUnregistered,
    ComponentCreated,
    ParameterUpdated,
    GlobalParameterUpdated,
    StateRestored,
    StateCleared,
}

impl EventKind {
    pub const fn all() -> &'static [Self] {
        &[
            Self::ComponentRegistered,
            Self::ComponentUnregistered,
            Self::ComponentCreated,
            Self::ParameterUpdated,
            Self::GlobalParameterUpdated,
            Self::StateRestored,
            Self::StateCleared,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ComponentRegistered => "componentRegistered",
            Self::ComponentUnregistered => "componentUnregistered",
            Self::ComponentCreated => "componentCreated",
            Self::ParameterUpdated => "parameterUpdated",
            Self::GlobalParameterUpdated => "globalParameterUpdated",
            Self::StateRestored => "stateRestored",
            Self::StateCleared => "stateCleared",
        }
    }
}

/// Notification emitted by the state layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StateEvent {
    #[serde(rename_all = "camelCase")]
    ComponentRegistered {
        component_id: String,
        component_type: String,
    },
    #[serde(rename_all = "camelCase")]
    ComponentUnregistered {
        component_id: String,
        component_type: String,
    },
    ComponentCreated { instance: ComponentInstance },
    ParameterUpdated(ParameterUpdateEvent),
    #[serde(rename_all = "camelCase")]
    GlobalParameterUpdated {
        key: String,
        old_value: Option<ParamValue>,
        new_value: ParamValue,
    },
    StateRestored { timestamp: DateTime<Utc> },
    StateCleared,
}

impl StateEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ComponentRegistered { .. } => EventKind::ComponentRegistered,
            Self::ComponentUnregistered { .. } => EventKind::ComponentUnregistered,
            Self::ComponentCreated { .. } => EventKind::ComponentCreated,
            Self::ParameterUpdated(_) => EventKind::ParameterUpdated,
            Self::GlobalParameterUpdated { .. } => EventKind::GlobalParameterUpdated,
            Self::StateRestored { .. } => EventKind::StateRestored,
            Self::StateCleared => EventKind::StateCleared,
        }
    }

    /// The parameter update payload, if this is a `ParameterUpdated` event.
    pub fn as_parameter_update(&self) -> Option<&ParameterUpdateEvent> {
        match self {
            Self::ParameterUpdated(update) => Some(update),
            _ => None,
        }
    }
}
