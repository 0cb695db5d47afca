//! Read-only view handed to renderers.
//!
//! Renderers are pure functions of these props plus their own private state.
//! They never write parameters directly; change requests go back through the
//! system's update path so validation and batching apply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::instance::{ComponentInstance, ParameterMap};
use crate::value::ParamValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProps {
    pub component_id: String,
    pub component_type: String,
    pub parameters: ParameterMap,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl RenderProps {
    pub fn from_instance(instance: &ComponentInstance) -> Self {
        Self {
            component_id: instance.id.clone(),
            component_type: instance.component_type.clone(),
            parameters: instance.parameters.clone(),
            style: BTreeMap::new(),
            class_name: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ParamValue::as_bool)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut parameters = ParameterMap::new();
        parameters.insert("opacity".into(), 0.5.into());
        parameters.insert("visible".into(), true.into());
        parameters.insert("fill".into(), "#fff".into());
        let instance = ComponentInstance::new("card_1", "card", parameters);

        let props = RenderProps::from_instance(&instance).with_class_name("hero");
        assert_eq!(props.number("opacity"), Some(0.5));
        assert_eq!(props.flag("visible"), Some(true));
        assert_eq!(props.text("fill"), Some("#fff"));
        assert_eq!(props.number("fill"), None);
        assert_eq!(props.class_name.as_deref(), Some("hero"));
    }
}
