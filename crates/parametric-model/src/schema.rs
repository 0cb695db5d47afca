//! Component schemas, parameter declarations and presets.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Kind of control a parameter is edited with.
///
/// The kind decides which validation rule applies to the parameter's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Numeric value, optionally bounded by `min`/`max`.
    Slider,
    /// Color string. The format is not checked.
    Color,
    /// Boolean switch.
    Toggle,
    /// One of a fixed list of options.
    Dropdown,
    /// Free-form string.
    Text,
}

impl ParameterType {
    /// Get all parameter types.
    pub const fn all() -> &'static [Self] {
        &[
            Self::Slider,
            Self::Color,
            Self::Toggle,
            Self::Dropdown,
            Self::Text,
        ]
    }

    /// Wire name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Color => "color",
            Self::Toggle => "toggle",
            Self::Dropdown => "dropdown",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declaration of one configurable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterConfig {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub default: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ParameterConfig {
    fn new(kind: ParameterType, default: ParamValue) -> Self {
        Self {
            kind,
            default,
            min: None,
            max: None,
            step: None,
            options: Vec::new(),
            unit: None,
            description: String::new(),
            group: None,
        }
    }

    /// Bounded numeric slider.
    pub fn slider(default: f64, min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::new(ParameterType::Slider, ParamValue::Number(default))
        }
    }

    /// Slider without declared bounds.
    pub fn unbounded_slider(default: f64) -> Self {
        Self::new(ParameterType::Slider, ParamValue::Number(default))
    }

    pub fn color(default: impl Into<String>) -> Self {
        Self::new(ParameterType::Color, ParamValue::Text(default.into()))
    }

    pub fn toggle(default: bool) -> Self {
        Self::new(ParameterType::Toggle, ParamValue::Bool(default))
    }

    /// Dropdown over string options.
    pub fn dropdown<I, S>(default: impl Into<ParamValue>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ParamValue>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::new(ParameterType::Dropdown, default.into())
        }
    }

    pub fn text(default: impl Into<String>) -> Self {
        Self::new(ParameterType::Text, ParamValue::Text(default.into()))
    }

    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Ordered, named list of parameter keys shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub name: String,
    pub parameters: Vec<String>,
}

/// Breakpoint-driven hints for hosts that adapt parameters to viewport size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveConfig {
    /// Breakpoint name to minimum width in pixels.
    #[serde(default)]
    pub breakpoints: BTreeMap<String, u32>,
    /// Parameter keys the host may rescale per breakpoint.
    #[serde(default)]
    pub adaptive_parameters: Vec<String>,
}

/// Descriptive metadata attached to a preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Named partial parameter overlay for one component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetConfig {
    pub id: String,
    pub name: String,
    pub component_type: String,
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub metadata: PresetMetadata,
}

impl PresetConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        component_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            component_type: component_type.into(),
            parameters: BTreeMap::new(),
            metadata: PresetMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Persistence key this preset is stored under.
    pub fn storage_key(id: &str) -> String {
        format!("preset_{id}")
    }
}

/// Declarative description of one component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSchema {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_schema_version")]
    pub version: String,
    #[serde(default)]
    pub groups: Vec<ParameterGroup>,
    pub parameters: BTreeMap<String, ParameterConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<PresetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveConfig>,
}

fn default_schema_version() -> String {
    "1.0.0".to_string()
}

impl ComponentSchema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            version: default_schema_version(),
            groups: Vec::new(),
            parameters: BTreeMap::new(),
            presets: Vec::new(),
            responsive: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, config: ParameterConfig) -> Self {
        self.parameters.insert(key.into(), config);
        self
    }

    #[must_use]
    pub fn with_group<I, S>(mut self, name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(ParameterGroup {
            name: name.into(),
            parameters: keys.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: PresetConfig) -> Self {
        self.presets.push(preset);
        self
    }

    #[must_use]
    pub fn with_responsive(mut self, responsive: ResponsiveConfig) -> Self {
        self.responsive = Some(responsive);
        self
    }

    /// Map of every parameter key to its declared default.
    pub fn defaults(&self) -> BTreeMap<String, ParamValue> {
        self.parameters
            .iter()
            .map(|(key, config)| (key.clone(), config.default.clone()))
            .collect()
    }

    /// Find a bundled preset by id.
    pub fn preset(&self, id: &str) -> Option<&PresetConfig> {
        self.presets.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_json_uses_wire_names() {
        let schema = ComponentSchema::new("card", "Card")
            .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0));
        let json = serde_json::to_value(&schema).unwrap();

        assert_eq!(json["parameters"]["opacity"]["type"], "slider");
        assert_eq!(json["parameters"]["opacity"]["max"], 1.0);
        assert!(json["parameters"]["opacity"].get("options").is_none());
    }

    #[test]
    fn test_schema_from_minimal_json() {
        let schema: ComponentSchema = serde_json::from_str(
            r#"{
                "id": "badge",
                "name": "Badge",
                "parameters": {
                    "label": { "type": "text", "default": "New" },
                    "size": { "type": "dropdown", "default": "md", "options": ["sm", "md", "lg"] }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(schema.version, "1.0.0");
        assert!(schema.groups.is_empty());
        assert_eq!(schema.parameters["size"].options.len(), 3);
        assert_eq!(schema.defaults()["label"], ParamValue::from("New"));
    }

    #[test]
    fn test_preset_lookup_and_storage_key() {
        let schema = ComponentSchema::new("card", "Card")
            .with_preset(PresetConfig::new("faded", "Faded", "card").with_parameter("opacity", 0.3));

        assert!(schema.preset("faded").is_some());
        assert!(schema.preset("missing").is_none());
        assert_eq!(PresetConfig::storage_key("faded"), "preset_faded");
    }
}
