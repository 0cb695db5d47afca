//! Registry of component schemas indexed by id.

use std::collections::HashMap;
use std::sync::Arc;

use parametric_model::{ComponentSchema, ParameterType};

use crate::error::{Result, SchemaError};
use crate::validator::check_value;

/// Registry of component schemas.
///
/// Schemas are validated once on registration and then shared read-only.
/// Registering an id that already exists replaces the previous schema.
/// There is no removal: schemas live as long as the registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<ComponentSchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Validate the shape of a schema and store it by id.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] describing the first structural problem:
    /// empty id, no parameters, a group or responsive entry naming an unknown
    /// key, inverted slider bounds, a dropdown with no options, a default that
    /// fails its own rule, or a bundled preset that does not fit the schema.
    pub fn register(&mut self, schema: ComponentSchema) -> Result<()> {
        check_shape(&schema)?;

        let id = schema.id.clone();
        if self.schemas.insert(id.clone(), Arc::new(schema)).is_some() {
            tracing::debug!(schema = %id, "Replaced existing schema");
        } else {
            tracing::debug!(schema = %id, "Registered schema");
        }
        Ok(())
    }

    /// Parse a schema from JSON and register it, returning its id.
    pub fn register_json(&mut self, json: &str) -> Result<String> {
        let schema: ComponentSchema =
            serde_json::from_str(json).map_err(|source| SchemaError::Parse { source })?;
        let id = schema.id.clone();
        self.register(schema)?;
        Ok(id)
    }

    /// Get schema by id.
    pub fn get(&self, id: &str) -> Option<Arc<ComponentSchema>> {
        self.schemas.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// All schemas, sorted by id.
    pub fn list(&self) -> Vec<Arc<ComponentSchema>> {
        let mut schemas: Vec<_> = self.schemas.values().cloned().collect();
        schemas.sort_by(|a, b| a.id.cmp(&b.id));
        schemas
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.schemas.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of schemas in the registry.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn check_shape(schema: &ComponentSchema) -> Result<()> {
    if schema.id.trim().is_empty() {
        return Err(SchemaError::EmptyId);
    }
    if schema.parameters.is_empty() {
        return Err(SchemaError::NoParameters {
            schema: schema.id.clone(),
        });
    }

    for group in &schema.groups {
        if let Some(missing) = group
            .parameters
            .iter()
            .find(|key| !schema.parameters.contains_key(*key))
        {
            return Err(SchemaError::UnknownGroupParameter {
                schema: schema.id.clone(),
                group: group.name.clone(),
                parameter: missing.clone(),
            });
        }
    }

    for (key, config) in &schema.parameters {
        if let (Some(min), Some(max)) = (config.min, config.max)
            && min > max
        {
            return Err(SchemaError::InvertedBounds {
                schema: schema.id.clone(),
                parameter: key.clone(),
                min,
                max,
            });
        }
        if config.kind == ParameterType::Dropdown && config.options.is_empty() {
            return Err(SchemaError::MissingOptions {
                schema: schema.id.clone(),
                parameter: key.clone(),
            });
        }
        check_value(key, config, &config.default).map_err(|issue| SchemaError::InvalidDefault {
            schema: schema.id.clone(),
            parameter: key.clone(),
            issue,
        })?;
    }

    for preset in &schema.presets {
        let invalid = |reason: String| SchemaError::InvalidPreset {
            schema: schema.id.clone(),
            preset: preset.id.clone(),
            reason,
        };
        if preset.component_type != schema.id {
            return Err(invalid(format!(
                "targets component type '{}'",
                preset.component_type
            )));
        }
        for (key, value) in &preset.parameters {
            let config = schema
                .parameters
                .get(key)
                .ok_or_else(|| invalid(format!("unknown parameter '{key}'")))?;
            check_value(key, config, value).map_err(|issue| invalid(issue.to_string()))?;
        }
    }

    if let Some(responsive) = &schema.responsive
        && let Some(missing) = responsive
            .adaptive_parameters
            .iter()
            .find(|key| !schema.parameters.contains_key(*key))
    {
        return Err(SchemaError::UnknownAdaptiveParameter {
            schema: schema.id.clone(),
            parameter: missing.clone(),
        });
    }

    Ok(())
}
