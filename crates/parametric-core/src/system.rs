//! The system facade: schemas, validation, state, presets and import/export
//! behind one handle.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use parametric_model::{
    ComponentInstance, ComponentSchema, EventKind, ParamValue, ParameterMap,
    ParameterUpdateEvent, PresetConfig, RenderProps, StateEvent, StateSnapshot,
};
use parametric_persistence::{PersistenceProvider, load_json, save_json};
use parametric_schema::{ParameterValidator, SchemaRegistry};
use parametric_state::{Dispatch, HandlerId, StateManager};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::config::SystemConfig;
use crate::envelope::ExportEnvelope;
use crate::error::{ParametricError, Result};

const PRESET_KEY_PREFIX: &str = "preset_";

struct Inner<P> {
    config: SystemConfig,
    schemas: RwLock<SchemaRegistry>,
    /// Presets saved during this session, by id.
    presets: RwLock<HashMap<String, PresetConfig>>,
    state: StateManager<P>,
}

/// Entry point for hosts.
///
/// Cloning yields another handle to the same system. There is no global
/// instance; construct one and pass it where it is needed.
pub struct ParametricSystem<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for ParametricSystem<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PersistenceProvider> ParametricSystem<P> {
    pub fn new(config: SystemConfig, provider: P) -> Self {
        Self::with_shared_provider(config, Arc::new(provider))
    }

    /// Build a system over a provider the caller keeps a handle to.
    pub fn with_shared_provider(config: SystemConfig, provider: Arc<P>) -> Self {
        let state = StateManager::new(config.state(), provider);
        Self {
            inner: Arc::new(Inner {
                config,
                schemas: RwLock::new(SchemaRegistry::new()),
                presets: RwLock::new(HashMap::new()),
                state,
            }),
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    /// The underlying state manager.
    pub fn state(&self) -> &StateManager<P> {
        &self.inner.state
    }

    pub fn provider(&self) -> &Arc<P> {
        self.inner.state.provider()
    }

    // =========================================================================
    // Schemas
    // =========================================================================

    pub fn register_schema(&self, schema: ComponentSchema) -> Result<()> {
        self.inner.schemas.write().register(schema)?;
        Ok(())
    }

    /// Register a schema from its JSON form. Returns the schema id.
    pub fn register_schema_json(&self, json: &str) -> Result<String> {
        Ok(self.inner.schemas.write().register_json(json)?)
    }

    /// Register every `*.json` file in `dir`, in file-name order.
    ///
    /// Stops at the first file that fails to read or register.
    pub fn register_schema_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        let read_err = |source| ParametricError::ConfigRead {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut ids = Vec::with_capacity(files.len());
        for path in files {
            let json = std::fs::read_to_string(&path).map_err(|source| {
                ParametricError::ConfigRead {
                    path: path.clone(),
                    source,
                }
            })?;
            ids.push(self.register_schema_json(&json)?);
        }
        tracing::info!(count = ids.len(), "Registered schemas from {:?}", dir);
        Ok(ids)
    }

    pub fn get_schema(&self, component_type: &str) -> Option<Arc<ComponentSchema>> {
        self.inner.schemas.read().get(component_type)
    }

    /// All registered schemas, sorted by id.
    pub fn list_schemas(&self) -> Vec<Arc<ComponentSchema>> {
        self.inner.schemas.read().list()
    }

    fn schema(&self, component_type: &str) -> Result<Arc<ComponentSchema>> {
        self.get_schema(component_type)
            .ok_or_else(|| ParametricError::SchemaNotFound {
                component_type: component_type.to_string(),
            })
    }

    fn schema_of(&self, component_id: &str) -> Result<Arc<ComponentSchema>> {
        let component_type = self.inner.state.component_type(component_id).ok_or_else(|| {
            ParametricError::ComponentNotFound {
                component_id: component_id.to_string(),
            }
        })?;
        self.schema(&component_type)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Create and register an instance of `component_type`.
    ///
    /// The parameter map starts from every declared default; a preset, when
    /// given, overlays its (possibly partial) values on top.
    pub async fn create_component(
        &self,
        component_type: &str,
        preset_id: Option<&str>,
    ) -> Result<ComponentInstance> {
        let schema = self.schema(component_type)?;
        let preset = match preset_id {
            Some(id) => Some(self.preset_for(&schema, id).await?),
            None => None,
        };
        let overlay = preset.as_ref().map(|p| p.parameters.clone()).unwrap_or_default();
        let parameters = ParameterValidator::resolve(&schema, &overlay)
            .map_err(|report| ParametricError::invalid(component_type, report))?;

        let mut instance = ComponentInstance::new(new_id(component_type), component_type, parameters);
        instance.preset = preset.map(|p| p.id);
        self.admit(instance.clone());
        tracing::debug!(component = %instance.id, "Created component");
        Ok(instance)
    }

    /// Register an instance and announce it as created.
    fn admit(&self, instance: ComponentInstance) {
        self.inner.state.register_component(instance.clone());
        self.inner
            .state
            .emit(&StateEvent::ComponentCreated { instance });
    }

    pub fn remove_component(&self, component_id: &str) -> Result<ComponentInstance> {
        Ok(self.inner.state.unregister_component(component_id)?)
    }

    pub fn get_component(&self, component_id: &str) -> Option<ComponentInstance> {
        self.inner.state.get_component(component_id)
    }

    pub fn get_components_by_type(&self, component_type: &str) -> Vec<ComponentInstance> {
        self.inner.state.get_components_by_type(component_type)
    }

    pub fn components(&self) -> Vec<ComponentInstance> {
        self.inner.state.components()
    }

    /// Validate one value against the component's schema, then write it.
    ///
    /// Validation runs before anything is stored or queued; an invalid value
    /// leaves the instance untouched.
    pub fn update_parameter(
        &self,
        component_id: &str,
        key: &str,
        value: ParamValue,
        dispatch: Dispatch,
    ) -> Result<ParameterUpdateEvent> {
        let schema = self.schema_of(component_id)?;
        ParameterValidator::validate_single(&schema, key, &value)
            .map_err(|issue| ParametricError::invalid_value(&schema.id, issue))?;
        Ok(self
            .inner
            .state
            .update_parameter(component_id, key, value, dispatch)?)
    }

    /// Validate every value first; write all of them or none.
    pub fn update_parameters(
        &self,
        component_id: &str,
        updates: ParameterMap,
        dispatch: Dispatch,
    ) -> Result<Vec<ParameterUpdateEvent>> {
        let schema = self.schema_of(component_id)?;
        ParameterValidator::validate(&schema, &updates)
            .into_result()
            .map_err(|report| ParametricError::invalid(&schema.id, report))?;
        Ok(self
            .inner
            .state
            .update_parameters(component_id, updates, dispatch)?)
    }

    /// Put every parameter back to its default, or to the applied preset's
    /// value when the instance was created from one.
    pub async fn reset_component(
        &self,
        component_id: &str,
        dispatch: Dispatch,
    ) -> Result<Vec<ParameterUpdateEvent>> {
        let instance = self.get_component(component_id).ok_or_else(|| {
            ParametricError::ComponentNotFound {
                component_id: component_id.to_string(),
            }
        })?;
        let schema = self.schema(&instance.component_type)?;
        let mut target = schema.defaults();
        if let Some(preset_id) = &instance.preset {
            let preset = self.preset_for(&schema, preset_id).await?;
            target.extend(preset.parameters);
        }
        self.update_parameters(component_id, target, dispatch)
    }

    /// Drain queued updates now. Returns how many events were emitted.
    pub fn flush(&self) -> usize {
        self.inner.state.flush()
    }

    // =========================================================================
    // Global parameters
    // =========================================================================

    pub fn set_global_parameter(&self, key: &str, value: ParamValue) -> Option<ParamValue> {
        self.inner.state.set_global_parameter(key, value)
    }

    pub fn get_global_parameter(&self, key: &str) -> Option<ParamValue> {
        self.inner.state.get_global_parameter(key)
    }

    // =========================================================================
    // Snapshots and history
    // =========================================================================

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.state.get_snapshot()
    }

    /// Replace all state with `snapshot` after checking every instance
    /// against its schema. Keys the snapshot omits take their defaults.
    pub fn restore(&self, snapshot: StateSnapshot) -> Result<()> {
        let snapshot = self.conform(snapshot)?;
        self.inner.state.restore_snapshot(snapshot);
        Ok(())
    }

    pub fn undo(&self) -> Result<StateSnapshot> {
        Ok(self.inner.state.undo()?)
    }

    pub fn clear(&self) {
        self.inner.state.clear();
    }

    /// Write the current snapshot to the provider and wait for it.
    pub async fn persist(&self) -> Result<()> {
        Ok(self.inner.state.persist().await?)
    }

    /// Restore the persisted snapshot, if any. Returns whether one was found.
    ///
    /// The stored snapshot is checked like [`restore`](Self::restore); a
    /// snapshot that fails leaves memory untouched and is not rewritten.
    pub async fn load_state(&self) -> Result<bool> {
        let Some(snapshot) = self.inner.state.load_snapshot().await? else {
            return Ok(false);
        };
        let snapshot = self.conform(snapshot)?;
        self.inner.state.restore_loaded(snapshot);
        Ok(true)
    }

    /// Bring every instance of `snapshot` to exactly its schema's keys,
    /// filling omitted ones from defaults. Fails on the first instance with
    /// an unregistered type, an unknown key or an invalid value.
    fn conform(&self, mut snapshot: StateSnapshot) -> Result<StateSnapshot> {
        for instance in snapshot.components.values_mut() {
            let schema = self.schema(&instance.component_type)?;
            instance.parameters = ParameterValidator::resolve(&schema, &instance.parameters)
                .map_err(|report| ParametricError::invalid(&schema.id, report))?;
        }
        Ok(snapshot)
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&StateEvent) + Send + Sync + 'static,
    {
        self.inner.state.events().on(kind, handler)
    }

    pub fn unsubscribe(&self, kind: EventKind, id: HandlerId) -> bool {
        self.inner.state.events().off(kind, id)
    }

    /// Receive events of `kind` on a channel instead of a callback.
    pub fn channel(&self, kind: EventKind) -> (HandlerId, Receiver<StateEvent>) {
        self.inner.state.events().channel(kind)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Resolved read-only props for a renderer.
    pub fn render_props(&self, component_id: &str) -> Result<RenderProps> {
        self.get_component(component_id)
            .map(|instance| RenderProps::from_instance(&instance))
            .ok_or_else(|| ParametricError::ComponentNotFound {
                component_id: component_id.to_string(),
            })
    }

    /// Change callback handed to a renderer alongside its props. Writes go
    /// through validation and the debounced path.
    pub fn change_handler(
        &self,
        component_id: &str,
    ) -> impl Fn(&str, ParamValue) -> Result<ParameterUpdateEvent> + Send + Sync + 'static {
        let system = self.clone();
        let component_id = component_id.to_string();
        move |key, value| system.update_parameter(&component_id, key, value, Dispatch::Debounced)
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Validate a preset against its schema and store it under `preset_<id>`.
    pub async fn save_preset(&self, preset: PresetConfig) -> Result<()> {
        let schema = self.schema(&preset.component_type)?;
        ParameterValidator::validate(&schema, &preset.parameters)
            .into_result()
            .map_err(|report| ParametricError::invalid(&schema.id, report))?;

        let key = PresetConfig::storage_key(&preset.id);
        save_json(&**self.provider(), &key, &preset).await?;
        tracing::info!(preset = %preset.id, "Saved preset");
        self.inner.presets.write().insert(preset.id.clone(), preset);
        Ok(())
    }

    /// Find a preset: bundled with a schema, saved this session, then the
    /// provider.
    pub async fn load_preset(&self, preset_id: &str) -> Result<PresetConfig> {
        if let Some(preset) = self.preset_in_memory(preset_id) {
            return Ok(preset);
        }
        let key = PresetConfig::storage_key(preset_id);
        let preset: Option<PresetConfig> = load_json(&**self.provider(), &key).await?;
        preset.ok_or_else(|| ParametricError::PresetNotFound {
            preset_id: preset_id.to_string(),
        })
    }

    /// Every preset known for `component_type`, sorted by id.
    pub async fn list_presets(&self, component_type: &str) -> Result<Vec<PresetConfig>> {
        let schema = self.schema(component_type)?;
        let mut found: BTreeMap<String, PresetConfig> = BTreeMap::new();

        let keys = self.provider().list().await?;
        for key in keys.iter().filter(|k| k.starts_with(PRESET_KEY_PREFIX)) {
            if let Some(preset) = load_json::<_, PresetConfig>(&**self.provider(), key).await? {
                found.insert(preset.id.clone(), preset);
            }
        }
        for preset in self.inner.presets.read().values() {
            found.insert(preset.id.clone(), preset.clone());
        }
        for preset in &schema.presets {
            found.insert(preset.id.clone(), preset.clone());
        }

        Ok(found
            .into_values()
            .filter(|p| p.component_type == component_type)
            .collect())
    }

    fn preset_in_memory(&self, preset_id: &str) -> Option<PresetConfig> {
        let bundled = self
            .inner
            .schemas
            .read()
            .list()
            .iter()
            .find_map(|schema| schema.preset(preset_id).cloned());
        bundled.or_else(|| self.inner.presets.read().get(preset_id).cloned())
    }

    async fn preset_for(&self, schema: &ComponentSchema, preset_id: &str) -> Result<PresetConfig> {
        let preset = match schema.preset(preset_id) {
            Some(bundled) => bundled.clone(),
            None => self.load_preset(preset_id).await?,
        };
        if preset.component_type != schema.id {
            return Err(ParametricError::PresetMismatch {
                preset_id: preset.id,
                preset_type: preset.component_type,
                component_type: schema.id.clone(),
            });
        }
        Ok(preset)
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Envelope of the given instances, or of every instance when `None`.
    pub fn export_envelope(&self, component_ids: Option<&[&str]>) -> Result<ExportEnvelope> {
        let components = match component_ids {
            None => self.components(),
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.get_component(id)
                        .ok_or_else(|| ParametricError::ComponentNotFound {
                            component_id: (*id).to_string(),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(ExportEnvelope::new(components))
    }

    /// JSON form of [`export_envelope`](Self::export_envelope).
    pub fn export_configuration(&self, component_ids: Option<&[&str]>) -> Result<String> {
        let envelope = self.export_envelope(component_ids)?;
        serde_json::to_string_pretty(&envelope)
            .map_err(|source| ParametricError::EnvelopeFormat { source })
    }

    /// Recreate every instance of an exported envelope under fresh ids.
    ///
    /// The whole envelope is checked first (version, schema presence and
    /// parameter values), so a bad entry creates nothing. Stored values win
    /// over schema defaults; keys the envelope omits are filled from them.
    pub fn import_configuration(&self, json: &str) -> Result<Vec<ComponentInstance>> {
        let envelope: ExportEnvelope = serde_json::from_str(json)
            .map_err(|source| ParametricError::EnvelopeFormat { source })?;
        self.import_envelope(envelope)
    }

    pub fn import_envelope(&self, envelope: ExportEnvelope) -> Result<Vec<ComponentInstance>> {
        if !envelope.is_supported() {
            return Err(ParametricError::envelope(format!(
                "unsupported version '{}'",
                envelope.version
            )));
        }

        let mut resolved = Vec::with_capacity(envelope.components.len());
        for source in &envelope.components {
            let schema = self.schema(&source.component_type)?;
            let parameters = ParameterValidator::resolve(&schema, &source.parameters)
                .map_err(|report| ParametricError::invalid(&schema.id, report))?;
            resolved.push((source, parameters));
        }

        let imported: Vec<ComponentInstance> = resolved
            .into_iter()
            .map(|(source, parameters)| {
                let mut instance = ComponentInstance::new(
                    new_id(&source.component_type),
                    source.component_type.clone(),
                    parameters,
                );
                instance.preset.clone_from(&source.preset);
                self.admit(instance.clone());
                instance
            })
            .collect();
        tracing::info!(count = imported.len(), "Imported components");
        Ok(imported)
    }
}

/// `<type>_<uuid>`: unique across sessions and readable in logs.
fn new_id(component_type: &str) -> String {
    format!("{component_type}_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parametric_model::ParameterConfig;
    use parametric_persistence::MemoryProvider;

    fn system() -> ParametricSystem<MemoryProvider> {
        let config = SystemConfig {
            auto_persist: false,
            ..Default::default()
        };
        let system = ParametricSystem::new(config, MemoryProvider::new());
        system
            .register_schema(
                ComponentSchema::new("card", "Card")
                    .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0)),
            )
            .unwrap();
        system
    }

    #[test]
    fn test_ids_carry_type_prefix() {
        let id = new_id("card");
        assert!(id.starts_with("card_"));
        assert_ne!(id, new_id("card"));
    }

    #[test]
    fn test_unknown_component_is_not_a_validation_error() {
        let err = system()
            .update_parameter("nope", "opacity", 0.5.into(), Dispatch::Immediate)
            .unwrap_err();
        assert!(matches!(err, ParametricError::ComponentNotFound { .. }));
    }

    #[test]
    fn test_render_props_for_unknown_component() {
        assert!(matches!(
            system().render_props("nope"),
            Err(ParametricError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_export_unknown_id_fails() {
        let err = system().export_configuration(Some(&["nope"])).unwrap_err();
        assert!(matches!(err, ParametricError::ComponentNotFound { .. }));
    }
}
