//! Opening a parametric system over a storage directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use parametric_core::{
    FileProvider, ParameterMap, ParameterValidator, ParametricSystem, SystemConfig,
    ValidationReport,
};

/// Storage directory used when neither the config nor a flag names one.
pub const DEFAULT_STORAGE_DIR: &str = ".parametric";

/// Location overrides, usually from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Locations {
    pub config: Option<PathBuf>,
    pub schema_dir: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
}

/// Load the config file (if any) and apply directory overrides.
pub fn resolve_config(locations: &Locations) -> Result<SystemConfig> {
    let mut config = match &locations.config {
        Some(path) => SystemConfig::load(path)?,
        None => SystemConfig::default(),
    };
    if let Some(dir) = &locations.schema_dir {
        config.schema_dir = Some(dir.clone());
    }
    if let Some(dir) = &locations.storage_dir {
        config.storage_dir = Some(dir.clone());
    }
    // Commands save explicitly so failures reach the exit code.
    config.auto_persist = false;
    Ok(config)
}

/// Build the system: register schemas, then restore stored state.
pub async fn open(config: SystemConfig) -> Result<ParametricSystem<FileProvider>> {
    let storage_dir = config
        .storage_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
    let schema_dir = config.schema_dir.clone();
    let system = ParametricSystem::new(config, FileProvider::new(&storage_dir));

    if let Some(dir) = schema_dir {
        system
            .register_schema_dir(&dir)
            .with_context(|| format!("register schemas from {}", dir.display()))?;
    }
    let restored = system
        .load_state()
        .await
        .with_context(|| format!("load state from {}", storage_dir.display()))?;
    tracing::debug!(restored, "Opened workspace at {:?}", storage_dir);
    Ok(system)
}

/// Validate a JSON parameter map file against `component_type`.
pub fn validate_file(
    system: &ParametricSystem<FileProvider>,
    component_type: &str,
    path: &Path,
) -> Result<ValidationReport> {
    let Some(schema) = system.get_schema(component_type) else {
        bail!("no schema registered for component type '{component_type}'");
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let parameters: ParameterMap = serde_json::from_str(&content)
        .with_context(|| format!("parse {} as a parameter map", path.display()))?;
    Ok(ParameterValidator::validate(&schema, &parameters))
}
