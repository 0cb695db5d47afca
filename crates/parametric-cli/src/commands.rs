use std::path::Path;

use anyhow::{Context, Result, bail};
use parametric_cli::tables::{
    component_table, issue_table, parameter_table, preset_table, schema_table,
};
use parametric_cli::workspace::validate_file;
use parametric_core::{FileProvider, ParametricSystem};
use tracing::info;

pub fn run_schemas(
    system: &ParametricSystem<FileProvider>,
    component_type: Option<&str>,
) -> Result<()> {
    let Some(component_type) = component_type else {
        let schemas = system.list_schemas();
        if schemas.is_empty() {
            println!("No schemas registered. Pass --schema-dir or set schema_dir in the config.");
        } else {
            println!("{}", schema_table(&schemas));
        }
        return Ok(());
    };

    let Some(schema) = system.get_schema(component_type) else {
        bail!("no schema registered for component type '{component_type}'");
    };
    println!("{} ({}) v{}", schema.name, schema.id, schema.version);
    println!("{}", parameter_table(&schema));
    for group in &schema.groups {
        println!("{}: {}", group.name, group.parameters.join(", "));
    }
    Ok(())
}

/// Returns whether the file is valid.
pub fn run_validate(
    system: &ParametricSystem<FileProvider>,
    component_type: &str,
    file: &Path,
) -> Result<bool> {
    let report = validate_file(system, component_type, file)?;
    if report.is_valid() {
        println!("{}: valid '{component_type}' parameters", file.display());
        return Ok(true);
    }
    println!(
        "{}: {} issue(s) against '{component_type}'",
        file.display(),
        report.issues.len()
    );
    println!("{}", issue_table(&report));
    Ok(false)
}

pub fn run_components(system: &ParametricSystem<FileProvider>, component_type: Option<&str>) {
    let components = match component_type {
        Some(component_type) => system.get_components_by_type(component_type),
        None => system.components(),
    };
    if components.is_empty() {
        println!("No components stored.");
    } else {
        println!("{}", component_table(&components));
    }
}

pub async fn run_presets(
    system: &ParametricSystem<FileProvider>,
    component_type: &str,
) -> Result<()> {
    let presets = system.list_presets(component_type).await?;
    if presets.is_empty() {
        println!("No presets for '{component_type}'.");
    } else {
        println!("{}", preset_table(&presets));
    }
    Ok(())
}

pub fn run_export(
    system: &ParametricSystem<FileProvider>,
    ids: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let selection = (!ids.is_empty()).then_some(ids.as_slice());
    let json = system.export_configuration(selection)?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!("Exported configuration to {:?}", path);
            println!("Exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub async fn run_import(
    system: &ParametricSystem<FileProvider>,
    file: &Path,
    dry_run: bool,
) -> Result<()> {
    let json =
        std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let imported = system.import_configuration(&json)?;

    if dry_run {
        println!("{} component(s) would be imported:", imported.len());
    } else {
        system.persist().await.context("save imported state")?;
        println!("Imported {} component(s):", imported.len());
    }
    println!("{}", component_table(&imported));
    Ok(())
}
