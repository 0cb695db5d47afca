//! Terminal tables for schemas, components and presets.

use std::sync::Arc;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use parametric_core::{
    ComponentInstance, ComponentSchema, ParameterConfig, PresetConfig, ValidationReport,
};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn styled(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn schema_table(schemas: &[Arc<ComponentSchema>]) -> Table {
    let mut table = styled(&["Type", "Name", "Category", "Version", "Parameters", "Presets"]);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for schema in schemas {
        table.add_row(vec![
            Cell::new(&schema.id).add_attribute(Attribute::Bold),
            Cell::new(&schema.name),
            Cell::new(&schema.category),
            Cell::new(&schema.version),
            Cell::new(schema.parameters.len()),
            Cell::new(schema.presets.len()),
        ]);
    }
    table
}

pub fn parameter_table(schema: &ComponentSchema) -> Table {
    let mut table = styled(&["Parameter", "Type", "Default", "Range / Options", "Group"]);
    for (key, config) in &schema.parameters {
        table.add_row(vec![
            Cell::new(key).add_attribute(Attribute::Bold),
            Cell::new(config.kind),
            Cell::new(&config.default),
            Cell::new(constraint_label(config)),
            Cell::new(config.group.as_deref().unwrap_or("")),
        ]);
    }
    table
}

/// Human form of a parameter's bounds or options.
pub fn constraint_label(config: &ParameterConfig) -> String {
    if !config.options.is_empty() {
        return config
            .options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
    }
    let bound = |b: Option<f64>| b.map_or_else(|| "..".to_string(), |v| v.to_string());
    match (config.min, config.max) {
        (None, None) => String::new(),
        (min, max) => {
            let mut label = format!("[{}, {}]", bound(min), bound(max));
            if let Some(unit) = &config.unit {
                label.push(' ');
                label.push_str(unit);
            }
            label
        }
    }
}

pub fn component_table(components: &[ComponentInstance]) -> Table {
    let mut table = styled(&["Id", "Type", "Preset", "Parameters", "Updated"]);
    align_column(&mut table, 3, CellAlignment::Right);
    for instance in components {
        table.add_row(vec![
            Cell::new(&instance.id),
            Cell::new(&instance.component_type),
            Cell::new(instance.preset.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
            Cell::new(instance.parameters.len()),
            Cell::new(instance.metadata.updated_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

pub fn preset_table(presets: &[PresetConfig]) -> Table {
    let mut table = styled(&["Preset", "Name", "Overrides", "Tags"]);
    for preset in presets {
        let overrides = preset
            .parameters
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&preset.id).add_attribute(Attribute::Bold),
            Cell::new(&preset.name),
            Cell::new(overrides),
            Cell::new(preset.metadata.tags.join(", ")),
        ]);
    }
    table
}

pub fn issue_table(report: &ValidationReport) -> Table {
    let mut table = styled(&["Parameter", "Problem"]);
    for issue in &report.issues {
        table.add_row(vec![
            Cell::new(issue.parameter()).fg(Color::Red),
            Cell::new(issue),
        ]);
    }
    table
}
