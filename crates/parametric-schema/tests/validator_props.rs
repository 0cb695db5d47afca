//! Property tests for the parameter validator.

use parametric_model::{ComponentSchema, ParamValue, ParameterConfig, ParameterMap};
use parametric_schema::{ParameterValidator, SchemaRegistry, ValidationIssue};
use proptest::prelude::*;

fn bounded(min: f64, max: f64) -> ComponentSchema {
    ComponentSchema::new("knob", "Knob")
        .with_parameter("level", ParameterConfig::slider(min, min, max))
        .with_parameter(
            "mode",
            ParameterConfig::dropdown("a", ["a", "b", "c"]),
        )
}

proptest! {
    #[test]
    fn slider_accepts_every_value_within_bounds(
        min in -1000.0f64..0.0,
        span in 0.0f64..1000.0,
        t in 0.0f64..=1.0,
    ) {
        let max = min + span;
        let value = (min + span * t).clamp(min, max);
        let schema = bounded(min, max);
        prop_assert!(ParameterValidator::validate_single(&schema, "level", &value.into()).is_ok());
    }

    #[test]
    fn slider_rejects_every_value_above_max(
        min in -1000.0f64..0.0,
        span in 0.0f64..1000.0,
        excess in 0.001f64..1000.0,
    ) {
        let max = min + span;
        let schema = bounded(min, max);
        let result = ParameterValidator::validate_single(&schema, "level", &(max + excess).into());
        let is_out_of_range = matches!(result, Err(ValidationIssue::OutOfRange { .. }));
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn dropdown_rejects_values_outside_options(value in "[d-z]{1,8}") {
        let schema = bounded(0.0, 1.0);
        let result = ParameterValidator::validate_single(&schema, "mode", &ParamValue::from(value));
        let is_not_an_option = matches!(result, Err(ValidationIssue::NotAnOption { .. }));
        prop_assert!(is_not_an_option);
    }

    #[test]
    fn resolved_map_always_covers_every_schema_key(opacity in 0.0f64..=1.0, include in any::<bool>()) {
        let schema = ComponentSchema::new("card", "Card")
            .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0))
            .with_parameter("title", ParameterConfig::text("Hello"))
            .with_parameter("visible", ParameterConfig::toggle(true));
        let mut overlay = ParameterMap::new();
        if include {
            overlay.insert("opacity".to_string(), opacity.into());
        }

        let resolved = ParameterValidator::resolve(&schema, &overlay).unwrap();
        prop_assert_eq!(resolved.len(), schema.parameters.len());
        for key in schema.parameters.keys() {
            prop_assert!(resolved.contains_key(key));
        }
    }
}

#[test]
fn registered_defaults_always_validate() {
    let mut registry = SchemaRegistry::new();
    registry.register(bounded(-5.0, 5.0)).unwrap();
    let schema = registry.get("knob").unwrap();

    let report = ParameterValidator::validate(&schema, &schema.defaults());
    assert!(report.is_valid(), "{report}");
}
