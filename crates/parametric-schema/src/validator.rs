//! Type, range and option checks for parameter values.
//!
//! Rules per declared type:
//! - `slider`: finite number, within `[min, max]` for each declared bound
//! - `color`: string (format is not checked)
//! - `toggle`: boolean
//! - `dropdown`: one of the declared options
//! - `text`: string
//!
//! Out-of-range values are rejected, never clamped. The `step` of a slider is
//! a UI hint and is not enforced.

use parametric_model::{ComponentSchema, ParamValue, ParameterConfig, ParameterMap, ParameterType};

use crate::issue::{ValidationIssue, ValidationReport};

/// Stateless validator over component schemas.
pub struct ParameterValidator;

impl ParameterValidator {
    /// Validate a (possibly partial) parameter map against a schema.
    ///
    /// Keys the map omits are not reported; they are filled from defaults at
    /// creation time. Every unknown key and every rule violation is reported.
    pub fn validate(schema: &ComponentSchema, parameters: &ParameterMap) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (key, value) in parameters {
            if let Err(issue) = Self::validate_single(schema, key, value) {
                report.push(issue);
            }
        }
        report
    }

    /// Validate one key/value pair. Used on the hot update path.
    pub fn validate_single(
        schema: &ComponentSchema,
        key: &str,
        value: &ParamValue,
    ) -> Result<(), ValidationIssue> {
        let config = schema
            .parameters
            .get(key)
            .ok_or_else(|| ValidationIssue::UnknownParameter {
                parameter: key.to_string(),
            })?;
        check_value(key, config, value)
    }

    /// Build the full parameter map for a new instance: declared defaults,
    /// overlaid with `overlay` after it validates.
    pub fn resolve(
        schema: &ComponentSchema,
        overlay: &ParameterMap,
    ) -> Result<ParameterMap, ValidationReport> {
        Self::validate(schema, overlay).into_result()?;
        let mut parameters = schema.defaults();
        parameters.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(parameters)
    }
}

/// Apply the rule for `config.kind` to a single value.
pub fn check_value(
    key: &str,
    config: &ParameterConfig,
    value: &ParamValue,
) -> Result<(), ValidationIssue> {
    let mismatch = |expected_kind: &'static str| ValidationIssue::TypeMismatch {
        parameter: key.to_string(),
        expected: config.kind,
        expected_kind,
        found: value.kind_label(),
    };

    match config.kind {
        ParameterType::Slider => {
            let n = value.as_f64().ok_or_else(|| mismatch("number"))?;
            if !n.is_finite() {
                return Err(ValidationIssue::NotFinite {
                    parameter: key.to_string(),
                });
            }
            let below = config.min.is_some_and(|min| n < min);
            let above = config.max.is_some_and(|max| n > max);
            if below || above {
                return Err(ValidationIssue::OutOfRange {
                    parameter: key.to_string(),
                    value: n,
                    min: config.min,
                    max: config.max,
                });
            }
            Ok(())
        }
        ParameterType::Color | ParameterType::Text => value
            .as_str()
            .map(|_| ())
            .ok_or_else(|| mismatch("string")),
        ParameterType::Toggle => value
            .as_bool()
            .map(|_| ())
            .ok_or_else(|| mismatch("boolean")),
        ParameterType::Dropdown => {
            if config.options.contains(value) {
                Ok(())
            } else {
                Err(ValidationIssue::NotAnOption {
                    parameter: key.to_string(),
                    value: value.clone(),
                    options: config.options.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ComponentSchema {
        ComponentSchema::new("card", "Card")
            .with_parameter("opacity", ParameterConfig::slider(1.0, 0.0, 1.0))
            .with_parameter("blur", ParameterConfig::unbounded_slider(0.0))
            .with_parameter("fill", ParameterConfig::color("#ffffff"))
            .with_parameter("visible", ParameterConfig::toggle(true))
            .with_parameter("size", ParameterConfig::dropdown("md", ["sm", "md", "lg"]))
            .with_parameter("title", ParameterConfig::text("Hello"))
    }

    #[test]
    fn test_accepts_values_of_declared_types() {
        let schema = card();
        let mut params = ParameterMap::new();
        params.insert("opacity".into(), 0.4.into());
        params.insert("blur".into(), 1200.0.into());
        params.insert("fill".into(), "not-even-a-color".into());
        params.insert("visible".into(), false.into());
        params.insert("size".into(), "lg".into());
        params.insert("title".into(), "".into());

        let report = ParameterValidator::validate(&schema, &params);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_missing_keys_are_not_errors() {
        let report = ParameterValidator::validate(&card(), &ParameterMap::new());
        assert!(report.is_valid());
    }

    #[test]
    fn test_slider_bounds_are_inclusive() {
        let schema = card();
        assert!(ParameterValidator::validate_single(&schema, "opacity", &0.0.into()).is_ok());
        assert!(ParameterValidator::validate_single(&schema, "opacity", &1.0.into()).is_ok());
        assert!(matches!(
            ParameterValidator::validate_single(&schema, "opacity", &2.0.into()),
            Err(ValidationIssue::OutOfRange { .. })
        ));
        assert!(matches!(
            ParameterValidator::validate_single(&schema, "opacity", &(-0.1).into()),
            Err(ValidationIssue::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_slider_rejects_non_finite() {
        let result = ParameterValidator::validate_single(&card(), "blur", &f64::NAN.into());
        assert!(matches!(result, Err(ValidationIssue::NotFinite { .. })));
    }

    #[test]
    fn test_type_mismatches() {
        let schema = card();
        for (key, value) in [
            ("opacity", ParamValue::from("0.5")),
            ("fill", ParamValue::from(3)),
            ("visible", ParamValue::from("yes")),
            ("title", ParamValue::from(true)),
        ] {
            let result = ParameterValidator::validate_single(&schema, key, &value);
            assert!(
                matches!(result, Err(ValidationIssue::TypeMismatch { .. })),
                "{key} accepted {value}"
            );
        }
    }

    #[test]
    fn test_dropdown_requires_option() {
        let result = ParameterValidator::validate_single(&card(), "size", &"xl".into());
        assert!(matches!(result, Err(ValidationIssue::NotAnOption { .. })));
    }

    #[test]
    fn test_unknown_key_is_reported() {
        let mut params = ParameterMap::new();
        params.insert("shadow".into(), 1.0.into());
        params.insert("opacity".into(), 5.0.into());

        let report = ParameterValidator::validate(&card(), &params);
        assert_eq!(report.issues.len(), 2);
        assert!(report.has_issue_for("shadow"));
        assert!(report.has_issue_for("opacity"));
    }

    #[test]
    fn test_resolve_overlays_defaults() {
        let mut overlay = ParameterMap::new();
        overlay.insert("opacity".into(), 0.25.into());

        let resolved = ParameterValidator::resolve(&card(), &overlay).unwrap();
        assert_eq!(resolved.len(), 6);
        assert_eq!(resolved["opacity"], ParamValue::from(0.25));
        assert_eq!(resolved["title"], ParamValue::from("Hello"));
    }

    #[test]
    fn test_resolve_rejects_invalid_overlay() {
        let mut overlay = ParameterMap::new();
        overlay.insert("opacity".into(), 3.0.into());
        assert!(ParameterValidator::resolve(&card(), &overlay).is_err());
    }
}
