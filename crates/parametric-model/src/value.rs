//! Dynamically typed parameter values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single parameter value.
///
/// Serialized untagged, so `true`, `0.4` and `"#ff0000"` appear on the wire
/// exactly as a JSON host would write them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the runtime kind, used in validation messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_shape() {
        let values = vec![
            ParamValue::from(true),
            ParamValue::from(0.4),
            ParamValue::from("#ff0000"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r##"[true,0.4,"#ff0000"]"##);
    }

    #[test]
    fn test_integers_parse_as_numbers() {
        let value: ParamValue = serde_json::from_str("3").unwrap();
        assert_eq!(value, ParamValue::Number(3.0));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ParamValue::from(2).as_f64(), Some(2.0));
        assert_eq!(ParamValue::from(false).as_bool(), Some(false));
        assert_eq!(ParamValue::from("a").as_str(), Some("a"));
        assert_eq!(ParamValue::from("a").as_f64(), None);
        assert_eq!(ParamValue::from(1.5).kind_label(), "number");
    }
}
