//! Versioned export/import envelope.

use chrono::{DateTime, Utc};
use parametric_model::ComponentInstance;
use serde::{Deserialize, Serialize};

/// Envelope version written by this crate.
pub const ENVELOPE_VERSION: &str = "1.0.0";

/// `{version, timestamp, components[]}` as exchanged with other hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub components: Vec<ComponentInstance>,
}

impl ExportEnvelope {
    pub fn new(components: Vec<ComponentInstance>) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            timestamp: Utc::now(),
            components,
        }
    }

    /// Whether this envelope's major version can be read.
    ///
    /// Minor and patch changes are additive; only the major number gates.
    pub fn is_supported(&self) -> bool {
        major(&self.version).is_some_and(|m| Some(m) == major(ENVELOPE_VERSION))
    }
}

fn major(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_version(version: &str) -> ExportEnvelope {
        ExportEnvelope {
            version: version.to_string(),
            ..ExportEnvelope::new(Vec::new())
        }
    }

    #[test]
    fn test_major_version_gate() {
        assert!(ExportEnvelope::new(Vec::new()).is_supported());
        assert!(with_version("1.4.2").is_supported());
        assert!(!with_version("2.0.0").is_supported());
        assert!(!with_version("banana").is_supported());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ExportEnvelope::new(Vec::new())).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert!(json["timestamp"].is_string());
        assert!(json["components"].as_array().unwrap().is_empty());
    }
}
