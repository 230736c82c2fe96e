//! Declarative zone definitions.

use serde::{Deserialize, Serialize};

use crate::error::{ZoneResult, validate_radius};
use crate::Position;

/// Serializable description of a zone.
///
/// ```json
/// { "name": "capture-point", "position": [0.0, 0.0, 0.0], "radius": 10.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    /// Diagnostic label.
    pub name: String,
    /// Sphere center.
    pub position: Position,
    /// Sphere radius, must be non-negative.
    pub radius: f64,
}

impl ZoneConfig {
    /// Create a config without validating it.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position, radius: f64) -> Self {
        Self {
            name: name.into(),
            position,
            radius,
        }
    }

    /// Apply the same checks as [`Zone::new`](crate::Zone::new).
    pub fn validate(&self) -> ZoneResult<()> {
        validate_radius(&self.name, self.radius)
    }
}
