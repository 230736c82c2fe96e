//! Scenario files.

use std::path::Path;

use eyre::{WrapErr, bail, ensure};
use serde::Deserialize;
use zone_core::{Position, ZoneConfig};
use zone_sim::Kind;

/// A scripted run: zones, entities and how long to drive them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Number of heartbeat ticks to run.
    pub ticks: u64,
    pub zones: Vec<ZoneConfig>,
    #[serde(default)]
    pub entities: Vec<ScriptedEntity>,
}

/// Entity kinds a scenario may spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedKind {
    Body,
    Camera,
    Marker,
}

impl From<ScriptedKind> for Kind {
    fn from(kind: ScriptedKind) -> Self {
        match kind {
            ScriptedKind::Body => Self::Body,
            ScriptedKind::Camera => Self::Camera,
            ScriptedKind::Marker => Self::Marker,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedEntity {
    pub name: String,
    pub kind: ScriptedKind,
    /// One position per tick; the last one holds once the path runs out.
    pub path: Vec<Position>,
    /// Tick at which the entity is despawned, before zones evaluate.
    #[serde(default)]
    pub despawn_at: Option<u64>,
}

impl ScriptedEntity {
    /// Position for `tick` (1-based), clamped to the end of the path.
    #[must_use]
    pub fn position_at(&self, tick: u64) -> Option<Position> {
        let index = usize::try_from(tick.saturating_sub(1)).unwrap_or(usize::MAX);
        self.path.get(index).or_else(|| self.path.last()).copied()
    }
}

impl Scenario {
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).wrap_err_with(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> eyre::Result<Self> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> eyre::Result<()> {
        ensure!(!self.zones.is_empty(), "scenario has no zones");
        for zone in &self.zones {
            zone.validate()?;
        }
        for entity in &self.entities {
            if entity.path.is_empty() {
                bail!("entity {:?} has an empty path", entity.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ticks": 3,
        "zones": [{ "name": "pad", "position": [0, 0, 0], "radius": 2 }],
        "entities": [
            { "name": "walker", "kind": "body", "path": [[5, 0, 0], [1, 0, 0]] },
            { "name": "eye", "kind": "camera", "path": [[0, 9, 0]], "despawn_at": 2 }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        assert_eq!(scenario.ticks, 3);
        assert_eq!(scenario.zones[0].name, "pad");
        assert_eq!(scenario.entities[1].kind, ScriptedKind::Camera);
        assert_eq!(scenario.entities[1].despawn_at, Some(2));
    }

    #[test]
    fn test_path_clamps_to_last_waypoint() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        let walker = &scenario.entities[0];
        assert_eq!(walker.position_at(1), Some(Position::new(5.0, 0.0, 0.0)));
        assert_eq!(walker.position_at(2), Some(Position::new(1.0, 0.0, 0.0)));
        assert_eq!(walker.position_at(40), Some(Position::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rejects_bad_scenarios() {
        assert!(Scenario::parse(r#"{ "ticks": 1, "zones": [] }"#).is_err());
        assert!(
            Scenario::parse(
                r#"{ "ticks": 1, "zones": [{ "name": "z", "position": [0, 0, 0], "radius": -1 }] }"#
            )
            .is_err()
        );
        assert!(
            Scenario::parse(
                r#"{
                    "ticks": 1,
                    "zones": [{ "name": "z", "position": [0, 0, 0], "radius": 1 }],
                    "entities": [{ "name": "ghost", "kind": "body", "path": [] }]
                }"#
            )
            .is_err()
        );
    }
}
