//! Drives a [`Scenario`] against a [`SimWorld`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use zone_core::prelude::*;
use zone_sim::{Entity, Kind, SimWorld};

use crate::scenario::{Scenario, ScriptedEntity};

/// One observed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub tick: u64,
    pub zone: String,
    pub entity: String,
    pub transition: Transition,
}

#[derive(Debug, Default)]
pub struct Report {
    pub ticks: u64,
    pub events: Vec<Event>,
    /// `(zone, entity)` pairs the zone refused to track.
    pub rejected: Vec<(String, String)>,
}

impl Report {
    /// Number of events for one zone and transition.
    #[must_use]
    pub fn count(&self, zone: &str, transition: Transition) -> usize {
        self.events
            .iter()
            .filter(|e| e.zone == zone && e.transition == transition)
            .count()
    }
}

struct Spawned<'a> {
    script: &'a ScriptedEntity,
    name: Arc<str>,
    entity: Entity,
    kind: Kind,
}

pub fn run(scenario: &Scenario) -> eyre::Result<Report> {
    let world = SimWorld::new();
    let heartbeat = Heartbeat::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut rejected = Vec::new();

    let spawned: Vec<Spawned<'_>> = scenario
        .entities
        .iter()
        .filter_map(|script| {
            let kind = Kind::from(script.kind);
            let entity = world.spawn(kind, script.position_at(1)?);
            Some(Spawned {
                script,
                name: script.name.as_str().into(),
                entity,
                kind,
            })
        })
        .collect();

    let mut zones = Vec::with_capacity(scenario.zones.len());
    for config in &scenario.zones {
        let zone = Zone::from_config(config, world.clone(), heartbeat.clone())?;
        info!(
            zone = %config.name,
            position = ?config.position,
            radius = config.radius,
            "zone created"
        );

        for spawned in &spawned {
            if !watch(&zone, spawned, &heartbeat, &events)? {
                rejected.push((config.name.clone(), spawned.name.to_string()));
            }
        }
        zones.push(zone);
    }

    for tick in 1..=scenario.ticks {
        for spawned in &spawned {
            let script = spawned.script;
            if script.despawn_at == Some(tick) {
                if world.despawn(spawned.entity) {
                    info!(tick, entity = %spawned.name, "despawned");
                }
            } else if let Some(position) = script.position_at(tick) {
                world.set_position(spawned.entity, position);
            }
        }
        heartbeat.tick();
    }

    for zone in zones {
        let remaining = zone.tracked_count();
        if remaining > 0 {
            warn!(zone = zone.name(), remaining, "zone destroyed with entities still tracked");
        }
        zone.destroy();
    }

    let events = core::mem::take(&mut *events.lock());
    Ok(Report {
        ticks: scenario.ticks,
        events,
        rejected,
    })
}

/// Track one entity and record its transitions. Returns `false` if the zone refused it.
fn watch(
    zone: &Zone<SimWorld>,
    spawned: &Spawned<'_>,
    heartbeat: &Heartbeat,
    events: &Arc<Mutex<Vec<Event>>>,
) -> eyre::Result<bool> {
    let tracked = match spawned.kind {
        Kind::Camera => zone.track_camera(spawned.entity),
        Kind::Body | Kind::Marker => zone.track(spawned.entity),
    };
    match tracked {
        Ok(_) => {}
        Err(ZoneError::NotTrackable { .. }) => return Ok(false),
        Err(e) => return Err(e.into()),
    }

    for transition in [Transition::Enter, Transition::Exit] {
        let callback = recorder(heartbeat, events, zone.name(), &spawned.name, transition);
        match transition {
            Transition::Enter => zone.on_enter(spawned.entity, callback)?,
            Transition::Exit => zone.on_exit(spawned.entity, callback)?,
        };
    }
    Ok(true)
}

fn recorder(
    heartbeat: &Heartbeat,
    events: &Arc<Mutex<Vec<Event>>>,
    zone: &str,
    entity: &Arc<str>,
    transition: Transition,
) -> impl Fn() + Send + Sync + 'static {
    let heartbeat = heartbeat.clone();
    let events = Arc::clone(events);
    let zone = zone.to_owned();
    let entity = Arc::clone(entity);

    move || {
        let tick = heartbeat.current_tick();
        debug!(tick, %zone, %entity, %transition, "recorded transition");
        events.lock().push(Event {
            tick,
            zone: zone.clone(),
            entity: entity.to_string(),
            transition,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(json: &str) -> Scenario {
        Scenario::parse(json).unwrap()
    }

    #[test]
    fn test_walk_through_zone() {
        let report = run(&scenario(
            r#"{
                "ticks": 5,
                "zones": [{ "name": "pad", "position": [0, 0, 0], "radius": 2 }],
                "entities": [{
                    "name": "walker",
                    "kind": "body",
                    "path": [[-4, 0, 0], [-2, 0, 0], [0, 0, 0], [2.5, 0, 0], [6, 0, 0]]
                }]
            }"#,
        ))
        .unwrap();

        let transitions: Vec<_> = report.events.iter().map(|e| (e.tick, e.transition)).collect();
        assert_eq!(
            transitions,
            vec![(2, Transition::Enter), (4, Transition::Exit)]
        );
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_marker_rejected_and_despawn_is_silent() {
        let report = run(&scenario(
            r#"{
                "ticks": 3,
                "zones": [{ "name": "pad", "position": [0, 0, 0], "radius": 2 }],
                "entities": [
                    { "name": "decal", "kind": "marker", "path": [[0, 0, 0]] },
                    { "name": "runner", "kind": "body", "path": [[0, 0, 0]], "despawn_at": 2 }
                ]
            }"#,
        ))
        .unwrap();

        assert_eq!(report.rejected, vec![("pad".to_owned(), "decal".to_owned())]);
        assert_eq!(report.count("pad", Transition::Enter), 1);
        assert_eq!(report.count("pad", Transition::Exit), 0);
    }

    #[test]
    fn test_camera_tracked_by_viewpoint() {
        let report = run(&scenario(
            r#"{
                "ticks": 2,
                "zones": [
                    { "name": "near", "position": [0, 0, 0], "radius": 1 },
                    { "name": "far", "position": [50, 0, 0], "radius": 1 }
                ],
                "entities": [{ "name": "eye", "kind": "camera", "path": [[0, 0, 0], [50, 0, 0]] }]
            }"#,
        ))
        .unwrap();

        assert_eq!(report.count("near", Transition::Enter), 1);
        assert_eq!(report.count("near", Transition::Exit), 1);
        assert_eq!(report.count("far", Transition::Enter), 1);
    }
}
