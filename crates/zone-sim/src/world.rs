//! In-memory entity world.

use std::sync::Arc;

use parking_lot::RwLock;
use zone_core::{EntitySystem, Position};

use crate::entity::{Entity, EntityAllocator};

/// What an entity is, as far as zones are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Physical body: trackable, exposes a body position.
    Body,
    /// Viewpoint: exposes only a viewpoint position.
    Camera,
    /// Positioned but not trackable (e.g. a decal or sound emitter).
    Marker,
}

#[derive(Debug, Clone, Copy)]
struct Record {
    kind: Kind,
    position: Position,
}

#[derive(Default)]
struct SimWorldInner {
    allocator: EntityAllocator,
    /// Indexed by `Entity::index`; `None` for free slots.
    records: Vec<Option<Record>>,
}

impl SimWorldInner {
    fn get(&self, entity: Entity) -> Option<Record> {
        if !self.allocator.is_current(entity) {
            return None;
        }
        self.records.get(entity.index() as usize).copied().flatten()
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut Record> {
        if !self.allocator.is_current(entity) {
            return None;
        }
        self.records.get_mut(entity.index() as usize)?.as_mut()
    }
}

/// World handle - cloneable wrapper around shared entity storage.
///
/// Clones see the same entities, so a test or game loop can keep one clone to move
/// entities while zones hold another.
#[derive(Clone, Default)]
pub struct SimWorld {
    inner: Arc<RwLock<SimWorldInner>>,
}

impl SimWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity of the given kind.
    pub fn spawn(&self, kind: Kind, position: Position) -> Entity {
        let mut inner = self.inner.write();
        let entity = inner.allocator.allocate();
        let index = entity.index() as usize;
        if inner.records.len() <= index {
            inner.records.resize(index + 1, None);
        }
        inner.records[index] = Some(Record { kind, position });
        drop(inner);

        tracing::trace!(%entity, ?kind, ?position, "spawned");
        entity
    }

    pub fn spawn_body(&self, position: Position) -> Entity {
        self.spawn(Kind::Body, position)
    }

    pub fn spawn_camera(&self, viewpoint: Position) -> Entity {
        self.spawn(Kind::Camera, viewpoint)
    }

    pub fn spawn_marker(&self, position: Position) -> Entity {
        self.spawn(Kind::Marker, position)
    }

    /// Move an entity. For cameras this moves the viewpoint.
    ///
    /// Returns `false` if the entity is gone.
    pub fn set_position(&self, entity: Entity, position: Position) -> bool {
        let mut inner = self.inner.write();
        let Some(record) = inner.get_mut(entity) else {
            return false;
        };
        record.position = position;
        true
    }

    /// Remove an entity. Returns `false` if it was already gone.
    pub fn despawn(&self, entity: Entity) -> bool {
        let mut inner = self.inner.write();
        if !inner.allocator.deallocate(entity) {
            return false;
        }
        inner.records[entity.index() as usize] = None;
        drop(inner);

        tracing::trace!(%entity, "despawned");
        true
    }

    #[must_use]
    pub fn kind(&self, entity: Entity) -> Option<Kind> {
        self.inner.read().get(entity).map(|r| r.kind)
    }

    /// Current position regardless of kind.
    #[must_use]
    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.inner.read().get(entity).map(|r| r.position)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.inner.read().records.iter().flatten().count()
    }
}

impl EntitySystem for SimWorld {
    type Entity = Entity;

    fn is_alive(&self, entity: Entity) -> bool {
        self.inner.read().get(entity).is_some()
    }

    fn is_trackable_body(&self, entity: Entity) -> bool {
        self.kind(entity) == Some(Kind::Body)
    }

    fn position(&self, entity: Entity) -> Option<Position> {
        let record = self.inner.read().get(entity)?;
        match record.kind {
            Kind::Body | Kind::Marker => Some(record.position),
            Kind::Camera => None,
        }
    }

    fn viewpoint_position(&self, entity: Entity) -> Option<Position> {
        let record = self.inner.read().get(entity)?;
        (record.kind == Kind::Camera).then_some(record.position)
    }
}

impl core::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimWorld")
            .field("entities", &self.entity_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_query() {
        let world = SimWorld::new();
        let body = world.spawn_body(Position::new(1.0, 2.0, 3.0));
        let camera = world.spawn_camera(Position::new(4.0, 5.0, 6.0));
        let marker = world.spawn_marker(Position::ORIGIN);

        assert_eq!(world.entity_count(), 3);

        assert!(world.is_trackable_body(body));
        assert!(!world.is_trackable_body(camera));
        assert!(!world.is_trackable_body(marker));

        assert_eq!(world.position(body), Some(Position::new(1.0, 2.0, 3.0)));
        assert_eq!(world.viewpoint_position(body), None);
        assert_eq!(world.position(camera), None);
        assert_eq!(
            world.viewpoint_position(camera),
            Some(Position::new(4.0, 5.0, 6.0))
        );
        assert_eq!(world.position(marker), Some(Position::ORIGIN));
    }

    #[test]
    fn test_despawn_invalidates_handle() {
        let world = SimWorld::new();
        let body = world.spawn_body(Position::ORIGIN);

        assert!(world.despawn(body));
        assert!(!world.despawn(body));
        assert!(!world.is_alive(body));
        assert!(!world.is_trackable_body(body));
        assert!(!world.set_position(body, Position::ORIGIN));
        assert_eq!(world.position(body), None);

        // Reused slot is a different entity.
        let next = world.spawn_body(Position::ORIGIN);
        assert_eq!(next.index(), body.index());
        assert!(world.is_alive(next));
        assert!(!world.is_alive(body));
    }

    #[test]
    fn test_clones_share_storage() {
        let world = SimWorld::new();
        let other = world.clone();
        let body = world.spawn_body(Position::ORIGIN);

        assert!(other.set_position(body, Position::new(9.0, 0.0, 0.0)));
        assert_eq!(world.position_of(body), Some(Position::new(9.0, 0.0, 0.0)));
    }
}
