//! Host entity-system capability.

use core::fmt::Debug;
use core::hash::Hash;
use std::sync::Arc;

use crate::Position;

/// What a zone needs to know about the host's entities.
///
/// Zones only ever query the host; they never create, move, or destroy entities.
pub trait EntitySystem: Send + Sync + 'static {
    /// Entity handle. Must stay comparable after the entity is gone.
    type Entity: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Whether the entity still exists and is attached to the world.
    fn is_alive(&self, entity: Self::Entity) -> bool;

    /// Whether the entity has a physical body that can be tracked.
    fn is_trackable_body(&self, entity: Self::Entity) -> bool;

    /// Body position, or `None` if the entity has no body.
    fn position(&self, entity: Self::Entity) -> Option<Position>;

    /// Viewpoint position for camera-like entities, or `None` if unavailable.
    fn viewpoint_position(&self, entity: Self::Entity) -> Option<Position>;
}

impl<H: EntitySystem> EntitySystem for Arc<H> {
    type Entity = H::Entity;

    fn is_alive(&self, entity: Self::Entity) -> bool {
        (**self).is_alive(entity)
    }

    fn is_trackable_body(&self, entity: Self::Entity) -> bool {
        (**self).is_trackable_body(entity)
    }

    fn position(&self, entity: Self::Entity) -> Option<Position> {
        (**self).position(entity)
    }

    fn viewpoint_position(&self, entity: Self::Entity) -> Option<Position> {
        (**self).viewpoint_position(entity)
    }
}
