//! Generational entity handles.
//!
//! A despawned slot is reused with a bumped generation, so stale handles never
//! alias a newer entity.

use std::fmt;

/// Generation counter for a slot. Incremented on despawn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u32);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Handle to an entity in a [`SimWorld`](crate::SimWorld).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: Generation,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: Generation) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation.0)
    }
}

/// Hands out slot indices and tracks which generation is current in each.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<Generation>,
    free: Vec<u32>,
}

impl EntityAllocator {
    pub(crate) fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            return Entity::new(index, self.generations[index as usize]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(Generation::default());
        Entity::new(index, Generation::default())
    }

    /// Returns `false` for stale or unknown handles.
    pub(crate) fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_current(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.next();
        self.free.push(entity.index);
        true
    }

    pub(crate) fn is_current(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut allocator = EntityAllocator::default();

        let a = allocator.allocate();
        assert!(allocator.deallocate(a));
        assert!(!allocator.deallocate(a));

        let b = allocator.allocate();
        assert_eq!(b.index(), a.index());
        assert_ne!(b, a);
        assert!(allocator.is_current(b));
        assert!(!allocator.is_current(a));
    }

    #[test]
    fn test_display() {
        let e = Entity::new(3, Generation::default().next());
        assert_eq!(e.to_string(), "3v1");
        assert_eq!(format!("{e:?}"), "Entity(3v1)");
    }
}
