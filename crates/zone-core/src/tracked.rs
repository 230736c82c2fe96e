//! Per-entity tracking state.

use zone_signal::Signal;

use crate::{EntitySystem, Position};

/// How a tracked entity's position is read from the host.
///
/// Chosen once at track time instead of re-inspecting the entity every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// Ordinary entity: body position, auto-untracked when it dies.
    #[default]
    Body,
    /// Camera-like entity: viewpoint position, never liveness-checked.
    Viewpoint,
}

impl Accessor {
    /// Whether this accessor marks a camera-like entity.
    #[must_use]
    pub const fn is_camera_like(self) -> bool {
        matches!(self, Self::Viewpoint)
    }

    /// Read the entity's current position through this accessor.
    pub fn read<H: EntitySystem>(self, host: &H, entity: H::Entity) -> Option<Position> {
        match self {
            Self::Body => host.position(entity),
            Self::Viewpoint => host.viewpoint_position(entity),
        }
    }
}

/// A containment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Enter,
    Exit,
}

impl core::fmt::Display for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Enter => f.write_str("enter"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// State a zone keeps for one tracked entity.
///
/// Owns its two signals; the zone disconnects them when it removes the record.
#[derive(Debug)]
pub(crate) struct TrackedEntity {
    in_zone: bool,
    accessor: Accessor,
    on_enter: Signal,
    on_exit: Signal,
}

impl TrackedEntity {
    /// Fresh state: outside, no subscribers.
    pub(crate) fn new(accessor: Accessor) -> Self {
        Self {
            in_zone: false,
            accessor,
            on_enter: Signal::new(),
            on_exit: Signal::new(),
        }
    }

    /// Last evaluated containment.
    #[must_use]
    pub const fn in_zone(&self) -> bool {
        self.in_zone
    }

    #[must_use]
    pub const fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// Record a containment sample. Returns the transition if the state changed.
    pub(crate) fn observe(&mut self, currently_in: bool) -> Option<Transition> {
        if currently_in == self.in_zone {
            return None;
        }
        self.in_zone = currently_in;
        Some(if currently_in {
            Transition::Enter
        } else {
            Transition::Exit
        })
    }

    pub(crate) fn signal(&self, transition: Transition) -> &Signal {
        match transition {
            Transition::Enter => &self.on_enter,
            Transition::Exit => &self.on_exit,
        }
    }

    /// Drop every enter and exit subscriber.
    pub(crate) fn disconnect(&self) {
        self.on_enter.unsubscribe_all();
        self.on_exit.unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_outside() {
        let tracked = TrackedEntity::new(Accessor::Body);
        assert!(!tracked.in_zone());
        assert!(!tracked.accessor().is_camera_like());
        assert!(Accessor::Viewpoint.is_camera_like());
    }

    #[test]
    fn test_observe_is_edge_triggered() {
        let mut tracked = TrackedEntity::new(Accessor::Body);

        let samples = [false, true, true, false, false, true, false];
        let transitions: Vec<_> = samples
            .iter()
            .filter_map(|&inside| tracked.observe(inside))
            .collect();

        assert_eq!(
            transitions,
            vec![Transition::Enter, Transition::Exit, Transition::Enter, Transition::Exit]
        );
    }

    #[test]
    fn test_disconnect_clears_both_signals() {
        let tracked = TrackedEntity::new(Accessor::Body);
        let enter = tracked.signal(Transition::Enter).subscribe(|| {});
        let exit = tracked.signal(Transition::Exit).subscribe(|| {});

        tracked.disconnect();

        assert!(!enter.is_active());
        assert!(!exit.is_active());
        assert_eq!(tracked.signal(Transition::Enter).fire(), 0);
    }
}
