//! Spherical trigger zone.

use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use parking_lot::Mutex;
use zone_signal::{Signal, Subscription};
use zone_tick::{TickHandle, TickId, TickSource};

use crate::error::validate_radius;
use crate::tracked::{Accessor, TrackedEntity, Transition};
use crate::{EntitySystem, Position, ZoneConfig, ZoneError, ZoneResult};

/// Mutable zone state (behind the zone's mutex).
struct ZoneState<E> {
    /// Cleared once on teardown; an inert zone does no work.
    live: bool,
    tracked: HashMap<E, TrackedEntity>,
}

/// State shared between the owning [`Zone`], its tick callback and any [`ZoneHandle`].
struct ZoneShared<H: EntitySystem> {
    name: Arc<str>,
    position: Position,
    radius: f64,
    host: H,
    state: Mutex<ZoneState<H::Entity>>,
}

impl<H: EntitySystem> ZoneShared<H> {
    fn contains(&self, point: Position) -> bool {
        point.distance(self.position) <= self.radius
    }

    fn destroyed(&self) -> ZoneError {
        ZoneError::Destroyed {
            zone: self.name.to_string(),
        }
    }

    fn track(&self, entity: H::Entity, accessor: Accessor) -> ZoneResult<bool> {
        let mut state = self.state.lock();
        if !state.live {
            return Err(self.destroyed());
        }

        if !accessor.is_camera_like() && !self.host.is_trackable_body(entity) {
            tracing::warn!(
                zone = %self.name,
                ?entity,
                "refusing to track entity without a trackable body"
            );
            return Err(ZoneError::NotTrackable {
                zone: self.name.to_string(),
                entity: format!("{entity:?}"),
            });
        }

        match state.tracked.entry(entity) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(TrackedEntity::new(accessor));
                tracing::debug!(zone = %self.name, ?entity, ?accessor, "tracking entity");
                Ok(true)
            }
        }
    }

    fn untrack(&self, entity: H::Entity) -> bool {
        let removed = self.state.lock().tracked.remove(&entity);
        let Some(tracked) = removed else {
            return false;
        };
        tracked.disconnect();
        tracing::debug!(zone = %self.name, ?entity, "untracked entity");
        true
    }

    fn subscribe<F>(
        &self,
        entity: H::Entity,
        transition: Transition,
        callback: F,
    ) -> ZoneResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let state = self.state.lock();
        let Some(tracked) = state.tracked.get(&entity) else {
            tracing::warn!(
                zone = %self.name,
                ?entity,
                %transition,
                "cannot subscribe: entity is not tracked"
            );
            return Err(ZoneError::NotTracked {
                zone: self.name.to_string(),
                entity: format!("{entity:?}"),
            });
        };
        Ok(tracked.signal(transition).subscribe(callback))
    }

    fn is_tracked(&self, entity: H::Entity) -> bool {
        self.state.lock().tracked.contains_key(&entity)
    }

    fn is_in_zone(&self, entity: H::Entity) -> Option<bool> {
        self.state.lock().tracked.get(&entity).map(TrackedEntity::in_zone)
    }

    /// One evaluation pass.
    ///
    /// Transitions are computed under the lock and fired after it is released, so
    /// callbacks may track, untrack or subscribe on this zone.
    fn update(&self, tick: TickId) {
        let pending = {
            let mut state = self.state.lock();
            if !state.live {
                return;
            }

            let mut pending: Vec<(H::Entity, Transition, Signal)> = Vec::new();
            let mut departed = Vec::new();

            for (&entity, tracked) in &mut state.tracked {
                let accessor = tracked.accessor();
                if !accessor.is_camera_like() && !self.host.is_alive(entity) {
                    departed.push(entity);
                    continue;
                }

                let Some(position) = accessor.read(&self.host, entity) else {
                    tracing::trace!(zone = %self.name, ?entity, tick, "no position, skipping");
                    continue;
                };

                if let Some(transition) = tracked.observe(self.contains(position)) {
                    pending.push((entity, transition, tracked.signal(transition).clone()));
                }
            }

            for entity in departed {
                if let Some(tracked) = state.tracked.remove(&entity) {
                    tracked.disconnect();
                    tracing::debug!(zone = %self.name, ?entity, tick, "auto-untracked dead entity");
                }
            }

            pending
        };

        for (entity, transition, signal) in pending {
            let invoked = signal.fire();
            tracing::trace!(zone = %self.name, ?entity, tick, %transition, invoked, "transition");
        }
    }

    /// Mark inert and disconnect everything. Returns `false` if already torn down.
    fn shut_down(&self) -> bool {
        let tracked = {
            let mut state = self.state.lock();
            if !state.live {
                return false;
            }
            state.live = false;
            core::mem::take(&mut state.tracked)
        };

        for record in tracked.values() {
            record.disconnect();
        }
        true
    }
}

/// A spherical region that raises enter/exit signals for tracked entities.
///
/// Evaluation is driven by the [`TickSource`] given at construction: once per tick,
/// every tracked entity's position is compared against the sphere and the entity's
/// enter or exit signal fires on a change. Signals are edge-triggered; an entity
/// that stays inside fires nothing further.
///
/// Dropping a zone tears it down exactly like [`Zone::destroy`].
///
/// # Example
///
/// ```ignore
/// let zone = Zone::new(Position::ORIGIN, 10.0, "capture-point", world.clone(), heartbeat.clone())?;
/// zone.track(player)?;
/// zone.on_enter(player, || tracing::info!("capturing"))?;
///
/// heartbeat.tick();
/// ```
pub struct Zone<H: EntitySystem> {
    shared: Arc<ZoneShared<H>>,
    ticks: Box<dyn TickSource + Send + Sync>,
    tick_handle: Option<TickHandle>,
}

impl<H: EntitySystem> Zone<H> {
    /// Create a zone and start evaluating it on the next tick.
    ///
    /// Fails with [`ZoneError::InvalidRadius`] if `radius` is negative or NaN.
    pub fn new<T>(
        position: Position,
        radius: f64,
        name: impl Into<String>,
        host: H,
        ticks: T,
    ) -> ZoneResult<Self>
    where
        T: TickSource + Send + Sync + 'static,
    {
        let name: String = name.into();
        validate_radius(&name, radius)?;

        let shared = Arc::new(ZoneShared {
            name: name.into(),
            position,
            radius,
            host,
            state: Mutex::new(ZoneState {
                live: true,
                tracked: HashMap::new(),
            }),
        });

        // Weak so a zone leaked into its own tick source is not kept alive by it.
        let weak = Arc::downgrade(&shared);
        let tick_handle = ticks.subscribe(Box::new(move |tick| {
            if let Some(shared) = weak.upgrade() {
                shared.update(tick);
            }
        }));

        tracing::debug!(zone = %shared.name, ?position, radius, "zone created");

        Ok(Self {
            shared,
            ticks: Box::new(ticks),
            tick_handle: Some(tick_handle),
        })
    }

    /// Create a zone from a [`ZoneConfig`].
    pub fn from_config<T>(config: &ZoneConfig, host: H, ticks: T) -> ZoneResult<Self>
    where
        T: TickSource + Send + Sync + 'static,
    {
        Self::new(
            config.position,
            config.radius,
            config.name.clone(),
            host,
            ticks,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.shared.position
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.shared.radius
    }

    /// The host this zone queries.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// A weak, cloneable handle for use inside callbacks.
    #[must_use]
    pub fn handle(&self) -> ZoneHandle<H> {
        ZoneHandle {
            name: Arc::clone(&self.shared.name),
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Track an entity by its body position.
    ///
    /// Returns `Ok(true)` if newly tracked and `Ok(false)` if it already was, in
    /// which case its state and subscribers are untouched. Entities without a
    /// trackable body are rejected with [`ZoneError::NotTrackable`].
    pub fn track(&self, entity: H::Entity) -> ZoneResult<bool> {
        self.shared.track(entity, Accessor::Body)
    }

    /// Track a camera-like entity by its viewpoint position.
    ///
    /// Camera-like entities skip the body check and are never auto-untracked.
    pub fn track_camera(&self, entity: H::Entity) -> ZoneResult<bool> {
        self.shared.track(entity, Accessor::Viewpoint)
    }

    /// Stop tracking an entity and disconnect all of its subscribers.
    ///
    /// Returns `false` if the entity was not tracked.
    pub fn untrack(&self, entity: H::Entity) -> bool {
        self.shared.untrack(entity)
    }

    /// Subscribe to the entity entering this zone.
    pub fn on_enter<F>(&self, entity: H::Entity, callback: F) -> ZoneResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.subscribe(entity, Transition::Enter, callback)
    }

    /// Subscribe to the entity leaving this zone.
    pub fn on_exit<F>(&self, entity: H::Entity, callback: F) -> ZoneResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.subscribe(entity, Transition::Exit, callback)
    }

    /// Whether `point` lies inside or on the sphere.
    #[must_use]
    pub fn is_point_in_zone(&self, point: Position) -> bool {
        self.shared.contains(point)
    }

    #[must_use]
    pub fn is_tracked(&self, entity: H::Entity) -> bool {
        self.shared.is_tracked(entity)
    }

    /// Last evaluated containment, or `None` if the entity is not tracked.
    #[must_use]
    pub fn is_in_zone(&self, entity: H::Entity) -> Option<bool> {
        self.shared.is_in_zone(entity)
    }

    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.shared.state.lock().tracked.len()
    }

    /// Snapshot of the tracked entities, in no particular order.
    #[must_use]
    pub fn tracked_entities(&self) -> Vec<H::Entity> {
        self.shared.state.lock().tracked.keys().copied().collect()
    }

    /// Stop evaluating, disconnect every subscriber, and release all state.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        // Cancel first so no evaluation can start mid-teardown.
        if let Some(handle) = self.tick_handle.take() {
            self.ticks.cancel(handle);
        }
        if self.shared.shut_down() {
            tracing::debug!(zone = %self.shared.name, "zone destroyed");
        }
    }
}

impl<H: EntitySystem> Drop for Zone<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<H: EntitySystem> core::fmt::Debug for Zone<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.shared.name)
            .field("position", &self.shared.position)
            .field("radius", &self.shared.radius)
            .field("tracked", &self.tracked_count())
            .finish_non_exhaustive()
    }
}

/// Weak reference to a [`Zone`].
///
/// Safe to capture in enter/exit callbacks: it does not keep the zone alive, and
/// every operation fails with [`ZoneError::Destroyed`] (or is a no-op) once the
/// zone is gone.
pub struct ZoneHandle<H: EntitySystem> {
    name: Arc<str>,
    shared: Weak<ZoneShared<H>>,
}

impl<H: EntitySystem> ZoneHandle<H> {
    fn upgrade(&self) -> ZoneResult<Arc<ZoneShared<H>>> {
        self.shared.upgrade().ok_or_else(|| ZoneError::Destroyed {
            zone: self.name.to_string(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the zone still exists and has not been torn down.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.state.lock().live)
    }

    /// See [`Zone::track`].
    pub fn track(&self, entity: H::Entity) -> ZoneResult<bool> {
        self.upgrade()?.track(entity, Accessor::Body)
    }

    /// See [`Zone::track_camera`].
    pub fn track_camera(&self, entity: H::Entity) -> ZoneResult<bool> {
        self.upgrade()?.track(entity, Accessor::Viewpoint)
    }

    /// See [`Zone::untrack`].
    pub fn untrack(&self, entity: H::Entity) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.untrack(entity))
    }

    /// See [`Zone::on_enter`].
    pub fn on_enter<F>(&self, entity: H::Entity, callback: F) -> ZoneResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.upgrade()?.subscribe(entity, Transition::Enter, callback)
    }

    /// See [`Zone::on_exit`].
    pub fn on_exit<F>(&self, entity: H::Entity, callback: F) -> ZoneResult<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.upgrade()?.subscribe(entity, Transition::Exit, callback)
    }

    /// See [`Zone::is_tracked`].
    #[must_use]
    pub fn is_tracked(&self, entity: H::Entity) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.is_tracked(entity))
    }

    /// See [`Zone::is_in_zone`].
    #[must_use]
    pub fn is_in_zone(&self, entity: H::Entity) -> Option<bool> {
        self.shared.upgrade()?.is_in_zone(entity)
    }
}

impl<H: EntitySystem> Clone for ZoneHandle<H> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<H: EntitySystem> core::fmt::Debug for ZoneHandle<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ZoneHandle")
            .field("name", &self.name)
            .field("live", &self.is_live())
            .finish()
    }
}
