//! Zone Core
//!
//! Spherical trigger zones that raise edge-triggered enter/exit signals for tracked
//! entities.
//!
//! # Architecture
//!
//! ```text
//! TickSource ──tick──▶ Zone ──query──▶ EntitySystem
//!                       │
//!                       └── TrackedEntity (per entity)
//!                             ├── on_enter: Signal
//!                             └── on_exit:  Signal
//! ```
//!
//! The host plugs in through two capabilities: a [`TickSource`](zone_tick::TickSource)
//! that drives evaluation, and an [`EntitySystem`] that answers position and
//! liveness queries. The zone itself never depends on a concrete engine.
//!
//! # Evaluation
//!
//! Once per tick, for every tracked entity:
//!
//! ```text
//! 1. Body entity no longer alive  → auto-untrack, no signal
//! 2. Read position (body or viewpoint accessor)
//! 3. inside = distance(position, center) <= radius
//! 4. inside changed               → fire on_enter / on_exit
//! ```
//!
//! Newly tracked entities start outside, so an entity tracked while already inside
//! fires `on_enter` on the next tick.

#![allow(clippy::redundant_pub_crate)]

mod config;
mod error;
mod host;
mod position;
mod tracked;
mod zone;

pub use config::ZoneConfig;
pub use error::{ZoneError, ZoneResult};
pub use host::EntitySystem;
pub use position::Position;
pub use tracked::{Accessor, Transition};
pub use zone::{Zone, ZoneHandle};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Accessor, EntitySystem, Position, Transition, Zone, ZoneConfig, ZoneError, ZoneHandle,
        ZoneResult,
    };
    pub use zone_signal::Subscription;
    pub use zone_tick::{Heartbeat, TickSource};
}
