//! Zone Sim
//!
//! A small in-memory entity world that implements [`zone_core::EntitySystem`].
//! Used by the demo binary and the integration tests; real hosts implement the
//! trait over their own transform system instead.

#![allow(clippy::redundant_pub_crate)]

mod entity;
mod world;

pub use entity::{Entity, Generation};
pub use world::{Kind, SimWorld};
