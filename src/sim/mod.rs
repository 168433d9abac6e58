//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Input arrives as a value, never read from a device
//! - Stable iteration order (arena order, platforms in stage order)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod rng;
pub mod spawn;
pub mod tick;
pub mod world;

pub use aabb::Aabb;
pub use collision::{CollisionResult, resolve};
pub use entity::{
    ActorState, CollisionHandler, Entity, EntityId, EntityKind, EntityType, Facing, IdAllocator,
    Transform, collision_handler, update,
};
pub use grid::SpatialGrid;
pub use rng::SequenceGenerator;
pub use spawn::{Partition, spawn_stage_entities};
pub use tick::{TickOutcome, tick};
pub use world::World;
