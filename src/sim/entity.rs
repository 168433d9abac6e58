//! Entity model
//!
//! Entities are plain tagged records. Everything a variant needs to remember
//! between ticks (facing, climbing, animation state) is a field on its
//! [`EntityKind`] so it can be inspected and serialized. Behavior lives in free
//! functions dispatched on the variant.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::input::{Control, InputState};
use crate::tuning::Tuning;

/// Unique entity identifier, never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monotonic id source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Id the next allocation will return
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

/// Closed set of entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Actor,
    Boss,
    /// Rolling hazard (barrel)
    Hazard,
    Fireball,
    Item,
    Platform,
    Ladder,
    LadderGate,
    Rivet,
}

impl EntityType {
    /// Participates in the collision pass against platforms
    pub fn is_dynamic(self) -> bool {
        matches!(self, EntityType::Actor | EntityType::Hazard)
    }
}

/// Horizontal facing, never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

impl TryFrom<i8> for Facing {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Facing::Left),
            1 => Ok(Facing::Right),
            other => Err(format!("direction must be 1 or -1, got {other}")),
        }
    }
}

impl From<Facing> for i8 {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Actor animation/behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorState {
    #[default]
    Idle,
    Running,
    Rising,
    Falling,
    Climbing,
    Attacking,
    Dead,
}

/// Position, velocity and footprint of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: Vec2,
    /// Received an upward push-out from a platform this tick
    pub grounded: bool,
}

impl Transform {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: Vec2::new(w, h),
            grounded: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Variant tag plus the variant's private state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Actor { state: ActorState, climbing: bool },
    Boss,
    Hazard { facing: Facing },
    Fireball,
    Item,
    Platform,
    Ladder,
    LadderGate { center_x: i32 },
    Rivet,
}

impl EntityKind {
    pub fn tag(&self) -> EntityType {
        match self {
            EntityKind::Actor { .. } => EntityType::Actor,
            EntityKind::Boss => EntityType::Boss,
            EntityKind::Hazard { .. } => EntityType::Hazard,
            EntityKind::Fireball => EntityType::Fireball,
            EntityKind::Item => EntityType::Item,
            EntityKind::Platform => EntityType::Platform,
            EntityKind::Ladder => EntityType::Ladder,
            EntityKind::LadderGate { .. } => EntityType::LadderGate,
            EntityKind::Rivet => EntityType::Rivet,
        }
    }
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub transform: Transform,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, transform: Transform) -> Self {
        Self { id, kind, transform }
    }

    #[inline]
    pub fn tag(&self) -> EntityType {
        self.kind.tag()
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.transform.aabb()
    }

    /// Actor state, if this is the actor
    pub fn actor_state(&self) -> Option<ActorState> {
        match self.kind {
            EntityKind::Actor { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self.kind, EntityKind::Actor { climbing: true, .. })
    }

    /// Hazard facing, if this is a rolling hazard
    pub fn facing(&self) -> Option<Facing> {
        match self.kind {
            EntityKind::Hazard { facing } => Some(facing),
            _ => None,
        }
    }
}

/// Response to a resolved contact; receives the push-out normal
pub type CollisionHandler = fn(&mut Entity, Vec2);

/// Collision response for a type, if it has one
pub fn collision_handler(tag: EntityType) -> Option<CollisionHandler> {
    match tag {
        EntityType::Hazard => Some(reverse_on_wall),
        _ => None,
    }
}

fn reverse_on_wall(entity: &mut Entity, normal: Vec2) {
    if normal.x == 0.0 {
        return;
    }
    if let EntityKind::Hazard { facing } = &mut entity.kind {
        *facing = facing.flipped();
    }
}

/// Advance one entity by one fixed step
pub fn update(entity: &mut Entity, input: &InputState, tuning: &Tuning, dt: f32) {
    let transform = &mut entity.transform;
    match &mut entity.kind {
        EntityKind::Actor { state, climbing } => {
            update_actor(state, *climbing, transform, input, tuning, dt)
        }
        EntityKind::Hazard { facing } => update_hazard(*facing, transform, tuning, dt),
        EntityKind::Fireball => transform.pos += transform.vel * dt,
        EntityKind::Boss
        | EntityKind::Item
        | EntityKind::Platform
        | EntityKind::Ladder
        | EntityKind::LadderGate { .. }
        | EntityKind::Rivet => {}
    }
}

fn update_actor(
    state: &mut ActorState,
    climbing: bool,
    t: &mut Transform,
    input: &InputState,
    tuning: &Tuning,
    dt: f32,
) {
    let left = input.is_down(&[Control::Left]);
    let right = input.is_down(&[Control::Right]);
    let up = input.is_down(&[Control::Up]);
    let down = input.is_down(&[Control::Down]);
    let jump = input.is_down(&[Control::Jump]);

    // Horizontal movement (none while on a ladder)
    t.vel.x = if climbing {
        0.0
    } else {
        axis(left, right) * tuning.run_speed
    };

    if climbing {
        t.vel.y = axis(up, down) * tuning.climb_speed;
    } else {
        t.vel.y += tuning.gravity * dt;
        if jump && t.grounded {
            t.vel.y = tuning.jump_velocity;
            t.grounded = false;
            *state = ActorState::Rising;
        }
    }

    // Integrate; the collision pass corrects afterwards
    t.pos += t.vel * dt;

    if climbing {
        *state = ActorState::Climbing;
    } else if !t.grounded && t.vel.y > 0.0 {
        *state = ActorState::Falling;
    } else if t.vel.x != 0.0 {
        *state = ActorState::Running;
    } else if t.grounded {
        *state = ActorState::Idle;
    }
}

fn update_hazard(facing: Facing, t: &mut Transform, tuning: &Tuning, dt: f32) {
    if !t.grounded {
        t.vel.y += tuning.gravity * dt;
    }
    t.vel.x = facing.sign() * tuning.roll_speed;
    t.pos += t.vel * dt;
}

/// -1, 0 or +1 from a pair of opposing controls
#[inline]
fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
