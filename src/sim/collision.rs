//! Collision detection and response for axis-aligned boxes
//!
//! Single-contact, minimum-penetration push-out. The caller applies it once per
//! (mover, solid) pair per tick; several contacts in one tick compose in the
//! order the caller visits the solids.

use glam::Vec2;

use super::aabb::Aabb;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether the boxes overlapped
    pub collided: bool,
    /// Unit normal on the resolved axis, pointing from the solid toward the mover
    pub normal: Vec2,
    /// Distance the mover was pushed
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            collided: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    #[inline]
    pub fn normal_x(&self) -> f32 {
        self.normal.x
    }

    #[inline]
    pub fn normal_y(&self) -> f32 {
        self.normal.y
    }
}

/// Push `mover` out of `solid` along the axis of least penetration
///
/// Penetration per axis is `(half-extent sum) - |center distance|`. The x axis
/// wins only when strictly shallower; ties resolve vertically. With coincident
/// centers on the resolved axis the mover is pushed toward negative.
pub fn resolve(mover: &mut Aabb, solid: &Aabb) -> CollisionResult {
    if !mover.intersects(solid) {
        return CollisionResult::miss();
    }

    let delta = mover.center() - solid.center();
    let penetration = (mover.half_extents() + solid.half_extents()) - delta.abs();

    if penetration.x < penetration.y {
        let sign = if delta.x > 0.0 { 1.0 } else { -1.0 };
        mover.pos.x += sign * penetration.x;
        CollisionResult {
            collided: true,
            normal: Vec2::new(sign, 0.0),
            penetration: penetration.x,
        }
    } else {
        let sign = if delta.y > 0.0 { 1.0 } else { -1.0 };
        mover.pos.y += sign * penetration.y;
        CollisionResult {
            collided: true,
            normal: Vec2::new(0.0, sign),
            penetration: penetration.y,
        }
    }
}
