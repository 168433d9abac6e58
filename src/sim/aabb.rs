//! Axis-aligned box geometry
//!
//! Screen-space convention: `pos` is the top-left corner and y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::stage::{LadderGate, Rect};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height (strictly positive)
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w > 0.0 && h > 0.0, "degenerate box {w}x{h}");
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Strict overlap: boxes sharing only an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    /// Inclusive point containment
    pub fn contains_point(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Smallest box enclosing both
    pub fn union(&self, other: &Aabb) -> Aabb {
        let min = self.min().min(other.min());
        let max = self.max().max(other.max());
        Aabb {
            pos: min,
            size: max - min,
        }
    }

    /// Grow toward the sign of `delta` on each axis (a box swept by `delta`)
    pub fn expand(&self, delta: Vec2) -> Aabb {
        let pos = Vec2::new(
            if delta.x < 0.0 { self.pos.x + delta.x } else { self.pos.x },
            if delta.y < 0.0 { self.pos.y + delta.y } else { self.pos.y },
        );
        Aabb {
            pos,
            size: self.size + delta.abs(),
        }
    }

    /// Grow by `margin` on every side
    pub fn inflate(&self, margin: Vec2) -> Aabb {
        Aabb {
            pos: self.pos - margin,
            size: self.size + margin * 2.0,
        }
    }
}

impl From<Rect> for Aabb {
    fn from(r: Rect) -> Self {
        Aabb::new(r.x, r.y, r.w, r.h)
    }
}

impl From<LadderGate> for Aabb {
    fn from(g: LadderGate) -> Self {
        Aabb::new(g.x, g.y, g.w, g.h)
    }
}
