//! Uniform-grid broad-phase
//!
//! Buckets entity ids by the cells their boxes touch. Queries return a
//! conservative candidate set; exact tests still decide contact. The grid holds
//! no history and is cleared and refilled every tick.

use std::collections::{HashMap, HashSet};

use super::entity::EntityId;

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<EntityId>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "grid cell size must be positive");
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add `id` to every cell the box touches
    pub fn insert(&mut self, id: EntityId, x: f32, y: f32, w: f32, h: f32) {
        let (ix0, iy0, ix1, iy1) = self.cell_span(x, y, w, h);
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                self.cells.entry((ix, iy)).or_default().push(id);
            }
        }
    }

    /// Ids in every cell the box touches, de-duplicated, in first-seen order
    pub fn query(&self, x: f32, y: f32, w: f32, h: f32) -> Vec<EntityId> {
        let (ix0, iy0, ix1, iy1) = self.cell_span(x, y, w, h);
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                if let Some(ids) = self.cells.get(&(ix, iy)) {
                    for &id in ids {
                        if seen.insert(id) {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    fn cell_span(&self, x: f32, y: f32, w: f32, h: f32) -> (i32, i32, i32, i32) {
        let cs = self.cell_size;
        (
            (x / cs).floor() as i32,
            (y / cs).floor() as i32,
            ((x + w) / cs).floor() as i32,
            ((y + h) / cs).floor() as i32,
        )
    }
}
