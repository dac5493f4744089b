use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Replaces the cell set with blue-noise points at least `radius` apart.
///
/// Bridson sampling seeded at the map centre; accepted points are rounded
/// to cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoissonDisc {
    pub radius: f32,
    pub samples_before_rejection: u32,
}

impl Default for PoissonDisc {
    fn default() -> Self {
        Self { radius: 1.0, samples_before_rejection: 30 }
    }
}

struct SampleGrid {
    cell_size: f32,
    cols: i32,
    rows: i32,
    slots: Vec<Option<Vec2>>,
}

impl SampleGrid {
    fn new(width: f32, height: f32, radius: f32) -> Self {
        let cell_size = radius / std::f32::consts::SQRT_2;
        let cols = (width / cell_size).ceil().max(1.0) as i32;
        let rows = (height / cell_size).ceil().max(1.0) as i32;
        Self { cell_size, cols, rows, slots: vec![None; (cols * rows) as usize] }
    }

    fn slot_of(&self, p: Vec2) -> IVec2 {
        IVec2::new(
            ((p.x / self.cell_size) as i32).clamp(0, self.cols - 1),
            ((p.y / self.cell_size) as i32).clamp(0, self.rows - 1),
        )
    }

    fn insert(&mut self, p: Vec2) {
        let s = self.slot_of(p);
        self.slots[(s.y * self.cols + s.x) as usize] = Some(p);
    }

    fn is_far_enough(&self, p: Vec2, radius: f32) -> bool {
        let s = self.slot_of(p);
        for y in (s.y - 2).max(0)..=(s.y + 2).min(self.rows - 1) {
            for x in (s.x - 2).max(0)..=(s.x + 2).min(self.cols - 1) {
                if let Some(q) = self.slots[(y * self.cols + x) as usize] {
                    if q.distance(p) < radius {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl BlueprintModifier for PoissonDisc {
    fn execute(&self, _cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = CellSet::new();
        if ctx.width <= 0 || ctx.height <= 0 || self.radius <= 0.0 {
            return Ok(out);
        }
        let (w, h) = (ctx.width as f32, ctx.height as f32);
        let mut grid = SampleGrid::new(w, h, self.radius);

        let first = Vec2::new(w / 2.0, h / 2.0);
        grid.insert(first);
        let mut active = vec![first];
        let mut points = vec![first];

        while !active.is_empty() {
            let index = ctx.rng.next_index(active.len());
            let center = active[index];
            let mut accepted = false;
            for _ in 0..self.samples_before_rejection {
                let candidate = center + ctx.rng.unit_direction2() * ctx.rng.next_float(self.radius, 2.0 * self.radius);
                let inside = candidate.x >= 0.0 && candidate.y >= 0.0 && candidate.x < w && candidate.y < h;
                if inside && grid.is_far_enough(candidate, self.radius) {
                    grid.insert(candidate);
                    active.push(candidate);
                    points.push(candidate);
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                active.swap_remove(index);
            }
        }

        for p in points {
            let cell = p.round().as_ivec2();
            if ctx.in_bounds(cell) {
                out.add(cell);
            }
        }
        Ok(out)
    }
}
