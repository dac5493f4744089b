use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::{LayerRng, Result};
use crate::grid::{CellSet, in_bounds};
use crate::blueprint::{BlueprintModifier, ModifierContext};
use crate::blueprint::modifiers::find_islands;

const PLUS_OFFSETS: [IVec2; 4] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
];

/// Cave-like regions from a smoothed random fill, unioned into the cell set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellularAutomata {
    pub fill_probability: f32,
    pub smoothing_steps: u32,
    /// Join separate caves with meandering tunnels
    pub ensure_connected: bool,
    /// Generate over the whole map; otherwise over `custom_size` at `position`
    pub use_map_size: bool,
    pub position: IVec2,
    pub custom_size: IVec2,
}

impl Default for CellularAutomata {
    fn default() -> Self {
        Self {
            fill_probability: 0.45,
            smoothing_steps: 5,
            ensure_connected: true,
            use_map_size: true,
            position: IVec2::ZERO,
            custom_size: IVec2::splat(5),
        }
    }
}

struct CaveMap {
    width: i32,
    height: i32,
    cells: CellSet,
}

impl CaveMap {
    fn random(width: i32, height: i32, fill: f32, rng: &mut LayerRng) -> Self {
        let mut cells = CellSet::new();
        for x in 0..width {
            for y in 0..height {
                if rng.next_unit() < fill {
                    cells.add(IVec2::new(x, y));
                }
            }
        }
        Self { width, height, cells }
    }

    fn neighbour_count(&self, p: IVec2) -> usize {
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p + IVec2::new(dx, dy);
                if in_bounds(n, self.width, self.height) && self.cells.contains(n) {
                    count += 1;
                }
            }
        }
        count
    }

    fn smooth(&mut self) {
        let mut next = CellSet::new();
        for x in 0..self.width {
            for y in 0..self.height {
                let p = IVec2::new(x, y);
                let alive = match self.neighbour_count(p) {
                    n if n > 4 => true,
                    n if n < 4 => false,
                    _ => self.cells.contains(p),
                };
                if alive {
                    next.add(p);
                }
            }
        }
        self.cells = next;
    }

    fn connect_islands(&mut self, rng: &mut LayerRng) {
        let islands = find_islands(&self.cells, self.width, self.height);
        let mut iter = islands.into_iter();
        let Some(mut main) = iter.next() else {
            return;
        };
        for island in iter {
            let start = main[rng.next_index(main.len())];
            let target = island[rng.next_index(island.len())];
            self.carve_path(start, target, rng);
            main.extend(island);
        }
    }

    /// Random walk that only accepts steps closing in on `target`
    fn carve_path(&mut self, start: IVec2, target: IVec2, rng: &mut LayerRng) {
        let max_steps = 64 * (self.width + self.height).max(1) as usize;
        let mut current = start;
        let mut steps = 0;
        while current.as_vec2().distance(target.as_vec2()) > 1.0 && steps < max_steps {
            self.cells.add(current);
            let moves: Vec<IVec2> = PLUS_OFFSETS
                .iter()
                .map(|o| current + *o)
                .filter(|n| in_bounds(*n, self.width, self.height))
                .collect();
            let next = moves[rng.next_index(moves.len())];
            if next.as_vec2().distance(target.as_vec2()) < current.as_vec2().distance(target.as_vec2()) {
                current = next;
            }
            steps += 1;
        }
        self.cells.add(current);
    }
}

impl BlueprintModifier for CellularAutomata {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let (width, height, offset) = if self.use_map_size {
            (ctx.width, ctx.height, IVec2::ZERO)
        } else {
            (self.custom_size.x, self.custom_size.y, self.position)
        };

        let mut map = CaveMap::random(width, height, self.fill_probability, &mut ctx.rng);
        for _ in 0..self.smoothing_steps {
            map.smooth();
        }
        if self.ensure_connected {
            map.connect_islands(&mut ctx.rng);
        }

        let mut out = cells.clone();
        out.extend(map.cells.iter().map(|c| c + offset));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_caves_form_one_island() {
        let mut ctx = ModifierContext::new(40, 40, LayerRng::new(21), &[]);
        let out = CellularAutomata::default().execute(&CellSet::new(), &mut ctx).unwrap();
        assert!(!out.is_empty());
        assert_eq!(find_islands(&out, 40, 40).len(), 1);
    }

    #[test]
    fn test_custom_size_offset() {
        let mut ctx = ModifierContext::new(100, 100, LayerRng::new(2), &[]);
        let ca = CellularAutomata {
            fill_probability: 1.0,
            smoothing_steps: 0,
            ensure_connected: false,
            use_map_size: false,
            position: IVec2::new(50, 60),
            custom_size: IVec2::new(4, 3),
            ..Default::default()
        };
        let out = ca.execute(&CellSet::new(), &mut ctx).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out.contains(IVec2::new(50, 60)));
        assert!(out.contains(IVec2::new(53, 62)));
    }
}
