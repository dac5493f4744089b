use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::{CellSet, in_bounds};
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Islands at or below this size get no marker
const MIN_ISLAND_SIZE: usize = 5;

const PLUS_OFFSETS: [IVec2; 4] = [
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
];

/// 4-connected components of the in-bounds cells, scanned column by column
pub fn find_islands(cells: &CellSet, width: i32, height: i32) -> Vec<Vec<IVec2>> {
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    for x in 0..width {
        for y in 0..height {
            let start = IVec2::new(x, y);
            if !cells.contains(start) || visited.contains(&start) {
                continue;
            }
            let mut island = Vec::new();
            let mut stack = vec![start];
            while let Some(cell) = stack.pop() {
                if !visited.insert(cell) {
                    continue;
                }
                island.push(cell);
                for o in PLUS_OFFSETS {
                    let n = cell + o;
                    if in_bounds(n, width, height) && cells.contains(n) && !visited.contains(&n) {
                        stack.push(n);
                    }
                }
            }
            islands.push(island);
        }
    }
    islands
}

/// Replaces the cell set with one random cell per island larger than five cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindPositionOnIslands {}

impl BlueprintModifier for FindPositionOnIslands {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        if cells.is_empty() {
            return Ok(cells.clone());
        }
        let mut out = CellSet::new();
        for island in find_islands(cells, ctx.width, ctx.height) {
            if island.len() <= MIN_ISLAND_SIZE {
                continue;
            }
            let index = ctx.rng.next_int(0, island.len() as i32 - 1) as usize;
            out.add(island[index]);
        }
        Ok(out)
    }
}
