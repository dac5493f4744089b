use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

const DIRECTIONS: [IVec2; 4] = [
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
];

/// Depth-first maze over the map, unioned into the cell set.
///
/// Corridors advance `2 + corridor_width` cells per carve. With either
/// `only_start` or `only_end` set, just those cells are emitted; the end is
/// the corridor cell farthest from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    pub corridor_width: i32,
    #[serde(default)]
    pub only_start: bool,
    #[serde(default)]
    pub only_end: bool,
}

impl Default for Maze {
    fn default() -> Self {
        Self { corridor_width: 1, only_start: false, only_end: false }
    }
}

struct Frame {
    cell: IVec2,
    directions: [IVec2; 4],
    next: usize,
}

impl BlueprintModifier for Maze {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let (width, height) = (ctx.width, ctx.height);
        if width < 2 || height < 2 {
            return Ok(cells.clone());
        }
        let step = 2 + self.corridor_width.max(0);
        let start = IVec2::new(ctx.rng.next_int(0, width - 1), ctx.rng.next_int(0, height - 1));

        let mut maze = CellSet::new();
        maze.add(start);
        let mut shuffled = DIRECTIONS;
        ctx.rng.shuffle(&mut shuffled);
        let mut stack = vec![Frame { cell: start, directions: shuffled, next: 0 }];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.directions.len() {
                stack.pop();
                continue;
            }
            let dir = frame.directions[frame.next];
            frame.next += 1;
            let cell = frame.cell;
            let target = cell + dir * step;
            let blocked = match (dir.x, dir.y) {
                (-1, _) => target.x <= 1,
                (1, _) => target.x >= width - 1,
                (_, 1) => target.y >= height - 1,
                _ => target.y <= 1,
            };
            if blocked || maze.contains(target) {
                continue;
            }
            for b in 1..=step {
                maze.add(cell + dir * b);
            }
            let mut directions = DIRECTIONS;
            ctx.rng.shuffle(&mut directions);
            stack.push(Frame { cell: target, directions, next: 0 });
        }

        let mut out = cells.clone();
        if self.only_start || self.only_end {
            if self.only_start {
                out.add(start);
            }
            if self.only_end {
                out.add(farthest_from(&maze, start));
            }
        } else {
            out.union_with(&maze);
        }
        Ok(out)
    }
}

fn farthest_from(cells: &CellSet, origin: IVec2) -> IVec2 {
    cells
        .sorted()
        .into_iter()
        .fold((origin, 0), |(best, best_d), c| {
            let d = (c - origin).length_squared();
            if d > best_d { (c, d) } else { (best, best_d) }
        })
        .0
}
