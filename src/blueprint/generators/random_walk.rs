use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::{LayerRng, Result};
use crate::grid::{CellSet, in_bounds};
use crate::blueprint::{BlueprintModifier, ModifierContext};

const CARDINALS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Corridors walked in straight runs, with random-walk rooms at some
/// corridor joints and at every dead end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomWalkDungeon {
    pub random_start_position: bool,
    pub start_position: IVec2,
    /// Walks per room
    pub iterations: u32,
    pub walk_length: u32,
    pub start_randomly_each_iteration: bool,
    pub corridor_length: u32,
    pub corridor_count: u32,
    /// Share of corridor joints that get a room, 0.1 to 1
    pub room_percent: f32,
}

impl Default for RandomWalkDungeon {
    fn default() -> Self {
        Self {
            random_start_position: false,
            start_position: IVec2::ZERO,
            iterations: 10,
            walk_length: 10,
            start_randomly_each_iteration: true,
            corridor_length: 14,
            corridor_count: 5,
            room_percent: 0.8,
        }
    }
}

/// Insertion-ordered set, so random picks by index stay reproducible
#[derive(Default)]
struct OrderedCells {
    order: Vec<IVec2>,
    set: CellSet,
}

impl OrderedCells {
    fn add(&mut self, p: IVec2) {
        if self.set.add(p) {
            self.order.push(p);
        }
    }

    fn extend(&mut self, cells: impl IntoIterator<Item = IVec2>) {
        for c in cells {
            self.add(c);
        }
    }
}

struct Walker<'r> {
    width: i32,
    height: i32,
    rng: &'r mut LayerRng,
}

impl Walker<'_> {
    fn direction(&mut self) -> IVec2 {
        CARDINALS[self.rng.next_index(CARDINALS.len())]
    }

    /// Straight run; steps leaving the map are dropped but the walker keeps going
    fn corridor(&mut self, start: IVec2, length: u32) -> Vec<IVec2> {
        let direction = self.direction();
        let mut current = start;
        let mut corridor = vec![start];
        for _ in 0..length {
            current += direction;
            if in_bounds(current, self.width, self.height) {
                corridor.push(current);
            }
        }
        corridor
    }

    fn simple_walk(&mut self, start: IVec2, length: u32) -> Vec<IVec2> {
        let mut path = vec![start];
        let mut previous = start;
        for _ in 0..length {
            let next = previous + self.direction();
            if in_bounds(next, self.width, self.height) {
                path.push(next);
                previous = next;
            }
        }
        path
    }

    fn room(&mut self, start: IVec2, iterations: u32, walk_length: u32, restart_randomly: bool) -> OrderedCells {
        let mut floor = OrderedCells::default();
        let mut current = start;
        for _ in 0..iterations {
            let path = self.simple_walk(current, walk_length);
            floor.extend(path);
            if restart_randomly {
                current = floor.order[self.rng.next_index(floor.order.len())];
            }
        }
        floor
    }
}

impl BlueprintModifier for RandomWalkDungeon {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let start = if self.random_start_position {
            IVec2::new(ctx.rng.next_int(0, ctx.width), ctx.rng.next_int(0, ctx.height))
        } else {
            self.start_position
        };
        let mut walker = Walker { width: ctx.width, height: ctx.height, rng: &mut ctx.rng };

        // Corridors
        let mut corridors = OrderedCells::default();
        let mut joints = OrderedCells::default();
        let mut current = start;
        joints.add(current);
        for _ in 0..self.corridor_count {
            let corridor = walker.corridor(current, self.corridor_length);
            if let Some(last) = corridor.last() {
                current = *last;
            }
            joints.add(current);
            corridors.extend(corridor);
        }

        // Rooms at a share of the joints
        let room_count = (joints.order.len() as f32 * self.room_percent).round() as usize;
        let mut candidates = joints.order.clone();
        walker.rng.shuffle(&mut candidates);
        let mut rooms = OrderedCells::default();
        for joint in candidates.into_iter().take(room_count) {
            let room = walker.room(joint, self.iterations, self.walk_length, self.start_randomly_each_iteration);
            rooms.extend(room.order);
        }

        // Rooms at dead ends
        let dead_ends: Vec<IVec2> = corridors
            .order
            .iter()
            .copied()
            .filter(|c| CARDINALS.iter().filter(|d| corridors.set.contains(*c + **d)).count() == 1)
            .collect();
        for dead_end in dead_ends {
            if !rooms.set.contains(dead_end) {
                let room = walker.room(dead_end, self.iterations, self.walk_length, self.start_randomly_each_iteration);
                rooms.extend(room.order);
            }
        }

        let mut out = cells.clone();
        out.union_with(&corridors.set);
        out.union_with(&rooms.set);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::modifiers::find_islands;

    #[test]
    fn test_dungeon_in_bounds_and_connected() {
        let mut ctx = ModifierContext::new(40, 40, LayerRng::new(4), &[]);
        let dungeon = RandomWalkDungeon { start_position: IVec2::new(20, 20), ..Default::default() };
        let out = dungeon.execute(&CellSet::new(), &mut ctx).unwrap();
        assert!(out.contains(IVec2::new(20, 20)));
        assert!(out.iter().all(|c| in_bounds(c, 40, 40)));
        assert_eq!(find_islands(&out, 40, 40).len(), 1);
    }

    #[test]
    fn test_dungeon_deterministic() {
        let run = || {
            let mut ctx = ModifierContext::new(30, 30, LayerRng::new(99), &[]);
            RandomWalkDungeon { random_start_position: true, ..Default::default() }
                .execute(&CellSet::new(), &mut ctx)
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
