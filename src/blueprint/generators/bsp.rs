use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::{LayerRng, Result};
use crate::grid::{CellSet, in_bounds};
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Cells kept clear along every map edge
const BORDER: i32 = 2;

/// Rooms in binary space partition leaves, joined by L-shaped corridors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BspDungeon {
    pub min_leaf_width: i32,
    pub min_leaf_height: i32,
    pub corridor_width: i32,
    #[serde(default)]
    pub only_rooms: bool,
    #[serde(default)]
    pub only_corridors: bool,
    /// Emit only the centre of a random room
    #[serde(default)]
    pub only_start: bool,
    /// Emit only the room centre farthest from the start room
    #[serde(default)]
    pub only_end: bool,
}

impl Default for BspDungeon {
    fn default() -> Self {
        Self {
            min_leaf_width: 10,
            min_leaf_height: 10,
            corridor_width: 1,
            only_rooms: false,
            only_corridors: false,
            only_start: false,
            only_end: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    min: IVec2,
    size: IVec2,
}

impl Rect {
    fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { min: IVec2::new(x, y), size: IVec2::new(w, h) }
    }

    fn center(&self) -> IVec2 {
        self.min + self.size / 2
    }

    fn cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (min, size) = (self.min, self.size);
        (0..size.x).flat_map(move |x| (0..size.y).map(move |y| min + IVec2::new(x, y)))
    }
}

struct Partition<'r> {
    min_size: IVec2,
    corridor_width: i32,
    rng: &'r mut LayerRng,
    rooms: Vec<Rect>,
    corridors: Vec<Rect>,
}

impl Partition<'_> {
    /// Split `leaf` until it is too small, returning the rooms created below it
    fn build(&mut self, leaf: Rect) -> Vec<usize> {
        let can_split_x = leaf.size.x >= 2 * self.min_size.x;
        let can_split_y = leaf.size.y >= 2 * self.min_size.y;
        let split_x = match (can_split_x, can_split_y) {
            (false, false) => return self.place_room(leaf).into_iter().collect(),
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                if leaf.size.x != leaf.size.y {
                    leaf.size.x > leaf.size.y
                } else {
                    self.rng.next_bool()
                }
            }
        };

        let (a, b) = if split_x {
            let cut = self.rng.next_int(self.min_size.x, leaf.size.x - self.min_size.x + 1);
            (
                Rect::new(leaf.min.x, leaf.min.y, cut, leaf.size.y),
                Rect::new(leaf.min.x + cut, leaf.min.y, leaf.size.x - cut, leaf.size.y),
            )
        } else {
            let cut = self.rng.next_int(self.min_size.y, leaf.size.y - self.min_size.y + 1);
            (
                Rect::new(leaf.min.x, leaf.min.y, leaf.size.x, cut),
                Rect::new(leaf.min.x, leaf.min.y + cut, leaf.size.x, leaf.size.y - cut),
            )
        };

        let left = self.build(a);
        let right = self.build(b);
        if let (Some(l), Some(r)) = (self.pick(&left), self.pick(&right)) {
            let (from, to) = (self.rooms[l].center(), self.rooms[r].center());
            self.connect(from, to);
        }
        left.into_iter().chain(right).collect()
    }

    fn pick(&mut self, rooms: &[usize]) -> Option<usize> {
        if rooms.is_empty() {
            None
        } else {
            Some(rooms[self.rng.next_index(rooms.len())])
        }
    }

    fn place_room(&mut self, leaf: Rect) -> Option<usize> {
        if leaf.size.x < 4 || leaf.size.y < 4 {
            return None;
        }
        let w = self.rng.next_int((leaf.size.x / 2).max(2), leaf.size.x - 1);
        let h = self.rng.next_int((leaf.size.y / 2).max(2), leaf.size.y - 1);
        let x = leaf.min.x + self.rng.next_int(1, leaf.size.x - w);
        let y = leaf.min.y + self.rng.next_int(1, leaf.size.y - h);
        self.rooms.push(Rect::new(x, y, w, h));
        Some(self.rooms.len() - 1)
    }

    /// Horizontal leg then vertical leg, `corridor_width` thick
    fn connect(&mut self, from: IVec2, to: IVec2) {
        let cw = self.corridor_width.max(1);
        let corner = if self.rng.next_bool() {
            IVec2::new(to.x, from.y)
        } else {
            IVec2::new(from.x, to.y)
        };
        for (a, b) in [(from, corner), (corner, to)] {
            let min = a.min(b);
            let max = a.max(b);
            self.corridors.push(Rect::new(min.x, min.y, max.x - min.x + cw, max.y - min.y + cw));
        }
    }
}

impl BlueprintModifier for BspDungeon {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let (width, height) = (ctx.width, ctx.height);
        let mut partition = Partition {
            min_size: IVec2::new(self.min_leaf_width.max(4), self.min_leaf_height.max(4)),
            corridor_width: self.corridor_width,
            rng: &mut ctx.rng,
            rooms: Vec::new(),
            corridors: Vec::new(),
        };
        partition.build(Rect::new(0, 0, width, height));

        let inside = |p: &IVec2| {
            in_bounds(*p, width, height)
                && p.x >= BORDER
                && p.y >= BORDER
                && p.x < width - BORDER
                && p.y < height - BORDER
        };

        let mut out = cells.clone();
        if self.only_start || self.only_end {
            if partition.rooms.is_empty() {
                return Ok(out);
            }
            let start_room = partition.rng.next_index(partition.rooms.len());
            let start = partition.rooms[start_room].center();
            if self.only_start {
                out.add(start);
            } else {
                let end = partition
                    .rooms
                    .iter()
                    .map(|r| r.center())
                    .max_by_key(|c| (*c - start).length_squared())
                    .unwrap_or(start);
                out.add(end);
            }
            return Ok(out);
        }

        if !self.only_corridors {
            out.extend(partition.rooms.iter().flat_map(|r| r.cells()).filter(inside));
        }
        if !self.only_rooms {
            out.extend(partition.corridors.iter().flat_map(|r| r.cells()).filter(inside));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::modifiers::find_islands;

    fn run(dungeon: BspDungeon) -> CellSet {
        let mut ctx = ModifierContext::new(60, 60, LayerRng::new(31), &[]);
        dungeon.execute(&CellSet::new(), &mut ctx).unwrap()
    }

    #[test]
    fn test_border_is_clear() {
        let out = run(BspDungeon::default());
        assert!(!out.is_empty());
        assert!(out.iter().all(|c| c.x >= 2 && c.y >= 2 && c.x < 58 && c.y < 58));
    }

    #[test]
    fn test_rooms_and_corridors_connect() {
        let out = run(BspDungeon::default());
        assert_eq!(find_islands(&out, 60, 60).len(), 1);
    }

    #[test]
    fn test_output_modes() {
        let all = run(BspDungeon::default());
        let rooms = run(BspDungeon { only_rooms: true, ..Default::default() });
        let corridors = run(BspDungeon { only_corridors: true, ..Default::default() });
        assert!(rooms.len() < all.len());
        assert!(corridors.len() < all.len());
        assert!(rooms.iter().all(|c| all.contains(c)));
        let start = run(BspDungeon { only_start: true, ..Default::default() });
        assert_eq!(start.len(), 1);
    }
}
