//! Hash-set backed cell grid with bitmask neighbourhood encoding.
//!
//! Configuration masks set bit `i` when the i-th offset of the
//! neighbourhood table is occupied. The centre bit is always set.

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::Adjacency;

/// 3x3 neighbourhood in bit order: NW, N, NE, W, centre, E, SW, S, SE
pub const EIGHT_NEIGHBOURHOOD: [IVec2; 9] = [
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// Plus-shaped neighbourhood in bit order: N, W, centre, E, S
pub const FOUR_NEIGHBOURHOOD: [IVec2; 5] = [
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
];

/// Eight-direction configuration of a fully surrounded cell
pub const FULL_EIGHT_CONFIGURATION: u32 = 511;

/// Whether `pos` lies inside `0..width x 0..height`
pub fn in_bounds(pos: IVec2, width: i32, height: i32) -> bool {
    pos.x >= 0 && pos.y >= 0 && pos.x < width && pos.y < height
}

/// Set of occupied integer cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<IVec2>", into = "Vec<IVec2>")]
pub struct CellSet {
    cells: HashSet<IVec2>,
}

impl CellSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, returning true if it was not present
    pub fn add(&mut self, pos: IVec2) -> bool {
        self.cells.insert(pos)
    }

    /// Remove a cell, returning true if it was present
    pub fn remove(&mut self, pos: IVec2) -> bool {
        self.cells.remove(&pos)
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().copied()
    }

    /// Cells in ascending (y, x) order
    pub fn sorted(&self) -> Vec<IVec2> {
        let mut cells: Vec<IVec2> = self.cells.iter().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    pub fn union_with(&mut self, other: &CellSet) {
        self.cells.extend(other.cells.iter().copied());
    }

    pub fn subtract(&mut self, other: &CellSet) {
        self.cells.retain(|c| !other.cells.contains(c));
    }

    pub fn intersect_with(&mut self, other: &CellSet) {
        self.cells.retain(|c| other.cells.contains(c));
    }

    pub fn symmetric_difference_with(&mut self, other: &CellSet) {
        for c in other.iter() {
            if !self.cells.remove(&c) {
                self.cells.insert(c);
            }
        }
    }

    /// Occupancy of each neighbourhood offset, centre included
    pub fn neighbors(&self, pos: IVec2, adjacency: Adjacency) -> Vec<bool> {
        match adjacency {
            Adjacency::Four => FOUR_NEIGHBOURHOOD.iter().map(|o| self.contains(pos + *o)).collect(),
            Adjacency::Eight => EIGHT_NEIGHBOURHOOD.iter().map(|o| self.contains(pos + *o)).collect(),
        }
    }

    /// 9-bit configuration over [`EIGHT_NEIGHBOURHOOD`]
    pub fn configuration_eight(&self, pos: IVec2) -> u32 {
        EIGHT_NEIGHBOURHOOD
            .iter()
            .enumerate()
            .filter(|(i, o)| *i == 4 || self.contains(pos + **o))
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// 5-bit configuration over [`FOUR_NEIGHBOURHOOD`]
    pub fn configuration_four(&self, pos: IVec2) -> u32 {
        FOUR_NEIGHBOURHOOD
            .iter()
            .enumerate()
            .filter(|(i, o)| *i == 2 || self.contains(pos + **o))
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Dense occupancy map of `0..width x 0..height`, indexed `[x][y]`
    pub fn to_map(&self, width: i32, height: i32) -> Vec<Vec<bool>> {
        (0..width.max(0))
            .map(|x| (0..height.max(0)).map(|y| self.contains(IVec2::new(x, y))).collect())
            .collect()
    }

    /// Cells within `radius` (euclidean, inclusive) of `center`
    pub fn cells_in_radius(&self, center: IVec2, radius: f32) -> Vec<IVec2> {
        let r = radius.ceil() as i32;
        let r2 = radius * radius;
        let mut out = Vec::new();
        for y in -r..=r {
            for x in -r..=r {
                let p = center + IVec2::new(x, y);
                if ((x * x + y * y) as f32) <= r2 && self.contains(p) {
                    out.push(p);
                }
            }
        }
        out
    }
}

impl From<Vec<IVec2>> for CellSet {
    fn from(cells: Vec<IVec2>) -> Self {
        Self { cells: cells.into_iter().collect() }
    }
}

impl From<CellSet> for Vec<IVec2> {
    fn from(set: CellSet) -> Self {
        set.sorted()
    }
}

impl FromIterator<IVec2> for CellSet {
    fn from_iter<I: IntoIterator<Item = IVec2>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

impl Extend<IVec2> for CellSet {
    fn extend<I: IntoIterator<Item = IVec2>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block3() -> CellSet {
        (0..3).flat_map(|y| (0..3).map(move |x| IVec2::new(x, y))).collect()
    }

    #[test]
    fn test_add_remove_no_duplicates() {
        let mut set = CellSet::new();
        assert!(set.add(IVec2::new(1, 1)));
        assert!(!set.add(IVec2::new(1, 1)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(IVec2::new(1, 1)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_configuration_eight_of_block() {
        let set = block3();
        assert_eq!(set.len(), 9);
        assert_eq!(set.configuration_eight(IVec2::new(1, 1)), FULL_EIGHT_CONFIGURATION);
        assert_eq!(set.configuration_eight(IVec2::new(0, 0)), 54);
    }

    #[test]
    fn test_configuration_four() {
        let set = block3();
        assert_eq!(set.configuration_four(IVec2::new(1, 1)), 31);
        // bottom edge middle: N, W, centre, E
        assert_eq!(set.configuration_four(IVec2::new(1, 0)), 15);
    }

    #[test]
    fn test_neighbors_four() {
        let set = block3();
        let n = set.neighbors(IVec2::new(0, 0), Adjacency::Four);
        assert_eq!(n, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_to_map_and_radius() {
        let set = block3();
        let map = set.to_map(4, 4);
        assert!(map[2][2]);
        assert!(!map[3][0]);
        assert_eq!(set.cells_in_radius(IVec2::new(1, 1), 1.0).len(), 5);
    }

    #[test]
    fn test_serde_dedupes() {
        let set: CellSet = serde_json::from_str("[[1,2],[1,2],[3,4]]").unwrap();
        assert_eq!(set.len(), 2);
    }
}
