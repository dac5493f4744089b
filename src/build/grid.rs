//! Cluster-partitioned storage of tracked cells and resolved tiles.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterIndexer, DirtyClusters};
use crate::core::TilePos;
use crate::grid::CellSet;

use super::TileData;

/// Outcome of diffing a source cell set against the tracked cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridDiff {
    pub added: Vec<IVec2>,
    pub removed: Vec<IVec2>,
    /// Sorted keys of clusters whose contents must be rebuilt
    pub dirty_clusters: Vec<i32>,
    /// Cells to regenerate: the added cells, then every other tracked cell
    /// of a dirty cluster
    pub working: Vec<IVec2>,
}

impl GridDiff {
    pub fn is_empty(&self) -> bool {
        self.working.is_empty() && self.removed.is_empty() && self.dirty_clusters.is_empty()
    }
}

/// `world_grid` and `tile_grid` of a build layer, both keyed by cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterGrid {
    indexer: ClusterIndexer,
    world: HashMap<i32, HashSet<IVec2>>,
    tiles: HashMap<i32, HashMap<TilePos, TileData>>,
}

impl ClusterGrid {
    pub fn new(indexer: ClusterIndexer) -> Self {
        Self {
            indexer,
            world: HashMap::new(),
            tiles: HashMap::new(),
        }
    }

    pub fn indexer(&self) -> ClusterIndexer {
        self.indexer
    }

    pub fn contains_cell(&self, cell: IVec2) -> bool {
        self.world
            .get(&self.indexer.key_of_cell(cell))
            .is_some_and(|cells| cells.contains(&cell))
    }

    pub fn tracked_count(&self) -> usize {
        self.world.values().map(HashSet::len).sum()
    }

    /// Tracked cells in (y, x) order
    pub fn tracked_cells(&self) -> Vec<IVec2> {
        let mut cells: Vec<IVec2> = self.world.values().flatten().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    /// Occupied clusters in key order
    pub fn cluster_keys(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self
            .world
            .iter()
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.values().map(HashMap::len).sum()
    }

    pub fn tile_at(&self, pos: TilePos) -> Option<&TileData> {
        self.tiles.get(&self.indexer.key_of_tile(pos))?.get(&pos)
    }

    /// All tiles in tile position order
    pub fn tiles(&self) -> Vec<TileData> {
        let mut tiles: Vec<TileData> = self.tiles.values().flat_map(|m| m.values().copied()).collect();
        tiles.sort_by_key(|t| t.tile_position);
        tiles
    }

    /// Bring the tracked cells in line with `source`.
    ///
    /// Every added or removed cell, and every cell in `extra_edits`, marks
    /// its cluster and the eight around it dirty.
    pub fn diff(&mut self, source: &CellSet, extra_edits: &[IVec2]) -> GridDiff {
        let removed: Vec<IVec2> = self
            .tracked_cells()
            .into_iter()
            .filter(|c| !source.contains(*c))
            .collect();
        for cell in &removed {
            let key = self.indexer.key_of_cell(*cell);
            if let Some(cells) = self.world.get_mut(&key) {
                cells.remove(cell);
                if cells.is_empty() {
                    self.world.remove(&key);
                }
            }
        }

        let added: Vec<IVec2> = source.sorted().into_iter().filter(|c| !self.contains_cell(*c)).collect();
        for cell in &added {
            self.world.entry(self.indexer.key_of_cell(*cell)).or_default().insert(*cell);
        }

        let mut dirty = DirtyClusters::new();
        for cell in added.iter().chain(&removed).chain(extra_edits) {
            dirty.mark_cell_edited(&self.indexer, *cell);
        }
        let dirty_clusters = dirty.take_dirty();

        let added_set: HashSet<IVec2> = added.iter().copied().collect();
        let mut working = added.clone();
        for key in &dirty_clusters {
            if let Some(cells) = self.world.get(key) {
                let mut rest: Vec<IVec2> = cells.iter().filter(|c| !added_set.contains(c)).copied().collect();
                rest.sort_by_key(|c| (c.y, c.x));
                working.extend(rest);
            }
        }

        GridDiff {
            added,
            removed,
            dirty_clusters,
            working,
        }
    }

    /// Drop the tiles owned by removed and regenerated cells, then store
    /// `tiles`.
    ///
    /// A position still held by a tile of an untouched cell keeps that
    /// tile. Returns the tiles actually stored.
    pub fn commit(&mut self, diff: &GridDiff, tiles: Vec<TileData>) -> Vec<TileData> {
        let stale: HashSet<IVec2> = diff.removed.iter().chain(&diff.working).copied().collect();
        for grid in self.tiles.values_mut() {
            grid.retain(|_, t| !stale.contains(&t.world_position));
        }
        self.tiles.retain(|_, grid| !grid.is_empty());

        let mut stored = Vec::with_capacity(tiles.len());
        for tile in tiles {
            let cluster = self.tiles.entry(self.indexer.key_of_tile(tile.tile_position)).or_default();
            if let Entry::Vacant(slot) = cluster.entry(tile.tile_position) {
                slot.insert(tile);
                stored.push(tile);
            }
        }
        stored
    }

    /// Flatten to lists for persistence
    pub fn to_data(&self) -> ClusterGridData {
        ClusterGridData {
            cluster_size: self.indexer.cluster_size(),
            world_positions: self.tracked_cells(),
            tiles: self.tiles(),
        }
    }

    /// Rebuild from lists, dropping duplicates
    pub fn from_data(data: ClusterGridData) -> Self {
        let mut grid = Self::new(ClusterIndexer::new(data.cluster_size));
        for cell in data.world_positions {
            grid.world.entry(grid.indexer.key_of_cell(cell)).or_default().insert(cell);
        }
        for tile in data.tiles {
            grid.tiles
                .entry(grid.indexer.key_of_tile(tile.tile_position))
                .or_default()
                .entry(tile.tile_position)
                .or_insert(tile);
        }
        grid
    }
}

/// Serialized form of a [`ClusterGrid`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterGridData {
    pub cluster_size: i32,
    #[serde(default)]
    pub world_positions: Vec<IVec2>,
    #[serde(default)]
    pub tiles: Vec<TileData>,
}

impl Serialize for ClusterGrid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_data().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClusterGrid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        ClusterGridData::deserialize(deserializer).map(Self::from_data)
    }
}
