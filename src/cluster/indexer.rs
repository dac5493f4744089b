//! Cluster key computation.

use glam::IVec2;

use crate::core::TilePos;

/// Row stride of a packed cluster key
pub const CLUSTER_Y_MULTIPLIER: i32 = 1000;

/// Cells per cluster edge when nothing else is configured
pub const DEFAULT_CLUSTER_SIZE: i32 = 5;

/// Maps cells and tiles to packed cluster keys `cx + 1000 * cy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterIndexer {
    cluster_size: i32,
}

impl ClusterIndexer {
    pub fn new(cluster_size: i32) -> Self {
        Self { cluster_size: cluster_size.max(1) }
    }

    pub fn cluster_size(&self) -> i32 {
        self.cluster_size
    }

    /// Key of the cluster containing `cell`
    pub fn key_of_cell(&self, cell: IVec2) -> i32 {
        Self::pack(cell.x.div_euclid(self.cluster_size), cell.y.div_euclid(self.cluster_size))
    }

    /// Key of a tile, taken at `pos + 0.5` so dual tiles fall with their upper-right cell
    pub fn key_of_tile(&self, tile: TilePos) -> i32 {
        let h = tile.half_units() + IVec2::ONE;
        let span = 2 * self.cluster_size;
        Self::pack(h.x.div_euclid(span), h.y.div_euclid(span))
    }

    /// The key itself followed by its eight surrounding cluster keys
    pub fn neighbor_clusters(key: i32) -> [i32; 9] {
        let m = CLUSTER_Y_MULTIPLIER;
        [
            key,
            key + 1,
            key - 1,
            key + m,
            key - m,
            key + 1 + m,
            key - 1 + m,
            key + 1 - m,
            key - 1 - m,
        ]
    }

    fn pack(cx: i32, cy: i32) -> i32 {
        cx + CLUSTER_Y_MULTIPLIER * cy
    }
}

impl Default for ClusterIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_SIZE)
    }
}
