//! Global world settings.

use serde::{Deserialize, Serialize};

use crate::build::ColliderType;
use crate::cluster::{ClusterIndexer, DEFAULT_CLUSTER_SIZE};
use crate::core::rng;

/// Map-wide generation settings shared by every layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Map width in cells
    pub width: i32,
    /// Map height in cells
    pub height: i32,
    /// World units per cell
    pub cell_size: f32,
    /// Cells per cluster edge
    pub cluster_cell_size: i32,
    /// Use `global_random_seed` instead of a fresh seed per run
    pub use_global_random_seed: bool,
    pub global_random_seed: u32,
    /// Seed of the current run, refreshed when the global seed is off
    pub current_random_seed: u32,
    /// Merge cluster contents into one mesh
    pub merge_tiles: bool,
    pub collider_type: ColliderType,
    /// Tile collider floor height above the layer height
    pub tile_collider_height: f32,
    pub tile_collider_extrusion_height: f32,
    pub invert_collision_walls: bool,
    /// Compute tiles with rayon instead of the chunked sequential job
    pub use_parallel: bool,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            cell_size: 1.0,
            cluster_cell_size: DEFAULT_CLUSTER_SIZE,
            use_global_random_seed: false,
            global_random_seed: 1,
            current_random_seed: 1,
            merge_tiles: true,
            collider_type: ColliderType::MeshCollider,
            tile_collider_height: 0.0,
            tile_collider_extrusion_height: 0.0,
            invert_collision_walls: false,
            use_parallel: true,
        }
    }
}

impl WorldSettings {
    /// Settings for a `width x height` map with a fixed seed
    pub fn with_seed(width: i32, height: i32, seed: u32) -> Self {
        Self {
            width,
            height,
            use_global_random_seed: true,
            global_random_seed: rng::non_zero(seed),
            ..Default::default()
        }
    }

    /// Seed used by placement decisions in this run
    pub fn effective_seed(&self) -> u32 {
        if self.use_global_random_seed {
            rng::non_zero(self.global_random_seed)
        } else {
            rng::non_zero(self.current_random_seed)
        }
    }

    /// Start a new run: pin the current seed to the global one, or draw a clock seed
    pub fn refresh_seed(&mut self) {
        if self.use_global_random_seed {
            self.global_random_seed = rng::non_zero(self.global_random_seed);
            self.current_random_seed = self.global_random_seed;
        } else {
            self.current_random_seed = rng::tick_seed();
        }
    }

    pub fn indexer(&self) -> ClusterIndexer {
        ClusterIndexer::new(self.cluster_cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = WorldSettings::default();
        assert_eq!((s.width, s.height), (50, 50));
        assert_eq!(s.cell_size, 1.0);
        assert_eq!(s.cluster_cell_size, 5);
        assert!(!s.use_global_random_seed);
        assert_eq!(s.global_random_seed, 1);
        assert!(s.merge_tiles);
        assert_eq!(s.collider_type, ColliderType::MeshCollider);
        assert!(s.use_parallel);
    }

    #[test]
    fn test_zero_global_seed_becomes_one() {
        let mut s = WorldSettings::with_seed(10, 10, 0);
        assert_eq!(s.effective_seed(), 1);
        s.global_random_seed = 0;
        s.refresh_seed();
        assert_eq!(s.global_random_seed, 1);
        assert_eq!(s.current_random_seed, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: WorldSettings = serde_json::from_str(r#"{"width": 8}"#).unwrap();
        assert_eq!(s.width, 8);
        assert_eq!(s.height, 50);
    }
}
