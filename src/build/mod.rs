//! Build layers
//!
//! Build layers turn blueprint cells into render instructions. Both kinds
//! track the cells they were built from per cluster, so a re-execution
//! only rebuilds the clusters touched by a change:
//! - [`TilesBuildLayer`]: bitmask-resolved tiles on the normal or dual grid
//! - [`ObjectBuildLayer`]: weighted prefabs, one per cell

pub mod grid;
pub mod job;
pub mod mask;
pub mod mesh_settings;
pub mod objects;
pub mod selection;
pub mod tile_data;
pub mod tiles;

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::blueprint::BlueprintLayer;
use crate::core::{LayerId, Result, TilePos};
use crate::render::RenderInstruction;
use crate::tiles::TilePreset;
use crate::world::WorldSettings;

pub use grid::{ClusterGrid, GridDiff};
pub use job::{JobStatus, TileGenerationJob};
pub use mask::BuildLayerMask;
pub use mesh_settings::{ColliderType, MeshGenerationSettings};
pub use objects::{ChildSpawnSettings, ObjectBuildLayer, OrientationSettings, PrefabObject, RotationRange, ScaleRange};
pub use selection::TilePresetSelection;
pub use tile_data::TileData;
pub use tiles::{TileLayer, TilePresetOverride, TilesBuildLayer};

/// Read-only view of the configuration a build layer executes against.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub settings: &'a WorldSettings,
    pub blueprints: &'a [BlueprintLayer],
    pub presets: &'a BTreeMap<String, TilePreset>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        settings: &'a WorldSettings,
        blueprints: &'a [BlueprintLayer],
        presets: &'a BTreeMap<String, TilePreset>,
    ) -> Self {
        Self {
            settings,
            blueprints,
            presets,
        }
    }

    pub fn blueprint(&self, guid: &LayerId) -> Option<&'a BlueprintLayer> {
        self.blueprints.iter().find(|l| l.guid == *guid)
    }

    pub fn preset(&self, name: &str) -> Option<&'a TilePreset> {
        self.presets.get(name)
    }
}

/// Result of one build layer execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutcome {
    pub instructions: Vec<RenderInstruction>,
    /// Whether any cell was added, removed or re-dirtied
    pub changed: bool,
}

/// Any build layer of a configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildLayer {
    Tiles(TilesBuildLayer),
    Objects(ObjectBuildLayer),
}

impl BuildLayer {
    pub fn guid(&self) -> LayerId {
        match self {
            BuildLayer::Tiles(l) => l.guid,
            BuildLayer::Objects(l) => l.guid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BuildLayer::Tiles(l) => &l.name,
            BuildLayer::Objects(l) => &l.name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            BuildLayer::Tiles(l) => l.is_enabled,
            BuildLayer::Objects(l) => l.is_enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            BuildLayer::Tiles(l) => l.is_enabled = enabled,
            BuildLayer::Objects(l) => l.is_enabled = enabled,
        }
    }

    pub fn blueprint_layer(&self) -> Option<LayerId> {
        match self {
            BuildLayer::Tiles(l) => l.blueprint_layer,
            BuildLayer::Objects(l) => l.blueprint_layer,
        }
    }

    /// Blueprint layers whose changes must trigger a late re-execution
    pub fn override_layers(&self) -> Vec<LayerId> {
        match self {
            BuildLayer::Tiles(l) => l.override_layers(),
            BuildLayer::Objects(_) => Vec::new(),
        }
    }

    pub fn grid(&self) -> &ClusterGrid {
        match self {
            BuildLayer::Tiles(l) => l.grid(),
            BuildLayer::Objects(l) => l.grid(),
        }
    }

    fn grid_mut(&mut self) -> &mut ClusterGrid {
        match self {
            BuildLayer::Tiles(l) => l.grid_mut(),
            BuildLayer::Objects(l) => l.grid_mut(),
        }
    }

    /// Forget everything built so far.
    ///
    /// Returns a `DestroyCluster` for every cluster that held content.
    pub fn reset(&mut self, settings: &WorldSettings) -> Vec<RenderInstruction> {
        let layer = self.guid();
        let grid = self.grid_mut();
        let mut clusters: Vec<i32> = grid.cluster_keys();
        let indexer = grid.indexer();
        clusters.extend(grid.tiles().iter().map(|t| indexer.key_of_cell(t.world_position)));
        clusters.sort_unstable();
        clusters.dedup();
        *grid = ClusterGrid::new(settings.indexer());
        clusters
            .into_iter()
            .map(|cluster| RenderInstruction::DestroyCluster { layer, cluster })
            .collect()
    }

    pub fn execute(&mut self, ctx: &BuildContext<'_>) -> Result<BuildOutcome> {
        match self {
            BuildLayer::Tiles(l) => l.execute(ctx),
            BuildLayer::Objects(l) => l.execute(ctx),
        }
    }

    /// Tile at a world-space XZ position, divided by the cell size
    pub fn tile_data_at(&self, position: Vec2, cell_size: f32) -> Option<TileData> {
        let relative = position / cell_size;
        match self {
            BuildLayer::Tiles(l) => l.tile_at(relative).copied(),
            BuildLayer::Objects(l) => {
                let cell = relative.round().as_ivec2();
                l.grid().tile_at(TilePos::from_cell(cell)).copied()
            }
        }
    }
}

impl From<TilesBuildLayer> for BuildLayer {
    fn from(layer: TilesBuildLayer) -> Self {
        BuildLayer::Tiles(layer)
    }
}

impl From<ObjectBuildLayer> for BuildLayer {
    fn from(layer: ObjectBuildLayer) -> Self {
        BuildLayer::Objects(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_reset_destroys_built_clusters() {
        let settings = WorldSettings::with_seed(20, 20, 1);
        let mut ground = BlueprintLayer::new("ground");
        ground.add_cells([IVec2::new(1, 1), IVec2::new(12, 1)]);
        let presets = BTreeMap::new();
        let ctx = BuildContext::new(&settings, std::slice::from_ref(&ground), &presets);

        let mut layer: BuildLayer = ObjectBuildLayer::new("props", ground.guid).with_prefab("crate", 1.0).into();
        layer.execute(&ctx).unwrap();
        let destroyed = layer.reset(&settings);
        assert_eq!(destroyed.iter().map(|i| i.cluster()).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(layer.grid().tracked_count(), 0);
        assert!(layer.reset(&settings).is_empty());
    }

    #[test]
    fn test_tile_data_at_dual_and_objects() {
        let settings = WorldSettings::with_seed(20, 20, 1);
        let mut ground = BlueprintLayer::new("ground");
        ground.add_cells([IVec2::new(2, 2)]);
        let presets = BTreeMap::new();
        let ctx = BuildContext::new(&settings, std::slice::from_ref(&ground), &presets);

        let mut tiles: BuildLayer = TilesBuildLayer::new("tiles", ground.guid).into();
        tiles.execute(&ctx).unwrap();
        let tile = tiles.tile_data_at(Vec2::new(2.5, 2.5), 1.0).unwrap();
        assert_eq!(tile.tile_position, TilePos::from_half_units(5, 5));
        // a cell centre falls back to the dual tile below and to the left
        let tile = tiles.tile_data_at(Vec2::new(2.0, 2.0), 1.0).unwrap();
        assert_eq!(tile.tile_position, TilePos::from_half_units(3, 3));

        let mut objects: BuildLayer = ObjectBuildLayer::new("props", ground.guid).into();
        objects.execute(&ctx).unwrap();
        assert!(objects.tile_data_at(Vec2::new(2.2, 1.9), 1.0).is_some());
        assert!(objects.tile_data_at(Vec2::new(5.0, 5.0), 1.0).is_none());
    }

    #[test]
    fn test_build_layer_serde_tag() {
        let layer: BuildLayer = TilesBuildLayer::new("tiles", crate::core::new_layer_id()).into();
        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("\"type\":\"Tiles\""));
        let back: BuildLayer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.guid(), layer.guid());
    }
}
