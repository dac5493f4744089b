//! Cluster merge and collider settings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blueprint::BlueprintLayer;
use crate::cluster::ClusterIndexer;
use crate::collision::CollisionMeshBuilder;
use crate::core::LayerId;
use crate::render::{Collider, RenderInstruction};
use crate::world::WorldSettings;

/// Collider attached to merged clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColliderType {
    None,
    #[default]
    MeshCollider,
    TileCollider,
}

/// Merge and collider options, global or overridden per build layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshGenerationSettings {
    pub merge: bool,
    pub collider_type: ColliderType,
    pub tile_collider_height: f32,
    pub tile_collider_extrusion_height: f32,
    pub invert_collision_walls: bool,
}

impl Default for MeshGenerationSettings {
    fn default() -> Self {
        Self::from_world(&WorldSettings::default())
    }
}

impl MeshGenerationSettings {
    pub fn from_world(settings: &WorldSettings) -> Self {
        Self {
            merge: settings.merge_tiles,
            collider_type: settings.collider_type,
            tile_collider_height: settings.tile_collider_height,
            tile_collider_extrusion_height: settings.tile_collider_extrusion_height,
            invert_collision_walls: settings.invert_collision_walls,
        }
    }

    /// The layer override when present, otherwise the world settings
    pub fn resolve(layer_override: Option<&MeshGenerationSettings>, settings: &WorldSettings) -> Self {
        layer_override.copied().unwrap_or_else(|| Self::from_world(settings))
    }
}

/// Inputs of the merge pass shared by tile and object layers
pub(crate) struct MergePass<'a> {
    pub layer: LayerId,
    pub mesh: MeshGenerationSettings,
    pub blueprint: &'a BlueprintLayer,
    pub indexer: ClusterIndexer,
    pub cell_size: f32,
    /// Vertical offset of the layer's content above the blueprint height
    pub y_offset: f32,
}

impl MergePass<'_> {
    /// `MergeCluster` for every dirty cluster that received content.
    pub fn run(&self, dirty: &[i32], populated: &HashSet<i32>) -> Vec<RenderInstruction> {
        if !self.mesh.merge {
            return Vec::new();
        }
        dirty
            .iter()
            .filter(|key| populated.contains(key))
            .map(|&cluster| RenderInstruction::MergeCluster {
                layer: self.layer,
                cluster,
                collider: self.collider(cluster),
            })
            .collect()
    }

    fn collider(&self, cluster: i32) -> Collider {
        match self.mesh.collider_type {
            ColliderType::None => Collider::None,
            ColliderType::MeshCollider => Collider::CombinedMesh,
            ColliderType::TileCollider => {
                let cells = self.blueprint.positions_in_cluster(&self.indexer, cluster);
                let builder = CollisionMeshBuilder::new(
                    self.cell_size,
                    self.blueprint.default_layer_height + self.y_offset + self.mesh.tile_collider_height,
                    self.mesh.tile_collider_extrusion_height,
                    self.mesh.invert_collision_walls,
                );
                let mesh = builder.build(&cells, self.blueprint.all_positions());
                if mesh.is_empty() {
                    log::debug!("Cluster {} has no collision geometry", cluster);
                    Collider::None
                } else {
                    Collider::TileCollider(mesh)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_override_wins() {
        let settings = WorldSettings::default();
        let layer = MeshGenerationSettings {
            merge: false,
            collider_type: ColliderType::TileCollider,
            tile_collider_height: 1.0,
            tile_collider_extrusion_height: 2.0,
            invert_collision_walls: true,
        };
        assert_eq!(MeshGenerationSettings::resolve(Some(&layer), &settings), layer);
        let global = MeshGenerationSettings::resolve(None, &settings);
        assert!(global.merge);
        assert_eq!(global.collider_type, ColliderType::MeshCollider);
    }

    fn pass(blueprint: &BlueprintLayer, collider_type: ColliderType) -> MergePass<'_> {
        MergePass {
            layer: LayerId::nil(),
            mesh: MeshGenerationSettings { collider_type, ..Default::default() },
            blueprint,
            indexer: ClusterIndexer::new(5),
            cell_size: 1.0,
            y_offset: 0.0,
        }
    }

    #[test]
    fn test_only_populated_clusters_merge() {
        let blueprint = BlueprintLayer::new("ground");
        let populated: HashSet<i32> = [0].into_iter().collect();
        let out = pass(&blueprint, ColliderType::MeshCollider).run(&[0, 1], &populated);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0],
            RenderInstruction::MergeCluster { layer: LayerId::nil(), cluster: 0, collider: Collider::CombinedMesh }
        );
    }

    #[test]
    fn test_tile_collider_mesh() {
        let mut blueprint = BlueprintLayer::new("ground");
        blueprint.add_cells([IVec2::new(1, 1)]);
        let populated: HashSet<i32> = [0, 1].into_iter().collect();
        let out = pass(&blueprint, ColliderType::TileCollider).run(&[0, 1], &populated);
        match &out[0] {
            RenderInstruction::MergeCluster { collider: Collider::TileCollider(mesh), .. } => {
                assert_eq!(mesh.vertex_count(), 36);
            }
            other => panic!("unexpected {other:?}"),
        }
        // no cells in cluster 1 means no collider
        match &out[1] {
            RenderInstruction::MergeCluster { collider, .. } => assert_eq!(collider, &Collider::None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_merge_disabled() {
        let blueprint = BlueprintLayer::new("ground");
        let mut p = pass(&blueprint, ColliderType::MeshCollider);
        p.mesh.merge = false;
        let populated: HashSet<i32> = [0].into_iter().collect();
        assert!(p.run(&[0], &populated).is_empty());
    }
}
