//! Render instruction types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionMesh;
use crate::core::LayerId;
use crate::tiles::TileType;

/// One placed tile prefab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInstance {
    pub prefab: String,
    pub tile_type: TileType,
    /// Index into the build layer's tile layers
    pub tile_layer: usize,
    pub position: Vec3,
    /// Degrees around +Y, table rotation plus preset offset
    pub y_rotation: f32,
    pub scale: Vec3,
    pub material_override: Option<String>,
}

/// One placed object prefab, or a child scattered around one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub prefab: String,
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
    pub is_child: bool,
}

/// Collider attached to a merged cluster
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    None,
    /// Collide against the combined render mesh
    CombinedMesh,
    /// Boundary mesh synthesized from the blueprint cells
    TileCollider(CollisionMesh),
}

/// Scene change requested by a build layer.
///
/// Clusters are addressed by `(layer, cluster)`, where `layer` is the
/// build layer guid.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    DestroyCluster { layer: LayerId, cluster: i32 },
    SpawnTile { layer: LayerId, cluster: i32, tile: TileInstance },
    SpawnObject { layer: LayerId, cluster: i32, object: ObjectInstance },
    MergeCluster { layer: LayerId, cluster: i32, collider: Collider },
}

impl RenderInstruction {
    pub fn layer(&self) -> LayerId {
        match self {
            RenderInstruction::DestroyCluster { layer, .. }
            | RenderInstruction::SpawnTile { layer, .. }
            | RenderInstruction::SpawnObject { layer, .. }
            | RenderInstruction::MergeCluster { layer, .. } => *layer,
        }
    }

    pub fn cluster(&self) -> i32 {
        match self {
            RenderInstruction::DestroyCluster { cluster, .. }
            | RenderInstruction::SpawnTile { cluster, .. }
            | RenderInstruction::SpawnObject { cluster, .. }
            | RenderInstruction::MergeCluster { cluster, .. } => *cluster,
        }
    }
}
