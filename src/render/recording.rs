//! In-memory renderer that records instructions and tracks live clusters.

use std::collections::HashMap;

use crate::core::LayerId;

use super::instruction::{Collider, ObjectInstance, RenderInstruction, TileInstance};
use super::Renderer;

/// Current contents of one cluster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedCluster {
    pub tiles: Vec<TileInstance>,
    pub objects: Vec<ObjectInstance>,
    pub collider: Option<Collider>,
    pub merged: bool,
}

/// Renderer that keeps every instruction plus the resulting cluster state.
///
/// Used by tests, the CLI and the benchmarks.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub instructions: Vec<RenderInstruction>,
    clusters: HashMap<(LayerId, i32), RenderedCluster>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cluster(&self, layer: LayerId, cluster: i32) -> Option<&RenderedCluster> {
        self.clusters.get(&(layer, cluster))
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Live tiles across all clusters
    pub fn tile_count(&self) -> usize {
        self.clusters.values().map(|c| c.tiles.len()).sum()
    }

    pub fn object_count(&self) -> usize {
        self.clusters.values().map(|c| c.objects.len()).sum()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileInstance> {
        self.clusters.values().flat_map(|c| c.tiles.iter())
    }

    /// Drop the recorded log, keeping cluster state
    pub fn clear_log(&mut self) {
        self.instructions.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn apply(&mut self, instruction: &RenderInstruction) {
        let key = (instruction.layer(), instruction.cluster());
        match instruction {
            RenderInstruction::DestroyCluster { .. } => {
                self.clusters.remove(&key);
            }
            RenderInstruction::SpawnTile { tile, .. } => {
                self.clusters.entry(key).or_default().tiles.push(tile.clone());
            }
            RenderInstruction::SpawnObject { object, .. } => {
                self.clusters.entry(key).or_default().objects.push(object.clone());
            }
            RenderInstruction::MergeCluster { collider, .. } => {
                if let Some(cluster) = self.clusters.get_mut(&key) {
                    cluster.merged = true;
                    cluster.collider = Some(collider.clone());
                } else {
                    log::warn!("Merge requested for missing cluster {}", key.1);
                }
            }
        }
        self.instructions.push(instruction.clone());
    }
}
