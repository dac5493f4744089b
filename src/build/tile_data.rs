//! Per-tile build record.

use std::hash::{Hash, Hasher};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::TilePos;
use crate::tiles::TileType;

/// Resolved tile stored in a build layer's tile grid.
///
/// Identity is `(tile_position, configuration, tile_type)`; rotation and
/// assignment state do not take part in equality or hashing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TileData {
    pub is_assigned: bool,
    pub tile_position: TilePos,
    /// Blueprint cell that produced this tile
    pub world_position: IVec2,
    pub y_rotation: i32,
    pub y_rotation_offset: f32,
    pub configuration: u32,
    pub tile_type: TileType,
}

impl TileData {
    /// Unresolved tile owned by `world_position`
    pub fn new(tile_position: TilePos, world_position: IVec2) -> Self {
        Self {
            is_assigned: true,
            tile_position,
            world_position,
            ..Default::default()
        }
    }
}

impl PartialEq for TileData {
    fn eq(&self, other: &Self) -> bool {
        self.tile_position == other.tile_position
            && self.configuration == other.configuration
            && self.tile_type == other.tile_type
    }
}

impl Eq for TileData {}

impl Hash for TileData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tile_position.hash(state);
        self.configuration.hash(state);
        self.tile_type.hash(state);
    }
}
