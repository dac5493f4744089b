//! Tile presets: which asset to place for each tile type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::GridType;
use super::TileType;

/// Asset placed for one tile type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileAsset {
    /// Renderer-side asset identifier
    pub prefab: String,
    /// Added to the resolved rotation, in degrees
    pub y_rotation_offset: f32,
}

/// Set of tile assets authored for one grid topology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TilePreset {
    pub name: String,
    pub grid_type: GridType,
    #[serde(default)]
    pub tiles: BTreeMap<TileType, TileAsset>,
    #[serde(default)]
    pub material_override: Option<String>,
}

impl TilePreset {
    pub fn new(name: impl Into<String>, grid_type: GridType) -> Self {
        Self {
            name: name.into(),
            grid_type,
            tiles: BTreeMap::new(),
            material_override: None,
        }
    }

    /// Builder-style registration of a tile asset
    pub fn with_tile(mut self, tile_type: TileType, prefab: impl Into<String>, y_rotation_offset: f32) -> Self {
        self.tiles.insert(tile_type, TileAsset { prefab: prefab.into(), y_rotation_offset });
        self
    }

    pub fn with_material_override(mut self, material: impl Into<String>) -> Self {
        self.material_override = Some(material.into());
        self
    }

    /// Asset and rotation offset for a tile type, if the preset defines one
    pub fn get_tile(&self, tile_type: TileType) -> Option<&TileAsset> {
        self.tiles.get(&tile_type)
    }

    /// Preset with one asset per dual tile type, named `<prefix>_<type>`
    pub fn dual_from_prefix(name: impl Into<String>, prefix: &str) -> Self {
        TileType::DUAL.iter().fold(Self::new(name, GridType::Dual), |p, t| {
            p.with_tile(*t, format!("{prefix}_{t:?}"), 0.0)
        })
    }

    /// Preset with one asset per normal tile type, named `<prefix>_<type>`
    pub fn standard_from_prefix(name: impl Into<String>, prefix: &str) -> Self {
        TileType::NORMAL.iter().fold(Self::new(name, GridType::Standard), |p, t| {
            p.with_tile(*t, format!("{prefix}_{t:?}"), 0.0)
        })
    }
}
