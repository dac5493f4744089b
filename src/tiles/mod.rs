//! Tile types, configuration tables and presets
//!
//! A tile's neighbourhood is encoded as a bitmask, which the resolver maps
//! to a tile type and a Y rotation:
//! - Normal grid: 9 bits over the 3x3 cell neighbourhood
//! - Dual grid: 4 bits over the cell corners of a half-offset tile

pub mod types;
pub mod tables;
pub mod resolver;
pub mod preset;

pub use types::TileType;
pub use resolver::{dual_corner_rotation, is_mirrored_x, resolve};
pub use preset::{TileAsset, TilePreset};
