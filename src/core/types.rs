//! Core type aliases and re-exports

use serde::{Deserialize, Serialize};

pub use glam::{
    Vec2, Vec3,
    IVec2,
};

/// Standard Result type for the engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Stable identifier of a blueprint or build layer
pub type LayerId = uuid::Uuid;

/// Fresh random layer identifier
pub fn new_layer_id() -> LayerId {
    uuid::Uuid::new_v4()
}

/// Tile position on the half-unit lattice.
///
/// Stores doubled coordinates so dual-grid tiles at `cell ± 0.5` stay exact
/// and hashable. A cell `(x, y)` maps to `(2x, 2y)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos(pub IVec2);

impl TilePos {
    /// Construct from raw half-unit coordinates
    pub const fn from_half_units(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    /// Tile located exactly on a cell
    pub fn from_cell(cell: IVec2) -> Self {
        Self(cell * 2)
    }

    /// Offset by a number of half units
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self(self.0 + IVec2::new(dx, dy))
    }

    pub fn half_units(self) -> IVec2 {
        self.0
    }

    /// Position in cell units (e.g. `(0.5, -1.5)`)
    pub fn to_vec2(self) -> Vec2 {
        self.0.as_vec2() * 0.5
    }

    /// The cell this tile coincides with, if it is cell aligned
    pub fn as_cell(self) -> Option<IVec2> {
        if self.0.x % 2 == 0 && self.0.y % 2 == 0 {
            Some(self.0 / 2)
        } else {
            None
        }
    }
}

/// Row-major order: by y, then x
impl Ord for TilePos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.y, self.0.x).cmp(&(other.0.y, other.0.x))
    }
}

impl PartialOrd for TilePos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<IVec2> for TilePos {
    fn from(cell: IVec2) -> Self {
        Self::from_cell(cell)
    }
}

/// Neighbourhood used by cell queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Adjacency {
    Four,
    #[default]
    Eight,
}

/// Grid topology a tile preset is authored for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridType {
    Standard,
    #[default]
    Dual,
}
