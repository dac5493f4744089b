//! Tile type identifiers.

use serde::{Deserialize, Serialize};

/// Shape class of a placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    None,

    // Dual grid
    DualCorner,
    DualInteriorCorner,
    DualDoubleInteriorCorner,
    DualEdge,
    DualFill,

    // Normal grid
    DeadEnd,
    Single,
    Fill,
    CornerWay,
    CornerFill,
    InteriorCorner,
    DoubleCorner,
    EdgeWay,
    EdgeFill,
    ThreeWay,
    ThreeWayFill,
    EdgeCornerFill,
    ThreeCorner,
    FourWay,
}

impl TileType {
    pub const DUAL: [TileType; 5] = [
        TileType::DualCorner,
        TileType::DualInteriorCorner,
        TileType::DualDoubleInteriorCorner,
        TileType::DualEdge,
        TileType::DualFill,
    ];

    pub const NORMAL: [TileType; 14] = [
        TileType::DeadEnd,
        TileType::Single,
        TileType::Fill,
        TileType::CornerWay,
        TileType::CornerFill,
        TileType::InteriorCorner,
        TileType::DoubleCorner,
        TileType::EdgeWay,
        TileType::EdgeFill,
        TileType::ThreeWay,
        TileType::ThreeWayFill,
        TileType::EdgeCornerFill,
        TileType::ThreeCorner,
        TileType::FourWay,
    ];

    pub fn is_dual(self) -> bool {
        Self::DUAL.contains(&self)
    }

    /// Fully enclosed tiles, skipped by tile layers that ignore fill
    pub fn is_fill(self) -> bool {
        matches!(self, TileType::DualFill | TileType::Fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_and_normal_disjoint() {
        for t in TileType::DUAL {
            assert!(!TileType::NORMAL.contains(&t));
        }
        assert!(!TileType::None.is_dual());
    }

    #[test]
    fn test_is_fill() {
        assert!(TileType::Fill.is_fill());
        assert!(TileType::DualFill.is_fill());
        assert!(!TileType::EdgeFill.is_fill());
    }
}
