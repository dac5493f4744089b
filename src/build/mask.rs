//! Build layer masks.

use serde::{Deserialize, Serialize};

use crate::core::{LayerId, TilePos};
use crate::grid::CellSet;
use crate::tiles::TileType;

use super::{BuildContext, TileData};

/// Blueprint layer used to block generation.
///
/// Every mask skips generation on its exact cells. A priority mask also
/// suppresses tiles with a mask cell in their 3x3 half-unit window, except
/// for the listed tile types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildLayerMask {
    pub blueprint_layer: LayerId,
    #[serde(default)]
    pub is_priority: bool,
    #[serde(default)]
    pub priority_exceptions: Vec<TileType>,
}

impl BuildLayerMask {
    pub fn new(blueprint_layer: LayerId) -> Self {
        Self {
            blueprint_layer,
            is_priority: false,
            priority_exceptions: Vec::new(),
        }
    }

    pub fn priority(blueprint_layer: LayerId, exceptions: Vec<TileType>) -> Self {
        Self {
            blueprint_layer,
            is_priority: true,
            priority_exceptions: exceptions,
        }
    }

    fn suppresses(&self, tile_type: TileType) -> bool {
        self.is_priority && !self.priority_exceptions.contains(&tile_type)
    }
}

/// Masks bound to the current cells of their blueprint layers.
pub(crate) struct ResolvedMasks<'a> {
    masks: Vec<(&'a BuildLayerMask, &'a CellSet)>,
}

impl<'a> ResolvedMasks<'a> {
    /// Missing mask layers are ignored
    pub fn resolve(masks: &'a [BuildLayerMask], ctx: &BuildContext<'a>) -> Self {
        let masks = masks
            .iter()
            .filter_map(|m| ctx.blueprint(&m.blueprint_layer).map(|l| (m, l.all_positions())))
            .collect();
        Self { masks }
    }

    pub fn is_neighbour_masked(&self, tile: &TileData) -> bool {
        self.masks
            .iter()
            .filter(|(mask, _)| mask.suppresses(tile.tile_type))
            .any(|(_, cells)| window_hits(tile.tile_position, cells))
    }
}

/// Cells of every mask layer, for exact-cell masking
pub(crate) fn exact_mask_cells<'a>(masks: &[BuildLayerMask], ctx: &BuildContext<'a>) -> Vec<&'a CellSet> {
    masks
        .iter()
        .filter_map(|m| ctx.blueprint(&m.blueprint_layer))
        .map(|l| l.all_positions())
        .collect()
}

/// Whether any cell-aligned point in the 3x3 half-unit window is occupied
fn window_hits(tile: TilePos, cells: &CellSet) -> bool {
    (-1..=1).any(|dx| {
        (-1..=1).any(|dy| tile.offset(dx, dy).as_cell().is_some_and(|c| cells.contains(c)))
    })
}

/// Number of occupied cell-aligned points in the 3x3 half-unit window
pub(crate) fn window_count(tile: TilePos, cells: &CellSet) -> usize {
    let mut count = 0;
    for dx in -1..=1 {
        for dy in -1..=1 {
            if tile.offset(dx, dy).as_cell().is_some_and(|c| cells.contains(c)) {
                count += 1;
            }
        }
    }
    count
}
