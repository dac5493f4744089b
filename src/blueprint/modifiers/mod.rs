//! Cell set modifiers: morphology, boolean algebra and selection

mod expand;
mod shrink;
mod invert;
mod smooth;
mod boolean;
mod select;
mod neighbour;
mod rule;
mod islands;
mod push;

pub use expand::Expand;
pub use shrink::Shrink;
pub use invert::Invert;
pub use smooth::Smooth;
pub use boolean::{AddLayers, BooleanOp, BooleanOperator, SubtractLayers};
pub use select::{Select, Selection};
pub use neighbour::SelectBasedOnNeighbour;
pub use rule::{CellRule, RuleCell, SelectByRule};
pub use islands::{FindPositionOnIslands, find_islands};
pub use push::PushToPaintPositions;

use glam::IVec2;

use crate::grid::{CellSet, FULL_EIGHT_CONFIGURATION};

/// Cells whose full 3x3 neighbourhood is occupied
pub(crate) fn inner_cells(cells: &CellSet) -> CellSet {
    cells
        .iter()
        .filter(|c| cells.configuration_eight(*c) == FULL_EIGHT_CONFIGURATION)
        .collect()
}

/// Cells with at least one empty neighbour in the 3x3 neighbourhood
pub(crate) fn border_cells(cells: &CellSet) -> Vec<IVec2> {
    cells
        .sorted()
        .into_iter()
        .filter(|c| cells.configuration_eight(*c) != FULL_EIGHT_CONFIGURATION)
        .collect()
}
