use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Complement of the cell set within the map bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invert {}

impl BlueprintModifier for Invert {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        Ok(ctx.map_cells().filter(|p| !cells.contains(*p)).collect())
    }
}
