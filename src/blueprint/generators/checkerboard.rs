use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Replaces the cell set with evenly spaced rows and/or columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkerboard {
    pub horizontal: bool,
    pub vertical: bool,
    pub spacing: i32,
}

impl Default for Checkerboard {
    fn default() -> Self {
        Self { horizontal: true, vertical: true, spacing: 2 }
    }
}

impl BlueprintModifier for Checkerboard {
    fn execute(&self, _cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let spacing = self.spacing.max(1);
        Ok(ctx
            .map_cells()
            .filter(|p| (self.horizontal && p.y % spacing == 0) || (self.vertical && p.x % spacing == 0))
            .collect())
    }
}
