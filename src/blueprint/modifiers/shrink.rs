use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

use super::inner_cells;

/// Peels off the border ring `shrink_count` times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shrink {
    pub shrink_count: u32,
}

impl BlueprintModifier for Shrink {
    fn execute(&self, cells: &CellSet, _ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = cells.clone();
        for _ in 0..self.shrink_count {
            if out.is_empty() {
                break;
            }
            out = inner_cells(&out);
        }
        Ok(out)
    }
}
