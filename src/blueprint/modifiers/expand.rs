use serde::{Deserialize, Serialize};

use crate::core::{Adjacency, Result};
use crate::grid::{CellSet, EIGHT_NEIGHBOURHOOD, FOUR_NEIGHBOURHOOD};
use crate::blueprint::{BlueprintModifier, ModifierContext};

use super::border_cells;

/// Grows the cell set outward from its border, one ring per iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expand {
    #[serde(default)]
    pub direction: Adjacency,
    pub iterations: u32,
}

impl Default for Expand {
    fn default() -> Self {
        Self { direction: Adjacency::Four, iterations: 1 }
    }
}

impl BlueprintModifier for Expand {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let offsets: &[glam::IVec2] = match self.direction {
            Adjacency::Four => &FOUR_NEIGHBOURHOOD,
            Adjacency::Eight => &EIGHT_NEIGHBOURHOOD,
        };
        let mut out = cells.clone();
        for _ in 0..self.iterations {
            for border in border_cells(&out) {
                for o in offsets {
                    let p = border + *o;
                    if ctx.in_bounds(p) {
                        out.add(p);
                    }
                }
            }
        }
        Ok(out)
    }
}
