use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::{CellSet, EIGHT_NEIGHBOURHOOD};
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Base neighbour threshold of the first smoothing pass
const SMOOTH_THRESHOLD: u32 = 4;

/// Erodes sparse cells.
///
/// Pass `i` removes every in-bounds cell whose occupied 3x3 count (itself
/// included) is at most `4 + i`. Counts are taken from the result of the
/// previous pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Smooth {
    pub smooth_count: u32,
}

impl BlueprintModifier for Smooth {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = cells.clone();
        for i in 0..self.smooth_count {
            let threshold = SMOOTH_THRESHOLD + i;
            let removed: Vec<_> = out
                .iter()
                .filter(|c| ctx.in_bounds(*c))
                .filter(|c| {
                    let count = EIGHT_NEIGHBOURHOOD
                        .iter()
                        .filter(|o| {
                            let p = *c + **o;
                            ctx.in_bounds(p) && out.contains(p)
                        })
                        .count() as u32;
                    count <= threshold
                })
                .collect();
            for c in removed {
                out.remove(c);
            }
        }
        Ok(out)
    }
}
