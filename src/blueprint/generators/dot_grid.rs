use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Replaces the cell set with a lattice of single dots.
///
/// Columns are taken every `grid_space` cells. Rows use one counter that
/// keeps running across selected columns, so the pattern staggers when the
/// map height is not a multiple of `grid_space`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotGrid {
    pub grid_space: i32,
}

impl BlueprintModifier for DotGrid {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        if self.grid_space <= 0 {
            return Ok(cells.clone());
        }
        let mut out = CellSet::new();
        let mut row_counter = 0;
        for x in 0..ctx.width {
            if x % self.grid_space != 0 {
                continue;
            }
            for y in 0..ctx.height {
                if row_counter % self.grid_space == 0 {
                    out.add(glam::IVec2::new(x, y));
                }
                row_counter += 1;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LayerRng;
    use glam::IVec2;

    #[test]
    fn test_dot_grid() {
        let mut ctx = ModifierContext::new(6, 6, LayerRng::new(1), &[]);
        let out = DotGrid { grid_space: 3 }.execute(&CellSet::new(), &mut ctx).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.contains(IVec2::new(0, 0)));
        assert!(out.contains(IVec2::new(3, 3)));
    }

    #[test]
    fn test_zero_spacing_passes_through() {
        let mut ctx = ModifierContext::new(6, 6, LayerRng::new(1), &[]);
        let input = CellSet::from(vec![IVec2::new(2, 2)]);
        assert_eq!(DotGrid { grid_space: 0 }.execute(&input, &mut ctx).unwrap(), input);
    }
}
