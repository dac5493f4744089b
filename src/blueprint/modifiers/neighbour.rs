use serde::{Deserialize, Serialize};

use crate::core::{Error, LayerId, Result};
use crate::grid::{CellSet, EIGHT_NEIGHBOURHOOD, FOUR_NEIGHBOURHOOD};
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Keeps cells by how many of their neighbours are occupied in another layer.
///
/// Only in-bounds neighbours count. With `invert`, empty neighbours are
/// counted instead and a cell is kept when the count is at most
/// `neighbour_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectBasedOnNeighbour {
    pub layer: Option<LayerId>,
    pub neighbour_count: usize,
    #[serde(default)]
    pub only_four_directions: bool,
    #[serde(default)]
    pub invert: bool,
}

impl BlueprintModifier for SelectBasedOnNeighbour {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let guid = self
            .layer
            .ok_or_else(|| Error::InvalidConfiguration("neighbour selection has no layer".into()))?;
        let other = ctx.layer_positions(&guid)?;
        let offsets: &[glam::IVec2] = if self.only_four_directions {
            &FOUR_NEIGHBOURHOOD
        } else {
            &EIGHT_NEIGHBOURHOOD
        };

        Ok(cells
            .iter()
            .filter(|c| {
                let count = offsets
                    .iter()
                    .filter(|o| **o != glam::IVec2::ZERO)
                    .map(|o| *c + *o)
                    .filter(|p| ctx.in_bounds(*p) && other.contains(*p) != self.invert)
                    .count();
                if self.invert {
                    count <= self.neighbour_count
                } else {
                    count >= self.neighbour_count
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::BlueprintLayer;
    use crate::core::LayerRng;
    use glam::IVec2;

    #[test]
    fn test_select_next_to_other_layer() {
        let mut water = BlueprintLayer::new("water");
        water.add_cells([IVec2::new(5, 5), IVec2::new(5, 6)]);
        let layers = vec![water];
        let step = SelectBasedOnNeighbour {
            layer: Some(layers[0].guid),
            neighbour_count: 2,
            only_four_directions: false,
            invert: false,
        };
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &layers);
        let input = CellSet::from(vec![IVec2::new(4, 5), IVec2::new(4, 7), IVec2::new(0, 0)]);
        let out = step.execute(&input, &mut ctx).unwrap();
        assert_eq!(out, CellSet::from(vec![IVec2::new(4, 5)]));
    }

    #[test]
    fn test_select_four_directions_inverted() {
        let mut walls = BlueprintLayer::new("walls");
        walls.add_cells([IVec2::new(1, 2)]);
        let layers = vec![walls];
        let step = SelectBasedOnNeighbour {
            layer: Some(layers[0].guid),
            neighbour_count: 3,
            only_four_directions: true,
            invert: true,
        };
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &layers);
        // (1, 1) has three empty plus-neighbours, (5, 5) has four
        let input = CellSet::from(vec![IVec2::new(1, 1), IVec2::new(5, 5)]);
        let out = step.execute(&input, &mut ctx).unwrap();
        assert_eq!(out, CellSet::from(vec![IVec2::new(1, 1)]));
    }
}
