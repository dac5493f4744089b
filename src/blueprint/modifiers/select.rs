use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::tiles::tables::{SELECT_CORNER, SELECT_EDGE, SELECT_INTERIOR_CORNER};
use crate::blueprint::{BlueprintModifier, ModifierContext};

use super::{border_cells, inner_cells};

/// Which cells a [`Select`] step keeps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    /// Keep each cell with probability `weight`
    Random(f32),
    Border,
    Fill,
    Edge,
    Corner,
    InteriorCorner,
    /// Keep this many distinct random cells
    Count(usize),
}

/// Keeps a subset of the cell set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub selection: Selection,
}

impl BlueprintModifier for Select {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let out = match self.selection {
            Selection::Random(weight) => cells
                .sorted()
                .into_iter()
                .filter(|_| ctx.rng.next_unit() < weight)
                .collect(),
            Selection::Border => border_cells(cells).into_iter().collect(),
            Selection::Fill => inner_cells(cells),
            Selection::Edge => cells
                .iter()
                .filter(|c| SELECT_EDGE.contains(&cells.configuration_four(*c)))
                .collect(),
            Selection::Corner => cells
                .iter()
                .filter(|c| SELECT_CORNER.contains(&cells.configuration_four(*c)))
                .collect(),
            Selection::InteriorCorner => cells
                .iter()
                .filter(|c| SELECT_INTERIOR_CORNER.contains(&cells.configuration_eight(*c)))
                .collect(),
            Selection::Count(count) => {
                if count >= cells.len() {
                    cells.clone()
                } else {
                    let mut pool = cells.sorted();
                    ctx.rng.shuffle(&mut pool);
                    pool.into_iter().take(count).collect()
                }
            }
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LayerRng;
    use crate::blueprint::modifiers::test_util::rect;
    use glam::IVec2;

    fn select(selection: Selection, cells: &CellSet) -> CellSet {
        let mut ctx = ModifierContext::new(20, 20, LayerRng::new(3), &[]);
        Select { selection }.execute(cells, &mut ctx).unwrap()
    }

    #[test]
    fn test_select_border_and_fill() {
        let block = rect(0, 0, 4, 4);
        assert_eq!(select(Selection::Border, &block).len(), 12);
        assert_eq!(select(Selection::Fill, &block), rect(1, 1, 2, 2));
    }

    #[test]
    fn test_select_corner_and_edge() {
        let block = rect(0, 0, 4, 4);
        let corners = select(Selection::Corner, &block);
        assert_eq!(corners.len(), 4);
        assert!(corners.contains(IVec2::new(0, 0)));
        assert!(corners.contains(IVec2::new(3, 3)));
        let edges = select(Selection::Edge, &block);
        assert_eq!(edges.len(), 8);
        assert!(edges.contains(IVec2::new(1, 0)));
    }

    #[test]
    fn test_select_interior_corner() {
        // L-shape: the inner corner cell has only its NE neighbour missing
        let mut cells = rect(0, 0, 4, 2);
        cells.extend(rect(0, 2, 2, 2).iter());
        let inner = select(Selection::InteriorCorner, &cells);
        assert!(inner.contains(IVec2::new(1, 1)));
    }

    #[test]
    fn test_select_count() {
        let block = rect(0, 0, 5, 5);
        assert_eq!(select(Selection::Count(7), &block).len(), 7);
        assert_eq!(select(Selection::Count(100), &block).len(), 25);
        assert!(select(Selection::Count(3), &CellSet::new()).is_empty());
    }

    #[test]
    fn test_select_random_extremes() {
        let block = rect(0, 0, 5, 5);
        assert_eq!(select(Selection::Random(1.0), &block).len(), 25);
        assert!(select(Selection::Random(0.0), &block).is_empty());
    }
}
