use serde::{Deserialize, Serialize};

use crate::core::{Error, LayerId, Result};
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BooleanOperator {
    #[default]
    Add,
    Subtract,
    Intersect,
    Xor,
}

/// Combines the cell set with another blueprint layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanOp {
    pub layer: Option<LayerId>,
    pub operator: BooleanOperator,
}

impl BlueprintModifier for BooleanOp {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let guid = self
            .layer
            .ok_or_else(|| Error::InvalidConfiguration("boolean step has no layer".into()))?;
        let other = ctx.layer_positions(&guid)?;
        let mut out = cells.clone();
        match self.operator {
            BooleanOperator::Add => out.union_with(other),
            BooleanOperator::Subtract => out.subtract(other),
            BooleanOperator::Intersect => out.intersect_with(other),
            BooleanOperator::Xor => out.symmetric_difference_with(other),
        }
        Ok(out)
    }
}

/// Unions the outputs of several layers into the cell set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddLayers {
    pub layers: Vec<LayerId>,
}

impl BlueprintModifier for AddLayers {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = cells.clone();
        for guid in &self.layers {
            match ctx.layer_positions(guid) {
                Ok(other) => out.union_with(other),
                Err(e) => log::warn!("Add: {}", e),
            }
        }
        Ok(out)
    }
}

/// Removes the outputs of several layers from the cell set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtractLayers {
    pub layers: Vec<LayerId>,
}

impl BlueprintModifier for SubtractLayers {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = cells.clone();
        for guid in &self.layers {
            match ctx.layer_positions(guid) {
                Ok(other) => out.subtract(other),
                Err(e) => log::warn!("Subtract: {}", e),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::BlueprintLayer;
    use crate::blueprint::modifiers::test_util::rect;
    use crate::core::LayerRng;

    fn layer_with(cells: CellSet) -> BlueprintLayer {
        let mut layer = BlueprintLayer::new("other");
        layer.add_cells(cells.iter());
        layer
    }

    #[test]
    fn test_boolean_operators() {
        let layers = vec![layer_with(rect(2, 0, 4, 1))];
        let guid = layers[0].guid;
        let input = rect(0, 0, 4, 1);
        let run = |operator| {
            let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &layers);
            BooleanOp { layer: Some(guid), operator }.execute(&input, &mut ctx).unwrap()
        };
        assert_eq!(run(BooleanOperator::Add), rect(0, 0, 6, 1));
        assert_eq!(run(BooleanOperator::Subtract), rect(0, 0, 2, 1));
        assert_eq!(run(BooleanOperator::Intersect), rect(2, 0, 2, 1));
        let xor = run(BooleanOperator::Xor);
        assert_eq!(xor.len(), 4);
        assert!(!xor.contains(glam::IVec2::new(2, 0)));
    }

    #[test]
    fn test_boolean_without_layer_errors() {
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &[]);
        let op = BooleanOp::default();
        assert!(op.execute(&rect(0, 0, 1, 1), &mut ctx).is_err());
    }

    #[test]
    fn test_add_and_subtract_layers() {
        let layers = vec![layer_with(rect(0, 0, 2, 2)), layer_with(rect(5, 5, 1, 1))];
        let guids: Vec<_> = layers.iter().map(|l| l.guid).collect();
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(1), &layers);
        let added = AddLayers { layers: guids.clone() }.execute(&CellSet::new(), &mut ctx).unwrap();
        assert_eq!(added.len(), 5);
        let subtracted = SubtractLayers { layers: guids }.execute(&rect(0, 0, 3, 3), &mut ctx).unwrap();
        assert_eq!(subtracted.len(), 5);
    }
}
