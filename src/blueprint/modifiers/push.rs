use serde::{Deserialize, Serialize};

use crate::core::{Error, LayerId, Result};
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext, SideEffect};

/// Copies the current cells into another layer's painted cells.
///
/// The cell set passes through unchanged; the write is applied to the
/// target layer once this layer's pipeline has finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushToPaintPositions {
    pub layer: Option<LayerId>,
    #[serde(default)]
    pub clear_previous: bool,
}

impl BlueprintModifier for PushToPaintPositions {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let guid = self
            .layer
            .ok_or_else(|| Error::InvalidConfiguration("push step has no target layer".into()))?;
        if !ctx.has_layer(&guid) {
            return Err(Error::MissingLayer(guid.to_string()));
        }
        ctx.push_side_effect(SideEffect::PushToPaint {
            layer: guid,
            cells: cells.clone(),
            clear_previous: self.clear_previous,
        });
        Ok(cells.clone())
    }
}
