//! Weighted tile preset selection.

use serde::{Deserialize, Serialize};

use crate::core::LayerRng;

/// Weighted preset candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePresetSelection {
    /// Name of a preset in the configuration
    pub preset: String,
    /// Nominal tile height, for stacking multi layers
    #[serde(default)]
    pub tile_height: f32,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl TilePresetSelection {
    pub fn new(preset: impl Into<String>, weight: f32) -> Self {
        Self {
            preset: preset.into(),
            tile_height: 0.0,
            weight,
        }
    }
}

/// Preset pool of a tiles build layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetTier {
    Top,
    Middle,
    Bottom,
}

/// Pick the pool for tile layer `index` out of `layer_count`.
///
/// `has_middle` and `has_bottom` report whether those pools are non-empty.
/// The top pool is the fallback.
pub fn tier_for_layer(index: usize, layer_count: usize, has_top: bool, has_middle: bool, has_bottom: bool) -> PresetTier {
    if index == 0 {
        if layer_count == 1 {
            PresetTier::Top
        } else if has_bottom {
            PresetTier::Bottom
        } else if has_middle {
            PresetTier::Middle
        } else {
            PresetTier::Top
        }
    } else if index + 1 == layer_count && has_top {
        PresetTier::Top
    } else if has_middle {
        PresetTier::Middle
    } else {
        PresetTier::Top
    }
}

/// Index drawn with probability proportional to its weight.
///
/// Draws `r` in `[0, total)` and returns the first index whose running
/// sum exceeds `r`, clamped to the last index. `None` for an empty list.
/// NaN and infinite weights count as 0.
pub fn random_weighted(weights: &[f32], rng: &mut LayerRng) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let usable = |w: f32| if w.is_finite() { w } else { 0.0 };
    let total: f32 = weights.iter().map(|w| usable(*w)).sum();
    let r = rng.next_float(0.0, total);
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += usable(*w);
        if cumulative > r {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}
