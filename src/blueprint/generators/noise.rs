use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

/// Adds map cells whose Perlin sample exceeds `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomNoise {
    pub weight: f32,
}

impl Default for RandomNoise {
    fn default() -> Self {
        Self { weight: 0.5 }
    }
}

impl BlueprintModifier for RandomNoise {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let perlin = Perlin::new(ctx.rng.next_int(0, i32::MAX) as u32);
        let (w, h) = (ctx.width.max(1) as f32, ctx.height.max(1) as f32);
        let mut out = cells.clone();
        for p in ctx.map_cells() {
            let sx = p.x as f32 / w + ctx.rng.next_float(0.0, 100.0);
            let sy = p.y as f32 / h + ctx.rng.next_float(0.0, 100.0);
            // Perlin output is [-1, 1]
            let sample = (perlin.get([sx as f64, sy as f64]) as f32 + 1.0) * 0.5;
            if sample > self.weight {
                out.add(p);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LayerRng;

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let run = || {
            let mut ctx = ModifierContext::new(30, 20, LayerRng::new(77), &[]);
            RandomNoise::default().execute(&CellSet::new(), &mut ctx).unwrap()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.iter().all(|c| c.x >= 0 && c.x < 30 && c.y >= 0 && c.y < 20));
    }

    #[test]
    fn test_noise_weight_extremes() {
        let mut ctx = ModifierContext::new(10, 10, LayerRng::new(5), &[]);
        let none = RandomNoise { weight: 2.0 }.execute(&CellSet::new(), &mut ctx).unwrap();
        assert!(none.is_empty());
        let all = RandomNoise { weight: -0.1 }.execute(&CellSet::new(), &mut ctx).unwrap();
        assert_eq!(all.len(), 100);
    }
}
