use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::grid::CellSet;
use crate::blueprint::{BlueprintModifier, ModifierContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Circle,
    Square,
    Triangle,
}

/// Direction a triangle's apex points away from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Place at a random map cell instead of `position`
    #[serde(default)]
    pub random_position: bool,
    pub position: IVec2,
    /// Square extent
    #[serde(default)]
    pub size: IVec2,
    /// Circle radius, triangle height
    #[serde(default)]
    pub radius: i32,
    #[serde(default)]
    pub orientation: Orientation,
}

/// Stamps primitive shapes into the cell set, clipped to the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shapes {
    pub shapes: Vec<Shape>,
}

impl Shapes {
    fn circle(center: IVec2, radius: i32, ctx: &ModifierContext<'_>, out: &mut CellSet) {
        let r2 = (radius * radius) as f32;
        out.extend(ctx.map_cells().filter(|p| (*p - center).as_vec2().length_squared() <= r2));
    }

    fn square(center: IVec2, size: IVec2, ctx: &ModifierContext<'_>, out: &mut CellSet) {
        let (hx, hy) = (size.x / 2, size.y / 2);
        // Odd sizes extend one extra cell on the positive side
        let (ex, ey) = (size.x - hx, size.y - hy);
        for x in -hx..ex {
            for y in -hy..ey {
                let p = center + IVec2::new(x, y);
                if ctx.in_bounds(p) {
                    out.add(p);
                }
            }
        }
    }

    fn triangle(center: IVec2, height: i32, orientation: Orientation, ctx: &ModifierContext<'_>, out: &mut CellSet) {
        for row in 0..height {
            for across in -row..=row {
                let p = match orientation {
                    Orientation::Up => IVec2::new(center.x + across, center.y - row),
                    Orientation::Down => IVec2::new(center.x + across, center.y + row),
                    Orientation::Left => IVec2::new(center.x - row, center.y + across),
                    Orientation::Right => IVec2::new(center.x + row, center.y + across),
                };
                if ctx.in_bounds(p) {
                    out.add(p);
                }
            }
        }
    }
}

impl BlueprintModifier for Shapes {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        let mut out = cells.clone();
        for shape in &self.shapes {
            let position = if shape.random_position {
                IVec2::new(ctx.rng.next_int(0, ctx.width), ctx.rng.next_int(0, ctx.height))
            } else {
                shape.position
            };
            match shape.kind {
                ShapeKind::Circle => Self::circle(position, shape.radius, ctx, &mut out),
                ShapeKind::Square => Self::square(position, shape.size, ctx, &mut out),
                ShapeKind::Triangle => Self::triangle(position, shape.radius, shape.orientation, ctx, &mut out),
            }
        }
        Ok(out)
    }
}
