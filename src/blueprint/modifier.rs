//! Modifier pipeline plumbing.
//!
//! A blueprint layer's cells are produced by running its painted cells
//! through an ordered list of [`ModifierStep`]s. Each step is one
//! [`Modifier`] variant; dispatch goes through the [`BlueprintModifier`] trait.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::core::{Error, LayerId, LayerRng, Result};
use crate::grid::{CellSet, in_bounds};

use super::BlueprintLayer;
use super::generators::{
    BspDungeon, CellularAutomata, Checkerboard, DotGrid, Maze, PoissonDisc, RandomNoise,
    RandomWalkDungeon, Shapes,
};
use super::modifiers::{
    AddLayers, BooleanOp, Expand, FindPositionOnIslands, Invert, PushToPaintPositions, Select,
    SelectBasedOnNeighbour, SelectByRule, Shrink, Smooth, SubtractLayers,
};

/// One transformation of a cell set.
pub trait BlueprintModifier {
    /// Produce the next cell set from `cells`.
    ///
    /// An error means the step is misconfigured; the pipeline logs it and
    /// keeps `cells` unchanged.
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet>;
}

/// Change to another layer requested by a step, applied after the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    PushToPaint {
        layer: LayerId,
        cells: CellSet,
        clear_previous: bool,
    },
}

/// Everything a step may read besides its input cells.
pub struct ModifierContext<'a> {
    pub width: i32,
    pub height: i32,
    pub rng: LayerRng,
    layers: &'a [BlueprintLayer],
    side_effects: Vec<SideEffect>,
}

impl<'a> ModifierContext<'a> {
    pub fn new(width: i32, height: i32, rng: LayerRng, layers: &'a [BlueprintLayer]) -> Self {
        Self {
            width,
            height,
            rng,
            layers,
            side_effects: Vec::new(),
        }
    }

    /// Current output of another blueprint layer
    pub fn layer_positions(&self, guid: &LayerId) -> Result<&'a CellSet> {
        self.layers
            .iter()
            .find(|l| l.guid == *guid)
            .map(|l| l.all_positions())
            .ok_or_else(|| Error::MissingLayer(guid.to_string()))
    }

    pub fn has_layer(&self, guid: &LayerId) -> bool {
        self.layers.iter().any(|l| l.guid == *guid)
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        in_bounds(pos, self.width, self.height)
    }

    /// Every cell of the map region in column-major order
    pub fn map_cells(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (w, h) = (self.width.max(0), self.height.max(0));
        (0..w).flat_map(move |x| (0..h).map(move |y| IVec2::new(x, y)))
    }

    pub fn push_side_effect(&mut self, effect: SideEffect) {
        self.side_effects.push(effect);
    }

    pub fn into_side_effects(self) -> Vec<SideEffect> {
        self.side_effects
    }
}

/// Closed set of pipeline steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Modifier {
    // Modifiers
    Expand(Expand),
    Shrink(Shrink),
    Invert(Invert),
    Smooth(Smooth),
    Boolean(BooleanOp),
    Add(AddLayers),
    Subtract(SubtractLayers),
    Select(Select),
    SelectBasedOnNeighbour(SelectBasedOnNeighbour),
    SelectByRule(SelectByRule),
    FindPositionOnIslands(FindPositionOnIslands),
    PushToPaintPositions(PushToPaintPositions),

    // Generators
    RandomNoise(RandomNoise),
    Checkerboard(Checkerboard),
    DotGrid(DotGrid),
    CellularAutomata(CellularAutomata),
    RandomWalkDungeon(RandomWalkDungeon),
    Maze(Maze),
    BspDungeon(BspDungeon),
    Shapes(Shapes),
    PoissonDisc(PoissonDisc),
}

impl Modifier {
    fn as_modifier(&self) -> &dyn BlueprintModifier {
        match self {
            Modifier::Expand(m) => m,
            Modifier::Shrink(m) => m,
            Modifier::Invert(m) => m,
            Modifier::Smooth(m) => m,
            Modifier::Boolean(m) => m,
            Modifier::Add(m) => m,
            Modifier::Subtract(m) => m,
            Modifier::Select(m) => m,
            Modifier::SelectBasedOnNeighbour(m) => m,
            Modifier::SelectByRule(m) => m,
            Modifier::FindPositionOnIslands(m) => m,
            Modifier::PushToPaintPositions(m) => m,
            Modifier::RandomNoise(m) => m,
            Modifier::Checkerboard(m) => m,
            Modifier::DotGrid(m) => m,
            Modifier::CellularAutomata(m) => m,
            Modifier::RandomWalkDungeon(m) => m,
            Modifier::Maze(m) => m,
            Modifier::BspDungeon(m) => m,
            Modifier::Shapes(m) => m,
            Modifier::PoissonDisc(m) => m,
        }
    }

    /// Display name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Expand(_) => "Expand",
            Modifier::Shrink(_) => "Shrink",
            Modifier::Invert(_) => "Invert",
            Modifier::Smooth(_) => "Smooth",
            Modifier::Boolean(_) => "Boolean",
            Modifier::Add(_) => "Add",
            Modifier::Subtract(_) => "Subtract",
            Modifier::Select(_) => "Select",
            Modifier::SelectBasedOnNeighbour(_) => "Select based on neighbours",
            Modifier::SelectByRule(_) => "Select by rule",
            Modifier::FindPositionOnIslands(_) => "Find position on islands",
            Modifier::PushToPaintPositions(_) => "Push to paint positions",
            Modifier::RandomNoise(_) => "Random noise",
            Modifier::Checkerboard(_) => "Checkerboard",
            Modifier::DotGrid(_) => "Dot grid",
            Modifier::CellularAutomata(_) => "Cellular automata",
            Modifier::RandomWalkDungeon(_) => "Random walk dungeon",
            Modifier::Maze(_) => "Maze",
            Modifier::BspDungeon(_) => "BSP dungeon",
            Modifier::Shapes(_) => "Shapes",
            Modifier::PoissonDisc(_) => "Poisson disc",
        }
    }

    /// Blueprint layers this step reads or writes
    pub fn referenced_layers(&self) -> Vec<LayerId> {
        match self {
            Modifier::Boolean(m) => m.layer.into_iter().collect(),
            Modifier::Add(m) => m.layers.clone(),
            Modifier::Subtract(m) => m.layers.clone(),
            Modifier::SelectBasedOnNeighbour(m) => m.layer.into_iter().collect(),
            Modifier::PushToPaintPositions(m) => m.layer.into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl BlueprintModifier for Modifier {
    fn execute(&self, cells: &CellSet, ctx: &mut ModifierContext<'_>) -> Result<CellSet> {
        self.as_modifier().execute(cells, ctx)
    }
}

/// A pipeline entry that can be switched off without removing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierStep {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub modifier: Modifier,
}

fn default_enabled() -> bool {
    true
}

impl ModifierStep {
    pub fn new(modifier: Modifier) -> Self {
        Self { enabled: true, modifier }
    }
}

impl From<Modifier> for ModifierStep {
    fn from(modifier: Modifier) -> Self {
        Self::new(modifier)
    }
}

/// Run `steps` in order over `input`.
///
/// Disabled steps are skipped. A failing step is logged and skipped,
/// leaving its input to the next step.
pub fn run_pipeline(steps: &[ModifierStep], input: &CellSet, ctx: &mut ModifierContext<'_>) -> CellSet {
    let mut cells = input.clone();
    for (i, step) in steps.iter().enumerate() {
        if !step.enabled {
            continue;
        }
        match step.modifier.execute(&cells, ctx) {
            Ok(next) => {
                log::debug!("Step {} ({}): {} -> {} cells", i, step.modifier.name(), cells.len(), next.len());
                cells = next;
            }
            Err(e) => {
                log::warn!("Skipping step {} ({}): {}", i, step.modifier.name(), e);
            }
        }
    }
    cells
}
