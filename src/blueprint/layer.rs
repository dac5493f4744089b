//! Blueprint layer storage, seeding and execution.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterIndexer;
use crate::core::{LayerId, LayerRng, new_layer_id, rng};
use crate::grid::CellSet;
use crate::world::WorldSettings;

use super::modifier::{ModifierContext, ModifierStep, SideEffect, run_pipeline};

/// Result of running a layer's pipeline, before it is stored
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub cells: CellSet,
    pub side_effects: Vec<SideEffect>,
}

/// Named cell layer with an ordered modifier stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BlueprintLayerData", into = "BlueprintLayerData")]
pub struct BlueprintLayer {
    pub guid: LayerId,
    pub name: String,
    pub is_enabled: bool,
    /// Seed this layer independently of the world seed
    pub random_seed_override: bool,
    /// With the override on: use `custom_seed` rather than a clock seed
    pub custom_random_seed: bool,
    pub custom_seed: u32,
    /// Base height of tiles built from this layer
    pub default_layer_height: f32,
    pub modifiers: Vec<ModifierStep>,
    paint_grid: CellSet,
    all_positions: CellSet,
    current_seed: u32,
}

impl BlueprintLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            guid: new_layer_id(),
            name: name.into(),
            is_enabled: true,
            random_seed_override: false,
            custom_random_seed: false,
            custom_seed: 0,
            default_layer_height: 0.0,
            modifiers: Vec::new(),
            paint_grid: CellSet::new(),
            all_positions: CellSet::new(),
            current_seed: 0,
        }
    }

    /// Builder-style append of a pipeline step
    pub fn with_modifier(mut self, step: impl Into<ModifierStep>) -> Self {
        self.modifiers.push(step.into());
        self
    }

    pub fn paint_positions(&self) -> &CellSet {
        &self.paint_grid
    }

    /// Pipeline output, including painted cells
    pub fn all_positions(&self) -> &CellSet {
        &self.all_positions
    }

    pub fn has_position(&self, pos: IVec2) -> bool {
        self.all_positions.contains(pos)
    }

    pub fn cells_in_radius(&self, center: IVec2, radius: f32) -> Vec<IVec2> {
        self.all_positions.cells_in_radius(center, radius)
    }

    /// Output cells falling in a cluster, using the plain `floor(c / s)` key
    pub fn positions_in_cluster(&self, indexer: &ClusterIndexer, key: i32) -> Vec<IVec2> {
        self.all_positions
            .sorted()
            .into_iter()
            .filter(|c| indexer.key_of_cell(*c) == key)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Cell editing
    // -----------------------------------------------------------------------

    pub fn add_cells(&mut self, cells: impl IntoIterator<Item = IVec2>) {
        for c in cells {
            self.paint_grid.add(c);
            self.all_positions.add(c);
        }
    }

    pub fn remove_cells(&mut self, cells: impl IntoIterator<Item = IVec2>) {
        for c in cells {
            self.paint_grid.remove(c);
            self.all_positions.remove(c);
        }
    }

    /// Drop all painted and generated cells
    pub fn clear_layer(&mut self) {
        self.paint_grid.clear();
        self.all_positions.clear();
    }

    /// Paint every cell of a `width x height` map
    pub fn fill_layer(&mut self, width: i32, height: i32) {
        let cells: Vec<IVec2> = (0..width)
            .flat_map(|x| (0..height).map(move |y| IVec2::new(x, y)))
            .collect();
        self.add_cells(cells);
    }

    /// Discard generated cells, keeping only painted ones
    pub fn reset_layer(&mut self) {
        self.all_positions = self.paint_grid.clone();
    }

    pub(crate) fn set_all_positions(&mut self, cells: CellSet) {
        self.all_positions = cells;
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Seed for the next execution.
    ///
    /// The layer override wins over the world seed; without a custom seed
    /// the override draws a fresh clock seed each time.
    pub fn next_seed(&mut self, settings: &WorldSettings) -> u32 {
        let seed = if self.random_seed_override {
            if self.custom_random_seed {
                self.custom_seed
            } else {
                rng::tick_seed()
            }
        } else if settings.use_global_random_seed {
            settings.global_random_seed
        } else {
            settings.current_random_seed
        };
        self.current_seed = rng::non_zero(seed);
        self.current_seed
    }

    /// Seed used by the last execution
    pub fn current_seed(&self) -> u32 {
        self.current_seed
    }

    /// Run the pipeline over the painted cells.
    ///
    /// `layers` provides the outputs of other layers to steps that
    /// reference them.
    pub fn compute(&self, layers: &[BlueprintLayer], settings: &WorldSettings, seed: u32) -> PipelineOutput {
        let mut ctx = ModifierContext::new(settings.width, settings.height, LayerRng::new(seed), layers);
        let cells = run_pipeline(&self.modifiers, &self.paint_grid, &mut ctx);
        PipelineOutput {
            cells,
            side_effects: ctx.into_side_effects(),
        }
    }

    /// Execute without access to other layers; side effects are returned
    pub fn execute(&mut self, settings: &WorldSettings) -> Vec<SideEffect> {
        let seed = self.next_seed(settings);
        let output = self.compute(&[], settings, seed);
        self.all_positions = output.cells;
        output.side_effects
    }
}

/// Flattened on-disk form of a blueprint layer
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlueprintLayerData {
    guid: LayerId,
    name: String,
    is_enabled: bool,
    #[serde(default)]
    random_seed_override: bool,
    #[serde(default)]
    custom_random_seed: bool,
    #[serde(default)]
    custom_seed: u32,
    #[serde(default)]
    default_layer_height: f32,
    #[serde(default)]
    modifiers: Vec<ModifierStep>,
    #[serde(default)]
    paint_positions: Vec<IVec2>,
    #[serde(default)]
    world_positions: Vec<IVec2>,
}

impl From<BlueprintLayer> for BlueprintLayerData {
    fn from(layer: BlueprintLayer) -> Self {
        Self {
            guid: layer.guid,
            name: layer.name,
            is_enabled: layer.is_enabled,
            random_seed_override: layer.random_seed_override,
            custom_random_seed: layer.custom_random_seed,
            custom_seed: layer.custom_seed,
            default_layer_height: layer.default_layer_height,
            modifiers: layer.modifiers,
            paint_positions: layer.paint_grid.sorted(),
            world_positions: layer.all_positions.sorted(),
        }
    }
}

impl From<BlueprintLayerData> for BlueprintLayer {
    fn from(data: BlueprintLayerData) -> Self {
        let paint_grid: CellSet = data.paint_positions.into_iter().collect();
        let mut all_positions: CellSet = data.world_positions.into_iter().collect();
        all_positions.union_with(&paint_grid);
        Self {
            guid: data.guid,
            name: data.name,
            is_enabled: data.is_enabled,
            random_seed_override: data.random_seed_override,
            custom_random_seed: data.custom_random_seed,
            custom_seed: data.custom_seed,
            default_layer_height: data.default_layer_height,
            modifiers: data.modifiers,
            paint_grid,
            all_positions,
            current_seed: 0,
        }
    }
}
