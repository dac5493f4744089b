//! World manager: runs the blueprint and build stacks of a configuration.

use std::collections::HashSet;
use std::time::Instant;

use glam::{IVec2, Vec2, Vec3};

use crate::blueprint::SideEffect;
use crate::build::{BuildContext, BuildLayer, TileData};
use crate::core::{LayerId, Result};
use crate::render::RenderInstruction;

use super::Configuration;

/// How much of the built world a build execution may reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Rebuild only clusters touched by changes
    #[default]
    Normal,
    /// Reset every build layer first
    FromScratch,
}

type ProgressFn = Box<dyn FnMut(f32) + Send>;

/// Owns a [`Configuration`] and executes it.
///
/// Build operations return the render instructions to apply, in order.
pub struct WorldManager {
    configuration: Configuration,
    last_cell_size: Option<f32>,
    /// Build layers to re-execute after the main build pass
    late_update: HashSet<LayerId>,
    progress: Option<ProgressFn>,
}

impl WorldManager {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            last_cell_size: None,
            late_update: HashSet::new(),
            progress: None,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.configuration
    }

    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }

    /// Receive progress in `[0, 1]` during blueprint and build execution
    pub fn set_progress_callback(&mut self, callback: impl FnMut(f32) + Send + 'static) {
        self.progress = Some(Box::new(callback));
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Execute the blueprint stack, then rebuild every build layer from scratch
    pub fn generate_complete_map(&mut self) -> Vec<RenderInstruction> {
        self.execute_blueprint_layers();
        self.execute_build_layers(BuildMode::FromScratch)
    }

    /// Run every enabled blueprint layer's pipeline in order.
    ///
    /// Each layer sees the outputs of the layers before it.
    /// `PushToPaintPositions` effects land after the layer that emits them.
    pub fn execute_blueprint_layers(&mut self) {
        let start = Instant::now();
        let Self { configuration, progress, .. } = self;
        let settings = &mut configuration.settings;
        let layers = &mut configuration.blueprint_layers;
        settings.refresh_seed();

        for layer in layers.iter_mut().filter(|l| l.is_enabled) {
            layer.reset_layer();
        }

        let total = layers.iter().filter(|l| l.is_enabled).count();
        let mut done = 0;
        for i in 0..layers.len() {
            if !layers[i].is_enabled {
                continue;
            }
            let seed = layers[i].next_seed(settings);
            let output = layers[i].compute(layers, settings, seed);
            log::debug!("Blueprint layer {}: {} cells", layers[i].name, output.cells.len());
            layers[i].set_all_positions(output.cells);

            for effect in output.side_effects {
                match effect {
                    SideEffect::PushToPaint { layer, cells, clear_previous } => {
                        match layers.iter_mut().find(|l| l.guid == layer) {
                            Some(target) => {
                                if clear_previous {
                                    target.clear_layer();
                                }
                                target.add_cells(cells.iter());
                            }
                            None => log::warn!("Push to paint target {} not found", layer),
                        }
                    }
                }
            }

            done += 1;
            report(progress, done as f32 / total as f32);
        }

        log::info!("Executed {} blueprint layers in {:.2?}", total, start.elapsed());
    }

    /// Run every enabled build layer and collect its render instructions.
    ///
    /// A changed cell size or `FromScratch` resets all build layers first.
    /// Disabled layers are reset. A layer whose blueprint layer is missing
    /// is logged and skipped.
    pub fn execute_build_layers(&mut self, mode: BuildMode) -> Vec<RenderInstruction> {
        let start = Instant::now();
        let Self {
            configuration,
            last_cell_size,
            late_update,
            progress,
        } = self;
        configuration.settings.refresh_seed();

        let cell_size = configuration.settings.cell_size;
        let reset_all = mode == BuildMode::FromScratch || *last_cell_size != Some(cell_size);
        *last_cell_size = Some(cell_size);

        let mut instructions = Vec::new();
        let (ctx, layers) = configuration.split_build();
        let indexer = ctx.settings.indexer();
        for layer in layers.iter_mut() {
            if !layer.is_enabled() || reset_all || layer.grid().indexer() != indexer {
                instructions.extend(layer.reset(ctx.settings));
            }
        }

        let total = layers.iter().filter(|l| l.is_enabled()).count();
        let mut done = 0;
        let mut changed_sources: Vec<(usize, LayerId)> = Vec::new();
        for (i, layer) in layers.iter_mut().enumerate() {
            if !layer.is_enabled() {
                continue;
            }
            match layer.execute(&ctx) {
                Ok(outcome) => {
                    if outcome.changed {
                        changed_sources.extend(layer.blueprint_layer().map(|b| (i, b)));
                    }
                    instructions.extend(outcome.instructions);
                }
                Err(e) => log::warn!("Skipping build layer {}: {}", layer.name(), e),
            }
            done += 1;
            report(progress, done as f32 / total as f32);
        }

        for (j, layer) in layers.iter().enumerate() {
            if !layer.is_enabled() {
                continue;
            }
            let overrides = layer.override_layers();
            if changed_sources.iter().any(|(i, b)| *i != j && overrides.contains(b)) {
                late_update.insert(layer.guid());
            }
        }
        if !late_update.is_empty() {
            instructions.extend(run_late_update(late_update, &ctx, layers));
        }

        log::info!(
            "Executed {} build layers in {:.2?}: {} instructions",
            total,
            start.elapsed(),
            instructions.len()
        );
        instructions
    }

    /// Clear every blueprint layer and reset every build layer
    pub fn reset_configuration(&mut self) -> Vec<RenderInstruction> {
        self.clear_all_blueprint_layers();
        let settings = &self.configuration.settings;
        self.configuration
            .build_layers
            .iter_mut()
            .flat_map(|l| l.reset(settings))
            .collect()
    }

    pub fn clear_all_blueprint_layers(&mut self) {
        for layer in &mut self.configuration.blueprint_layers {
            layer.clear_layer();
        }
    }

    // -----------------------------------------------------------------------
    // Cell editing by layer name
    // -----------------------------------------------------------------------

    pub fn add_cells_to_layer(&mut self, name: &str, cells: impl IntoIterator<Item = IVec2>) -> Result<()> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        self.configuration.blueprint_layers[i].add_cells(cells);
        Ok(())
    }

    pub fn remove_cells_from_layer(&mut self, name: &str, cells: impl IntoIterator<Item = IVec2>) -> Result<()> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        self.configuration.blueprint_layers[i].remove_cells(cells);
        Ok(())
    }

    pub fn clear_layer(&mut self, name: &str) -> Result<()> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        self.configuration.blueprint_layers[i].clear_layer();
        Ok(())
    }

    /// Paint every cell of the map into a layer
    pub fn fill_layer(&mut self, name: &str) -> Result<()> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        let (width, height) = (self.configuration.settings.width, self.configuration.settings.height);
        self.configuration.blueprint_layers[i].fill_layer(width, height);
        Ok(())
    }

    pub fn set_blueprint_layer_active(&mut self, name: &str, active: bool) -> Result<()> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        self.configuration.blueprint_layers[i].is_enabled = active;
        Ok(())
    }

    pub fn set_build_layer_active(&mut self, name: &str, active: bool) -> Result<()> {
        let i = self.configuration.build_index_by_name(name)?;
        self.configuration.build_layers[i].set_enabled(active);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn cell_position_exists(&self, name: &str, cell: IVec2) -> Result<bool> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        Ok(self.configuration.blueprint_layers[i].has_position(cell))
    }

    /// Cells of a layer within `radius` cells of a world position
    pub fn cell_positions_in_radius(&self, name: &str, world: Vec3, radius: f32) -> Result<Vec<IVec2>> {
        let i = self.configuration.blueprint_index_by_name(name)?;
        let center = self.relative_grid_position(world);
        Ok(self.configuration.blueprint_layers[i].cells_in_radius(center, radius))
    }

    /// Tile of a build layer at a world-space XZ position
    pub fn tile_data_at(&self, name: &str, position: Vec2) -> Result<Option<TileData>> {
        let i = self.configuration.build_index_by_name(name)?;
        Ok(self.configuration.build_layers[i].tile_data_at(position, self.configuration.settings.cell_size))
    }

    /// Highest enabled blueprint height at a world position, plus the
    /// highest Y offset of a tiles layer with a tile there
    pub fn sample_layer_height(&self, world: Vec3) -> f32 {
        let cell = self.relative_grid_position(world);
        let base = self
            .configuration
            .blueprint_layers
            .iter()
            .filter(|l| l.is_enabled && l.has_position(cell))
            .map(|l| l.default_layer_height)
            .fold(0.0_f32, f32::max);
        let offset = self
            .configuration
            .build_layers
            .iter()
            .filter_map(|l| match l {
                BuildLayer::Tiles(tiles) => tiles.tile_at(cell.as_vec2()).map(|_| tiles.layer_y_offset),
                BuildLayer::Objects(_) => None,
            })
            .fold(0.0_f32, f32::max);
        base + offset
    }

    /// Nearest cell to a world position
    pub fn relative_grid_position(&self, world: Vec3) -> IVec2 {
        let cs = self.configuration.settings.cell_size;
        IVec2::new((world.x / cs).round() as i32, (world.z / cs).round() as i32)
    }

    /// Whether a world-space XZ position lies over the map
    pub fn is_relative_position_over_grid(&self, position: Vec2) -> bool {
        let settings = &self.configuration.settings;
        let extent = Vec2::new(settings.width as f32, settings.height as f32) * settings.cell_size;
        position.x >= 0.0 && position.y >= 0.0 && position.x < extent.x && position.y < extent.y
    }
}

fn report(progress: &mut Option<ProgressFn>, value: f32) {
    if let Some(callback) = progress {
        callback(value);
    }
}

/// Rebuild the queued layers from scratch and empty the queue
fn run_late_update(
    queue: &mut HashSet<LayerId>,
    ctx: &BuildContext<'_>,
    layers: &mut [BuildLayer],
) -> Vec<RenderInstruction> {
    let mut instructions = Vec::new();
    for layer in layers.iter_mut().filter(|l| queue.contains(&l.guid())) {
        log::debug!("Late update of {}", layer.name());
        instructions.extend(layer.reset(ctx.settings));
        match layer.execute(ctx) {
            Ok(outcome) => instructions.extend(outcome.instructions),
            Err(e) => log::warn!("Skipping late update of {}: {}", layer.name(), e),
        }
    }
    queue.clear();
    instructions
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::blueprint::modifiers::{Expand, PushToPaintPositions};
    use crate::blueprint::{BlueprintLayer, Modifier};
    use crate::build::{ObjectBuildLayer, TilePresetOverride, TilesBuildLayer};
    use crate::core::Adjacency;
    use crate::render::{RecordingRenderer, Renderer};
    use crate::tiles::TilePreset;
    use crate::world::WorldSettings;

    fn manager() -> WorldManager {
        let mut config = Configuration::new(WorldSettings::with_seed(20, 20, 11));
        let ground = config.add_blueprint_layer(BlueprintLayer::new("ground"));
        config.add_tile_preset(TilePreset::dual_from_prefix("grass", "grass"));
        config.add_build_layer(TilesBuildLayer::new("tiles", ground).with_preset("grass", 1.0));
        WorldManager::new(config)
    }

    #[test]
    fn test_generate_and_edit() {
        let mut m = manager();
        m.add_cells_to_layer("ground", (0..5).map(|x| IVec2::new(x, 0))).unwrap();
        let mut renderer = RecordingRenderer::new();
        renderer.apply_all(&m.generate_complete_map());
        // five cells in a row touch six dual columns of two tiles
        assert_eq!(renderer.tile_count(), 12);

        m.remove_cells_from_layer("ground", [IVec2::new(4, 0)]).unwrap();
        m.execute_blueprint_layers();
        renderer.apply_all(&m.execute_build_layers(BuildMode::Normal));
        assert_eq!(renderer.tile_count(), 10);
    }

    #[test]
    fn test_unknown_layer_names() {
        let mut m = manager();
        assert!(m.add_cells_to_layer("water", [IVec2::ZERO]).is_err());
        assert!(m.set_build_layer_active("nothing", false).is_err());
        assert!(m.tile_data_at("nothing", Vec2::ZERO).is_err());
    }

    #[test]
    fn test_normal_rerun_is_empty() {
        let mut m = manager();
        m.fill_layer("ground").unwrap();
        m.generate_complete_map();
        m.execute_blueprint_layers();
        assert!(m.execute_build_layers(BuildMode::Normal).is_empty());
    }

    #[test]
    fn test_disabled_build_layer_is_reset() {
        let mut m = manager();
        m.add_cells_to_layer("ground", [IVec2::new(3, 3)]).unwrap();
        let mut renderer = RecordingRenderer::new();
        renderer.apply_all(&m.generate_complete_map());
        assert_eq!(renderer.tile_count(), 4);

        m.set_build_layer_active("tiles", false).unwrap();
        renderer.apply_all(&m.execute_build_layers(BuildMode::Normal));
        assert_eq!(renderer.tile_count(), 0);
    }

    #[test]
    fn test_cell_size_change_rebuilds() {
        let mut m = manager();
        m.add_cells_to_layer("ground", [IVec2::new(3, 3)]).unwrap();
        m.generate_complete_map();
        m.configuration_mut().settings.cell_size = 2.0;
        let out = m.execute_build_layers(BuildMode::Normal);
        let positions: Vec<Vec3> = out
            .iter()
            .filter_map(|i| match i {
                RenderInstruction::SpawnTile { tile, .. } => Some(tile.position),
                _ => None,
            })
            .collect();
        assert_eq!(positions.len(), 4);
        assert!(positions.contains(&Vec3::new(7.0, 0.0, 7.0)));
    }

    #[test]
    fn test_missing_blueprint_skips_layer() {
        let mut m = manager();
        m.configuration_mut()
            .add_build_layer(ObjectBuildLayer::new("orphans", crate::core::new_layer_id()).with_prefab("x", 1.0));
        m.add_cells_to_layer("ground", [IVec2::new(1, 1)]).unwrap();
        let out = m.generate_complete_map();
        assert!(out.iter().any(|i| matches!(i, RenderInstruction::SpawnTile { .. })));
        assert!(!out.iter().any(|i| matches!(i, RenderInstruction::SpawnObject { .. })));
    }

    #[test]
    fn test_push_to_paint_and_expand() {
        let mut m = manager();
        let config = m.configuration_mut();
        let ground = config.blueprint_layers[0].guid;
        let seed = BlueprintLayer::new("seed")
            .with_modifier(Modifier::PushToPaintPositions(PushToPaintPositions {
                layer: Some(ground),
                clear_previous: true,
            }));
        config.blueprint_layers.insert(0, seed);
        config.blueprint_layers[1].modifiers.push(
            Modifier::Expand(Expand { direction: Adjacency::Four, iterations: 1 }).into(),
        );

        m.add_cells_to_layer("seed", [IVec2::new(5, 5)]).unwrap();
        m.execute_blueprint_layers();
        assert!(m.cell_position_exists("ground", IVec2::new(5, 5)).unwrap());
        assert!(m.cell_position_exists("ground", IVec2::new(5, 6)).unwrap());
        assert!(!m.cell_position_exists("ground", IVec2::new(6, 6)).unwrap());
    }

    #[test]
    fn test_late_update_of_override_layers() {
        let mut config = Configuration::new(WorldSettings::with_seed(20, 20, 11));
        let ground = config.add_blueprint_layer(BlueprintLayer::new("ground"));
        let sand = config.add_blueprint_layer(BlueprintLayer::new("sand"));
        config.add_tile_preset(TilePreset::dual_from_prefix("grass", "grass"));
        config.add_tile_preset(TilePreset::dual_from_prefix("beach", "beach"));
        let mut tiles = TilesBuildLayer::new("tiles", ground).with_preset("grass", 1.0);
        tiles.tile_layers[0].overrides.push(TilePresetOverride::new(sand, "beach"));
        config.add_build_layer(tiles);
        config.add_build_layer(TilesBuildLayer::new("sand tiles", sand).with_preset("beach", 1.0));
        let mut m = WorldManager::new(config);

        m.fill_layer("ground").unwrap();
        m.generate_complete_map();
        m.add_cells_to_layer("sand", [IVec2::new(10, 10)]).unwrap();
        m.execute_blueprint_layers();
        let out = m.execute_build_layers(BuildMode::Normal);

        let tiles_guid = m.configuration().build_layers[0].guid();
        let spawned = out
            .iter()
            .filter(|i| matches!(i, RenderInstruction::SpawnTile { layer, .. } if *layer == tiles_guid))
            .count();
        // the late update rebuilds the whole 21 x 21 dual grid of the ground layer
        assert!(spawned >= 21 * 21);
        assert!(m.late_update.is_empty());
    }

    #[test]
    fn test_progress_reaches_one() {
        let mut m = manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        m.set_progress_callback(move |p| sink.lock().unwrap().push(p));
        m.generate_complete_map();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_grid_queries() {
        let mut m = manager();
        m.configuration_mut().settings.cell_size = 2.0;
        m.configuration_mut().blueprint_layers[0].default_layer_height = 1.5;
        m.add_cells_to_layer("ground", [IVec2::new(3, 3), IVec2::new(4, 3)]).unwrap();
        m.generate_complete_map();

        assert_eq!(m.relative_grid_position(Vec3::new(6.2, 9.0, 5.9)), IVec2::new(3, 3));
        assert!(m.is_relative_position_over_grid(Vec2::new(39.9, 0.0)));
        assert!(!m.is_relative_position_over_grid(Vec2::new(40.0, 0.0)));
        assert!(!m.is_relative_position_over_grid(Vec2::new(-0.1, 3.0)));
        assert_eq!(m.sample_layer_height(Vec3::new(6.0, 0.0, 6.0)), 1.5);
        assert_eq!(m.sample_layer_height(Vec3::new(20.0, 0.0, 20.0)), 0.0);
        assert_eq!(m.cell_positions_in_radius("ground", Vec3::new(6.0, 0.0, 6.0), 1.0).unwrap().len(), 2);
        assert!(m.tile_data_at("tiles", Vec2::new(7.0, 7.0)).unwrap().is_some());
    }

    #[test]
    fn test_reset_configuration() {
        let mut m = manager();
        m.add_cells_to_layer("ground", [IVec2::new(1, 1)]).unwrap();
        m.generate_complete_map();
        let out = m.reset_configuration();
        assert!(out.iter().all(|i| matches!(i, RenderInstruction::DestroyCluster { .. })));
        assert!(!out.is_empty());
        assert!(!m.cell_position_exists("ground", IVec2::new(1, 1)).unwrap());
    }
}
