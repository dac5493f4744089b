//! World configuration: settings plus every layer and preset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blueprint::BlueprintLayer;
use crate::build::{BuildContext, BuildLayer};
use crate::core::{Error, LayerId, Result};
use crate::tiles::TilePreset;

use super::WorldSettings;

/// Everything needed to regenerate a world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub settings: WorldSettings,
    /// Executed in order; later layers may read earlier outputs
    pub blueprint_layers: Vec<BlueprintLayer>,
    pub build_layers: Vec<BuildLayer>,
    /// Tile presets by name
    pub tile_presets: BTreeMap<String, TilePreset>,
}

impl Configuration {
    pub fn new(settings: WorldSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Append a blueprint layer and return its guid
    pub fn add_blueprint_layer(&mut self, layer: BlueprintLayer) -> LayerId {
        let guid = layer.guid;
        self.blueprint_layers.push(layer);
        guid
    }

    /// Append a build layer and return its guid
    pub fn add_build_layer(&mut self, layer: impl Into<BuildLayer>) -> LayerId {
        let layer = layer.into();
        let guid = layer.guid();
        self.build_layers.push(layer);
        guid
    }

    pub fn add_tile_preset(&mut self, preset: TilePreset) {
        self.tile_presets.insert(preset.name.clone(), preset);
    }

    pub fn blueprint_layer(&self, guid: &LayerId) -> Option<&BlueprintLayer> {
        self.blueprint_layers.iter().find(|l| l.guid == *guid)
    }

    pub fn blueprint_index_by_name(&self, name: &str) -> Result<usize> {
        self.blueprint_layers
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| Error::MissingLayer(name.to_string()))
    }

    pub fn build_index_by_name(&self, name: &str) -> Result<usize> {
        self.build_layers
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| Error::MissingLayer(name.to_string()))
    }

    /// Split borrow: a build context over everything but the build layers
    pub fn split_build(&mut self) -> (BuildContext<'_>, &mut [BuildLayer]) {
        let ctx = BuildContext::new(&self.settings, &self.blueprint_layers, &self.tile_presets);
        (ctx, &mut self.build_layers)
    }

    /// Check that every referenced layer and preset exists.
    ///
    /// Execution tolerates dangling references; this is for hosts that
    /// want to reject a configuration up front.
    pub fn validate(&self) -> Result<()> {
        if self.settings.width <= 0 || self.settings.height <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "map size {}x{}",
                self.settings.width, self.settings.height
            )));
        }
        if self.settings.cell_size <= 0.0 {
            return Err(Error::InvalidConfiguration(format!("cell size {}", self.settings.cell_size)));
        }
        for layer in &self.build_layers {
            let referenced = layer.blueprint_layer().into_iter().chain(layer.override_layers());
            for guid in referenced {
                if self.blueprint_layer(&guid).is_none() {
                    return Err(Error::MissingLayer(format!("{} references {}", layer.name(), guid)));
                }
            }
            if let BuildLayer::Tiles(tiles) = layer {
                let names = tiles
                    .presets_top
                    .iter()
                    .chain(&tiles.presets_middle)
                    .chain(&tiles.presets_bottom)
                    .map(|p| p.preset.as_str())
                    .chain(tiles.tile_layers.iter().flat_map(|t| t.overrides.iter().map(|o| o.preset.as_str())));
                for name in names {
                    if !self.tile_presets.contains_key(name) {
                        return Err(Error::InvalidConfiguration(format!(
                            "{} uses unknown preset {}",
                            layer.name(),
                            name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::TilesBuildLayer;
    use crate::core::new_layer_id;

    #[test]
    fn test_lookup_by_name() {
        let mut config = Configuration::default();
        config.add_blueprint_layer(BlueprintLayer::new("ground"));
        assert_eq!(config.blueprint_index_by_name("ground").unwrap(), 0);
        assert!(matches!(config.blueprint_index_by_name("water"), Err(Error::MissingLayer(_))));
        assert!(config.build_index_by_name("tiles").is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = Configuration::default();
        let ground = config.add_blueprint_layer(BlueprintLayer::new("ground"));
        config.add_tile_preset(TilePreset::dual_from_prefix("grass", "grass"));
        config.add_build_layer(TilesBuildLayer::new("tiles", ground).with_preset("grass", 1.0));
        assert!(config.validate().is_ok());

        config.add_build_layer(TilesBuildLayer::new("dangling", new_layer_id()));
        assert!(matches!(config.validate(), Err(Error::MissingLayer(_))));
        config.build_layers.pop();

        config.add_build_layer(TilesBuildLayer::new("unknown", ground).with_preset("lava", 1.0));
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
    }
}
