//! Objects build layer: scatters weighted prefabs over blueprint cells.

use std::collections::{BTreeMap, HashSet};

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::blueprint::BlueprintLayer;
use crate::core::{Error, LayerId, LayerRng, Result, TilePos, new_layer_id, rng};
use crate::grid::CellSet;
use crate::render::{ObjectInstance, RenderInstruction};
use crate::world::WorldSettings;

use super::grid::ClusterGrid;
use super::mesh_settings::{MergePass, MeshGenerationSettings};
use super::selection::random_weighted;
use super::{BuildContext, BuildOutcome, TileData};

/// Weighted prefab candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabObject {
    pub prefab: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl PrefabObject {
    pub fn new(prefab: impl Into<String>, weight: f32) -> Self {
        Self {
            prefab: prefab.into(),
            weight,
        }
    }
}

/// Random scale, either one factor for all axes or one per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub uniform: bool,
    pub uniform_min: f32,
    pub uniform_max: f32,
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            uniform: false,
            uniform_min: 1.0,
            uniform_max: 1.0,
            min: Vec3::ONE,
            max: Vec3::ONE,
        }
    }
}

impl ScaleRange {
    fn sample(&self, rng: &mut LayerRng) -> Vec3 {
        if self.uniform {
            Vec3::splat(rng.next_float(self.uniform_min, self.uniform_max))
        } else {
            sample_vec3(rng, self.min, self.max)
        }
    }
}

/// Euler angle ranges in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationRange {
    pub min: Vec3,
    pub max: Vec3,
}

impl RotationRange {
    fn sample(&self, rng: &mut LayerRng) -> Vec3 {
        sample_vec3(rng, self.min, self.max)
    }
}

fn sample_vec3(rng: &mut LayerRng, min: Vec3, max: Vec3) -> Vec3 {
    let x = rng.next_float(min.x, max.x);
    let y = rng.next_float(min.y, max.y);
    let z = rng.next_float(min.z, max.z);
    Vec3::new(x, y, z)
}

/// Extra prefabs scattered around every placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSpawnSettings {
    pub prefab: String,
    pub radius: f32,
    pub count: u32,
    #[serde(default)]
    pub scale: ScaleRange,
    #[serde(default)]
    pub rotation: RotationRange,
}

/// Orientation of objects towards the cells of another layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSettings {
    pub layer: LayerId,
    #[serde(default)]
    pub y_rotation_offset: f32,
    /// Swap the north and south rotations
    #[serde(default)]
    pub invert: bool,
}

/// Build layer placing one prefab per blueprint cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectBuildLayer {
    pub guid: LayerId,
    pub name: String,
    pub is_enabled: bool,
    pub blueprint_layer: Option<LayerId>,
    pub prefab_objects: Vec<PrefabObject>,
    pub child_spawn_settings: Vec<ChildSpawnSettings>,
    pub orientation: Option<OrientationSettings>,
    pub mesh_generation_override: Option<MeshGenerationSettings>,
    /// Only the Y component moves objects and colliders
    pub layer_offset: Vec3,
    pub use_random_rotation: bool,
    pub rotation: RotationRange,
    pub use_random_scale: bool,
    pub scale: ScaleRange,
    grid: ClusterGrid,
}

impl Default for ObjectBuildLayer {
    fn default() -> Self {
        Self {
            guid: new_layer_id(),
            name: "Objects".to_string(),
            is_enabled: true,
            blueprint_layer: None,
            prefab_objects: Vec::new(),
            child_spawn_settings: Vec::new(),
            orientation: None,
            mesh_generation_override: None,
            layer_offset: Vec3::ZERO,
            use_random_rotation: false,
            rotation: RotationRange::default(),
            use_random_scale: false,
            scale: ScaleRange::default(),
            grid: ClusterGrid::default(),
        }
    }
}

impl ObjectBuildLayer {
    pub fn new(name: impl Into<String>, blueprint_layer: LayerId) -> Self {
        Self {
            name: name.into(),
            blueprint_layer: Some(blueprint_layer),
            ..Default::default()
        }
    }

    pub fn with_prefab(mut self, prefab: impl Into<String>, weight: f32) -> Self {
        self.prefab_objects.push(PrefabObject::new(prefab, weight));
        self
    }

    pub fn grid(&self) -> &ClusterGrid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut ClusterGrid {
        &mut self.grid
    }

    fn source<'a>(&self, ctx: &BuildContext<'a>) -> Result<&'a BlueprintLayer> {
        let id = self
            .blueprint_layer
            .ok_or_else(|| Error::MissingLayer(format!("{} has no blueprint layer", self.name)))?;
        ctx.blueprint(&id).ok_or_else(|| Error::MissingLayer(id.to_string()))
    }

    pub fn execute(&mut self, ctx: &BuildContext<'_>) -> Result<BuildOutcome> {
        let blueprint = self.source(ctx)?;
        let indexer = ctx.settings.indexer();
        if self.grid.indexer() != indexer {
            self.grid = ClusterGrid::new(indexer);
        }

        let diff = self.grid.diff(blueprint.all_positions(), &[]);
        let tiles: Vec<TileData> = diff
            .working
            .iter()
            .map(|c| TileData::new(TilePos::from_cell(*c), *c))
            .collect();
        let stored = self.grid.commit(&diff, tiles);

        let orientation = self
            .orientation
            .and_then(|o| ctx.blueprint(&o.layer).map(|l| (o, l.all_positions())));

        let mut clusters: BTreeMap<i32, Vec<IVec2>> = BTreeMap::new();
        for tile in &stored {
            clusters.entry(indexer.key_of_cell(tile.world_position)).or_default().push(tile.world_position);
        }

        let mut instructions: Vec<RenderInstruction> = diff
            .dirty_clusters
            .iter()
            .map(|&cluster| RenderInstruction::DestroyCluster { layer: self.guid, cluster })
            .collect();

        let mut populated = HashSet::new();
        for (cluster, mut cells) in clusters {
            cells.sort_by_key(|c| (c.y, c.x));
            for cell in cells {
                for object in self.place_objects(cell, blueprint, ctx.settings, orientation) {
                    instructions.push(RenderInstruction::SpawnObject { layer: self.guid, cluster, object });
                    populated.insert(cluster);
                }
            }
        }

        let merge = MergePass {
            layer: self.guid,
            mesh: MeshGenerationSettings::resolve(self.mesh_generation_override.as_ref(), ctx.settings),
            blueprint,
            indexer,
            cell_size: ctx.settings.cell_size,
            y_offset: self.layer_offset.y,
        };
        instructions.extend(merge.run(&diff.dirty_clusters, &populated));

        log::debug!("{}: {} objects in {} dirty clusters", self.name, stored.len(), diff.dirty_clusters.len());
        Ok(BuildOutcome {
            instructions,
            changed: !diff.is_empty(),
        })
    }

    /// The parent object for `cell` followed by its children
    fn place_objects(
        &self,
        cell: IVec2,
        blueprint: &BlueprintLayer,
        settings: &WorldSettings,
        orientation: Option<(OrientationSettings, &CellSet)>,
    ) -> Vec<ObjectInstance> {
        let mut rng = LayerRng::new(object_seed(cell, settings));
        let prefab = match self.prefab_objects.len() {
            0 => return Vec::new(),
            1 => &self.prefab_objects[0],
            _ => {
                let weights: Vec<f32> = self.prefab_objects.iter().map(|p| p.weight).collect();
                match random_weighted(&weights, &mut rng) {
                    Some(i) => &self.prefab_objects[i],
                    None => return Vec::new(),
                }
            }
        };

        let mut rotation = Vec3::ZERO;
        if self.use_random_rotation {
            rotation = self.rotation.sample(&mut rng);
        }
        if let Some((orient, cells)) = orientation {
            let x = rng.next_float(self.rotation.min.x, self.rotation.max.x);
            let z = rng.next_float(self.rotation.min.z, self.rotation.max.z);
            rotation = Vec3::new(x, orientation_rotation(cell, cells, orient.invert) + orient.y_rotation_offset, z);
        }
        let scale = if self.use_random_scale { self.scale.sample(&mut rng) } else { Vec3::ONE };

        let cs = settings.cell_size;
        let position = Vec3::new(
            cell.x as f32 * cs,
            blueprint.default_layer_height + self.layer_offset.y,
            cell.y as f32 * cs,
        );

        let mut objects = vec![ObjectInstance {
            prefab: prefab.prefab.clone(),
            position,
            rotation,
            scale,
            is_child: false,
        }];
        for child in &self.child_spawn_settings {
            for _ in 0..child.count {
                let offset = rng.unit_direction2() * child.radius;
                let rotation = child.rotation.sample(&mut rng);
                let scale = child.scale.sample(&mut rng);
                objects.push(ObjectInstance {
                    prefab: child.prefab.clone(),
                    position: position + Vec3::new(offset.x, 0.0, offset.y),
                    rotation,
                    scale,
                    is_child: true,
                });
            }
        }
        objects
    }
}

/// Deterministic per-cell seed; never 0
pub fn object_seed(cell: IVec2, settings: &WorldSettings) -> u32 {
    let seed = if settings.use_global_random_seed {
        let global = settings.global_random_seed;
        global
            .wrapping_add(cell.x as u32)
            .wrapping_add(global.wrapping_mul(cell.y as u32))
    } else {
        (cell.x.wrapping_mul(73_856_093) ^ cell.y.wrapping_mul(19_349_663)) as u32
    };
    rng::non_zero(seed)
}

/// Y rotation facing the first occupied neighbour in `cells`.
///
/// Cardinal neighbours win over diagonals; diagonal angles snap to the
/// nearest multiple of 90 degrees, ties to even.
pub fn orientation_rotation(cell: IVec2, cells: &CellSet, invert: bool) -> f32 {
    let (north, south) = if invert { (90.0, 270.0) } else { (270.0, 90.0) };
    let cardinals = [
        (IVec2::new(0, 1), north),
        (IVec2::new(1, 0), 0.0),
        (IVec2::new(0, -1), south),
        (IVec2::new(-1, 0), 180.0),
    ];
    if let Some((_, rotation)) = cardinals.iter().find(|(o, _)| cells.contains(cell + *o)) {
        return *rotation;
    }

    let diagonals = [IVec2::new(1, 1), IVec2::new(1, -1), IVec2::new(-1, -1), IVec2::new(-1, 1)];
    for d in diagonals {
        if cells.contains(cell + d) {
            let mut angle = (d.y as f32).atan2(d.x as f32).to_degrees();
            if angle < 0.0 {
                angle += 360.0;
            }
            return (angle / 90.0).round_ties_even() * 90.0;
        }
    }
    0.0
}
