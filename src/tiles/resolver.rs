//! Configuration bitmask to (tile type, rotation) resolution.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::TileType;
use super::tables::{
    DUAL_ROTATION_TABLE, DUAL_TYPE_TABLE, NORMAL_MINUS_X_SCALE, NORMAL_ROTATION_TABLE,
    NORMAL_TYPE_TABLE,
};

/// Dual-grid corner bits
pub const CORNER_TOP_LEFT: u32 = 1 << 0;
pub const CORNER_TOP_RIGHT: u32 = 1 << 1;
pub const CORNER_BOTTOM_LEFT: u32 = 1 << 2;
pub const CORNER_BOTTOM_RIGHT: u32 = 1 << 3;

const ALL_CORNERS: u32 = 0b1111;

struct Lookup {
    types: HashMap<u32, TileType>,
    rotations: HashMap<u32, i32>,
}

impl Lookup {
    fn build(types: &[(TileType, &[u32])], rotations: &[(i32, &[u32])]) -> Self {
        let mut lookup = Self {
            types: HashMap::new(),
            rotations: HashMap::new(),
        };
        for (tile_type, configurations) in types {
            for c in configurations.iter() {
                lookup.types.entry(*c).or_insert(*tile_type);
            }
        }
        for (rotation, configurations) in rotations {
            for c in configurations.iter() {
                lookup.rotations.entry(*c).or_insert(*rotation);
            }
        }
        lookup
    }
}

static NORMAL_LOOKUP: OnceLock<Lookup> = OnceLock::new();
static DUAL_LOOKUP: OnceLock<Lookup> = OnceLock::new();

fn lookup(dual: bool) -> &'static Lookup {
    if dual {
        DUAL_LOOKUP.get_or_init(|| Lookup::build(DUAL_TYPE_TABLE, DUAL_ROTATION_TABLE))
    } else {
        NORMAL_LOOKUP.get_or_init(|| Lookup::build(NORMAL_TYPE_TABLE, NORMAL_ROTATION_TABLE))
    }
}

/// Resolve a configuration to its tile type and Y rotation in degrees.
///
/// Unknown configurations yield `TileType::None` with rotation 0. On the
/// dual grid, the corner patterns of [`dual_corner_rotation`] override the
/// table rotation.
pub fn resolve(configuration: u32, dual: bool) -> (TileType, i32) {
    let table = lookup(dual);
    let Some(tile_type) = table.types.get(&configuration).copied() else {
        return (TileType::None, 0);
    };
    let mut rotation = table.rotations.get(&configuration).copied().unwrap_or(0);
    if dual {
        if let Some(r) = dual_corner_rotation(configuration) {
            rotation = r;
        }
    }
    (tile_type, rotation)
}

/// Explicit rotation for four dual corner patterns; others keep the table.
pub fn dual_corner_rotation(configuration: u32) -> Option<i32> {
    const TL: u32 = CORNER_TOP_LEFT;
    const TR: u32 = CORNER_TOP_RIGHT;
    const BL: u32 = CORNER_BOTTOM_LEFT;
    const BR: u32 = CORNER_BOTTOM_RIGHT;
    match configuration & ALL_CORNERS {
        c if c == TR | BL | BR => Some(0),
        c if c == TL | BL | BR => Some(90),
        c if c == TL | TR => Some(180),
        c if c == TL | TR | BR => Some(270),
        _ => None,
    }
}

/// Normal-grid tiles that are placed with a negative X scale
pub fn is_mirrored_x(configuration: u32) -> bool {
    NORMAL_MINUS_X_SCALE.contains(&configuration)
}
