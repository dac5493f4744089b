//! Static configuration tables.
//!
//! Lists may overlap; lookups built from them keep the first entry in
//! table order.

use super::TileType;

// ---------------------------------------------------------------------------
// Normal grid: configuration -> tile type
// ---------------------------------------------------------------------------

pub const NORMAL_CORNER_WAY: &[u32] = &[
    26, 30, 50, 51, 90, 94, 114, 115, 152, 153, 156, 157, 176, 177, 180, 181, 240, 241, 244, 245,
    282, 286, 306, 307, 346, 370, 371, 408, 409, 412, 413,
];

pub const NORMAL_CORNER_FILL: &[u32] = &[
    27, 31, 54, 55, 91, 95, 118, 119, 216, 217, 220, 221, 283, 287, 310, 311, 347, 351, 374, 375,
    432, 433, 436, 437, 472, 473, 476, 477, 496, 497, 500, 501,
];

pub const NORMAL_EDGE_WAY: &[u32] = &[
    56, 57, 60, 61, 120, 121, 124, 125, 146, 147, 150, 151, 210, 211, 214, 215, 312, 313, 316, 317,
    376, 377, 380, 381, 402, 403, 406, 407, 466, 467, 470, 471,
];

pub const NORMAL_EDGE_FILL: &[u32] = &[
    63, 127, 219, 223, 319, 383, 438, 439, 475, 479, 502, 503, 504, 505, 508, 509,
];

pub const NORMAL_FILL: &[u32] = &[511];

pub const NORMAL_SINGLE: &[u32] = &[
    16, 17, 20, 21, 80, 81, 84, 85, 272, 273, 276, 272, 277, 340, 341, 336, 337,
];

pub const NORMAL_THREE_WAY: &[u32] = &[
    58, 122, 154, 158, 178, 179, 184, 185, 188, 189, 242, 243, 314, 378, 410, 414,
];

pub const NORMAL_THREE_WAY_FILL: &[u32] = &[191, 251, 446, 506];

pub const NORMAL_THREE_CORNER: &[u32] = &[187, 190, 250, 442];

pub const NORMAL_DEAD_END: &[u32] = &[
    18, 19, 22, 23, 24, 25, 28, 29, 48, 49, 52, 53, 82, 83, 86, 87, 88, 89, 92, 93, 112, 113, 116,
    117, 144, 145, 148, 149, 208, 209, 212, 213, 274, 275, 278, 279, 280, 281, 284, 285, 304, 305,
    308, 309, 338, 339, 342, 343, 344, 345, 348, 349, 368, 369, 372, 373, 400, 401, 404, 405, 464,
    465, 468, 469,
];

pub const NORMAL_FOUR_WAY: &[u32] = &[186];

pub const NORMAL_EDGE_CORNER_FILL: &[u32] = &[
    59, 62, 123, 126, 155, 159, 182, 183, 218, 222, 246, 247, 248, 249, 252, 315, 318, 379, 382,
    253, 411, 415, 434, 435, 440, 441, 444, 445, 474, 478, 498, 499,
];

pub const NORMAL_DOUBLE_CORNER: &[u32] = &[254, 443];

pub const NORMAL_INTERIOR_CORNER: &[u32] = &[255, 447, 507, 510];

/// Lookup insertion order for the normal grid
pub const NORMAL_TYPE_TABLE: &[(TileType, &[u32])] = &[
    (TileType::CornerWay, NORMAL_CORNER_WAY),
    (TileType::CornerFill, NORMAL_CORNER_FILL),
    (TileType::EdgeWay, NORMAL_EDGE_WAY),
    (TileType::EdgeFill, NORMAL_EDGE_FILL),
    (TileType::Fill, NORMAL_FILL),
    (TileType::Single, NORMAL_SINGLE),
    (TileType::ThreeWay, NORMAL_THREE_WAY),
    (TileType::ThreeWayFill, NORMAL_THREE_WAY_FILL),
    (TileType::ThreeCorner, NORMAL_THREE_CORNER),
    (TileType::DeadEnd, NORMAL_DEAD_END),
    (TileType::FourWay, NORMAL_FOUR_WAY),
    (TileType::EdgeCornerFill, NORMAL_EDGE_CORNER_FILL),
    (TileType::DoubleCorner, NORMAL_DOUBLE_CORNER),
    (TileType::InteriorCorner, NORMAL_INTERIOR_CORNER),
];

// ---------------------------------------------------------------------------
// Normal grid: configuration -> rotation
// ---------------------------------------------------------------------------

pub const NORMAL_ROTATION_0: &[u32] = &[
    312, 120, 56, 24, 89, 280, 58, 152, 186, 95, 218, 222, 434, 474, 498,
];

pub const NORMAL_ROTATION_90: &[u32] = &[
    22, 23, 18, 19, 82, 83, 86, 87, 274, 275, 278, 279, 338, 339, 342, 343, 146, 147, 151, 210,
    211, 214, 215, 403, 406, 407, 466, 467, 470, 471, 438, 439, 502, 503, 178, 179, 242, 243, 191,
    54, 59, 123, 248, 249, 252, 253, 315, 379, 55, 118, 310, 311, 374, 375, 26, 30, 90, 94, 119,
    282, 286, 346, 507, 254, 250,
];

pub const NORMAL_ROTATION_180: &[u32] = &[
    48, 49, 52, 53, 112, 113, 116, 117, 304, 305, 308, 309, 368, 369, 372, 373, 50, 51, 114, 115,
    306, 307, 370, 371, 504, 505, 508, 509, 432, 433, 436, 437, 496, 497, 500, 501, 187, 184, 185,
    188, 189, 446, 155, 159, 182, 183, 246, 247, 411, 415, 255,
];

pub const NORMAL_ROTATION_270: &[u32] = &[
    144, 145, 148, 149, 208, 209, 212, 213, 400, 401, 404, 405, 464, 465, 468, 469, 154, 158, 410,
    414, 506, 216, 217, 220, 472, 476, 473, 477, 176, 177, 180, 181, 221, 240, 241, 244, 245, 190,
    150, 402, 223, 219, 475, 479, 62, 126, 318, 382, 440, 441, 444, 445, 447,
];

pub const NORMAL_ROTATION_TABLE: &[(i32, &[u32])] = &[
    (0, NORMAL_ROTATION_0),
    (90, NORMAL_ROTATION_90),
    (180, NORMAL_ROTATION_180),
    (270, NORMAL_ROTATION_270),
];

/// Normal-grid configurations whose tile is mirrored along X
pub const NORMAL_MINUS_X_SCALE: &[u32] = &[
    59, 123, 182, 183, 218, 222, 246, 247, 315, 379, 440, 441, 444, 445, 474, 478,
];

// ---------------------------------------------------------------------------
// Dual grid
// ---------------------------------------------------------------------------

pub const DUAL_CORNER: &[u32] = &[1, 2, 4, 8];
pub const DUAL_EDGE: &[u32] = &[3, 5, 10, 12];
pub const DUAL_FILL: &[u32] = &[15];
pub const DUAL_INTERIOR_CORNER: &[u32] = &[7, 13, 14, 11];
pub const DUAL_DOUBLE_INTERIOR_CORNER: &[u32] = &[6, 9];

pub const DUAL_TYPE_TABLE: &[(TileType, &[u32])] = &[
    (TileType::DualCorner, DUAL_CORNER),
    (TileType::DualEdge, DUAL_EDGE),
    (TileType::DualFill, DUAL_FILL),
    (TileType::DualInteriorCorner, DUAL_INTERIOR_CORNER),
    (TileType::DualDoubleInteriorCorner, DUAL_DOUBLE_INTERIOR_CORNER),
];

pub const DUAL_ROTATION_TABLE: &[(i32, &[u32])] = &[
    (0, &[1, 3, 15, 0]),
    (90, &[2, 10, 11, 6]),
    (180, &[8, 12, 14]),
    (270, &[4, 5, 13]),
];

// ---------------------------------------------------------------------------
// Blueprint selection masks
// ---------------------------------------------------------------------------

/// Four-direction configurations of straight border cells
pub const SELECT_EDGE: &[u32] = &[14, 15, 21, 23, 29, 30];

/// Four-direction configurations of outer corners
pub const SELECT_CORNER: &[u32] = &[22, 28, 7, 13];

/// Eight-direction configurations of inner corners
pub const SELECT_INTERIOR_CORNER: &[u32] = &[507, 447, 443, 510, 255];
