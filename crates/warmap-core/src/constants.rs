//! Map format constants and terrain tuning parameters.

// --- Tile geometry ---

/// Fixed-point subdivisions along one tile edge.
pub const TILE_UNITS: i32 = 128;

/// `log2(TILE_UNITS)`.
pub const TILE_SHIFT: u32 = 7;

/// Multiplier converting a stored byte height to world elevation units.
pub const ELEVATION_SCALE: i32 = 2;

/// Upper bound on any plausible `height_at` result.
/// Exceeding it means the tile data is corrupt, not that the query failed.
pub const MAX_HEIGHT: i32 = 256 * ELEVATION_SCALE;

/// Highest raw corner height a tile can store.
pub const TILE_MAX_HEIGHT: u8 = u8::MAX;

// --- Grid limits ---

/// Largest supported map edge, in tiles.
pub const MAX_MAP_EDGE: usize = 256;

/// Largest supported map area, in tiles.
pub const MAX_MAP_AREA: usize = MAX_MAP_EDGE * MAX_MAP_EDGE;

/// Number of player slots tracked in a tile's visibility mask.
pub const MAX_PLAYERS: usize = 8;

/// Size of the texture id → terrain type lookup table.
pub const MAX_TILE_TEXTURES: usize = 512;

// --- Texture field layout ---

/// Bits of the texture field holding the texture id.
pub const TILE_ID_MASK: u16 = 0x01ff;

/// Runtime-only flag: an object on this tile does not block movement.
pub const TILE_NOT_BLOCKING: u16 = 0x0200;

/// Set when the tile's diagonal runs top-right to bottom-left.
pub const TILE_TRI_FLIP: u16 = 0x0800;

// --- Map file ---

/// Map file magic.
pub const MAP_MAGIC: [u8; 4] = *b"map ";

/// Newest deprecated map version. Anything at or below is refused.
pub const LAST_DEPRECATED_MAP_VERSION: u32 = 9;

/// Map version written by the encoder and newest version accepted.
pub const CURRENT_MAP_VERSION: u32 = 39;

/// Map header: magic + version + width + height.
pub const MAP_HEADER_SIZE: usize = 16;

/// Tile record: texture (u16) + height (u8).
pub const TILE_RECORD_SIZE: usize = 3;

/// Only gateway section version in existence.
pub const GATEWAY_SECTION_VERSION: u32 = 1;

/// Gateway header: version (u32) + count (u32).
pub const GATEWAY_HEADER_SIZE: usize = 8;

/// Gateway record: four byte coordinates.
pub const GATEWAY_RECORD_SIZE: usize = 4;

/// Zone section without equivalence lists.
pub const ZONE_SECTION_V1: u16 = 1;

/// Zone section with equivalence lists. Written by the encoder.
pub const ZONE_SECTION_V2: u16 = 2;

/// Zone header for version 2: version + zone count + equivalence count + pad.
pub const ZONE_HEADER_SIZE_V2: usize = 8;

// --- Visibility file ---

/// Visibility file magic.
pub const VIS_MAGIC: [u8; 4] = *b"visd";

/// Visibility version written on save.
pub const CURRENT_VIS_VERSION: u32 = CURRENT_MAP_VERSION;

/// Visibility header: magic + version.
pub const VIS_HEADER_SIZE: usize = 8;

/// Convert a tile coordinate to world units.
pub const fn world_coord(tile: i32) -> i32 {
    tile << TILE_SHIFT
}

/// Convert a world coordinate to its containing tile.
pub const fn map_coord(world: i32) -> i32 {
    world >> TILE_SHIFT
}
