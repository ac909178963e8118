//! Tile-level data types shared by the grid, the codec and the height field.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PLAYERS, TILE_ID_MASK, TILE_NOT_BLOCKING, TILE_TRI_FLIP};

/// Packed tile texture: texture id plus orientation and runtime flags.
///
/// The id occupies the low bits; flags must never leak into terrain lookups,
/// so always go through [`TextureField::id`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureField(u16);

impl TextureField {
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Build a field holding only a texture id.
    pub const fn with_id(id: u16) -> Self {
        Self(id & TILE_ID_MASK)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Texture id with every flag bit masked out.
    pub const fn id(self) -> u16 {
        self.0 & TILE_ID_MASK
    }

    /// True when the split diagonal runs top-right to bottom-left.
    pub const fn is_tri_flipped(self) -> bool {
        self.0 & TILE_TRI_FLIP != 0
    }

    pub const fn is_not_blocking(self) -> bool {
        self.0 & TILE_NOT_BLOCKING != 0
    }

    /// Replace the texture id, keeping every flag bit.
    pub fn set_id(&mut self, id: u16) {
        self.0 = (self.0 & !TILE_ID_MASK) | (id & TILE_ID_MASK);
    }

    pub fn set_tri_flipped(&mut self, flipped: bool) {
        self.set_bit(TILE_TRI_FLIP, flipped);
    }

    pub fn set_not_blocking(&mut self, not_blocking: bool) {
        self.set_bit(TILE_NOT_BLOCKING, not_blocking);
    }

    /// The value written to disk. Not-blocking is derived from object
    /// placement after every load and is never persisted.
    pub const fn persisted(self) -> u16 {
        self.0 & !TILE_NOT_BLOCKING
    }

    fn set_bit(&mut self, bit: u16, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// Per-player visibility mask, one bit per player slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityBits(u8);

impl VisibilityBits {
    pub const NONE: Self = Self(0);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn is_visible_to(self, player: usize) -> bool {
        debug_assert!(player < MAX_PLAYERS, "player {player} out of range");
        self.0 & (1 << player) != 0
    }

    pub fn set_visible(&mut self, player: usize, visible: bool) {
        debug_assert!(player < MAX_PLAYERS, "player {player} out of range");
        if visible {
            self.0 |= 1 << player;
        } else {
            self.0 &= !(1 << player);
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Number of players that can see the tile.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// A single terrain tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub texture: TextureField,
    /// Raw corner elevation. World elevation is `height * ELEVATION_SCALE`.
    pub height: u8,
    /// Transient; cleared on map load and persisted by the visibility store.
    pub visibility: VisibilityBits,
}

impl Tile {
    pub fn new(texture: TextureField, height: u8) -> Self {
        Self {
            texture,
            height,
            visibility: VisibilityBits::NONE,
        }
    }
}

/// Gateway line segment in tile coordinates, as persisted in the map file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GatewayRecord {
    pub x0: u8,
    pub y0: u8,
    pub x1: u8,
    pub y1: u8,
}

impl GatewayRecord {
    pub fn new(x0: u8, y0: u8, x1: u8, y1: u8) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Gateways are horizontal or vertical lines.
    pub fn is_axis_aligned(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }
}
