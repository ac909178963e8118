//! Texture id → terrain classification table.

use warmap_core::constants::MAX_TILE_TEXTURES;
use warmap_core::enums::TerrainType;
use warmap_core::types::TextureField;

/// Lookup from texture id to terrain type.
#[derive(Debug, Clone)]
pub struct TerrainTypeTable {
    types: Vec<TerrainType>,
}

impl Default for TerrainTypeTable {
    fn default() -> Self {
        Self {
            types: vec![TerrainType::default(); MAX_TILE_TEXTURES],
        }
    }
}

impl TerrainTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set every texture back to the default terrain type.
    pub fn reset(&mut self) {
        self.types.fill(TerrainType::default());
    }

    pub fn set(&mut self, texture_id: u16, terrain: TerrainType) {
        self.types[texture_id as usize % MAX_TILE_TEXTURES] = terrain;
    }

    pub fn get(&self, texture_id: u16) -> TerrainType {
        self.types[texture_id as usize % MAX_TILE_TEXTURES]
    }

    /// Classify a tile texture. Flag bits are masked off first.
    pub fn classify(&self, texture: TextureField) -> TerrainType {
        self.get(texture.id())
    }
}
