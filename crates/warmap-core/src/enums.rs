//! Terrain classification.

use serde::{Deserialize, Serialize};

/// Terrain classification of a tile texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    Sand,
    /// Default for every texture until a terrain table is loaded.
    #[default]
    SandyBrush,
    BakedEarth,
    GreenMud,
    RedBrush,
    PinkRock,
    Road,
    Water,
    CliffFace,
    Rubble,
    SheetIce,
    Slush,
}

impl TerrainType {
    pub fn is_water(self) -> bool {
        self == TerrainType::Water
    }
}
