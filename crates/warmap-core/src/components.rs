//! ECS components for objects standing on the map.
//!
//! The terrain core never owns these; it only asks whoever does to drop them
//! all before the tile buffer is replaced.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::TILE_SHIFT;

/// World-space position. x and y in world units, z is elevation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldPos(pub IVec3);

impl WorldPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self(IVec3::new(x, y, z))
    }

    /// Tile containing this position.
    pub fn tile(&self) -> (i32, i32) {
        (self.0.x >> TILE_SHIFT, self.0.y >> TILE_SHIFT)
    }
}

/// Owning player slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner(pub u8);

/// Mobile unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Droid;

/// Building.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Structure {
    /// Walls and defences block; tank traps and the like do not.
    pub blocking: bool,
}

/// Static map decoration (trees, wrecks, oil resources).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Feature;

/// Shot in flight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Projectile;
