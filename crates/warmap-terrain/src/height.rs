//! Surface elevation queries over a tile grid.
//!
//! Each tile is split along one diagonal into two triangles and heights are
//! blended linearly inside the triangle containing the query point. Tiles
//! share corner heights with their neighbours, so the surface is continuous
//! across both the diagonal and tile edges.

use glam::IVec3;

use warmap_core::constants::{ELEVATION_SCALE, MAX_HEIGHT, TILE_UNITS};

use crate::collab::Environment;
use crate::grid::TileGrid;
use crate::terrain_types::TerrainTypeTable;

/// Raw corner heights of one tile, wave offsets included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corners {
    tl: i32,
    tr: i32,
    bl: i32,
    br: i32,
}

impl Corners {
    fn max(&self) -> i32 {
        self.tl.max(self.tr).max(self.bl).max(self.br)
    }

    fn min(&self) -> i32 {
        self.tl.min(self.tr).min(self.bl).min(self.br)
    }
}

/// Read-only height queries. Borrows everything it needs for one frame.
pub struct HeightField<'a> {
    grid: &'a TileGrid,
    terrain: &'a TerrainTypeTable,
    environment: &'a dyn Environment,
}

impl<'a> HeightField<'a> {
    pub fn new(
        grid: &'a TileGrid,
        terrain: &'a TerrainTypeTable,
        environment: &'a dyn Environment,
    ) -> Self {
        Self {
            grid,
            terrain,
            environment,
        }
    }

    /// Corner tile coordinates of `(tx, ty)`, repeating the last row and
    /// column at the right and bottom edges.
    fn neighbours(&self, tx: usize, ty: usize) -> (usize, usize) {
        let tx2 = if tx + 1 < self.grid.width() { tx + 1 } else { tx };
        let ty2 = if ty + 1 < self.grid.height() { ty + 1 } else { ty };
        (tx2, ty2)
    }

    /// Stored corner heights of a tile, without wave offsets.
    fn stored_corners(&self, tx: usize, ty: usize) -> Corners {
        let (tx2, ty2) = self.neighbours(tx, ty);
        let h = |x, y| self.grid.tile(x, y).height as i32;
        Corners {
            tl: h(tx, ty),
            tr: h(tx2, ty),
            bl: h(tx, ty2),
            br: h(tx2, ty2),
        }
    }

    /// Corner heights used for interpolation. Water tiles ride on half the
    /// environment's wave height at each corner.
    fn surface_corners(&self, tx: usize, ty: usize) -> Corners {
        let mut c = self.stored_corners(tx, ty);
        let texture = self.grid.tile(tx, ty).texture;
        if self.terrain.classify(texture).is_water() {
            let env = self.environment;
            c.tl += env.wave_height(tx, ty) / 2;
            c.tr += env.wave_height(tx + 1, ty) / 2;
            c.bl += env.wave_height(tx, ty + 1) / 2;
            c.br += env.wave_height(tx + 1, ty + 1) / 2;
        }
        c
    }

    /// Interpolated surface elevation at a world position, in world units.
    ///
    /// Coordinates outside the map are clamped to its edge. Returns 0 when no
    /// map is allocated.
    pub fn height_at(&self, world_x: i32, world_y: i32) -> i32 {
        if !self.grid.is_allocated() {
            return 0;
        }
        let x = world_x.clamp(0, self.grid.world_width() - 1);
        let y = world_y.clamp(0, self.grid.world_height() - 1);

        let tx = (x / TILE_UNITS) as usize;
        let ty = (y / TILE_UNITS) as usize;
        let ox = x % TILE_UNITS;
        let oy = y % TILE_UNITS;

        let Corners { tl, tr, bl, br } = self.surface_corners(tx, ty);
        let flipped = self.grid.tile(tx, ty).texture.is_tri_flipped();

        let raw = if flipped {
            if ox + oy > TILE_UNITS {
                // bottom-right triangle, measured back from the far corner
                let rx = TILE_UNITS - ox;
                let ry = TILE_UNITS - oy;
                br + (bl - br) * rx / TILE_UNITS + (tr - br) * ry / TILE_UNITS
            } else {
                tl + (tr - tl) * ox / TILE_UNITS + (bl - tl) * oy / TILE_UNITS
            }
        } else if ox > oy {
            tl + (tr - tl) * ox / TILE_UNITS + (br - tr) * oy / TILE_UNITS
        } else {
            tl + (br - bl) * ox / TILE_UNITS + (bl - tl) * oy / TILE_UNITS
        };

        let height = raw * ELEVATION_SCALE;
        debug_assert!(
            height < MAX_HEIGHT,
            "height {height} at ({x},{y}) is beyond any stored tile height"
        );
        height
    }

    /// True when `position` is strictly above the terrain surface.
    ///
    /// Positions clearly above or below all four tile corners are decided
    /// without interpolating.
    pub fn is_above_surface(&self, position: IVec3) -> bool {
        if !self.grid.is_allocated() {
            return position.z > 0;
        }
        let x = position.x.clamp(0, self.grid.world_width() - 1);
        let y = position.y.clamp(0, self.grid.world_height() - 1);
        let corners = self.stored_corners((x / TILE_UNITS) as usize, (y / TILE_UNITS) as usize);

        let z = position.z;
        if z > corners.max() * ELEVATION_SCALE {
            return true;
        }
        if z <= corners.min() * ELEVATION_SCALE {
            return false;
        }
        z > self.height_at(position.x, position.y)
    }

    /// Lowest and highest stored (unscaled) corner heights of a tile.
    pub fn tile_min_max(&self, tile_x: usize, tile_y: usize) -> (u8, u8) {
        let c = self.stored_corners(tile_x, tile_y);
        // corners come straight from u8 storage
        (c.min() as u8, c.max() as u8)
    }
}
