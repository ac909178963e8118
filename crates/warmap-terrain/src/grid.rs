//! TileGrid: the owned, row-major tile buffer and its lifecycle.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use warmap_core::constants::{MAX_MAP_AREA, TILE_UNITS};
use warmap_core::error::{MapError, Result};
use warmap_core::types::Tile;

use crate::collab::{Environment, LoadContext, ObjectRegistry};

/// Camera scroll limits in tiles, derived from the grid size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

/// Rectangular grid of terrain tiles.
///
/// An empty grid (zero dimensions) is the state before the first map is
/// created and after [`TileGrid::shutdown`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// Row-major, index = `y * width + x`.
    tiles: Vec<Tile>,
    scroll: ScrollBounds,
}

/// Validate `width * height` against the maximum map area.
pub fn checked_area(width: usize, height: usize) -> Result<usize> {
    match width.checked_mul(height) {
        Some(area) if area <= MAX_MAP_AREA => Ok(area),
        _ => Err(MapError::MapTooLarge { width, height }),
    }
}

/// Allocate `count` zeroed tiles, reporting allocation failure instead of aborting.
pub(crate) fn alloc_tiles(count: usize) -> Result<Vec<Tile>> {
    let mut tiles = Vec::new();
    tiles
        .try_reserve_exact(count)
        .map_err(|_| MapError::OutOfMemory { tiles: count })?;
    tiles.resize(count, Tile::default());
    Ok(tiles)
}

impl TileGrid {
    /// Allocate a zero-initialised grid.
    pub fn allocate(width: usize, height: usize) -> Result<Self> {
        let area = checked_area(width, height)?;
        let tiles = alloc_tiles(area)?;
        Ok(Self {
            width,
            height,
            tiles,
            scroll: ScrollBounds::default(),
        })
    }

    /// Wrap an already-built tile buffer.
    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
            scroll: ScrollBounds::default(),
        }
    }

    /// Replace this grid with a fresh, empty map of the given size.
    ///
    /// Objects on the old map are cleared before its buffer is released, and
    /// every terrain type is reset to the default.
    pub fn new_map(&mut self, width: usize, height: usize, ctx: &mut LoadContext<'_>) -> Result<()> {
        let fresh = Self::allocate(width, height)?;
        if self.is_allocated() {
            ctx.objects.clear_all();
        }
        *self = fresh;
        ctx.terrain.reset();
        self.reset(ctx.environment);
        info!("new {width}x{height} map");
        Ok(())
    }

    /// Swap in a fully built grid.
    ///
    /// Same-sized grids keep their storage and the objects on them; anything
    /// else clears every object first so nothing outlives the old buffer.
    pub(crate) fn install(&mut self, staged: TileGrid, objects: &mut dyn ObjectRegistry) {
        if self.is_allocated() && self.width == staged.width && self.height == staged.height {
            debug!("reusing {}x{} tile storage", self.width, self.height);
            self.tiles.copy_from_slice(&staged.tiles);
            return;
        }
        if self.is_allocated() {
            debug!(
                "replacing {}x{} grid with {}x{}: clearing map objects",
                self.width, self.height, staged.width, staged.height
            );
            objects.clear_all();
        }
        *self = staged;
    }

    /// Re-derive state that depends on the grid size.
    pub fn reset(&mut self, environment: &mut dyn Environment) {
        self.scroll = ScrollBounds {
            min_x: 0,
            min_y: 0,
            max_x: self.width as i32,
            max_y: self.height as i32,
        };
        environment.reset(self.width, self.height);
    }

    /// Release the tile buffer. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.tiles = Vec::new();
        self.width = 0;
        self.height = 0;
        self.scroll = ScrollBounds::default();
    }

    pub fn is_allocated(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// World-unit extent along x.
    pub fn world_width(&self) -> i32 {
        self.width as i32 * TILE_UNITS
    }

    /// World-unit extent along y.
    pub fn world_height(&self) -> i32 {
        self.height as i32 * TILE_UNITS
    }

    pub fn scroll_bounds(&self) -> ScrollBounds {
        self.scroll
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "tile ({x},{y}) outside {}x{} grid",
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[self.index(x, y)]
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        let idx = self.index(x, y);
        &mut self.tiles[idx]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }
}
