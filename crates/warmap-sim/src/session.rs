//! MapSession: the single owner of the current map and its objects.

use std::path::Path;

use glam::IVec3;
use hecs::Entity;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use warmap_core::components::{Structure, WorldPos};
use warmap_core::error::Result;
use warmap_terrain::codec::{self, CodecConfig, MapHeader};
use warmap_terrain::visibility::{self, VisibilityLoad};
use warmap_terrain::{
    HeightField, LoadContext, MapStorage, ObjectRegistry, TerrainTypeTable, TileGrid, WaveField,
    ZoneRouting,
};

use crate::objects::ObjectWorld;

/// Configuration for a map session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub codec: CodecConfig,
    /// Re-derive not-blocking tile flags from structures after every load.
    /// Objects placed after the load need an explicit
    /// [`MapSession::refresh_not_blocking`].
    pub refresh_not_blocking_on_load: bool,
}

/// The running map. Owns the grid and everything tied to its lifetime.
pub struct MapSession {
    config: SessionConfig,
    grid: TileGrid,
    terrain: TerrainTypeTable,
    routing: ZoneRouting,
    environment: WaveField,
    objects: ObjectWorld,
}

impl MapSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            grid: TileGrid::default(),
            terrain: TerrainTypeTable::new(),
            routing: ZoneRouting::new(),
            environment: WaveField::default(),
            objects: ObjectWorld::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn terrain(&self) -> &TerrainTypeTable {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainTypeTable {
        &mut self.terrain
    }

    pub fn routing(&self) -> &ZoneRouting {
        &self.routing
    }

    pub fn routing_mut(&mut self) -> &mut ZoneRouting {
        &mut self.routing
    }

    pub fn environment(&self) -> &WaveField {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut WaveField {
        &mut self.environment
    }

    pub fn objects(&self) -> &ObjectWorld {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectWorld {
        &mut self.objects
    }

    // --- Map lifecycle ---

    /// Start an empty map. Routing data is dropped along with the old map.
    pub fn new_map(&mut self, width: usize, height: usize) -> Result<()> {
        let mut ctx = LoadContext {
            objects: &mut self.objects,
            routing: &mut self.routing,
            environment: &mut self.environment,
            terrain: &mut self.terrain,
        };
        self.grid.new_map(width, height, &mut ctx)?;
        self.routing.release();
        Ok(())
    }

    /// Replace the current map with one decoded from `data`.
    ///
    /// Routing data is built into a fresh store and only replaces the
    /// current one on success, so a failed load leaves the session as it was.
    pub fn load_map(&mut self, data: &[u8]) -> Result<MapHeader> {
        let mut routing = ZoneRouting::new();
        let header = {
            let mut ctx = LoadContext {
                objects: &mut self.objects,
                routing: &mut routing,
                environment: &mut self.environment,
                terrain: &mut self.terrain,
            };
            codec::load_map_with(data, &mut self.grid, &mut ctx, &self.config.codec)?
        };
        self.routing = routing;

        if self.config.refresh_not_blocking_on_load {
            self.refresh_not_blocking();
        }
        Ok(header)
    }

    pub fn load_map_from(&mut self, storage: &dyn MapStorage, name: &str) -> Result<MapHeader> {
        let data = storage.read(name)?;
        debug!("loading map '{name}' ({} bytes)", data.len());
        self.load_map(&data)
    }

    /// Encode the current map.
    pub fn save_map(&self) -> Result<Vec<u8>> {
        codec::encode(&self.grid, &self.routing)
    }

    pub fn save_map_to(&self, storage: &mut dyn MapStorage, name: &str) -> Result<()> {
        let data = self.save_map()?;
        storage.write(name, &data)?;
        info!("saved map '{name}' ({} bytes)", data.len());
        Ok(())
    }

    pub fn save_visibility(&self, path: &Path) -> Result<()> {
        visibility::save(path, &self.grid)
    }

    pub fn load_visibility(&mut self, path: &Path) -> Result<VisibilityLoad> {
        visibility::load(path, &mut self.grid)
    }

    /// Release the map and everything on it. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.objects.clear_all();
        self.grid.shutdown();
        self.routing.release();
        self.environment = WaveField::default();
        info!("map session shut down");
    }

    // --- Queries ---

    pub fn height_field(&self) -> HeightField<'_> {
        HeightField::new(&self.grid, &self.terrain, &self.environment)
    }

    pub fn height_at(&self, world_x: i32, world_y: i32) -> i32 {
        self.height_field().height_at(world_x, world_y)
    }

    pub fn is_above_surface(&self, position: IVec3) -> bool {
        self.height_field().is_above_surface(position)
    }

    // --- Objects ---

    pub fn spawn_droid(&mut self, pos: WorldPos, owner: u8) -> Entity {
        self.objects.spawn_droid(pos, owner)
    }

    pub fn spawn_structure(&mut self, pos: WorldPos, owner: u8, blocking: bool) -> Entity {
        self.objects.spawn_structure(pos, owner, blocking)
    }

    pub fn spawn_feature(&mut self, pos: WorldPos) -> Entity {
        self.objects.spawn_feature(pos)
    }

    pub fn spawn_projectile(&mut self, pos: WorldPos, owner: u8) -> Entity {
        self.objects.spawn_projectile(pos, owner)
    }

    /// Recompute every tile's not-blocking flag from the structures on the
    /// map. Returns the number of flagged tiles.
    pub fn refresh_not_blocking(&mut self) -> usize {
        for tile in self.grid.tiles_mut() {
            tile.texture.set_not_blocking(false);
        }

        let (width, height) = (self.grid.width() as i32, self.grid.height() as i32);
        let mut flagged = 0;
        for (_entity, (pos, structure)) in self.objects.world().query::<(&WorldPos, &Structure)>().iter() {
            if structure.blocking {
                continue;
            }
            let (tx, ty) = pos.tile();
            if tx < 0 || ty < 0 || tx >= width || ty >= height {
                continue;
            }
            let texture = &mut self.grid.tile_mut(tx as usize, ty as usize).texture;
            if !texture.is_not_blocking() {
                texture.set_not_blocking(true);
                flagged += 1;
            }
        }
        debug!("{flagged} tiles marked not-blocking");
        flagged
    }
}
