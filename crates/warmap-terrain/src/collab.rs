//! Seams to the systems that live outside the terrain core.
//!
//! The grid never reaches into object lists, routing tables or the wave
//! simulation directly; it calls through these traits.

use warmap_core::types::GatewayRecord;
use warmap_core::RoutingError;

use crate::grid::TileGrid;

/// Owner of every object that may hold a reference into the tile buffer.
pub trait ObjectRegistry {
    fn clear_droids(&mut self);
    fn clear_structures(&mut self);
    fn clear_features(&mut self);
    fn clear_projectiles(&mut self);

    /// Drop every object. Must run before the tile buffer is replaced.
    fn clear_all(&mut self) {
        self.clear_droids();
        self.clear_structures();
        self.clear_features();
        self.clear_projectiles();
    }
}

/// A gateway as known to the routing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gateway {
    pub record: GatewayRecord,
    /// Generated for water crossings; rebuilt on load, never saved.
    pub water_link: bool,
}

/// Load/save contract of the gateway and zone routing system.
pub trait RoutingData {
    /// Drop every gateway, water links included. Called before a map's
    /// gateways are registered.
    fn clear_gateways(&mut self);

    /// Register a gateway read from a map file.
    fn add_gateway(&mut self, record: GatewayRecord) -> Result<(), RoutingError>;

    /// All gateways, water links included.
    fn gateways(&self) -> &[Gateway];

    /// Discard any zone map and start an empty one.
    fn new_zone_map(&mut self) -> Result<(), RoutingError>;

    /// Allocate zone line `index` of `len` bytes and hand back its buffer.
    fn new_zone_line(&mut self, index: usize, len: usize) -> Result<&mut [u8], RoutingError>;

    fn zone_line_count(&self) -> usize;

    /// RLE bytes of zone line `index`.
    fn zone_line(&self, index: usize) -> &[u8];

    /// Allocate an equivalence table with one entry per zone.
    fn new_equivalence_table(&mut self, zones: usize) -> Result<(), RoutingError>;

    /// Set the zones equivalent to `zone`.
    fn set_zone_equivalence(&mut self, zone: usize, members: &[u8]) -> Result<(), RoutingError>;

    /// Number of zones covered by the equivalence table. Zero when absent.
    fn equivalence_zone_count(&self) -> usize;

    /// Zones equivalent to `zone`; empty when it has none.
    fn zone_equivalence(&self, zone: usize) -> &[u8];

    fn has_equivalence_table(&self) -> bool {
        self.equivalence_zone_count() > 0
    }

    /// Build inter-zone link gates from the equivalence table.
    fn generate_link_gates(&mut self, grid: &TileGrid) -> Result<(), RoutingError>;

    /// Attach every gateway to the zones on either side of it.
    fn link_gateways(&mut self, grid: &TileGrid) -> Result<(), RoutingError>;
}

/// Ambient environment simulation (waves on water tiles).
pub trait Environment {
    /// Wave height at a tile corner. May be negative.
    fn wave_height(&self, x: usize, y: usize) -> i32;

    /// Reinitialise for a grid of the given size.
    fn reset(&mut self, width: usize, height: usize);
}

/// Collaborators touched while a map is replaced.
pub struct LoadContext<'a> {
    pub objects: &'a mut dyn ObjectRegistry,
    pub routing: &'a mut dyn RoutingData,
    pub environment: &'a mut dyn Environment,
    pub terrain: &'a mut crate::terrain_types::TerrainTypeTable,
}
