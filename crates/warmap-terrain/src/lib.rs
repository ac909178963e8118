//! Terrain map subsystem for warmap.
//!
//! Tile grid ownership, the "map " binary format, surface height queries
//! and visibility persistence, plus the collaborator seams the grid calls
//! out through.

pub use warmap_core as core;

pub mod codec;
pub mod collab;
pub mod environ;
pub mod grid;
pub mod height;
pub mod reader;
pub mod routing;
pub mod storage;
pub mod terrain_types;
pub mod visibility;

// Re-export key types for convenience.
pub use codec::{decode, encode, load_map, CodecConfig, MapFile, MapHeader, MapSummary};
pub use collab::{Environment, LoadContext, ObjectRegistry, RoutingData};
pub use environ::WaveField;
pub use grid::{ScrollBounds, TileGrid};
pub use height::HeightField;
pub use routing::ZoneRouting;
pub use storage::{DirStorage, MapStorage, MemoryStorage};
pub use terrain_types::TerrainTypeTable;
pub use visibility::VisibilityLoad;
