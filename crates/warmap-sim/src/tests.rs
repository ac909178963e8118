//! Tests for the map session: load/save lifecycle, objects and visibility.

use glam::IVec3;

use warmap_core::components::{Droid, Feature, Projectile, Structure, WorldPos};
use warmap_core::constants::{ELEVATION_SCALE, TILE_UNITS};
use warmap_core::error::MapError;
use warmap_core::types::{GatewayRecord, VisibilityBits};
use warmap_terrain::routing::encode_rle_row;
use warmap_terrain::visibility::VisibilityLoad;
use warmap_terrain::{DirStorage, MapStorage, MemoryStorage, RoutingData};

use crate::session::{MapSession, SessionConfig};

fn tile_center(tx: i32, ty: i32) -> WorldPos {
    WorldPos::new(tx * TILE_UNITS + TILE_UNITS / 2, ty * TILE_UNITS + TILE_UNITS / 2, 0)
}

/// Session holding a small map with heights, a gateway and zone data.
fn session_with_map(width: usize, height: usize) -> MapSession {
    let mut session = MapSession::new(SessionConfig::default());
    session.new_map(width, height).unwrap();
    for (i, tile) in session.grid_mut().tiles_mut().iter_mut().enumerate() {
        tile.height = (i % 50) as u8;
    }
    let routing = session.routing_mut();
    routing
        .add_gateway(GatewayRecord::new(0, 0, width as u8 - 1, 0))
        .unwrap();
    for row in 0..height {
        routing.set_zone_line(row, encode_rle_row(&vec![row as u8; width]));
    }
    session
}

// ---- Map lifecycle ----

#[test]
fn test_save_load_roundtrip_through_storage() {
    let session = session_with_map(6, 4);
    let mut storage = MemoryStorage::new();
    session.save_map_to(&mut storage, "game.map").unwrap();

    let mut loaded = MapSession::new(SessionConfig::default());
    let header = loaded.load_map_from(&storage, "game.map").unwrap();
    assert_eq!((header.width, header.height), (6, 4));
    assert_eq!(loaded.grid().tiles().len(), 24);
    for (a, b) in session.grid().tiles().iter().zip(loaded.grid().tiles()) {
        assert_eq!(a.height, b.height);
    }
    assert_eq!(loaded.routing().gateways().len(), 1);
    assert_eq!(loaded.routing().zone_at(5, 3), Some(3));
    assert!(loaded.routing().is_linked());
}

#[test]
fn test_dir_storage_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = DirStorage::new(dir.path());
    let session = session_with_map(3, 3);
    session.save_map_to(&mut storage, "maps/tiny.map").unwrap();
    assert!(storage.exists("maps/tiny.map"));

    let mut loaded = MapSession::new(SessionConfig::default());
    loaded.load_map_from(&storage, "maps/tiny.map").unwrap();
    assert_eq!(loaded.grid().width(), 3);
}

#[test]
fn test_missing_map_is_io_error() {
    let storage = MemoryStorage::new();
    let mut session = MapSession::new(SessionConfig::default());
    let err = session.load_map_from(&storage, "absent.map").unwrap_err();
    assert!(matches!(err, MapError::Io(_)));
}

#[test]
fn test_resize_clears_objects() {
    let mut session = session_with_map(4, 4);
    session.spawn_droid(tile_center(1, 1), 0);
    session.spawn_structure(tile_center(2, 2), 1, true);
    session.spawn_feature(tile_center(3, 0));
    session.spawn_projectile(tile_center(0, 3), 0);
    assert_eq!(session.objects().len(), 4);

    // Same size: objects survive.
    let same = session.save_map().unwrap();
    session.load_map(&same).unwrap();
    assert_eq!(session.objects().len(), 4);

    // Different size: everything goes before the grid is replaced.
    let bigger = session_with_map(8, 8).save_map().unwrap();
    session.load_map(&bigger).unwrap();
    assert!(session.objects().is_empty());
    assert_eq!(session.objects().count::<Droid>(), 0);
    assert_eq!(session.grid().width(), 8);
}

#[test]
fn test_failed_load_leaves_session_untouched() {
    let mut session = session_with_map(4, 4);
    session.spawn_droid(tile_center(1, 1), 0);
    let before = session.grid().clone();

    // Valid header and tiles, skewed gateway.
    let mut bad = b"map ".to_vec();
    bad.extend_from_slice(&39u32.to_le_bytes());
    bad.extend_from_slice(&2u32.to_le_bytes());
    bad.extend_from_slice(&2u32.to_le_bytes());
    bad.extend_from_slice(&[0; 12]);
    bad.extend_from_slice(&1u32.to_le_bytes());
    bad.extend_from_slice(&1u32.to_le_bytes());
    bad.extend_from_slice(&[0, 0, 1, 1]);
    bad.extend_from_slice(&[1, 0, 0, 0]);

    let err = session.load_map(&bad).unwrap_err();
    assert!(matches!(err, MapError::Routing(_)));
    assert_eq!(session.grid(), &before);
    assert_eq!(session.objects().len(), 1);
    assert_eq!(session.routing().gateways().len(), 1);
    assert_eq!(session.routing().zone_line_count(), 4);

    assert!(matches!(
        session.load_map(b"xyz \x27\0\0\0"),
        Err(MapError::BadMagic { .. })
    ));
    assert_eq!(session.grid(), &before);
}

#[test]
fn test_new_map_same_size_clears_objects() {
    let mut session = session_with_map(4, 4);
    session.spawn_droid(tile_center(1, 1), 0);
    session.spawn_structure(tile_center(2, 2), 0, false);
    session.new_map(4, 4).unwrap();
    assert!(session.objects().is_empty());
    assert!(session.grid().tiles().iter().all(|t| t.height == 0));
}

#[test]
fn test_new_map_resets_routing() {
    let mut session = session_with_map(4, 4);
    session.new_map(2, 2).unwrap();
    assert!(session.routing().gateways().is_empty());
    assert_eq!(session.routing().zone_line_count(), 0);
    assert_eq!(session.environment().size(), (2, 2));
}

#[test]
fn test_shutdown_idempotent() {
    let mut session = session_with_map(4, 4);
    session.spawn_droid(tile_center(0, 0), 0);
    session.shutdown();
    assert!(!session.grid().is_allocated());
    assert!(session.objects().is_empty());
    assert!(session.routing().gateways().is_empty());
    session.shutdown();
    assert_eq!(session.height_at(10, 10), 0);
}

// ---- Heights ----

#[test]
fn test_height_queries() {
    let mut session = MapSession::new(SessionConfig::default());
    session.new_map(2, 2).unwrap();
    for tile in session.grid_mut().tiles_mut() {
        tile.height = 30;
    }
    assert_eq!(session.height_at(70, 70), 30 * ELEVATION_SCALE);
    assert!(session.is_above_surface(IVec3::new(70, 70, 61)));
    assert!(!session.is_above_surface(IVec3::new(70, 70, 60)));
}

// ---- Not-blocking flag ----

#[test]
fn test_refresh_not_blocking_from_structures() {
    let mut session = session_with_map(4, 4);
    session.spawn_structure(tile_center(2, 1), 0, false);
    session.spawn_structure(tile_center(3, 3), 0, true);
    session.spawn_structure(WorldPos::new(-50, 10, 0), 0, false);
    session.spawn_droid(tile_center(0, 0), 0);

    assert_eq!(session.refresh_not_blocking(), 1);
    assert!(session.grid().tile(2, 1).texture.is_not_blocking());
    assert!(!session.grid().tile(3, 3).texture.is_not_blocking());
    assert!(!session.grid().tile(0, 0).texture.is_not_blocking());

    // Never persisted.
    let mut reloaded = MapSession::new(SessionConfig::default());
    reloaded.load_map(&session.save_map().unwrap()).unwrap();
    assert!(reloaded.grid().tiles().iter().all(|t| !t.texture.is_not_blocking()));
}

#[test]
fn test_refresh_on_load_config() {
    let config = SessionConfig {
        refresh_not_blocking_on_load: true,
        ..Default::default()
    };
    let data = session_with_map(4, 4).save_map().unwrap();

    let mut session = MapSession::new(config);
    session.load_map(&data).unwrap();
    session.spawn_structure(tile_center(1, 2), 0, false);
    // Same-size reload keeps the structure and re-derives the flag.
    session.load_map(&data).unwrap();
    assert!(session.grid().tile(1, 2).texture.is_not_blocking());
    assert_eq!(session.objects().count::<Structure>(), 1);
}

// ---- Visibility ----

#[test]
fn test_visibility_save_and_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visdata.bjo");

    let mut session = session_with_map(5, 5);
    session.grid_mut().tile_mut(4, 4).visibility = VisibilityBits::from_raw(0b1010_0001);
    session.save_visibility(&path).unwrap();

    let mut loaded = MapSession::new(SessionConfig::default());
    loaded.load_map(&session.save_map().unwrap()).unwrap();
    assert_eq!(loaded.grid().tile(4, 4).visibility.raw(), 0);
    assert_eq!(loaded.load_visibility(&path).unwrap(), VisibilityLoad::Restored);
    assert_eq!(loaded.grid().tile(4, 4).visibility.raw(), 0b1010_0001);
    assert!(loaded.grid().tile(4, 4).visibility.is_visible_to(7));

    let absent = dir.path().join("none.bjo");
    assert_eq!(loaded.load_visibility(&absent).unwrap(), VisibilityLoad::Missing);
}

#[test]
fn test_visibility_for_other_map_size_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visdata.bjo");
    session_with_map(5, 5).save_visibility(&path).unwrap();

    let mut other = session_with_map(4, 4);
    assert!(matches!(
        other.load_visibility(&path),
        Err(MapError::VisibilitySizeMismatch { .. })
    ));
}

// ---- Objects ----

#[test]
fn test_object_registry_clears_by_kind() {
    use warmap_terrain::ObjectRegistry;

    let mut session = session_with_map(4, 4);
    session.spawn_droid(tile_center(0, 0), 0);
    session.spawn_droid(tile_center(1, 0), 1);
    session.spawn_feature(tile_center(2, 0));
    session.spawn_projectile(tile_center(3, 0), 1);

    let objects = session.objects_mut();
    objects.clear_droids();
    assert_eq!(objects.count::<Droid>(), 0);
    assert_eq!(objects.count::<Feature>(), 1);
    assert_eq!(objects.count::<Projectile>(), 1);
    objects.clear_all();
    assert!(objects.is_empty());
}

// ---- Config ----

#[test]
fn test_config_from_json() {
    let config: SessionConfig = serde_json::from_str("{}").unwrap();
    assert!(!config.refresh_not_blocking_on_load);
    assert!(!config.codec.reject_trailing_bytes);

    let config: SessionConfig =
        serde_json::from_str(r#"{"codec": {"reject_trailing_bytes": true}}"#).unwrap();
    assert!(config.codec.reject_trailing_bytes);
}
