//! Map file codec: header, tile array, gateway section, zone section.
//!
//! All multi-byte fields are little-endian. Loading is split into a pure
//! parse ([`decode`]) and an install step ([`load_map`]) so that a bad file
//! never disturbs the grid already in use.

use std::io::Write;
use std::ops::RangeInclusive;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use warmap_core::constants::*;
use warmap_core::error::{MapError, Result};
use warmap_core::types::{GatewayRecord, TextureField, Tile};

use crate::collab::{LoadContext, RoutingData};
use crate::grid::{alloc_tiles, checked_area, TileGrid};
use crate::reader::ByteReader;

/// Runtime options for map decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Fail on bytes left after the zone section instead of warning.
    pub reject_trailing_bytes: bool,
}

/// Fixed-size map file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapHeader {
    pub version: u32,
    pub width: usize,
    pub height: usize,
}

/// Zone routing data as stored in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneSection {
    pub version: u16,
    /// RLE zone lines, one per map row.
    pub lines: Vec<Vec<u8>>,
    /// Equivalence list per zone. Empty entries mean "no equivalents".
    pub equivalences: Vec<Vec<u8>>,
}

/// Fully parsed map file, not yet installed anywhere.
#[derive(Debug, Clone)]
pub struct MapFile {
    pub header: MapHeader,
    pub grid: TileGrid,
    pub gateways: Vec<GatewayRecord>,
    pub zones: ZoneSection,
}

/// Short description of a map file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    pub gateways: usize,
    pub zone_version: u16,
    pub zone_lines: usize,
    pub equivalence_zones: usize,
    pub min_height: u8,
    pub max_height: u8,
    pub flipped_tiles: usize,
}

impl MapFile {
    pub fn summary(&self) -> MapSummary {
        let tiles = self.grid.tiles();
        MapSummary {
            version: self.header.version,
            width: self.header.width,
            height: self.header.height,
            gateways: self.gateways.len(),
            zone_version: self.zones.version,
            zone_lines: self.zones.lines.len(),
            equivalence_zones: self.zones.equivalences.len(),
            min_height: tiles.iter().map(|t| t.height).min().unwrap_or(0),
            max_height: tiles.iter().map(|t| t.height).max().unwrap_or(0),
            flipped_tiles: tiles.iter().filter(|t| t.texture.is_tri_flipped()).count(),
        }
    }
}

/// Everything after the header, produced by a version-specific decoder.
struct MapBody {
    tiles: Vec<Tile>,
    gateways: Vec<GatewayRecord>,
    zones: ZoneSection,
}

type BodyDecoder = fn(&mut ByteReader<'_>, usize) -> Result<MapBody>;

/// Supported map versions and the decoder for each range.
/// Versions at or below [`LAST_DEPRECATED_MAP_VERSION`] are never listed.
const DECODERS: &[(RangeInclusive<u32>, BodyDecoder)] = &[(
    LAST_DEPRECATED_MAP_VERSION + 1..=CURRENT_MAP_VERSION,
    decode_body_v3 as BodyDecoder,
)];

fn select_decoder(version: u32) -> Result<BodyDecoder> {
    if version <= LAST_DEPRECATED_MAP_VERSION {
        warn!("map version {version} is deprecated");
    }
    DECODERS
        .iter()
        .find(|(range, _)| range.contains(&version))
        .map(|(_, decoder)| *decoder)
        .ok_or(MapError::UnsupportedVersion {
            section: "map",
            version,
        })
}

/// Parse a map file buffer.
pub fn decode(data: &[u8]) -> Result<MapFile> {
    decode_with(data, &CodecConfig::default())
}

/// Parse a map file buffer with explicit options.
pub fn decode_with(data: &[u8], config: &CodecConfig) -> Result<MapFile> {
    let mut reader = ByteReader::new(data);
    reader.enter("map header");

    let magic = reader.magic()?;
    if magic != MAP_MAGIC {
        return Err(MapError::BadMagic {
            expected: MAP_MAGIC,
            found: magic,
        });
    }

    let version = reader.u32()?;
    let decoder = select_decoder(version)?;

    let width = reader.u32()? as usize;
    let height = reader.u32()? as usize;
    let area = checked_area(width, height)?;
    debug!("map v{version}: {width}x{height}");

    let body = decoder(&mut reader, area)?;

    let extra = reader.remaining();
    if extra > 0 {
        if config.reject_trailing_bytes {
            return Err(MapError::TrailingBytes { extra });
        }
        warn!("{extra} trailing bytes after zone section ignored");
    }

    Ok(MapFile {
        header: MapHeader {
            version,
            width,
            height,
        },
        grid: TileGrid::from_tiles(width, height, body.tiles),
        gateways: body.gateways,
        zones: body.zones,
    })
}

/// Decoder for versions 10 and up: tiles, gateways, zone map.
fn decode_body_v3(reader: &mut ByteReader<'_>, area: usize) -> Result<MapBody> {
    let tiles = decode_tiles(reader, area)?;
    let gateways = decode_gateways(reader)?;
    let zones = decode_zones(reader)?;
    Ok(MapBody {
        tiles,
        gateways,
        zones,
    })
}

fn decode_tiles(reader: &mut ByteReader<'_>, area: usize) -> Result<Vec<Tile>> {
    reader.enter("tiles");
    // Fail on a short buffer before allocating for it.
    let records = reader.take(area * TILE_RECORD_SIZE)?;
    let mut tiles = alloc_tiles(area)?;
    for (tile, record) in tiles.iter_mut().zip(records.chunks_exact(TILE_RECORD_SIZE)) {
        // Not-blocking and visibility are runtime state, never read from a map file.
        let texture = u16::from_le_bytes([record[0], record[1]]) & !TILE_NOT_BLOCKING;
        *tile = Tile::new(TextureField::from_raw(texture), record[2]);
    }
    Ok(tiles)
}

fn decode_gateways(reader: &mut ByteReader<'_>) -> Result<Vec<GatewayRecord>> {
    reader.enter("gateway header");
    let version = reader.u32()?;
    if version != GATEWAY_SECTION_VERSION {
        return Err(MapError::UnsupportedVersion {
            section: "gateway",
            version,
        });
    }
    let count = reader.u32()? as usize;

    reader.enter("gateways");
    let len = count
        .checked_mul(GATEWAY_RECORD_SIZE)
        .ok_or(MapError::TruncatedFile {
            section: "gateways",
            needed: usize::MAX,
            available: reader.remaining(),
        })?;
    let records = reader.take(len)?;
    Ok(records
        .chunks_exact(GATEWAY_RECORD_SIZE)
        .map(|g| GatewayRecord::new(g[0], g[1], g[2], g[3]))
        .collect())
}

fn decode_zones(reader: &mut ByteReader<'_>) -> Result<ZoneSection> {
    reader.enter("zone header");
    let version = reader.u16()?;
    if version != ZONE_SECTION_V1 && version != ZONE_SECTION_V2 {
        return Err(MapError::UnsupportedVersion {
            section: "zone",
            version: version as u32,
        });
    }
    let num_zones = reader.u16()? as usize;
    let num_equiv = if version == ZONE_SECTION_V2 {
        let num_equiv = reader.u16()? as usize;
        let _pad = reader.u16()?;
        num_equiv
    } else {
        0
    };

    reader.enter("zone lines");
    let mut lines = Vec::with_capacity(num_zones);
    for _ in 0..num_zones {
        let len = reader.u16()? as usize;
        lines.push(reader.take(len)?.to_vec());
    }

    reader.enter("equivalence lists");
    let mut equivalences = Vec::with_capacity(num_equiv);
    for _ in 0..num_equiv {
        // count byte + count members; a zero count still consumes its byte
        let count = reader.u8()? as usize;
        equivalences.push(reader.take(count)?.to_vec());
    }

    debug!(
        "zone section v{version}: {num_zones} lines, {num_equiv} equivalence lists"
    );
    Ok(ZoneSection {
        version,
        lines,
        equivalences,
    })
}

/// Decode `data` and make it the current map.
pub fn load_map(data: &[u8], grid: &mut TileGrid, ctx: &mut LoadContext<'_>) -> Result<MapHeader> {
    load_map_with(data, grid, ctx, &CodecConfig::default())
}

/// Decode `data` and make it the current map, with explicit options.
///
/// Format and size problems are found before anything is touched. Routing
/// data is registered and linked against the staged grid, and the staged
/// grid replaces `grid` only once all of that has succeeded.
pub fn load_map_with(
    data: &[u8],
    grid: &mut TileGrid,
    ctx: &mut LoadContext<'_>,
    config: &CodecConfig,
) -> Result<MapHeader> {
    let MapFile {
        header,
        grid: staged,
        gateways,
        zones,
    } = decode_with(data, config)?;

    register_routing(ctx.routing, &staged, &gateways, &zones)?;

    grid.install(staged, ctx.objects);
    grid.reset(ctx.environment);
    info!(
        "loaded {}x{} map (v{}): {} gateways, {} zone lines",
        header.width,
        header.height,
        header.version,
        gateways.len(),
        zones.lines.len()
    );
    Ok(header)
}

fn register_routing(
    routing: &mut dyn RoutingData,
    staged: &TileGrid,
    gateways: &[GatewayRecord],
    zones: &ZoneSection,
) -> Result<()> {
    routing.clear_gateways();
    for gateway in gateways {
        routing.add_gateway(*gateway)?;
    }

    routing.new_zone_map()?;
    for (index, line) in zones.lines.iter().enumerate() {
        let dest = routing.new_zone_line(index, line.len())?;
        if dest.len() != line.len() {
            return Err(warmap_core::RoutingError::ZoneLine {
                zone: index,
                reason: format!("asked for {} bytes, got {}", line.len(), dest.len()),
            }
            .into());
        }
        dest.copy_from_slice(line);
    }

    if zones.version == ZONE_SECTION_V2 && !zones.equivalences.is_empty() {
        routing.new_equivalence_table(zones.equivalences.len())?;
        for (zone, members) in zones.equivalences.iter().enumerate() {
            if !members.is_empty() {
                routing.set_zone_equivalence(zone, members)?;
            }
        }
    }

    if routing.has_equivalence_table() {
        routing.generate_link_gates(staged)?;
    }
    routing.link_gateways(staged)?;
    Ok(())
}

/// Gateways that get written: everything except water links.
fn persisted_gateways(routing: &dyn RoutingData) -> Vec<GatewayRecord> {
    routing
        .gateways()
        .iter()
        .filter(|g| !g.water_link)
        .map(|g| g.record)
        .collect()
}

/// Exact size of the buffer [`encode`] produces.
pub fn encoded_len(grid: &TileGrid, routing: &dyn RoutingData) -> usize {
    let gateways = persisted_gateways(routing).len();
    let zone_lines: usize = (0..routing.zone_line_count())
        .map(|i| 2 + routing.zone_line(i).len())
        .sum();
    let equivalences: usize = (0..routing.equivalence_zone_count())
        .map(|i| 1 + routing.zone_equivalence(i).len())
        .sum();

    MAP_HEADER_SIZE
        + grid.tile_count() * TILE_RECORD_SIZE
        + GATEWAY_HEADER_SIZE
        + gateways * GATEWAY_RECORD_SIZE
        + ZONE_HEADER_SIZE_V2
        + zone_lines
        + equivalences
}

fn field_u16(field: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| MapError::FieldOverflow { field, value })
}

fn field_u8(field: &'static str, value: usize) -> Result<u8> {
    u8::try_from(value).map_err(|_| MapError::FieldOverflow { field, value })
}

/// Serialize the grid and routing data at the current format versions.
pub fn encode(grid: &TileGrid, routing: &dyn RoutingData) -> Result<Vec<u8>> {
    let expected = encoded_len(grid, routing);
    let mut buf = Vec::with_capacity(expected);

    // Header
    buf.write_all(&MAP_MAGIC)?;
    buf.write_u32::<LittleEndian>(CURRENT_MAP_VERSION)?;
    buf.write_u32::<LittleEndian>(grid.width() as u32)?;
    buf.write_u32::<LittleEndian>(grid.height() as u32)?;

    // Tiles
    for tile in grid.tiles() {
        buf.write_u16::<LittleEndian>(tile.texture.persisted())?;
        buf.write_u8(tile.height)?;
    }

    // Gateways
    let gateways = persisted_gateways(routing);
    buf.write_u32::<LittleEndian>(GATEWAY_SECTION_VERSION)?;
    buf.write_u32::<LittleEndian>(gateways.len() as u32)?;
    for g in &gateways {
        buf.write_all(&[g.x0, g.y0, g.x1, g.y1])?;
    }

    // Zones
    let num_zones = routing.zone_line_count();
    let num_equiv = routing.equivalence_zone_count();
    buf.write_u16::<LittleEndian>(ZONE_SECTION_V2)?;
    buf.write_u16::<LittleEndian>(field_u16("zone line count", num_zones)?)?;
    buf.write_u16::<LittleEndian>(field_u16("equivalence zone count", num_equiv)?)?;
    buf.write_u16::<LittleEndian>(0)?;

    for i in 0..num_zones {
        let line = routing.zone_line(i);
        buf.write_u16::<LittleEndian>(field_u16("zone line length", line.len())?)?;
        buf.write_all(line)?;
    }

    for i in 0..num_equiv {
        let members = routing.zone_equivalence(i);
        buf.write_u8(field_u8("equivalence list length", members.len())?)?;
        buf.write_all(members)?;
    }

    debug_assert_eq!(buf.len(), expected, "map buffer size mismatch");
    info!(
        "encoded {}x{} map: {} bytes, {} gateways",
        grid.width(),
        grid.height(),
        buf.len(),
        gateways.len()
    );
    Ok(buf)
}
