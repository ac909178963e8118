//! Per-tile visibility persistence ("visd" files).
//!
//! Layout: magic `"visd"`, version (u32, big-endian), then one visibility
//! byte per tile in row-major order.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::{debug, info};

use warmap_core::constants::{CURRENT_VIS_VERSION, VIS_HEADER_SIZE, VIS_MAGIC};
use warmap_core::error::{MapError, Result};
use warmap_core::types::VisibilityBits;

use crate::grid::TileGrid;

/// Outcome of [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityLoad {
    /// Every tile's visibility was replaced from the file.
    Restored,
    /// No file; the grid keeps its current visibility.
    Missing,
}

fn write_to<W: Write>(out: &mut W, grid: &TileGrid) -> io::Result<()> {
    out.write_all(&VIS_MAGIC)?;
    out.write_u32::<BigEndian>(CURRENT_VIS_VERSION)?;
    for tile in grid.tiles() {
        out.write_u8(tile.visibility.raw())?;
    }
    Ok(())
}

/// Serialize visibility of every tile.
pub fn encode(grid: &TileGrid) -> Vec<u8> {
    let mut buf = Vec::with_capacity(VIS_HEADER_SIZE + grid.tile_count());
    buf.extend_from_slice(&VIS_MAGIC);
    buf.extend_from_slice(&CURRENT_VIS_VERSION.to_be_bytes());
    buf.extend(grid.tiles().iter().map(|t| t.visibility.raw()));
    buf
}

/// Apply a visibility buffer to `grid`. Nothing is changed on error.
pub fn decode(data: &[u8], grid: &mut TileGrid) -> Result<()> {
    if data.len() < VIS_HEADER_SIZE {
        return Err(MapError::TruncatedFile {
            section: "visibility header",
            needed: VIS_HEADER_SIZE,
            available: data.len(),
        });
    }

    let magic = [data[0], data[1], data[2], data[3]];
    if magic != VIS_MAGIC {
        return Err(MapError::BadMagic {
            expected: VIS_MAGIC,
            found: magic,
        });
    }
    let version = BigEndian::read_u32(&data[4..VIS_HEADER_SIZE]);

    let expected = (VIS_HEADER_SIZE + grid.tile_count()) as u64;
    if data.len() as u64 != expected {
        return Err(MapError::VisibilitySizeMismatch {
            expected,
            actual: data.len() as u64,
        });
    }

    for (tile, bits) in grid.tiles_mut().iter_mut().zip(&data[VIS_HEADER_SIZE..]) {
        tile.visibility = VisibilityBits::from_raw(*bits);
    }
    debug!("visibility v{version}: {} tiles", grid.tile_count());
    Ok(())
}

/// Stream the grid's visibility to `path`.
///
/// On failure the file may be left partially written.
pub fn save(path: &Path, grid: &TileGrid) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_to(&mut out, grid)?;
    out.flush()?;
    info!("saved visibility for {} tiles to {}", grid.tile_count(), path.display());
    Ok(())
}

/// Restore visibility from `path`. A missing file is not an error.
pub fn load(path: &Path, grid: &mut TileGrid) -> Result<VisibilityLoad> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no visibility file at {}", path.display());
            return Ok(VisibilityLoad::Missing);
        }
        Err(e) => return Err(e.into()),
    };
    decode(&data, grid)?;
    info!("restored visibility from {}", path.display());
    Ok(VisibilityLoad::Restored)
}
