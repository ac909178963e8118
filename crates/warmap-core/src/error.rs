//! Error types for map loading, saving and routing collaborators.

use std::fmt;
use std::io;

/// Failure reported by the routing collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// Gateway is neither horizontal nor vertical.
    SkewedGateway { x0: u8, y0: u8, x1: u8, y1: u8 },
    /// Gateway endpoint lies outside the grid.
    GatewayOutOfBounds { x: u8, y: u8 },
    /// Zone line could not be allocated.
    ZoneLine { zone: usize, reason: String },
    /// Equivalence list rejected.
    Equivalence { zone: usize, reason: String },
    /// Inter-zone link gates could not be generated.
    LinkGates(String),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::SkewedGateway { x0, y0, x1, y1 } => write!(
                f,
                "gateway ({x0},{y0})-({x1},{y1}) is not horizontal or vertical"
            ),
            RoutingError::GatewayOutOfBounds { x, y } => {
                write!(f, "gateway endpoint ({x},{y}) is outside the map")
            }
            RoutingError::ZoneLine { zone, reason } => {
                write!(f, "zone line {zone}: {reason}")
            }
            RoutingError::Equivalence { zone, reason } => {
                write!(f, "equivalence list for zone {zone}: {reason}")
            }
            RoutingError::LinkGates(msg) => write!(f, "link gate generation failed: {msg}"),
        }
    }
}

impl std::error::Error for RoutingError {}

/// Errors produced by the map codec, the grid and the visibility store.
#[derive(Debug)]
pub enum MapError {
    /// Underlying storage failure.
    Io(io::Error),
    /// File does not start with the expected magic.
    BadMagic { expected: [u8; 4], found: [u8; 4] },
    /// Version outside the supported range for a section.
    UnsupportedVersion { section: &'static str, version: u32 },
    /// `width * height` exceeds the maximum map area.
    MapTooLarge { width: usize, height: usize },
    /// A section needs more bytes than the buffer holds.
    TruncatedFile {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    /// Bytes left over after the last section.
    TrailingBytes { extra: usize },
    /// Visibility file length does not match the grid.
    VisibilitySizeMismatch { expected: u64, actual: u64 },
    /// A value does not fit its on-disk field.
    FieldOverflow { field: &'static str, value: usize },
    /// Tile buffer could not be allocated. Callers normally terminate.
    OutOfMemory { tiles: usize },
    /// Routing collaborator refused the data.
    Routing(RoutingError),
}

impl MapError {
    /// Whether the caller should treat the failure as unrecoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MapError::OutOfMemory { .. })
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(e) => write!(f, "IO error: {e}"),
            MapError::BadMagic { expected, found } => write!(
                f,
                "bad magic: expected {:?}, found {:?}",
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(found)
            ),
            MapError::UnsupportedVersion { section, version } => {
                write!(f, "unsupported {section} version {version}")
            }
            MapError::MapTooLarge { width, height } => {
                write!(f, "map too large: {width}x{height}")
            }
            MapError::TruncatedFile {
                section,
                needed,
                available,
            } => write!(
                f,
                "unexpected end of file in {section}: needed {needed} bytes, {available} left"
            ),
            MapError::TrailingBytes { extra } => {
                write!(f, "{extra} unexpected bytes after the zone section")
            }
            MapError::VisibilitySizeMismatch { expected, actual } => write!(
                f,
                "visibility file is {actual} bytes, expected {expected}"
            ),
            MapError::FieldOverflow { field, value } => {
                write!(f, "{field} value {value} does not fit its field")
            }
            MapError::OutOfMemory { tiles } => {
                write!(f, "out of memory allocating {tiles} tiles")
            }
            MapError::Routing(e) => write!(f, "routing: {e}"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(e) => Some(e),
            MapError::Routing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MapError {
    fn from(err: io::Error) -> Self {
        MapError::Io(err)
    }
}

impl From<RoutingError> for MapError {
    fn from(err: RoutingError) -> Self {
        MapError::Routing(err)
    }
}

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, MapError>;
