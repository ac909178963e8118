//! In-memory routing store: gateways, RLE zone lines and equivalence lists.
//!
//! Holds exactly what the map file carries. The routing algorithms that
//! consume it live elsewhere; this store only validates and links.

use log::debug;

use warmap_core::types::GatewayRecord;
use warmap_core::RoutingError;

use crate::collab::{Gateway, RoutingData};
use crate::grid::TileGrid;

/// Run-length encode one row of zone ids as `(run, zone)` byte pairs.
/// Runs longer than 255 tiles are split.
pub fn encode_rle_row(zones: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut iter = zones.iter().copied().peekable();
    while let Some(zone) = iter.next() {
        let mut run: u8 = 1;
        while run < u8::MAX && iter.peek() == Some(&zone) {
            iter.next();
            run += 1;
        }
        out.push(run);
        out.push(zone);
    }
    out
}

/// Reference implementation of [`RoutingData`].
#[derive(Debug, Clone, Default)]
pub struct ZoneRouting {
    gateways: Vec<Gateway>,
    /// One RLE line per map row.
    zone_lines: Vec<Vec<u8>>,
    equivalences: Vec<Vec<u8>>,
    link_gates_generated: bool,
    linked: bool,
}

impl ZoneRouting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a water-crossing gateway. These are rebuilt on every load
    /// and never written to the map file.
    pub fn add_water_link(&mut self, record: GatewayRecord) {
        self.gateways.push(Gateway {
            record,
            water_link: true,
        });
    }

    /// Replace zone line `index` with already-encoded RLE bytes.
    pub fn set_zone_line(&mut self, index: usize, rle: Vec<u8>) {
        if self.zone_lines.len() <= index {
            self.zone_lines.resize_with(index + 1, Vec::new);
        }
        self.zone_lines[index] = rle;
    }

    /// Zone id at tile `(x, y)`, decoded from the RLE line for row `y`.
    pub fn zone_at(&self, x: usize, y: usize) -> Option<u8> {
        let line = self.zone_lines.get(y)?;
        let mut covered = 0usize;
        for pair in line.chunks_exact(2) {
            covered += pair[0] as usize;
            if x < covered {
                return Some(pair[1]);
            }
        }
        None
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn link_gates_generated(&self) -> bool {
        self.link_gates_generated
    }

    /// Drop everything.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

impl RoutingData for ZoneRouting {
    fn clear_gateways(&mut self) {
        self.gateways.clear();
        self.linked = false;
    }

    fn add_gateway(&mut self, record: GatewayRecord) -> Result<(), RoutingError> {
        if !record.is_axis_aligned() {
            return Err(RoutingError::SkewedGateway {
                x0: record.x0,
                y0: record.y0,
                x1: record.x1,
                y1: record.y1,
            });
        }
        self.gateways.push(Gateway {
            record,
            water_link: false,
        });
        self.linked = false;
        Ok(())
    }

    fn gateways(&self) -> &[Gateway] {
        &self.gateways
    }

    fn new_zone_map(&mut self) -> Result<(), RoutingError> {
        self.zone_lines.clear();
        self.equivalences.clear();
        self.link_gates_generated = false;
        Ok(())
    }

    fn new_zone_line(&mut self, index: usize, len: usize) -> Result<&mut [u8], RoutingError> {
        if len % 2 != 0 {
            return Err(RoutingError::ZoneLine {
                zone: index,
                reason: format!("odd RLE length {len}"),
            });
        }
        self.set_zone_line(index, vec![0; len]);
        Ok(self.zone_lines[index].as_mut_slice())
    }

    fn zone_line_count(&self) -> usize {
        self.zone_lines.len()
    }

    fn zone_line(&self, index: usize) -> &[u8] {
        self.zone_lines.get(index).map_or(&[], Vec::as_slice)
    }

    fn new_equivalence_table(&mut self, zones: usize) -> Result<(), RoutingError> {
        self.equivalences = vec![Vec::new(); zones];
        Ok(())
    }

    fn set_zone_equivalence(&mut self, zone: usize, members: &[u8]) -> Result<(), RoutingError> {
        let zones = self.equivalences.len();
        let slot = self
            .equivalences
            .get_mut(zone)
            .ok_or_else(|| RoutingError::Equivalence {
                zone,
                reason: format!("table holds {zones} zones"),
            })?;
        if members.len() > u8::MAX as usize {
            return Err(RoutingError::Equivalence {
                zone,
                reason: format!("{} members", members.len()),
            });
        }
        *slot = members.to_vec();
        Ok(())
    }

    fn equivalence_zone_count(&self) -> usize {
        self.equivalences.len()
    }

    fn zone_equivalence(&self, zone: usize) -> &[u8] {
        self.equivalences.get(zone).map_or(&[], Vec::as_slice)
    }

    fn generate_link_gates(&mut self, grid: &TileGrid) -> Result<(), RoutingError> {
        if self.zone_lines.len() != grid.height() {
            return Err(RoutingError::LinkGates(format!(
                "{} zone lines for {} map rows",
                self.zone_lines.len(),
                grid.height()
            )));
        }
        self.link_gates_generated = true;
        Ok(())
    }

    fn link_gateways(&mut self, grid: &TileGrid) -> Result<(), RoutingError> {
        for gate in &self.gateways {
            let r = gate.record;
            for (x, y) in [(r.x0, r.y0), (r.x1, r.y1)] {
                if x as usize >= grid.width() || y as usize >= grid.height() {
                    return Err(RoutingError::GatewayOutOfBounds { x, y });
                }
            }
        }
        debug!("linked {} gateways", self.gateways.len());
        self.linked = true;
        Ok(())
    }
}
