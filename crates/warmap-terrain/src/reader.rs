//! Bounds-checked cursor over a map file buffer.

use byteorder::{ByteOrder, LittleEndian};

use warmap_core::error::{MapError, Result};

/// Little-endian cursor that fails with [`MapError::TruncatedFile`] instead of
/// reading past the end of its buffer.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Section being read, reported on underrun.
    section: &'static str,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            section: "header",
        }
    }

    /// Label subsequent reads for error reporting.
    pub fn enter(&mut self, section: &'static str) {
        self.section = section;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(MapError::TruncatedFile {
                section: self.section,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn magic(&mut self) -> Result<[u8; 4]> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u16().unwrap(), 0x1234);
        assert_eq!(r.u32().unwrap(), 0x1234_5678);
        assert_eq!(r.u8().unwrap(), 0xff);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_underrun_reports_section() {
        let data = [1, 2, 3];
        let mut r = ByteReader::new(&data);
        r.enter("zone lines");
        let err = r.u32().unwrap_err();
        match err {
            MapError::TruncatedFile {
                section,
                needed,
                available,
            } => {
                assert_eq!(section, "zone lines");
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
        // A failed read does not advance.
        assert_eq!(r.position(), 0);
        assert_eq!(r.take(3).unwrap(), &[1, 2, 3]);
    }
}
