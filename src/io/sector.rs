/// Fixed-size logical sector access to a disc image

use crate::error::{Result, SacdError};
use crate::format::constants::{lsn_to_offset, SECTOR_SIZE};
use std::io::{self, Read, Seek, SeekFrom};

/// A random-access byte source that can back a disc image
pub trait ImageSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> ImageSource for T {}

/// Reads whole 2048-byte logical sectors from an image
#[derive(Debug)]
pub struct SectorReader<R> {
    inner: R,
}

impl<R: Read + Seek> SectorReader<R> {
    /// Wrap a seekable byte source
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read one logical sector into `buffer`.
    ///
    /// Fails with an I/O error if the seek does not land on the sector
    /// offset or the source cannot supply a full sector.
    pub fn read_sector_into(&mut self, lsn: u32, buffer: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        let offset = lsn_to_offset(lsn);
        let landed = self.inner.seek(SeekFrom::Start(offset))?;
        if landed != offset {
            return Err(SacdError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("seek to sector {} landed at byte {}", lsn, landed),
            )));
        }

        self.inner.read_exact(buffer).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                SacdError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short read at sector {}", lsn),
                ))
            } else {
                SacdError::Io(e)
            }
        })
    }

    /// Read one logical sector
    pub fn read_sector(&mut self, lsn: u32) -> Result<[u8; SECTOR_SIZE]> {
        let mut buffer = [0u8; SECTOR_SIZE];
        self.read_sector_into(lsn, &mut buffer)?;
        Ok(buffer)
    }

    /// Read `count` consecutive sectors into one buffer
    pub fn read_sectors(&mut self, lsn: u32, count: u32) -> Result<Vec<u8>> {
        let total = count as usize * SECTOR_SIZE;
        let mut data = Vec::new();
        data.try_reserve_exact(total).map_err(|_| {
            SacdError::out_of_memory(format!("{} sector buffer", count))
        })?;

        let mut buffer = [0u8; SECTOR_SIZE];
        for i in 0..count {
            let sector = lsn.checked_add(i).ok_or_else(|| {
                SacdError::invalid_file(format!("sector range {}+{} overflows", lsn, count))
            })?;
            self.read_sector_into(sector, &mut buffer)?;
            data.extend_from_slice(&buffer);
        }

        Ok(data)
    }

    /// Unwrap the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Audio payload of a sector: everything after the sub-header
#[inline]
pub fn sector_payload(sector: &[u8; SECTOR_SIZE]) -> &[u8] {
    &sector[crate::format::constants::SECTOR_HEADER_SIZE..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn image(sectors: usize) -> Vec<u8> {
        let mut data = vec![0u8; sectors * SECTOR_SIZE];
        for (i, chunk) in data.chunks_mut(SECTOR_SIZE).enumerate() {
            chunk.fill(i as u8);
        }
        data
    }

    #[test]
    fn test_read_sector() {
        let mut reader = SectorReader::new(Cursor::new(image(4)));
        let sector = reader.read_sector(2).unwrap();
        assert!(sector.iter().all(|&b| b == 2));
    }

    #[test]
    fn test_read_sectors() {
        let mut reader = SectorReader::new(Cursor::new(image(4)));
        let data = reader.read_sectors(1, 3).unwrap();
        assert_eq!(data.len(), 3 * SECTOR_SIZE);
        assert_eq!(data[0], 1);
        assert_eq!(data[SECTOR_SIZE], 2);
        assert_eq!(data[3 * SECTOR_SIZE - 1], 3);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut reader = SectorReader::new(Cursor::new(image(2)));
        let err = reader.read_sector(2).unwrap_err();
        assert!(matches!(err, SacdError::Io(_)));
    }

    #[test]
    fn test_partial_sector_fails() {
        let mut data = image(2);
        data.truncate(SECTOR_SIZE + 100);
        let mut reader = SectorReader::new(Cursor::new(data));
        assert!(reader.read_sector(0).is_ok());
        assert!(matches!(reader.read_sector(1), Err(SacdError::Io(_))));
    }

    #[test]
    fn test_sector_payload() {
        let mut sector = [0u8; SECTOR_SIZE];
        sector[16] = 0xAA;
        let payload = sector_payload(&sector);
        assert_eq!(payload.len(), SECTOR_SIZE - 16);
        assert_eq!(payload[0], 0xAA);
    }
}
