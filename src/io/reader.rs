/// SACD image reader

use crate::error::{Result, SacdError};
use crate::format::constants::*;
use crate::image::metadata::AreaPointer;
use crate::image::{Area, AreaType, Disc};
use crate::io::sector::{ImageSource, SectorReader};
use crate::toc::{area_type_from_signature, parse_area_toc, parse_master_toc};
use std::fs::File;
use std::io;
use std::path::Path;

/// Open and parse an SACD image file
pub fn read_sacd<P: AsRef<Path>>(path: P) -> Result<Disc> {
    let path = path.as_ref();
    let file = File::open(path)?;
    log::info!("Opening SACD image {}", path.display());
    read_disc(Box::new(file), Some(path.display().to_string()))
}

/// Parse a disc from any seekable source.
///
/// Reads the Master TOC at LSN 510, then each area TOC it points to. An
/// area whose TOC signature does not validate is treated as absent; any
/// other failure aborts the open.
pub fn read_disc(source: Box<dyn ImageSource>, filename: Option<String>) -> Result<Disc> {
    let mut reader = SectorReader::new(source);

    let master = reader
        .read_sectors(MASTER_TOC_LSN, MASTER_TOC_SECTORS)
        .map_err(|e| match e {
            SacdError::Io(ref io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                SacdError::invalid_file("image too small to hold a master TOC")
            }
            other => other,
        })?;
    let metadata = parse_master_toc(&master)?;

    let stereo = match metadata.stereo_toc {
        Some(pointer) => read_area(&mut reader, pointer, AreaType::Stereo)?,
        None => None,
    };
    let multichannel = match metadata.multichannel_toc {
        Some(pointer) => read_area(&mut reader, pointer, AreaType::Multichannel)?,
        None => None,
    };

    let disc = Disc {
        metadata,
        stereo,
        multichannel,
        source: std::sync::Mutex::new(reader),
        filename,
    };

    log::info!(
        "Found {} area(s): stereo={} multichannel={}",
        disc.area_count(),
        disc.stereo.as_ref().map_or(0, |a| a.track_count()),
        disc.multichannel.as_ref().map_or(0, |a| a.track_count())
    );

    Ok(disc)
}

fn read_area<R: ImageSource>(
    reader: &mut SectorReader<R>,
    pointer: AreaPointer,
    expected: AreaType,
) -> Result<Option<Area>> {
    let data = match reader.read_sectors(pointer.start_lsn, pointer.size as u32) {
        Ok(data) => data,
        Err(SacdError::Io(e)) => {
            log::warn!(
                "{} area TOC at sector {} could not be read, ignoring area: {}",
                expected,
                pointer.start_lsn,
                e
            );
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let Some(found) = area_type_from_signature(&data) else {
        log::warn!(
            "{} area TOC at sector {} has no valid signature, ignoring area",
            expected,
            pointer.start_lsn
        );
        return Ok(None);
    };

    let mut area = parse_area_toc(&data, pointer.size)?;
    if found != expected {
        log::warn!(
            "{} area TOC at sector {} is signed as {}",
            expected,
            pointer.start_lsn,
            found
        );
        area.area_type = expected;
    }

    Ok(Some(area))
}
