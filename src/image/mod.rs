/// SACD disc model

/// Area definition and frame format
pub mod area;
/// Image builder for creating synthetic SACD images
pub mod builder;
/// Album-level metadata
pub mod metadata;
/// Minute/second/frame time codes
pub mod time;
/// Track definition and text
pub mod track;

pub use area::{Area, AreaType, FrameFormat};
pub use builder::{AreaSpec, SacdImageBuilder, TrackSpec};
pub use metadata::{AreaPointer, DiscMetadata};
pub use time::{seconds_to_time, time_to_seconds, SacdTime};
pub use track::{estimate_track_file_size, Genre, SacdText, Track};

use crate::error::{Result, SacdError};
use crate::format::constants::SECTOR_SIZE;
use crate::io::sector::{ImageSource, SectorReader};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;

/// An opened SACD disc image.
///
/// The parsed structure is immutable. Sector reads go through a single
/// image handle guarded by a mutex, so a `Disc` can be shared between
/// extractors behind an `Arc`.
pub struct Disc {
    /// Master TOC metadata
    pub(crate) metadata: DiscMetadata,
    /// Stereo area, if its TOC validated
    pub(crate) stereo: Option<Area>,
    /// Multichannel area, if its TOC validated
    pub(crate) multichannel: Option<Area>,
    /// Image handle
    pub(crate) source: Mutex<SectorReader<Box<dyn ImageSource>>>,
    /// Original filename if opened from disk
    pub(crate) filename: Option<String>,
}

impl Disc {
    /// Open an SACD image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::io::read_sacd(path)
    }

    /// Parse a disc from any seekable byte source
    pub fn from_reader<R: ImageSource + 'static>(source: R) -> Result<Self> {
        crate::io::read_disc(Box::new(source), None)
    }

    /// Album-level metadata
    pub fn metadata(&self) -> &DiscMetadata {
        &self.metadata
    }

    /// Album text
    pub fn text(&self) -> &SacdText {
        &self.metadata.album_text
    }

    /// Album title
    pub fn title(&self) -> Option<&str> {
        self.metadata.album_text.title.as_deref()
    }

    /// Album artist
    pub fn artist(&self) -> Option<&str> {
        self.metadata.album_text.artist.as_deref()
    }

    /// Filename the disc was opened from
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Get an area by type
    pub fn area(&self, area_type: AreaType) -> Option<&Area> {
        match area_type {
            AreaType::Stereo => self.stereo.as_ref(),
            AreaType::Multichannel => self.multichannel.as_ref(),
        }
    }

    /// Get the preferred area: stereo if present, else multichannel
    pub fn best_area(&self) -> Option<&Area> {
        self.stereo.as_ref().or(self.multichannel.as_ref())
    }

    /// Iterate over the areas present on the disc
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.stereo.iter().chain(self.multichannel.iter())
    }

    /// Number of areas whose TOC validated
    pub fn area_count(&self) -> usize {
        self.areas().count()
    }

    /// Read one logical sector into `buffer`
    pub fn read_sector_into(&self, lsn: u32, buffer: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        let mut source = self
            .source
            .lock()
            .map_err(|_| SacdError::generic("disc image handle poisoned"))?;
        source.read_sector_into(lsn, buffer)
    }

    /// Read one logical sector
    pub fn read_sector(&self, lsn: u32) -> Result<[u8; SECTOR_SIZE]> {
        let mut buffer = [0u8; SECTOR_SIZE];
        self.read_sector_into(lsn, &mut buffer)?;
        Ok(buffer)
    }
}

impl fmt::Debug for Disc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disc")
            .field("metadata", &self.metadata)
            .field("stereo", &self.stereo)
            .field("multichannel", &self.multichannel)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}
