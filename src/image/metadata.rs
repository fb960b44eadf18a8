/// Album-level metadata decoded from the Master TOC

use crate::image::track::{Genre, SacdText};

/// Location of an area TOC on the disc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaPointer {
    /// First sector of the area TOC
    pub start_lsn: u32,
    /// Length of the area TOC in sectors
    pub size: u16,
}

impl AreaPointer {
    /// Build a pointer, or `None` if either field is zero (area absent)
    pub fn new(start_lsn: u32, size: u16) -> Option<Self> {
        if start_lsn > 0 && size > 0 {
            Some(Self { start_lsn, size })
        } else {
            None
        }
    }
}

/// Disc metadata from the Master TOC and master text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscMetadata {
    /// Specification version (major, minor)
    pub version: (u8, u8),
    /// Number of discs in the album set
    pub album_set_size: u16,
    /// Position of this disc in the album set
    pub album_sequence_number: u16,
    /// Album catalog number
    pub catalog_number: Option<String>,
    /// Disc catalog number
    pub disc_catalog_number: Option<String>,
    /// Disc genres
    pub genres: [Genre; 4],
    /// Stereo area TOC location
    pub stereo_toc: Option<AreaPointer>,
    /// Multichannel area TOC location
    pub multichannel_toc: Option<AreaPointer>,
    /// True if the disc carries a CD layer
    pub is_hybrid: bool,
    /// Release year
    pub year: u16,
    /// Release month
    pub month: u8,
    /// Release day
    pub day: u8,
    /// Album text
    pub album_text: SacdText,
    /// Disc text
    pub disc_text: SacdText,
}

impl DiscMetadata {
    /// Release date as `YYYY-MM-DD`, or `None` if no year is recorded
    pub fn release_date(&self) -> Option<String> {
        if self.year == 0 {
            return None;
        }
        Some(format!("{:04}-{:02}-{:02}", self.year, self.month, self.day))
    }
}
