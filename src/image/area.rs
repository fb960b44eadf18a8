/// Area data structures

use crate::format::constants::MAX_TRACKS;
use crate::image::track::{SacdText, Track};

/// Area type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaType {
    /// 2-channel area
    Stereo,
    /// Multi-channel area
    Multichannel,
}

impl AreaType {
    /// Get a human-readable name for this area type
    pub fn name(&self) -> &'static str {
        match self {
            AreaType::Stereo => "Stereo",
            AreaType::Multichannel => "Multichannel",
        }
    }
}

impl std::fmt::Display for AreaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio frame format of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// DST compressed
    Dst,
    /// Plain DSD, 3 frames in 14 sectors
    Dsd3In14,
    /// Plain DSD, 3 frames in 16 sectors
    Dsd3In16,
    /// Unrecognized frame format code
    Unknown(u8),
}

impl From<u8> for FrameFormat {
    fn from(value: u8) -> Self {
        match value & 0x0F {
            0 => FrameFormat::Dst,
            2 => FrameFormat::Dsd3In14,
            3 => FrameFormat::Dsd3In16,
            other => FrameFormat::Unknown(other),
        }
    }
}

impl From<FrameFormat> for u8 {
    fn from(format: FrameFormat) -> Self {
        match format {
            FrameFormat::Dst => 0,
            FrameFormat::Dsd3In14 => 2,
            FrameFormat::Dsd3In16 => 3,
            FrameFormat::Unknown(code) => code & 0x0F,
        }
    }
}

/// An audio area (stereo or multichannel program)
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    /// Area type
    pub area_type: AreaType,
    /// Area TOC version (major, minor)
    pub version: (u8, u8),
    /// Number of channels
    pub channel_count: u8,
    /// Sample frequency in Hz
    pub sample_frequency: u32,
    /// Frame format
    pub frame_format: FrameFormat,
    /// First logical sector of the area
    pub start_lsn: u32,
    /// Last logical sector of the area
    pub end_lsn: u32,
    /// Area text information
    pub text: SacdText,
    /// Tracks, at most [`MAX_TRACKS`]
    tracks: Vec<Track>,
}

impl Area {
    /// Create an area without tracks
    pub fn new(area_type: AreaType, channel_count: u8, frame_format: FrameFormat) -> Self {
        Self {
            area_type,
            version: (0, 0),
            channel_count,
            sample_frequency: crate::format::constants::SAMPLING_FREQUENCY,
            frame_format,
            start_lsn: 0,
            end_lsn: 0,
            text: SacdText::default(),
            tracks: Vec::new(),
        }
    }

    /// Add a track, ignoring it once the area holds [`MAX_TRACKS`] tracks.
    /// Returns false if the track was dropped.
    pub fn add_track(&mut self, track: Track) -> bool {
        if self.tracks.len() >= MAX_TRACKS {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Get all tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    /// Get a track by 0-based index
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the area has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Check whether a track's sectors lie within the area bounds
    pub fn contains_track(&self, track: &Track) -> bool {
        track.start_lsn >= self.start_lsn && track.end_lsn() <= self.end_lsn as u64 + 1
    }

    /// Total duration of all tracks in seconds
    pub fn total_duration_seconds(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration_seconds()).sum()
    }
}
