/// Track data structures

use crate::format::constants::{FRAME_RATE, SAMPLING_FREQUENCY};
use crate::format::OutputFormat;
use crate::image::area::FrameFormat;
use crate::image::time::SacdTime;

/// Genre table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Genre {
    /// Genre table category (1 = general)
    pub category: u8,
    /// Genre code within the category
    pub genre: u8,
}

impl Genre {
    /// Create a new genre entry
    pub fn new(category: u8, genre: u8) -> Self {
        Self { category, genre }
    }

    /// Check if no genre is set
    pub fn is_empty(&self) -> bool {
        self.category == 0 && self.genre == 0
    }
}

/// Text information for a disc, area or track.
///
/// Every field is optional; SACD text is decoded on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SacdText {
    /// Title
    pub title: Option<String>,
    /// Phonetic title
    pub title_phonetic: Option<String>,
    /// Artist (performer)
    pub artist: Option<String>,
    /// Phonetic artist
    pub artist_phonetic: Option<String>,
    /// Publisher
    pub publisher: Option<String>,
    /// Phonetic publisher
    pub publisher_phonetic: Option<String>,
    /// Copyright
    pub copyright: Option<String>,
    /// Phonetic copyright
    pub copyright_phonetic: Option<String>,
    /// Songwriter
    pub songwriter: Option<String>,
    /// Composer
    pub composer: Option<String>,
    /// Arranger
    pub arranger: Option<String>,
    /// Free-form message
    pub message: Option<String>,
}

impl SacdText {
    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        *self == SacdText::default()
    }
}

/// A track within an area
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Track number (0-based)
    pub number: usize,
    /// Start time
    pub start_time: SacdTime,
    /// Duration
    pub duration: SacdTime,
    /// First logical sector
    pub start_lsn: u32,
    /// Length in logical sectors
    pub length_lsn: u32,
    /// Channel count (inherited from the area)
    pub channel_count: u8,
    /// Frame format of the audio sectors
    pub frame_format: FrameFormat,
    /// True if the audio is DST compressed
    pub dst_encoded: bool,
    /// Text information
    pub text: SacdText,
    /// Genre
    pub genre: Genre,
    /// ISRC code
    pub isrc: Option<String>,
}

impl Track {
    /// Create an empty track inheriting the area's channel count and frame format
    pub fn new(number: usize, channel_count: u8, frame_format: FrameFormat) -> Self {
        Self {
            number,
            start_time: SacdTime::default(),
            duration: SacdTime::default(),
            start_lsn: 0,
            length_lsn: 0,
            channel_count,
            frame_format,
            dst_encoded: frame_format == FrameFormat::Dst,
            text: SacdText::default(),
            genre: Genre::default(),
            isrc: None,
        }
    }

    /// Title, if any
    pub fn title(&self) -> Option<&str> {
        self.text.title.as_deref()
    }

    /// Artist, if any
    pub fn artist(&self) -> Option<&str> {
        self.text.artist.as_deref()
    }

    /// One past the last logical sector of the track
    pub fn end_lsn(&self) -> u64 {
        self.start_lsn as u64 + self.length_lsn as u64
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration.to_seconds()
    }

    /// Duration in DSD samples per channel
    pub fn duration_samples(&self) -> u64 {
        self.duration.total_frames() * SAMPLING_FREQUENCY as u64 / FRAME_RATE as u64
    }

    /// Audio bytes the recorded duration implies, without any container header
    pub fn estimated_audio_bytes(&self) -> u64 {
        self.duration_samples() * self.channel_count as u64 / 8
    }
}

/// Estimate the output file size of a track: audio bytes plus header overhead
pub fn estimate_track_file_size(track: &Track, format: OutputFormat) -> u64 {
    track.estimated_audio_bytes() + format.header_overhead()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Track {
        let mut track = Track::new(0, 2, FrameFormat::Dsd3In16);
        track.duration = SacdTime::new(0, 10, 0);
        track.start_lsn = 1000;
        track.length_lsn = 50;
        track
    }

    #[test]
    fn test_new_track() {
        let track = Track::new(3, 6, FrameFormat::Dst);
        assert_eq!(track.number, 3);
        assert_eq!(track.channel_count, 6);
        assert!(track.dst_encoded);
        assert!(track.text.is_empty());
        assert!(track.title().is_none());
    }

    #[test]
    fn test_duration_samples() {
        let track = sample_track();
        assert_eq!(track.duration_samples(), 10 * 2_822_400);
        assert_eq!(track.end_lsn(), 1050);
        assert!((track.duration_seconds() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_track_file_size() {
        let track = sample_track();
        let audio = 10 * 2_822_400 * 2 / 8;
        assert_eq!(estimate_track_file_size(&track, OutputFormat::Dsf), audio + 96);
        assert_eq!(estimate_track_file_size(&track, OutputFormat::Dsdiff), audio + 512);
        assert_eq!(track.estimated_audio_bytes(), audio);
    }

    #[test]
    fn test_genre() {
        assert!(Genre::default().is_empty());
        assert!(!Genre::new(1, 9).is_empty());
    }
}
