/// Extraction configuration

use crate::extract::progress::Progress;
use crate::format::OutputFormat;
use crate::image::Track;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Called with throttled progress updates
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Called before a track is extracted: (1-based track number, track, output path)
pub type TrackStartCallback = Arc<dyn Fn(usize, &Track, &Path) + Send + Sync>;

/// Called after a track is finalized: (1-based track number, track, output path, bytes written)
pub type TrackCompleteCallback = Arc<dyn Fn(usize, &Track, &Path, u64) + Send + Sync>;

/// Options for an extraction run.
///
/// A plain value: the extractor keeps its own copy, and callbacks carry
/// whatever caller state they capture.
#[derive(Clone)]
pub struct ExtractionOptions {
    /// Output container format
    pub format: OutputFormat,
    /// Run DST compressed frames through the frame decoder
    pub convert_dst: bool,
    /// Write a cue sheet after a completed run
    pub export_cue_sheet: bool,
    /// Include track pauses (recognized, not applied)
    pub include_pauses: bool,
    /// Trim leading whitespace from filename components
    pub trim_whitespace: bool,
    /// Skip DSF block padding
    pub dsf_nopad: bool,
    /// Write ID3 tags (recognized, not applied)
    pub add_id3_tags: bool,
    /// ID3 tag version
    pub id3_version: u8,
    /// Extract into `<artist> - <album>` below the output directory
    pub add_artist_to_folder: bool,
    /// Append the track artist to output filenames
    pub add_performer_to_filename: bool,
    /// Progress callback
    pub progress: Option<ProgressCallback>,
    /// Track start callback
    pub track_start: Option<TrackStartCallback>,
    /// Track complete callback
    pub track_complete: Option<TrackCompleteCallback>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Dsf,
            convert_dst: true,
            export_cue_sheet: false,
            include_pauses: true,
            trim_whitespace: true,
            dsf_nopad: false,
            add_id3_tags: false,
            id3_version: 3,
            add_artist_to_folder: false,
            add_performer_to_filename: false,
            progress: None,
            track_start: None,
            track_complete: None,
        }
    }
}

impl ExtractionOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable DST conversion
    pub fn with_convert_dst(mut self, convert_dst: bool) -> Self {
        self.convert_dst = convert_dst;
        self
    }

    /// Enable or disable cue sheet export
    pub fn with_cue_sheet(mut self, export: bool) -> Self {
        self.export_cue_sheet = export;
        self
    }

    /// Enable or disable DSF block padding suppression
    pub fn with_dsf_nopad(mut self, nopad: bool) -> Self {
        self.dsf_nopad = nopad;
        self
    }

    /// Enable or disable leading whitespace trimming in filenames
    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Extract into an `<artist> - <album>` folder
    pub fn with_artist_folder(mut self, enabled: bool) -> Self {
        self.add_artist_to_folder = enabled;
        self
    }

    /// Append the track artist to filenames
    pub fn with_performer_in_filename(mut self, enabled: bool) -> Self {
        self.add_performer_to_filename = enabled;
        self
    }

    /// Set the progress callback
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Set the track start callback
    pub fn on_track_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, &Track, &Path) + Send + Sync + 'static,
    {
        self.track_start = Some(Arc::new(callback));
        self
    }

    /// Set the track complete callback
    pub fn on_track_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, &Track, &Path, u64) + Send + Sync + 'static,
    {
        self.track_complete = Some(Arc::new(callback));
        self
    }

    pub(crate) fn report_progress(&self, progress: &Progress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }

    pub(crate) fn report_track_start(&self, track: &Track, path: &Path) {
        if let Some(callback) = &self.track_start {
            callback(track.number + 1, track, path);
        }
    }

    pub(crate) fn report_track_complete(&self, track: &Track, path: &Path, bytes: u64) {
        if let Some(callback) = &self.track_complete {
            callback(track.number + 1, track, path, bytes);
        }
    }
}

impl fmt::Debug for ExtractionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionOptions")
            .field("format", &self.format)
            .field("convert_dst", &self.convert_dst)
            .field("export_cue_sheet", &self.export_cue_sheet)
            .field("include_pauses", &self.include_pauses)
            .field("trim_whitespace", &self.trim_whitespace)
            .field("dsf_nopad", &self.dsf_nopad)
            .field("add_id3_tags", &self.add_id3_tags)
            .field("id3_version", &self.id3_version)
            .field("add_artist_to_folder", &self.add_artist_to_folder)
            .field("add_performer_to_filename", &self.add_performer_to_filename)
            .field("progress", &self.progress.is_some())
            .field("track_start", &self.track_start.is_some())
            .field("track_complete", &self.track_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults() {
        let options = ExtractionOptions::default();
        assert_eq!(options.format, OutputFormat::Dsf);
        assert!(options.convert_dst);
        assert!(!options.export_cue_sheet);
        assert!(options.include_pauses);
        assert!(options.trim_whitespace);
        assert!(!options.dsf_nopad);
        assert_eq!(options.id3_version, 3);
        assert!(options.progress.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = ExtractionOptions::new()
            .with_format(OutputFormat::Dsdiff)
            .with_convert_dst(false)
            .with_cue_sheet(true)
            .with_performer_in_filename(true);
        assert_eq!(options.format, OutputFormat::Dsdiff);
        assert!(!options.convert_dst);
        assert!(options.export_cue_sheet);
        assert!(options.add_performer_to_filename);
    }

    #[test]
    fn test_clone_shares_callbacks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = ExtractionOptions::new().on_progress(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let copy = options.clone();

        options.report_progress(&Progress::default());
        copy.report_progress(&Progress::default());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(format!("{:?}", copy).contains("progress: true"));
    }
}
