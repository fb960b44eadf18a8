/// Background track extraction

/// Cue sheet export
pub mod cue;
/// Output naming
pub mod filename;
/// Extraction configuration
pub mod options;
/// Progress reporting
pub mod progress;

pub use cue::{render_cue_sheet, write_cue_sheet, CueEntry};
pub use filename::{album_output_dir, sanitize_filename, track_output_path};
pub use options::{ExtractionOptions, ProgressCallback, TrackCompleteCallback, TrackStartCallback};
pub use progress::{Progress, ProgressThrottle};

use crate::dst::{is_dst_data, DstDecoder, FrameDecoder};
use crate::error::{Result, SacdError};
use crate::format::constants::SECTOR_SIZE;
use crate::format::OutputFormat;
use crate::image::{Area, AreaType, Disc, Track};
use crate::io::sector::sector_payload;
use crate::io::writer::create_writer;
use progress::{overall_percent, percent_of};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Lifecycle of an extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionState {
    /// No run has started
    #[default]
    Idle,
    /// The worker is extracting
    Running,
    /// Every queued track was extracted
    Completed,
    /// The run stopped on request
    Cancelled,
    /// The run stopped on an error
    Failed,
}

#[derive(Debug, Default)]
struct RunState {
    status: ExtractionState,
    queue: Vec<usize>,
    current_track: Option<usize>,
    completed_tracks: usize,
    track_progress: u8,
    total_bytes_written: u64,
    last_error: Option<String>,
}

struct Shared {
    disc: Arc<Disc>,
    area_type: AreaType,
    output_dir: PathBuf,
    options: ExtractionOptions,
    decoder: Mutex<Box<dyn FrameDecoder>>,
    state: Mutex<RunState>,
    cancel: AtomicBool,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn area(&self) -> Result<&Area> {
        self.disc
            .area(self.area_type)
            .ok_or_else(|| SacdError::invalid_area(format!("{} area not present", self.area_type)))
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

/// Extracts queued tracks of one area to DSD container files on a
/// background worker.
///
/// The extractor shares ownership of its [`Disc`], so the disc stays open
/// for as long as any extractor uses it. Dropping a running extractor
/// cancels the run and waits for the worker.
pub struct Extractor {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl Extractor {
    /// Create an extractor for one area of `disc`, writing into `output_dir`.
    ///
    /// Fails with `InvalidArea` if the area is not on the disc and with an
    /// I/O error if the output directory cannot be created.
    pub fn new<P: AsRef<Path>>(
        disc: Arc<Disc>,
        area_type: AreaType,
        output_dir: P,
        options: ExtractionOptions,
    ) -> Result<Self> {
        if disc.area(area_type).is_none() {
            return Err(SacdError::invalid_area(format!("{} area not present", area_type)));
        }

        let output_dir = album_output_dir(output_dir.as_ref(), &disc, &options);
        fs::create_dir_all(&output_dir)?;

        if options.add_id3_tags {
            log::warn!("ID3v2.{} tagging is not supported, tags will not be written", options.id3_version);
        }
        if !options.include_pauses {
            log::debug!("Track pauses are not separated from audio");
        }

        let mut decoder: Box<dyn FrameDecoder> = Box::new(DstDecoder::new());
        decoder.init()?;

        Ok(Self {
            shared: Arc::new(Shared {
                disc,
                area_type,
                output_dir,
                options,
                decoder: Mutex::new(decoder),
                state: Mutex::new(RunState::default()),
                cancel: AtomicBool::new(false),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Replace the frame decoder, initializing it if needed
    pub fn with_decoder(self, mut decoder: Box<dyn FrameDecoder>) -> Result<Self> {
        if !decoder.is_ready() {
            decoder.init()?;
        }
        let mut current = self.shared.decoder.lock().unwrap_or_else(PoisonError::into_inner);
        current.release();
        *current = decoder;
        drop(current);
        Ok(self)
    }

    /// Append tracks (0-based indices) to the queue.
    ///
    /// Fails while a run is in progress, or with `InvalidTrack` if any
    /// index is out of range, leaving the queue unchanged.
    pub fn add_tracks(&self, indices: &[usize]) -> Result<()> {
        let count = self.shared.area()?.track_count();
        let mut state = self.shared.state();
        if state.status == ExtractionState::Running {
            return Err(SacdError::generic("cannot add tracks while extraction is running"));
        }
        if let Some(&index) = indices.iter().find(|&&index| index >= count) {
            return Err(SacdError::InvalidTrack { index, count });
        }
        state.queue.extend_from_slice(indices);
        Ok(())
    }

    /// Queue every track of the area
    pub fn add_all_tracks(&self) -> Result<()> {
        let count = self.shared.area()?.track_count();
        let all: Vec<usize> = (0..count).collect();
        self.add_tracks(&all)
    }

    /// Empty the queue. Fails while a run is in progress.
    pub fn clear_queue(&self) -> Result<()> {
        let mut state = self.shared.state();
        if state.status == ExtractionState::Running {
            return Err(SacdError::generic("cannot clear the queue while extraction is running"));
        }
        state.queue.clear();
        Ok(())
    }

    /// Queued track indices in extraction order
    pub fn queue(&self) -> Vec<usize> {
        self.shared.state().queue.clone()
    }

    /// Start extracting the queue on a background worker.
    ///
    /// Fails if a run is already in progress or the queue is empty.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        let queue = {
            let mut state = self.shared.state();
            if state.status == ExtractionState::Running {
                return Err(SacdError::generic("extraction already running"));
            }
            if state.queue.is_empty() {
                return Err(SacdError::generic("no tracks queued"));
            }
            // Reset under the state lock, before the run is visible
            self.shared.cancel.store(false, Ordering::Release);
            state.status = ExtractionState::Running;
            state.current_track = None;
            state.completed_tracks = 0;
            state.track_progress = 0;
            state.total_bytes_written = 0;
            state.last_error = None;
            state.queue.clone()
        };

        // A previous worker has already published its terminal state
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("sacd-extract".to_string())
            .spawn(move || run(&shared, &queue));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.state().status = ExtractionState::Idle;
                Err(SacdError::Io(e))
            }
        }
    }

    /// Request cancellation. Does not block.
    pub fn cancel(&self) {
        self.shared.cancel.store(true, Ordering::Release);
    }

    /// Check whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.shared.state().status == ExtractionState::Running
    }

    /// Block until the worker exits.
    ///
    /// Returns `Ok` for a completed run or when nothing was started,
    /// `Err(Cancelled)` for a cancelled run and the worker's error for a
    /// failed one.
    pub fn wait(&self) -> Result<()> {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match handle {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(SacdError::generic("extraction worker panicked"))),
            None => {
                let state = self.shared.state();
                match state.status {
                    ExtractionState::Cancelled => Err(SacdError::Cancelled),
                    ExtractionState::Failed => Err(SacdError::generic(
                        state.last_error.clone().unwrap_or_else(|| "extraction failed".to_string()),
                    )),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Current state of the run
    pub fn state(&self) -> ExtractionState {
        self.shared.state().status
    }

    /// Index of the track being extracted
    pub fn current_track(&self) -> Option<usize> {
        self.shared.state().current_track
    }

    /// Percent of the current track processed
    pub fn track_progress(&self) -> u8 {
        self.shared.state().track_progress
    }

    /// Audio bytes written in the current run
    pub fn total_bytes_written(&self) -> u64 {
        self.shared.state().total_bytes_written
    }

    /// Directory output files are written to
    pub fn output_dir(&self) -> &Path {
        &self.shared.output_dir
    }

    /// Area being extracted
    pub fn area_type(&self) -> AreaType {
        self.shared.area_type
    }

    /// Options the extractor was created with
    pub fn options(&self) -> &ExtractionOptions {
        &self.shared.options
    }
}

impl Drop for Extractor {
    fn drop(&mut self) {
        self.shared.cancel.store(true, Ordering::Release);
        let worker = self.worker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }
        self.shared
            .decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release();
    }
}

/// Worker body: extract the queue, publish the terminal state and send the
/// final progress report
fn run(shared: &Shared, queue: &[usize]) -> Result<()> {
    let outcome = extract_queue(shared, queue);

    let total_tracks = queue.len();
    let (status, summary) = {
        let mut state = shared.state();
        let summary = match &outcome {
            Ok(_) => {
                state.status = ExtractionState::Completed;
                state.track_progress = 100;
                Progress {
                    track_number: 0,
                    total_tracks,
                    track_percent: 100,
                    overall_percent: 100,
                    status: "Extraction completed".to_string(),
                }
            }
            Err(e) => {
                let completed = state.completed_tracks;
                state.status = if e.is_cancelled() {
                    ExtractionState::Cancelled
                } else {
                    state.last_error = Some(e.to_string());
                    ExtractionState::Failed
                };
                let status = if e.is_cancelled() {
                    "Extraction cancelled".to_string()
                } else {
                    format!("Extraction failed: {}", e)
                };
                Progress {
                    track_number: 0,
                    total_tracks,
                    track_percent: state.track_progress,
                    overall_percent: overall_percent(completed, state.track_progress, total_tracks),
                    status,
                }
            }
        };
        (state.status, summary)
    };

    match &outcome {
        Ok(_) => log::info!("Extraction completed: {} track(s)", total_tracks),
        Err(e) if e.is_cancelled() => log::info!("Extraction cancelled"),
        Err(e) => log::warn!("Extraction failed: {}", e),
    }
    log::debug!("Extractor state now {:?}", status);

    shared.options.report_progress(&summary);

    outcome.and_then(|entries| {
        if shared.options.export_cue_sheet {
            if let Err(e) = write_cue_sheet(&shared.output_dir, &shared.disc, &entries) {
                log::warn!("Failed to write cue sheet: {}", e);
            }
        }
        Ok(())
    })
}

fn extract_queue(shared: &Shared, queue: &[usize]) -> Result<Vec<CueEntry>> {
    let area = shared.area()?;
    let mut throttle = ProgressThrottle::new();
    let mut entries = Vec::with_capacity(queue.len());

    for (position, &index) in queue.iter().enumerate() {
        if shared.cancelled() {
            return Err(SacdError::Cancelled);
        }
        let track = area.track(index).ok_or(SacdError::InvalidTrack {
            index,
            count: area.track_count(),
        })?;

        {
            let mut state = shared.state();
            state.current_track = Some(index);
            state.completed_tracks = position;
            state.track_progress = 0;
        }
        throttle.reset();

        let path = track_output_path(&shared.output_dir, track, &shared.options);
        extract_track(shared, area, track, &path, position, queue.len(), &mut throttle)?;
        entries.push(CueEntry {
            track: track.clone(),
            path,
        });
    }

    Ok(entries)
}

fn extract_track(
    shared: &Shared,
    area: &Area,
    track: &Track,
    path: &Path,
    position: usize,
    total_tracks: usize,
    throttle: &mut ProgressThrottle,
) -> Result<u64> {
    let options = &shared.options;
    options.report_track_start(track, path);

    log::info!(
        "Extracting track {} ({} sectors from {}) to {}",
        track.number + 1,
        track.length_lsn,
        track.start_lsn,
        path.display()
    );

    let file = File::create(path)?;
    let mut writer = create_writer(options.format, BufWriter::new(file));
    writer.write_header(track, area, track.estimated_audio_bytes())?;

    let decode = track.dst_encoded && options.convert_dst;
    if track.dst_encoded && !options.convert_dst {
        log::warn!("Track {} is DST encoded, writing compressed frames as-is", track.number + 1);
    }

    let title = track.title().unwrap_or("Unknown");
    let bytes_before = shared.state().total_bytes_written;
    let mut sector = [0u8; SECTOR_SIZE];
    let mut bytes_written = 0u64;
    let length = track.length_lsn as u64;
    let mut cancelled = false;

    for offset in 0..length {
        if shared.cancelled() {
            log::info!("Track {} cancelled after {} sectors", track.number + 1, offset);
            cancelled = true;
            break;
        }

        let lsn = u32::try_from(track.start_lsn as u64 + offset)
            .map_err(|_| SacdError::invalid_file(format!("track {} runs past the last sector", track.number + 1)))?;
        shared.disc.read_sector_into(lsn, &mut sector).map_err(|e| {
            log::warn!("Failed to read sector {}: {}", lsn, e);
            e
        })?;

        let payload = sector_payload(&sector);
        if decode && is_dst_data(payload) {
            let mut decoder = shared.decoder.lock().unwrap_or_else(PoisonError::into_inner);
            let frame = decoder.decode_frame(payload)?;
            writer.write_audio(frame)?;
            bytes_written += frame.len() as u64;
        } else {
            writer.write_audio(payload)?;
            bytes_written += payload.len() as u64;
        }

        let track_percent = percent_of(offset + 1, length);
        if throttle.should_report(track_percent) {
            {
                let mut state = shared.state();
                state.track_progress = track_percent;
                state.total_bytes_written = bytes_before + bytes_written;
            }
            options.report_progress(&Progress {
                track_number: track.number + 1,
                total_tracks,
                track_percent,
                overall_percent: overall_percent(position, track_percent, total_tracks),
                status: format!(
                    "Extracting track {}/{}: {} ({}%) - {} MB",
                    position + 1,
                    total_tracks,
                    title,
                    track_percent,
                    bytes_written / (1024 * 1024)
                ),
            });
        }
    }

    if options.format == OutputFormat::Dsf && !options.dsf_nopad {
        bytes_written += writer.pad(bytes_written)?;
    }
    writer.finalize(bytes_written)?;
    drop(writer);

    shared.state().total_bytes_written = bytes_before + bytes_written;
    if cancelled {
        return Err(SacdError::Cancelled);
    }
    log::info!("Track {} finished: {} bytes", track.number + 1, bytes_written);
    options.report_track_complete(track, path, bytes_written);

    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{AreaSpec, FrameFormat, SacdImageBuilder, TrackSpec};
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn le_u64(data: &[u8], offset: usize) -> u64 {
        u64::from_le_bytes(data[offset..offset + 8].try_into().unwrap())
    }

    fn disc(area: AreaSpec) -> Arc<Disc> {
        let image = SacdImageBuilder::new()
            .title("Album")
            .artist("Band")
            .stereo(area)
            .build();
        Arc::new(Disc::from_reader(Cursor::new(image)).unwrap())
    }

    fn two_tracks() -> AreaSpec {
        AreaSpec::stereo()
            .track(TrackSpec::new("One", 3))
            .track(TrackSpec::new("Two", 2))
    }

    #[test]
    fn test_missing_area() {
        let dir = tempfile::tempdir().unwrap();
        let err = Extractor::new(disc(two_tracks()), AreaType::Multichannel, dir.path(), ExtractionOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, SacdError::InvalidArea(_)));
    }

    #[test]
    fn test_invalid_track_leaves_queue() {
        let dir = tempfile::tempdir().unwrap();
        let extractor =
            Extractor::new(disc(two_tracks()), AreaType::Stereo, dir.path(), ExtractionOptions::default()).unwrap();
        extractor.add_tracks(&[1]).unwrap();
        let err = extractor.add_tracks(&[0, 2]).unwrap_err();
        assert!(matches!(err, SacdError::InvalidTrack { index: 2, count: 2 }));
        assert_eq!(extractor.queue(), vec![1]);

        extractor.add_all_tracks().unwrap();
        assert_eq!(extractor.queue(), vec![1, 0, 1]);
        extractor.clear_queue().unwrap();
        assert!(extractor.queue().is_empty());
    }

    #[test]
    fn test_empty_queue_does_not_start() {
        let dir = tempfile::tempdir().unwrap();
        let extractor =
            Extractor::new(disc(two_tracks()), AreaType::Stereo, dir.path(), ExtractionOptions::default()).unwrap();
        assert!(matches!(extractor.start(), Err(SacdError::Error(_))));
        assert!(!extractor.is_running());
        assert_eq!(extractor.state(), ExtractionState::Idle);
        assert!(extractor.wait().is_ok());
    }

    #[test]
    fn test_run_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let options = ExtractionOptions::default()
            .with_dsf_nopad(true)
            .on_progress(move |p| sink.lock().unwrap().push(p.clone()));

        let extractor = Extractor::new(disc(two_tracks()), AreaType::Stereo, dir.path(), options).unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();

        assert_eq!(extractor.state(), ExtractionState::Completed);
        assert_eq!(extractor.total_bytes_written(), 5 * 2032);

        let first = std::fs::read(dir.path().join("01 - One.dsf")).unwrap();
        assert_eq!(first.len(), 92 + 3 * 2032);
        let second = std::fs::read(dir.path().join("02 - Two.dsf")).unwrap();
        assert_eq!(second.len(), 92 + 2 * 2032);

        let reports = reports.lock().unwrap();
        let last = reports.last().unwrap();
        assert_eq!(last.track_number, 0);
        assert_eq!(last.overall_percent, 100);
        assert_eq!(last.status, "Extraction completed");

        // Per track percentages never repeat or go backwards
        for pair in reports.windows(2) {
            if pair[0].track_number == pair[1].track_number && pair[1].track_number != 0 {
                assert!(pair[1].track_percent > pair[0].track_percent);
            }
        }
        assert_eq!(reports.iter().filter(|p| p.track_number == 1).count(), 3);
    }

    #[test]
    fn test_dsf_padding() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(
            disc(AreaSpec::stereo().track(TrackSpec::new("Padded", 1))),
            AreaType::Stereo,
            dir.path(),
            ExtractionOptions::default(),
        )
        .unwrap();
        extractor.add_tracks(&[0]).unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();

        let bytes = std::fs::read(dir.path().join("01 - Padded.dsf")).unwrap();
        assert_eq!(bytes.len(), 92 + 8192);
        assert_eq!(extractor.total_bytes_written(), 8192);
    }

    #[test]
    fn test_dst_frames_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = vec![0u8; 8];
        frame[2..4].copy_from_slice(&100u16.to_be_bytes());
        let area = AreaSpec::stereo()
            .frame_format(FrameFormat::Dst)
            .track(TrackSpec::new("Packed", 2).fill(0).payload_prefix(&frame))
            .track(TrackSpec::new("Never", 1));

        let extractor = Extractor::new(disc(area), AreaType::Stereo, dir.path(), ExtractionOptions::default()).unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();
        let err = extractor.wait().unwrap_err();
        assert!(matches!(err, SacdError::Unsupported(_)));
        assert_eq!(extractor.state(), ExtractionState::Failed);
        assert!(!dir.path().join("02 - Never.dsf").exists());

        // The stored error is reported again once the worker is gone
        assert!(matches!(extractor.wait(), Err(SacdError::Error(_))));
    }

    #[test]
    fn test_dst_passthrough_when_not_converting() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = vec![0u8; 8];
        frame[2..4].copy_from_slice(&100u16.to_be_bytes());
        let area = AreaSpec::stereo()
            .frame_format(FrameFormat::Dst)
            .track(TrackSpec::new("Packed", 2).fill(0).payload_prefix(&frame));

        let options = ExtractionOptions::default()
            .with_convert_dst(false)
            .with_format(OutputFormat::Dsdiff);
        let extractor = Extractor::new(disc(area), AreaType::Stereo, dir.path(), options).unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();

        let bytes = std::fs::read(dir.path().join("01 - Packed.dff")).unwrap();
        assert_eq!(bytes.len(), 98 + 2 * 2032);
        assert_eq!(&bytes[98..106], frame.as_slice());
    }

    #[test]
    fn test_artist_folder_and_cue() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractionOptions::default().with_artist_folder(true).with_cue_sheet(true);
        let extractor = Extractor::new(disc(two_tracks()), AreaType::Stereo, dir.path(), options).unwrap();
        let album_dir = dir.path().join("Band - Album");
        assert_eq!(extractor.output_dir(), album_dir.as_path());
        assert!(album_dir.is_dir());

        extractor.add_tracks(&[0]).unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();

        assert!(album_dir.join("01 - One.dsf").exists());
        let cue = std::fs::read_to_string(album_dir.join("Album.cue")).unwrap();
        assert!(cue.contains("FILE \"01 - One.dsf\" WAVE"));
        assert!(!cue.contains("TRACK 02"));
    }

    #[test]
    fn test_custom_decoder() {
        struct Doubler {
            ready: bool,
            out: Vec<u8>,
        }

        impl FrameDecoder for Doubler {
            fn init(&mut self) -> Result<()> {
                self.ready = true;
                Ok(())
            }
            fn is_ready(&self) -> bool {
                self.ready
            }
            fn decode_frame(&mut self, input: &[u8]) -> Result<&[u8]> {
                self.out = [input, input].concat();
                Ok(&self.out)
            }
            fn release(&mut self) {
                self.ready = false;
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut frame = vec![0u8; 8];
        frame[2..4].copy_from_slice(&100u16.to_be_bytes());
        let area = AreaSpec::stereo()
            .frame_format(FrameFormat::Dst)
            .track(TrackSpec::new("Packed", 1).fill(0).payload_prefix(&frame));

        let extractor = Extractor::new(
            disc(area),
            AreaType::Stereo,
            dir.path(),
            ExtractionOptions::default().with_dsf_nopad(true),
        )
        .unwrap()
        .with_decoder(Box::new(Doubler { ready: false, out: Vec::new() }))
        .unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();
        assert_eq!(extractor.total_bytes_written(), 2 * 2032);
    }

    #[test]
    fn test_cancel_mid_track_finalizes_file() {
        let dir = tempfile::tempdir().unwrap();
        let area = AreaSpec::stereo()
            .track(TrackSpec::new("Long", 10))
            .track(TrackSpec::new("Later", 1));

        // Park the worker once the first track is half done
        let (half_tx, half_rx) = mpsc::channel::<()>();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let half_tx = Mutex::new(half_tx);
        let gate_rx = Mutex::new(gate_rx);
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let options = ExtractionOptions::default().on_progress(move |p| {
            sink.lock().unwrap().push(p.clone());
            if p.track_number == 1 && p.track_percent == 50 {
                let _ = half_tx.lock().unwrap().send(());
                let _ = gate_rx.lock().unwrap().recv();
            }
        });

        let extractor = Extractor::new(disc(area), AreaType::Stereo, dir.path(), options).unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();

        half_rx.recv().unwrap();
        extractor.cancel();
        gate_tx.send(()).unwrap();

        assert!(extractor.wait().unwrap_err().is_cancelled());
        assert_eq!(extractor.state(), ExtractionState::Cancelled);

        let bytes = std::fs::read(dir.path().join("01 - Long.dsf")).unwrap();
        let len = bytes.len() as u64;
        assert_eq!(le_u64(&bytes, 12), len);
        assert_eq!(le_u64(&bytes, 84), len - 80);

        // Five sectors were read, then padded to whole 2 x 4096 byte blocks
        let audio = len - 92;
        assert_eq!(audio, 16384);
        assert_eq!(extractor.total_bytes_written(), audio);
        assert!(!dir.path().join("02 - Later.dsf").exists());

        let reports = reports.lock().unwrap();
        assert!(reports.iter().all(|p| p.track_number != 1 || p.track_percent <= 50));
        assert_eq!(reports.last().unwrap().status, "Extraction cancelled");
    }

    #[test]
    fn test_read_failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = SacdImageBuilder::new()
            .title("Album")
            .stereo(two_tracks())
            .build();
        let start_lsn = Disc::from_reader(Cursor::new(image.clone()))
            .unwrap()
            .area(AreaType::Stereo)
            .unwrap()
            .track(0)
            .unwrap()
            .start_lsn;

        // Only two of the first track's three sectors remain
        image.truncate((start_lsn as usize + 2) * SECTOR_SIZE);
        let disc = Arc::new(Disc::from_reader(Cursor::new(image)).unwrap());

        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let options = ExtractionOptions::default().on_progress(move |p| sink.lock().unwrap().push(p.clone()));
        let extractor = Extractor::new(disc, AreaType::Stereo, dir.path(), options).unwrap();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();

        let err = extractor.wait().unwrap_err();
        assert!(matches!(err, SacdError::Io(_)));
        assert_eq!(extractor.state(), ExtractionState::Failed);
        assert!(dir.path().join("01 - One.dsf").exists());
        assert!(!dir.path().join("02 - Two.dsf").exists());

        let reports = reports.lock().unwrap();
        assert!(reports.last().unwrap().status.starts_with("Extraction failed"));
    }

    #[test]
    fn test_start_clears_earlier_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(
            disc(two_tracks()),
            AreaType::Stereo,
            dir.path(),
            ExtractionOptions::default().with_dsf_nopad(true),
        )
        .unwrap();
        extractor.cancel();
        extractor.add_all_tracks().unwrap();
        extractor.start().unwrap();
        extractor.wait().unwrap();
        assert_eq!(extractor.state(), ExtractionState::Completed);
        assert_eq!(extractor.total_bytes_written(), 5 * 2032);
    }

    #[test]
    fn test_repeated_track_counts_queue_position() {
        let dir = tempfile::tempdir().unwrap();

        // Park the worker as the second copy of the track starts
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let gate_rx = Mutex::new(gate_rx);
        let starts = AtomicUsize::new(0);
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);

        let options = ExtractionOptions::default()
            .on_track_start(move |_number, _track, _path| {
                if starts.fetch_add(1, Ordering::SeqCst) == 1 {
                    let _ = started_tx.lock().unwrap().send(());
                    let _ = gate_rx.lock().unwrap().recv();
                }
            })
            .on_progress(move |p| sink.lock().unwrap().push(p.clone()));

        let extractor = Extractor::new(disc(two_tracks()), AreaType::Stereo, dir.path(), options).unwrap();
        extractor.add_tracks(&[0, 0]).unwrap();
        extractor.start().unwrap();

        started_rx.recv().unwrap();
        extractor.cancel();
        gate_tx.send(()).unwrap();
        assert!(extractor.wait().unwrap_err().is_cancelled());

        let reports = reports.lock().unwrap();
        let last = reports.last().unwrap();
        assert_eq!(last.status, "Extraction cancelled");
        assert_eq!(last.track_percent, 0);
        assert_eq!(last.overall_percent, 50);
    }
}
