/// Builder for creating synthetic SACD images

use crate::format::constants::*;
use crate::image::area::FrameFormat;
use crate::image::time::SacdTime;

/// First sector of the stereo area TOC in built images
pub const STEREO_TOC_LSN: u32 = 544;

/// First sector of the multichannel area TOC in built images
pub const MULTICHANNEL_TOC_LSN: u32 = 552;

/// Sectors per area TOC in built images
pub const AREA_TOC_SECTORS: u16 = 8;

/// First audio sector in built images
pub const FIRST_AUDIO_LSN: u32 = 600;

/// Bytes of audio payload carried by one sector
const PAYLOAD_SIZE: usize = SECTOR_SIZE - SECTOR_HEADER_SIZE;

/// Description of one track in a built image
#[derive(Debug, Clone)]
pub struct TrackSpec {
    title: Option<String>,
    artist: Option<String>,
    isrc: Option<String>,
    sectors: u32,
    fill: u8,
    prefix: Vec<u8>,
    duration: Option<SacdTime>,
}

impl TrackSpec {
    /// Create a track of `sectors` audio sectors filled with DSD silence
    pub fn new(title: &str, sectors: u32) -> Self {
        Self {
            title: Some(title.to_string()),
            artist: None,
            isrc: None,
            sectors,
            fill: 0x69,
            prefix: Vec::new(),
            duration: None,
        }
    }

    /// Create a track without text
    pub fn untitled(sectors: u32) -> Self {
        Self {
            title: None,
            ..Self::new("", sectors)
        }
    }

    /// Set the track artist
    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }

    /// Set the track ISRC
    pub fn isrc(mut self, isrc: &str) -> Self {
        self.isrc = Some(isrc.to_string());
        self
    }

    /// Set the byte used to fill each sector payload
    pub fn fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Set bytes written at the start of every sector payload
    pub fn payload_prefix(mut self, prefix: &[u8]) -> Self {
        self.prefix = prefix.to_vec();
        self
    }

    /// Override the recorded duration
    pub fn duration(mut self, duration: SacdTime) -> Self {
        self.duration = Some(duration);
        self
    }

    fn recorded_duration(&self, channel_count: u8) -> SacdTime {
        self.duration.unwrap_or_else(|| {
            let bytes = self.sectors as u64 * PAYLOAD_SIZE as u64;
            let samples = bytes * 8 / channel_count.max(1) as u64;
            SacdTime::from_frames(samples * FRAME_RATE as u64 / SAMPLING_FREQUENCY as u64)
        })
    }
}

/// Description of one area in a built image
#[derive(Debug, Clone)]
pub struct AreaSpec {
    channel_count: u8,
    frame_format: FrameFormat,
    tracks: Vec<TrackSpec>,
}

impl AreaSpec {
    /// A 2-channel plain DSD area
    pub fn stereo() -> Self {
        Self {
            channel_count: 2,
            frame_format: FrameFormat::Dsd3In16,
            tracks: Vec::new(),
        }
    }

    /// A 6-channel plain DSD area
    pub fn multichannel() -> Self {
        Self {
            channel_count: 6,
            ..Self::stereo()
        }
    }

    /// Set the channel count
    pub fn channel_count(mut self, channel_count: u8) -> Self {
        self.channel_count = channel_count;
        self
    }

    /// Set the frame format
    pub fn frame_format(mut self, frame_format: FrameFormat) -> Self {
        self.frame_format = frame_format;
        self
    }

    /// Append a track
    pub fn track(mut self, track: TrackSpec) -> Self {
        self.tracks.push(track);
        self
    }
}

/// Builder for constructing in-memory SACD images.
///
/// Produces a Master TOC with master text, one TOC per configured area
/// and the audio sectors of every track. Area TOC sections are written
/// time list first so readers cannot rely on section order.
#[derive(Debug, Clone, Default)]
pub struct SacdImageBuilder {
    title: Option<String>,
    artist: Option<String>,
    catalog_number: Option<String>,
    date: Option<(u16, u8, u8)>,
    hybrid: bool,
    stereo: Option<AreaSpec>,
    multichannel: Option<AreaSpec>,
}

impl SacdImageBuilder {
    /// Create a builder for an image with no areas
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the album title
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the album artist
    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }

    /// Set the album catalog number
    pub fn catalog_number(mut self, catalog_number: &str) -> Self {
        self.catalog_number = Some(catalog_number.to_string());
        self
    }

    /// Set the release date
    pub fn date(mut self, year: u16, month: u8, day: u8) -> Self {
        self.date = Some((year, month, day));
        self
    }

    /// Mark the disc as hybrid
    pub fn hybrid(mut self, hybrid: bool) -> Self {
        self.hybrid = hybrid;
        self
    }

    /// Add a stereo area
    pub fn stereo(mut self, area: AreaSpec) -> Self {
        self.stereo = Some(area);
        self
    }

    /// Add a multichannel area
    pub fn multichannel(mut self, area: AreaSpec) -> Self {
        self.multichannel = Some(area);
        self
    }

    /// First sector of the multichannel area TOC
    pub fn multichannel_toc_lsn(&self) -> u32 {
        MULTICHANNEL_TOC_LSN
    }

    /// First sector of the stereo area TOC
    pub fn stereo_toc_lsn(&self) -> u32 {
        STEREO_TOC_LSN
    }

    /// Build the image bytes
    pub fn build(self) -> Vec<u8> {
        let audio_sectors: u32 = [&self.stereo, &self.multichannel]
            .iter()
            .filter_map(|area| area.as_ref())
            .flat_map(|area| area.tracks.iter())
            .map(|track| track.sectors)
            .sum();
        let total_sectors = FIRST_AUDIO_LSN + audio_sectors;
        let mut image = vec![0u8; total_sectors as usize * SECTOR_SIZE];

        self.write_master_toc(&mut image);

        let mut next_lsn = FIRST_AUDIO_LSN;
        for (spec, signature, toc_lsn) in [
            (&self.stereo, STEREO_TOC_SIGNATURE, STEREO_TOC_LSN),
            (&self.multichannel, MULTICHANNEL_TOC_SIGNATURE, MULTICHANNEL_TOC_LSN),
        ] {
            if let Some(area) = spec {
                next_lsn = write_area(&mut image, area, signature, toc_lsn, next_lsn);
            }
        }

        image
    }

    fn write_master_toc(&self, image: &mut [u8]) {
        let base = sector_offset(MASTER_TOC_LSN);
        let toc = &mut image[base..base + MASTER_TOC_SECTORS as usize * SECTOR_SIZE];

        toc[..8].copy_from_slice(MASTER_TOC_SIGNATURE);
        toc[MTOC_VERSION_OFFSET] = 1;
        toc[MTOC_VERSION_OFFSET + 1] = 20;
        put_u16(toc, MTOC_ALBUM_SET_SIZE_OFFSET, 1);
        put_u16(toc, MTOC_ALBUM_SEQUENCE_OFFSET, 1);
        if let Some(catalog) = &self.catalog_number {
            put_fixed(toc, MTOC_CATALOG_OFFSET, CATALOG_NUMBER_LENGTH, catalog);
        }
        if self.stereo.is_some() {
            put_u32(toc, MTOC_STEREO_TOC_OFFSET, STEREO_TOC_LSN);
            put_u16(toc, MTOC_STEREO_TOC_SIZE_OFFSET, AREA_TOC_SECTORS);
        }
        if self.multichannel.is_some() {
            put_u32(toc, MTOC_MULTICHANNEL_TOC_OFFSET, MULTICHANNEL_TOC_LSN);
            put_u16(toc, MTOC_MULTICHANNEL_TOC_SIZE_OFFSET, AREA_TOC_SECTORS);
        }
        toc[MTOC_DISC_TYPE_OFFSET] = self.hybrid as u8;
        if let Some((year, month, day)) = self.date {
            put_u16(toc, MTOC_DATE_OFFSET, year);
            toc[MTOC_DATE_OFFSET + 2] = month;
            toc[MTOC_DATE_OFFSET + 3] = day;
        }

        if self.title.is_some() || self.artist.is_some() {
            let text = &mut toc[SECTOR_SIZE..2 * SECTOR_SIZE];
            text[..8].copy_from_slice(MASTER_TEXT_SIGNATURE);
            let mut pos = 64;
            for (slot, value) in [(16, &self.title), (18, &self.artist)] {
                if let Some(value) = value {
                    put_u16(text, slot, pos as u16);
                    pos = put_cstring(text, pos, value) + 1;
                }
            }
        }
    }
}

/// Write an area TOC and its audio; returns the next free audio sector
fn write_area(
    image: &mut [u8],
    area: &AreaSpec,
    signature: &[u8; 8],
    toc_lsn: u32,
    first_lsn: u32,
) -> u32 {
    let track_count = area.tracks.len().min(MAX_TRACKS);
    let tracks = &area.tracks[..track_count];

    let mut lsn = first_lsn;
    let mut elapsed = 0u64;
    let mut layout = Vec::with_capacity(track_count);
    for track in tracks {
        let duration = track.recorded_duration(area.channel_count);
        layout.push((lsn, SacdTime::from_frames(elapsed), duration));
        write_audio(image, track, lsn);
        lsn += track.sectors;
        elapsed += duration.total_frames();
    }

    let base = sector_offset(toc_lsn);
    let toc = &mut image[base..base + AREA_TOC_SECTORS as usize * SECTOR_SIZE];

    // Sector 0: header
    toc[..8].copy_from_slice(signature);
    toc[ATOC_VERSION_OFFSET] = 1;
    toc[ATOC_VERSION_OFFSET + 1] = 20;
    put_u16(toc, ATOC_SIZE_OFFSET, AREA_TOC_SECTORS);
    toc[ATOC_FRAME_FORMAT_OFFSET] = u8::from(area.frame_format);
    toc[ATOC_CHANNEL_COUNT_OFFSET] = area.channel_count;
    toc[ATOC_TRACK_COUNT_OFFSET] = track_count as u8;
    put_u32(toc, ATOC_START_LSN_OFFSET, first_lsn);
    put_u32(toc, ATOC_END_LSN_OFFSET, lsn.saturating_sub(1).max(first_lsn));

    // Sector 1: time list
    let times = &mut toc[SECTOR_SIZE..2 * SECTOR_SIZE];
    times[..8].copy_from_slice(TRACK_TIME_MARKER);
    for (i, (_, start, duration)) in layout.iter().enumerate() {
        put_time(times, list_offset(i), *start);
        put_time(times, list_offset(TRACK_LIST_SLOTS + i), *duration);
    }

    // Sector 2: sector list
    let lsns = &mut toc[2 * SECTOR_SIZE..3 * SECTOR_SIZE];
    lsns[..8].copy_from_slice(TRACK_LSN_MARKER);
    for (i, ((start, _, _), track)) in layout.iter().zip(tracks).enumerate() {
        put_u32(lsns, list_offset(i), *start);
        put_u32(lsns, list_offset(TRACK_LIST_SLOTS + i), track.sectors);
    }

    // Sector 3: a section readers do not know
    toc[3 * SECTOR_SIZE..3 * SECTOR_SIZE + 8].copy_from_slice(b"SACD_ACC");

    // Sectors 4-5: track text
    write_track_text(&mut toc[4 * SECTOR_SIZE..6 * SECTOR_SIZE], tracks);

    // Sectors 6-7: ISRC and genre list
    let igl = &mut toc[6 * SECTOR_SIZE..8 * SECTOR_SIZE];
    igl[..8].copy_from_slice(TRACK_ISRC_GENRE_MARKER);
    for (i, track) in tracks.iter().enumerate() {
        if let Some(isrc) = &track.isrc {
            put_fixed(igl, TRACK_LIST_OFFSET + i * ISRC_LENGTH, ISRC_LENGTH, isrc);
        }
    }

    lsn
}

fn write_track_text(section: &mut [u8], tracks: &[TrackSpec]) {
    section[..8].copy_from_slice(TRACK_TEXT_MARKER);

    let mut pos = align4(TRACK_LIST_OFFSET + MAX_TRACKS * 2);
    for (i, track) in tracks.iter().enumerate() {
        let items: Vec<(u8, &str)> = [(1u8, &track.title), (2, &track.artist)]
            .into_iter()
            .filter_map(|(kind, value)| value.as_deref().map(|v| (kind, v)))
            .collect();
        if items.is_empty() {
            continue;
        }

        let needed = 4 + items.iter().map(|(_, v)| v.len() + 6).sum::<usize>();
        if pos + needed > section.len() || pos > u16::MAX as usize {
            break;
        }

        put_u16(section, TRACK_LIST_OFFSET + i * 2, pos as u16);
        section[pos] = items.len() as u8;
        let mut item = pos + 4;
        for (kind, value) in items {
            section[item] = kind;
            item = align4(put_cstring(section, item + 2, value) + 1);
        }
        pos = item;
    }
}

fn write_audio(image: &mut [u8], track: &TrackSpec, first_lsn: u32) {
    for lsn in first_lsn..first_lsn + track.sectors {
        let base = sector_offset(lsn);
        let sector = &mut image[base..base + SECTOR_SIZE];
        put_u32(sector, 0, lsn);
        let payload = &mut sector[SECTOR_HEADER_SIZE..];
        payload.fill(track.fill);
        let prefix = track.prefix.len().min(payload.len());
        payload[..prefix].copy_from_slice(&track.prefix[..prefix]);
    }
}

fn sector_offset(lsn: u32) -> usize {
    lsn as usize * SECTOR_SIZE
}

fn list_offset(slot: usize) -> usize {
    TRACK_LIST_OFFSET + slot * TRACK_LIST_STRIDE
}

fn align4(pos: usize) -> usize {
    (pos + 3) & !3
}

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_time(data: &mut [u8], offset: usize, time: SacdTime) {
    data[offset] = time.minutes;
    data[offset + 1] = time.seconds;
    data[offset + 2] = time.frames;
}

fn put_fixed(data: &mut [u8], offset: usize, length: usize, value: &str) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(length);
    data[offset..offset + n].copy_from_slice(&bytes[..n]);
}

/// Write a NUL-terminated string; returns the terminator position
fn put_cstring(data: &mut [u8], offset: usize, value: &str) -> usize {
    let bytes = value.as_bytes();
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
    data[offset + bytes.len()] = 0;
    offset + bytes.len()
}
