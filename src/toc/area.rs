/// Area TOC parser

use crate::error::{Result, SacdError};
use crate::format::constants::*;
use crate::image::area::{Area, AreaType, FrameFormat};
use crate::image::time::SacdTime;
use crate::image::track::{Genre, SacdText, Track};
use crate::toc::text::{decode_fixed, read_cstring};

/// Track text item types
const TEXT_TYPE_TITLE: u8 = 1;
const TEXT_TYPE_ARTIST: u8 = 2;
const TEXT_TYPE_SONGWRITER: u8 = 3;
const TEXT_PHONETIC_FLAG: u8 = 0x80;

/// Determine the area type from an area TOC signature
pub fn area_type_from_signature(data: &[u8]) -> Option<AreaType> {
    let signature = data.get(..8)?;
    if signature == STEREO_TOC_SIGNATURE {
        Some(AreaType::Stereo)
    } else if signature == MULTICHANNEL_TOC_SIGNATURE {
        Some(AreaType::Multichannel)
    } else {
        None
    }
}

/// Parse an area TOC from its sector buffer.
///
/// `toc_size` is the TOC length in sectors; the marker scan never looks
/// past it or past the end of `data`. Sections may appear in any order.
pub fn parse_area_toc(data: &[u8], toc_size: u16) -> Result<Area> {
    let area_type = area_type_from_signature(data)
        .ok_or_else(|| SacdError::invalid_file("missing area TOC signature"))?;
    if data.len() < SECTOR_SIZE {
        return Err(SacdError::invalid_file("area TOC truncated"));
    }

    let frame_format = FrameFormat::from(data[ATOC_FRAME_FORMAT_OFFSET]);
    let mut channel_count = data[ATOC_CHANNEL_COUNT_OFFSET];
    if channel_count == 0 {
        channel_count = match area_type {
            AreaType::Stereo => 2,
            AreaType::Multichannel => 6,
        };
        log::debug!("{} area reports no channels, assuming {}", area_type, channel_count);
    }

    let mut area = Area::new(area_type, channel_count, frame_format);
    area.version = (data[ATOC_VERSION_OFFSET], data[ATOC_VERSION_OFFSET + 1]);
    area.start_lsn = be_u32(data, ATOC_START_LSN_OFFSET);
    area.end_lsn = be_u32(data, ATOC_END_LSN_OFFSET);

    let declared = data[ATOC_TRACK_COUNT_OFFSET] as usize;
    let track_count = declared.min(MAX_TRACKS);
    if track_count < declared {
        log::warn!("{} area declares {} tracks, clamping to {}", area_type, declared, MAX_TRACKS);
    }
    for number in 0..track_count {
        area.add_track(Track::new(number, channel_count, frame_format));
    }

    let sectors = (toc_size as usize).min(data.len() / SECTOR_SIZE);
    for sector in 1..sectors {
        let pos = sector * SECTOR_SIZE;
        let marker = &data[pos..pos + 8];
        let section = &data[pos..];

        if marker == TRACK_LSN_MARKER {
            parse_track_lsns(section, area.tracks_mut());
        } else if marker == TRACK_TIME_MARKER {
            parse_track_times(section, area.tracks_mut());
        } else if marker == TRACK_TEXT_MARKER {
            parse_track_text(section, area.tracks_mut());
        } else if marker == TRACK_ISRC_GENRE_MARKER {
            parse_isrc_genres(section, area.tracks_mut());
        } else {
            log::trace!("Skipping area TOC sector {}", sector);
        }
    }

    for track in area.tracks_mut() {
        if track.text.title.is_none() {
            track.text.title = Some(format!("Track {:02}", track.number + 1));
        }
    }

    log::debug!(
        "{} area: {} channels, {} tracks, sectors {}..={}, {:?}",
        area_type,
        area.channel_count,
        area.track_count(),
        area.start_lsn,
        area.end_lsn,
        area.frame_format
    );

    Ok(area)
}

fn list_entry(section: &[u8], slot: usize) -> Option<&[u8]> {
    let pos = TRACK_LIST_OFFSET + slot * TRACK_LIST_STRIDE;
    section.get(pos..pos + TRACK_LIST_STRIDE)
}

fn parse_track_lsns(section: &[u8], tracks: &mut [Track]) {
    for (i, track) in tracks.iter_mut().enumerate() {
        if let Some(entry) = list_entry(section, i) {
            track.start_lsn = be_u32(entry, 0);
        }
        if let Some(entry) = list_entry(section, TRACK_LIST_SLOTS + i) {
            track.length_lsn = be_u32(entry, 0);
        }
    }
}

fn parse_track_times(section: &[u8], tracks: &mut [Track]) {
    for (i, track) in tracks.iter_mut().enumerate() {
        if let Some(entry) = list_entry(section, i) {
            track.start_time = SacdTime::new(entry[0], entry[1], entry[2]);
        }
        if let Some(entry) = list_entry(section, TRACK_LIST_SLOTS + i) {
            track.duration = SacdTime::new(entry[0], entry[1], entry[2]);
        }
    }
}

fn parse_track_text(section: &[u8], tracks: &mut [Track]) {
    for (i, track) in tracks.iter_mut().enumerate() {
        let table = TRACK_LIST_OFFSET + i * 2;
        if table + 2 > section.len() {
            break;
        }
        let offset = be_u16(section, table) as usize;
        if offset == 0 {
            continue;
        }
        apply_text_items(section, offset, &mut track.text);
    }
}

/// Decode one track's text entry: item count, 3 pad bytes, then
/// `type, pad, text\0` items separated by NUL padding.
fn apply_text_items(section: &[u8], offset: usize, text: &mut SacdText) {
    let Some(&count) = section.get(offset) else {
        return;
    };

    let mut pos = offset + 4;
    for _ in 0..count {
        while section.get(pos) == Some(&0) {
            pos += 1;
        }
        let Some(&item_type) = section.get(pos) else {
            return;
        };
        let (value, end) = read_cstring(section, pos + 2);
        pos = end + 1;

        let phonetic = item_type & TEXT_PHONETIC_FLAG != 0;
        let slot = match (item_type & !TEXT_PHONETIC_FLAG, phonetic) {
            (TEXT_TYPE_TITLE, false) => &mut text.title,
            (TEXT_TYPE_TITLE, true) => &mut text.title_phonetic,
            (TEXT_TYPE_ARTIST, false) => &mut text.artist,
            (TEXT_TYPE_ARTIST, true) => &mut text.artist_phonetic,
            (TEXT_TYPE_SONGWRITER, false) => &mut text.songwriter,
            _ => continue,
        };
        if slot.is_none() {
            *slot = value;
        }
    }
}

fn parse_isrc_genres(section: &[u8], tracks: &mut [Track]) {
    let genre_table = TRACK_LIST_OFFSET + TRACK_LIST_SLOTS * ISRC_LENGTH + 4;
    for (i, track) in tracks.iter_mut().enumerate() {
        let pos = TRACK_LIST_OFFSET + i * ISRC_LENGTH;
        if let Some(isrc) = section.get(pos..pos + ISRC_LENGTH) {
            track.isrc = decode_fixed(isrc);
        }
        let pos = genre_table + i * 4;
        if let Some(entry) = section.get(pos..pos + 4) {
            track.genre = Genre::new(entry[0], entry[3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC_SECTORS: usize = 5;

    fn area_toc(signature: &[u8; 8], tracks: u8) -> Vec<u8> {
        let mut data = vec![0u8; TOC_SECTORS * SECTOR_SIZE];
        data[..8].copy_from_slice(signature);
        data[8] = 1;
        data[9] = 20;
        data[10..12].copy_from_slice(&(TOC_SECTORS as u16).to_be_bytes());
        data[21] = 3;
        data[32] = 2;
        data[69] = tracks;
        data[72..76].copy_from_slice(&1000u32.to_be_bytes());
        data[76..80].copy_from_slice(&1999u32.to_be_bytes());
        data
    }

    fn put_lsns(data: &mut [u8], sector: usize, entries: &[(u32, u32)]) {
        let base = sector * SECTOR_SIZE;
        data[base..base + 8].copy_from_slice(TRACK_LSN_MARKER);
        for (i, (start, length)) in entries.iter().enumerate() {
            let pos = base + 8 + i * 4;
            data[pos..pos + 4].copy_from_slice(&start.to_be_bytes());
            let pos = base + 8 + (255 + i) * 4;
            data[pos..pos + 4].copy_from_slice(&length.to_be_bytes());
        }
    }

    fn put_times(data: &mut [u8], sector: usize, entries: &[([u8; 3], [u8; 3])]) {
        let base = sector * SECTOR_SIZE;
        data[base..base + 8].copy_from_slice(TRACK_TIME_MARKER);
        for (i, (start, duration)) in entries.iter().enumerate() {
            let pos = base + 8 + i * 4;
            data[pos..pos + 3].copy_from_slice(start);
            let pos = base + 8 + (255 + i) * 4;
            data[pos..pos + 3].copy_from_slice(duration);
        }
    }

    #[test]
    fn test_header_fields() {
        let area = parse_area_toc(&area_toc(STEREO_TOC_SIGNATURE, 2), TOC_SECTORS as u16).unwrap();
        assert_eq!(area.area_type, AreaType::Stereo);
        assert_eq!(area.version, (1, 20));
        assert_eq!(area.channel_count, 2);
        assert_eq!(area.frame_format, FrameFormat::Dsd3In16);
        assert_eq!(area.sample_frequency, 2_822_400);
        assert_eq!((area.start_lsn, area.end_lsn), (1000, 1999));
        assert_eq!(area.track_count(), 2);
        assert_eq!(area.track(1).unwrap().title(), Some("Track 02"));
    }

    #[test]
    fn test_multichannel_signature() {
        let mut data = area_toc(MULTICHANNEL_TOC_SIGNATURE, 1);
        data[32] = 6;
        data[21] = 0;
        let area = parse_area_toc(&data, TOC_SECTORS as u16).unwrap();
        assert_eq!(area.area_type, AreaType::Multichannel);
        assert_eq!(area.track(0).unwrap().channel_count, 6);
        assert!(area.track(0).unwrap().dst_encoded);
    }

    #[test]
    fn test_bad_signature() {
        let data = area_toc(b"BADTOC!!", 1);
        assert!(matches!(
            parse_area_toc(&data, TOC_SECTORS as u16),
            Err(SacdError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_lists_in_either_order() {
        let lsns = [(1000, 400), (1400, 600)];
        let times = [([0, 0, 0], [0, 5, 10]), ([0, 5, 10], [1, 2, 3])];

        let mut forward = area_toc(STEREO_TOC_SIGNATURE, 2);
        put_lsns(&mut forward, 1, &lsns);
        put_times(&mut forward, 2, &times);

        let mut reversed = area_toc(STEREO_TOC_SIGNATURE, 2);
        put_times(&mut reversed, 1, &times);
        put_lsns(&mut reversed, 3, &lsns);

        let a = parse_area_toc(&forward, TOC_SECTORS as u16).unwrap();
        let b = parse_area_toc(&reversed, TOC_SECTORS as u16).unwrap();
        assert_eq!(a, b);

        let track = a.track(1).unwrap();
        assert_eq!(track.start_lsn, 1400);
        assert_eq!(track.length_lsn, 600);
        assert_eq!(track.start_time, SacdTime::new(0, 5, 10));
        assert_eq!(track.duration, SacdTime::new(1, 2, 3));
    }

    #[test]
    fn test_scan_bounded_by_toc_size() {
        let mut data = area_toc(STEREO_TOC_SIGNATURE, 1);
        put_lsns(&mut data, 4, &[(1000, 10)]);

        let area = parse_area_toc(&data, 4).unwrap();
        assert_eq!(area.track(0).unwrap().length_lsn, 0);

        let area = parse_area_toc(&data, 5).unwrap();
        assert_eq!(area.track(0).unwrap().length_lsn, 10);

        // toc_size larger than the buffer is capped at what was read
        let area = parse_area_toc(&data, 50).unwrap();
        assert_eq!(area.track(0).unwrap().length_lsn, 10);
    }

    #[test]
    fn test_track_text() {
        let mut data = area_toc(STEREO_TOC_SIGNATURE, 2);
        let base = SECTOR_SIZE;
        data[base..base + 8].copy_from_slice(TRACK_TEXT_MARKER);
        data[base + 8..base + 10].copy_from_slice(&64u16.to_be_bytes());

        let entry = base + 64;
        data[entry] = 3;
        let mut pos = entry + 4;
        for (item_type, text) in [(1u8, &b"So What"[..]), (2, b"Miles Davis"), (0x81, b"SO WHATO")] {
            data[pos] = item_type;
            data[pos + 2..pos + 2 + text.len()].copy_from_slice(text);
            pos += 2 + text.len() + 3;
        }

        let area = parse_area_toc(&data, TOC_SECTORS as u16).unwrap();
        let track = area.track(0).unwrap();
        assert_eq!(track.title(), Some("So What"));
        assert_eq!(track.artist(), Some("Miles Davis"));
        assert_eq!(track.text.title_phonetic.as_deref(), Some("SO WHATO"));
        assert_eq!(area.track(1).unwrap().title(), Some("Track 02"));
    }

    #[test]
    fn test_truncated_text_is_soft() {
        let mut data = area_toc(STEREO_TOC_SIGNATURE, 1);
        let base = (TOC_SECTORS - 1) * SECTOR_SIZE;
        data[base..base + 8].copy_from_slice(TRACK_TEXT_MARKER);
        data[base + 8..base + 10].copy_from_slice(&0xFFF0u16.to_be_bytes());

        let area = parse_area_toc(&data, TOC_SECTORS as u16).unwrap();
        assert_eq!(area.track(0).unwrap().title(), Some("Track 01"));
    }

    #[test]
    fn test_isrc_and_genre() {
        let mut data = area_toc(STEREO_TOC_SIGNATURE, 2);
        let base = 2 * SECTOR_SIZE;
        data[base..base + 8].copy_from_slice(TRACK_ISRC_GENRE_MARKER);
        data[base + 8..base + 20].copy_from_slice(b"USSM15900113");
        let genres = base + 8 + 255 * 12 + 4;
        data[genres] = 1;
        data[genres + 3] = 16;

        let area = parse_area_toc(&data, TOC_SECTORS as u16).unwrap();
        let track = area.track(0).unwrap();
        assert_eq!(track.isrc.as_deref(), Some("USSM15900113"));
        assert_eq!(track.genre, Genre::new(1, 16));
        assert!(area.track(1).unwrap().isrc.is_none());
    }
}
