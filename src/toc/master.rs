/// Master TOC parser

use crate::error::{Result, SacdError};
use crate::format::constants::*;
use crate::image::metadata::{AreaPointer, DiscMetadata};
use crate::image::track::{Genre, SacdText};
use crate::toc::text::{decode_fixed, read_cstring};

/// Album title used when the disc carries no master text
pub const DEFAULT_ALBUM_TITLE: &str = "SACD Album";

/// Album artist used when the disc carries no master text
pub const DEFAULT_ALBUM_ARTIST: &str = "Unknown Artist";

/// Parse the Master TOC from its sector buffer (normally 10 sectors
/// starting at LSN 510).
///
/// Fails with `InvalidFile` if the buffer does not start with `SACDMTOC`
/// or is shorter than one sector.
pub fn parse_master_toc(data: &[u8]) -> Result<DiscMetadata> {
    if data.len() < MASTER_TOC_SIGNATURE.len() || &data[..8] != MASTER_TOC_SIGNATURE {
        return Err(SacdError::invalid_file("missing SACDMTOC signature"));
    }
    if data.len() < SECTOR_SIZE {
        return Err(SacdError::invalid_file("master TOC truncated"));
    }

    let mut meta = DiscMetadata {
        version: (data[MTOC_VERSION_OFFSET], data[MTOC_VERSION_OFFSET + 1]),
        album_set_size: be_u16(data, MTOC_ALBUM_SET_SIZE_OFFSET),
        album_sequence_number: be_u16(data, MTOC_ALBUM_SEQUENCE_OFFSET),
        catalog_number: decode_fixed(
            &data[MTOC_CATALOG_OFFSET..MTOC_CATALOG_OFFSET + CATALOG_NUMBER_LENGTH],
        ),
        disc_catalog_number: decode_fixed(
            &data[MTOC_DISC_CATALOG_OFFSET..MTOC_DISC_CATALOG_OFFSET + CATALOG_NUMBER_LENGTH],
        ),
        stereo_toc: AreaPointer::new(
            be_u32(data, MTOC_STEREO_TOC_OFFSET),
            be_u16(data, MTOC_STEREO_TOC_SIZE_OFFSET),
        ),
        multichannel_toc: AreaPointer::new(
            be_u32(data, MTOC_MULTICHANNEL_TOC_OFFSET),
            be_u16(data, MTOC_MULTICHANNEL_TOC_SIZE_OFFSET),
        ),
        is_hybrid: data[MTOC_DISC_TYPE_OFFSET] & 0x01 != 0,
        year: be_u16(data, MTOC_DATE_OFFSET),
        month: data[MTOC_DATE_OFFSET + 2],
        day: data[MTOC_DATE_OFFSET + 3],
        ..Default::default()
    };

    for (i, genre) in meta.genres.iter_mut().enumerate() {
        let offset = MTOC_GENRE_OFFSET + i * 4;
        *genre = Genre::new(data[offset], data[offset + 3]);
    }

    if data.len() >= 2 * SECTOR_SIZE {
        let text_sector = &data[SECTOR_SIZE..2 * SECTOR_SIZE];
        if &text_sector[..8] == MASTER_TEXT_SIGNATURE {
            let (album, disc) = parse_master_text(text_sector);
            meta.album_text = album;
            meta.disc_text = disc;
        }
    }

    if meta.album_text.title.is_none() {
        meta.album_text.title = Some(DEFAULT_ALBUM_TITLE.to_string());
    }
    if meta.album_text.artist.is_none() {
        meta.album_text.artist = Some(DEFAULT_ALBUM_ARTIST.to_string());
    }

    log::debug!(
        "Master TOC v{}.{}: stereo={:?} multichannel={:?} hybrid={}",
        meta.version.0,
        meta.version.1,
        meta.stereo_toc,
        meta.multichannel_toc,
        meta.is_hybrid
    );

    Ok(meta)
}

/// Parse the album and disc text blocks of a master text sector.
///
/// Positions are u16 BE offsets from the start of the sector, in the order
/// title, artist, publisher, copyright, then the four phonetic variants.
fn parse_master_text(sector: &[u8]) -> (SacdText, SacdText) {
    (text_block(sector, 16), text_block(sector, 32))
}

fn text_block(sector: &[u8], table: usize) -> SacdText {
    let field = |slot: usize| -> Option<String> {
        let position = be_u16(sector, table + slot * 2) as usize;
        if position == 0 {
            return None;
        }
        read_cstring(sector, position).0
    };

    SacdText {
        title: field(0),
        artist: field(1),
        publisher: field(2),
        copyright: field(3),
        title_phonetic: field(4),
        artist_phonetic: field(5),
        publisher_phonetic: field(6),
        copyright_phonetic: field(7),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master_toc() -> Vec<u8> {
        let mut data = vec![0u8; MASTER_TOC_SECTORS as usize * SECTOR_SIZE];
        data[..8].copy_from_slice(MASTER_TOC_SIGNATURE);
        data[8] = 1;
        data[9] = 20;
        data[16..18].copy_from_slice(&1u16.to_be_bytes());
        data[18..20].copy_from_slice(&1u16.to_be_bytes());
        data[24..33].copy_from_slice(b"SIGC-1234");
        data[40] = 1;
        data[43] = 9;
        data[44] = 1;
        data[47] = 12;
        data[64..68].copy_from_slice(&544u32.to_be_bytes());
        data[72..76].copy_from_slice(&551u32.to_be_bytes());
        data[80] = 0x01;
        data[84..86].copy_from_slice(&7u16.to_be_bytes());
        data[86..88].copy_from_slice(&7u16.to_be_bytes());
        data[88..95].copy_from_slice(b"DISC-01");
        data[104..106].copy_from_slice(&2003u16.to_be_bytes());
        data[106] = 9;
        data[107] = 30;
        data
    }

    #[test]
    fn test_parse_fields() {
        let meta = parse_master_toc(&master_toc()).unwrap();
        assert_eq!(meta.version, (1, 20));
        assert_eq!(meta.album_set_size, 1);
        assert_eq!(meta.catalog_number.as_deref(), Some("SIGC-1234"));
        assert_eq!(meta.disc_catalog_number.as_deref(), Some("DISC-01"));
        assert_eq!(meta.genres[0], Genre::new(1, 9));
        assert_eq!(meta.genres[1], Genre::new(1, 12));
        assert!(meta.genres[2].is_empty());
        assert_eq!(meta.stereo_toc, Some(AreaPointer { start_lsn: 544, size: 7 }));
        assert_eq!(
            meta.multichannel_toc,
            Some(AreaPointer { start_lsn: 551, size: 7 })
        );
        assert!(meta.is_hybrid);
        assert_eq!((meta.year, meta.month, meta.day), (2003, 9, 30));
    }

    #[test]
    fn test_placeholder_text() {
        let meta = parse_master_toc(&master_toc()).unwrap();
        assert_eq!(meta.album_text.title.as_deref(), Some(DEFAULT_ALBUM_TITLE));
        assert_eq!(meta.album_text.artist.as_deref(), Some(DEFAULT_ALBUM_ARTIST));
        assert!(meta.disc_text.is_empty());
    }

    #[test]
    fn test_master_text_preferred() {
        let mut data = master_toc();
        let text = &mut data[SECTOR_SIZE..2 * SECTOR_SIZE];
        text[..8].copy_from_slice(MASTER_TEXT_SIGNATURE);
        text[16..18].copy_from_slice(&64u16.to_be_bytes());
        text[18..20].copy_from_slice(&80u16.to_be_bytes());
        text[32..34].copy_from_slice(&96u16.to_be_bytes());
        text[64..75].copy_from_slice(b"Kind of Blu");
        text[80..91].copy_from_slice(b"Miles Davis");
        text[96..102].copy_from_slice(b"Disc 1");

        let meta = parse_master_toc(&data).unwrap();
        assert_eq!(meta.album_text.title.as_deref(), Some("Kind of Blu"));
        assert_eq!(meta.album_text.artist.as_deref(), Some("Miles Davis"));
        assert!(meta.album_text.publisher.is_none());
        assert_eq!(meta.disc_text.title.as_deref(), Some("Disc 1"));
    }

    #[test]
    fn test_bad_signature() {
        let mut data = master_toc();
        data[..8].copy_from_slice(b"NOTSACD!");
        let err = parse_master_toc(&data).unwrap_err();
        assert!(matches!(err, SacdError::InvalidFile(_)));
    }

    #[test]
    fn test_truncated() {
        let data = master_toc();
        assert!(matches!(
            parse_master_toc(&data[..100]),
            Err(SacdError::InvalidFile(_))
        ));
        assert!(matches!(
            parse_master_toc(&data[..4]),
            Err(SacdError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_absent_areas() {
        let mut data = master_toc();
        data[64..68].fill(0);
        data[86..88].fill(0);
        let meta = parse_master_toc(&data).unwrap();
        assert!(meta.stereo_toc.is_none());
        assert!(meta.multichannel_toc.is_none());
    }
}
