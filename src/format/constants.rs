/// SACD on-disc layout constants and container sizes

/// Size of a logical sector in bytes
pub const SECTOR_SIZE: usize = 2048;

/// Logical sector holding the first copy of the Master TOC
pub const MASTER_TOC_LSN: u32 = 510;

/// Number of sectors in the Master TOC
pub const MASTER_TOC_SECTORS: u32 = 10;

/// Maximum number of tracks per area
pub const MAX_TRACKS: usize = 255;

/// Maximum number of areas on a disc
pub const MAX_AREAS: usize = 2;

/// DSD sample frequency (64 x 44.1 kHz)
pub const SAMPLING_FREQUENCY: u32 = 2_822_400;

/// Frames per second of the on-disc time code
pub const FRAME_RATE: u32 = 75;

/// Bytes of sector sub-header skipped before the audio payload
pub const SECTOR_HEADER_SIZE: usize = 16;

/// Master TOC signature
pub const MASTER_TOC_SIGNATURE: &[u8; 8] = b"SACDMTOC";

/// Master text signature (sector 1 of the Master TOC)
pub const MASTER_TEXT_SIGNATURE: &[u8; 8] = b"SACDText";

/// Two-channel area TOC signature
pub const STEREO_TOC_SIGNATURE: &[u8; 8] = b"TWOCHTOC";

/// Multichannel area TOC signature
pub const MULTICHANNEL_TOC_SIGNATURE: &[u8; 8] = b"MULCHTOC";

/// Track start/length list marker
pub const TRACK_LSN_MARKER: &[u8; 8] = b"SACDTRL1";

/// Track start time/duration list marker
pub const TRACK_TIME_MARKER: &[u8; 8] = b"SACDTRL2";

/// Track text marker
pub const TRACK_TEXT_MARKER: &[u8; 8] = b"SACDTTxt";

/// ISRC and genre list marker
pub const TRACK_ISRC_GENRE_MARKER: &[u8; 8] = b"SACD_IGL";

/// Slots reserved per parallel array in the track lists
pub const TRACK_LIST_SLOTS: usize = 255;

/// Stride of one track list entry
pub const TRACK_LIST_STRIDE: usize = 4;

/// Offset of the first entry after a list marker
pub const TRACK_LIST_OFFSET: usize = 8;

/// Length of an ISRC code
pub const ISRC_LENGTH: usize = 12;

// Master TOC field offsets
/// Offset of the major version byte
pub const MTOC_VERSION_OFFSET: usize = 8;
/// Offset of the album set size (u16 BE)
pub const MTOC_ALBUM_SET_SIZE_OFFSET: usize = 16;
/// Offset of the album sequence number (u16 BE)
pub const MTOC_ALBUM_SEQUENCE_OFFSET: usize = 18;
/// Offset of the album catalog number (16 bytes)
pub const MTOC_CATALOG_OFFSET: usize = 24;
/// Offset of the genre table (4 entries of 4 bytes)
pub const MTOC_GENRE_OFFSET: usize = 40;
/// Offset of the stereo area TOC start LSN (u32 BE)
pub const MTOC_STEREO_TOC_OFFSET: usize = 64;
/// Offset of the multichannel area TOC start LSN (u32 BE)
pub const MTOC_MULTICHANNEL_TOC_OFFSET: usize = 72;
/// Offset of the disc type flags byte
pub const MTOC_DISC_TYPE_OFFSET: usize = 80;
/// Offset of the stereo area TOC length in sectors (u16 BE)
pub const MTOC_STEREO_TOC_SIZE_OFFSET: usize = 84;
/// Offset of the multichannel area TOC length in sectors (u16 BE)
pub const MTOC_MULTICHANNEL_TOC_SIZE_OFFSET: usize = 86;
/// Offset of the disc catalog number (16 bytes)
pub const MTOC_DISC_CATALOG_OFFSET: usize = 88;
/// Offset of the release year (u16 BE), followed by month and day
pub const MTOC_DATE_OFFSET: usize = 104;
/// Length of a catalog number field
pub const CATALOG_NUMBER_LENGTH: usize = 16;

// Area TOC field offsets
/// Offset of the area TOC major version byte
pub const ATOC_VERSION_OFFSET: usize = 8;
/// Offset of the area TOC length in sectors (u16 BE)
pub const ATOC_SIZE_OFFSET: usize = 10;
/// Offset of the frame format byte (low nibble)
pub const ATOC_FRAME_FORMAT_OFFSET: usize = 21;
/// Offset of the channel count byte
pub const ATOC_CHANNEL_COUNT_OFFSET: usize = 32;
/// Offset of the track count byte
pub const ATOC_TRACK_COUNT_OFFSET: usize = 69;
/// Offset of the area start LSN (u32 BE)
pub const ATOC_START_LSN_OFFSET: usize = 72;
/// Offset of the area end LSN (u32 BE)
pub const ATOC_END_LSN_OFFSET: usize = 76;

/// Read a big-endian u16 at `offset`
#[inline]
pub fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read a big-endian u32 at `offset`
#[inline]
pub fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Byte offset of a logical sector within an image
#[inline]
pub fn lsn_to_offset(lsn: u32) -> u64 {
    lsn as u64 * SECTOR_SIZE as u64
}
