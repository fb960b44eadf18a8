/// DSF (Sony DSD Stream File) writer

use crate::error::Result;
use crate::format::constants::SAMPLING_FREQUENCY;
use crate::image::{Area, Track};
use crate::io::writer::{patch_at, ContainerWriter};
use std::io::{Seek, Write};

/// Size of the `DSD ` chunk
pub const DSF_DSD_CHUNK_SIZE: u64 = 28;
/// Size of the `fmt ` chunk
pub const DSF_FMT_CHUNK_SIZE: u64 = 52;
/// Size of the `data` chunk header
pub const DSF_DATA_HEADER_SIZE: u64 = 12;
/// Total header size
pub const DSF_HEADER_SIZE: u64 = DSF_DSD_CHUNK_SIZE + DSF_FMT_CHUNK_SIZE + DSF_DATA_HEADER_SIZE;
/// Offset of the total file size field
pub const DSF_FILE_SIZE_OFFSET: u64 = 12;
/// Offset of the data chunk size field
pub const DSF_DATA_SIZE_OFFSET: u64 = 84;
/// Block size per channel
pub const DSF_BLOCK_SIZE: u32 = 4096;
/// DSD silence pattern used for block padding
pub const DSD_SILENCE: u8 = 0x69;

/// Streams one track into a DSF container
#[derive(Debug)]
pub struct DsfWriter<W> {
    inner: W,
    channel_count: u32,
}

impl<W: Write + Seek> DsfWriter<W> {
    /// Create a writer over `inner`
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            channel_count: 2,
        }
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Channel type field: 2 for stereo, 7 (5.1) otherwise
fn channel_type(channel_count: u8) -> u32 {
    if channel_count == 2 {
        2
    } else {
        7
    }
}

impl<W: Write + Seek + Send> ContainerWriter for DsfWriter<W> {
    fn write_header(&mut self, track: &Track, _area: &Area, estimated_audio_bytes: u64) -> Result<u64> {
        self.channel_count = track.channel_count.max(1) as u32;

        let mut header = Vec::with_capacity(DSF_HEADER_SIZE as usize);

        // DSD chunk
        header.extend_from_slice(b"DSD ");
        header.extend_from_slice(&DSF_DSD_CHUNK_SIZE.to_le_bytes());
        header.extend_from_slice(&(DSF_HEADER_SIZE + estimated_audio_bytes).to_le_bytes());
        header.extend_from_slice(&0u64.to_le_bytes()); // no ID3 chunk

        // fmt chunk
        header.extend_from_slice(b"fmt ");
        header.extend_from_slice(&DSF_FMT_CHUNK_SIZE.to_le_bytes());
        header.extend_from_slice(&1u32.to_le_bytes()); // format version
        header.extend_from_slice(&0u32.to_le_bytes()); // raw DSD
        header.extend_from_slice(&channel_type(track.channel_count).to_le_bytes());
        header.extend_from_slice(&(track.channel_count as u32).to_le_bytes());
        header.extend_from_slice(&SAMPLING_FREQUENCY.to_le_bytes());
        header.extend_from_slice(&1u32.to_le_bytes()); // bits per sample
        header.extend_from_slice(&track.duration_samples().to_le_bytes());
        header.extend_from_slice(&DSF_BLOCK_SIZE.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());

        // data chunk header
        header.extend_from_slice(b"data");
        header.extend_from_slice(&(DSF_DATA_HEADER_SIZE + estimated_audio_bytes).to_le_bytes());

        self.inner.write_all(&header)?;
        Ok(header.len() as u64)
    }

    fn write_audio(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }

    fn pad(&mut self, audio_bytes: u64) -> Result<u64> {
        let block = DSF_BLOCK_SIZE as u64 * self.channel_count as u64;
        let padding = (block - audio_bytes % block) % block;
        if padding > 0 {
            self.inner.write_all(&vec![DSD_SILENCE; padding as usize])?;
        }
        Ok(padding)
    }

    fn finalize(&mut self, total_audio_bytes: u64) -> Result<()> {
        let file_size = self.inner.stream_position()?;
        patch_at(&mut self.inner, DSF_FILE_SIZE_OFFSET, &file_size.to_le_bytes())?;
        patch_at(
            &mut self.inner,
            DSF_DATA_SIZE_OFFSET,
            &(DSF_DATA_HEADER_SIZE + total_audio_bytes).to_le_bytes(),
        )?;
        self.inner.flush()?;
        Ok(())
    }
}
