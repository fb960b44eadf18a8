/// DSDIFF (DSD Interchange File Format) writer

use crate::error::Result;
use crate::image::{Area, Track};
use crate::io::writer::{patch_at, ContainerWriter};
use std::io::{Seek, Write};

/// Offset of the FRM8 chunk size field
pub const DSDIFF_FORM_SIZE_OFFSET: u64 = 4;
/// Format version written to the FVER chunk (1.5.0.0)
pub const DSDIFF_VERSION: u32 = 0x0105_0000;
/// Channel identifiers in CHNL order
pub const CHANNEL_IDS: [&[u8; 4]; 6] = [b"SLFT", b"SRGT", b"C   ", b"LFE ", b"LS  ", b"RS  "];

/// Streams one track into a DSDIFF container
#[derive(Debug)]
pub struct DsdiffWriter<W> {
    inner: W,
    data_size_offset: u64,
}

impl<W: Write + Seek> DsdiffWriter<W> {
    /// Create a writer over `inner`
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            data_size_offset: 0,
        }
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn chunk_header(header: &mut Vec<u8>, id: &[u8; 4], size: u64) {
    header.extend_from_slice(id);
    header.extend_from_slice(&size.to_be_bytes());
}

impl<W: Write + Seek + Send> ContainerWriter for DsdiffWriter<W> {
    fn write_header(&mut self, track: &Track, area: &Area, estimated_audio_bytes: u64) -> Result<u64> {
        let channels = &CHANNEL_IDS[..(track.channel_count as usize).min(CHANNEL_IDS.len())];
        let chnl_size = 2 + 4 * channels.len() as u64;
        let prop_size = 4 + (12 + 4) + (12 + chnl_size);

        let mut header = Vec::with_capacity(128);

        // Form placeholder, patched once the header length is known
        chunk_header(&mut header, b"FRM8", 0);
        header.extend_from_slice(b"DSD ");

        chunk_header(&mut header, b"FVER", 4);
        header.extend_from_slice(&DSDIFF_VERSION.to_le_bytes());

        chunk_header(&mut header, b"PROP", prop_size);
        header.extend_from_slice(b"SND ");

        chunk_header(&mut header, b"FS  ", 4);
        header.extend_from_slice(&area.sample_frequency.to_le_bytes());

        chunk_header(&mut header, b"CHNL", chnl_size);
        header.extend_from_slice(&(channels.len() as u16).to_be_bytes());
        for id in channels {
            header.extend_from_slice(*id);
        }

        self.data_size_offset = header.len() as u64 + 4;
        chunk_header(&mut header, b"DSD ", estimated_audio_bytes);

        let form_size = header.len() as u64 - 12 + estimated_audio_bytes;
        header[4..12].copy_from_slice(&form_size.to_be_bytes());

        self.inner.write_all(&header)?;
        Ok(header.len() as u64)
    }

    fn write_audio(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }

    fn finalize(&mut self, total_audio_bytes: u64) -> Result<()> {
        // Chunks are word aligned; the pad byte is not part of the chunk size
        if total_audio_bytes % 2 == 1 {
            self.inner.write_all(&[0])?;
        }

        let file_size = self.inner.stream_position()?;
        patch_at(
            &mut self.inner,
            DSDIFF_FORM_SIZE_OFFSET,
            &file_size.saturating_sub(12).to_be_bytes(),
        )?;
        patch_at(&mut self.inner, self.data_size_offset, &total_audio_bytes.to_be_bytes())?;
        self.inner.flush()?;
        Ok(())
    }
}
