/// DSD container writers

use crate::error::Result;
use crate::format::OutputFormat;
use crate::image::{Area, Track};
use crate::io::dsdiff::DsdiffWriter;
use crate::io::dsf::DsfWriter;
use std::io::{Seek, SeekFrom, Write};

/// A container writer that emits a header, streams audio and patches
/// size fields once the real audio length is known.
pub trait ContainerWriter: Send {
    /// Write the container header sized for `estimated_audio_bytes`.
    /// Returns the number of header bytes written.
    fn write_header(&mut self, track: &Track, area: &Area, estimated_audio_bytes: u64) -> Result<u64>;

    /// Append raw audio bytes
    fn write_audio(&mut self, data: &[u8]) -> Result<()>;

    /// Write format-specific padding after `audio_bytes` of audio.
    /// Returns the number of padding bytes written.
    fn pad(&mut self, _audio_bytes: u64) -> Result<u64> {
        Ok(0)
    }

    /// Patch size fields for `total_audio_bytes` and flush. The write
    /// position is restored afterwards.
    fn finalize(&mut self, total_audio_bytes: u64) -> Result<()>;
}

/// Create the writer for an output format
pub fn create_writer<W>(format: OutputFormat, inner: W) -> Box<dyn ContainerWriter>
where
    W: Write + Seek + Send + 'static,
{
    match format {
        OutputFormat::Dsf => Box::new(DsfWriter::new(inner)),
        OutputFormat::Dsdiff | OutputFormat::DsdiffEditMaster => Box::new(DsdiffWriter::new(inner)),
    }
}

/// Overwrite `bytes` at `offset`, then return to the current position
pub(crate) fn patch_at<W: Write + Seek>(inner: &mut W, offset: u64, bytes: &[u8]) -> Result<()> {
    let current = inner.stream_position()?;
    inner.seek(SeekFrom::Start(offset))?;
    inner.write_all(bytes)?;
    inner.seek(SeekFrom::Start(current))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::FrameFormat;
    use crate::image::AreaType;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// A `Write + Seek` that keeps its bytes reachable after being boxed
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Cursor<Vec<u8>>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Seek for SharedBuffer {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            self.0.lock().unwrap().seek(pos)
        }
    }

    #[test]
    fn test_create_writer_selects_format() {
        let area = Area::new(AreaType::Stereo, 2, FrameFormat::Dsd3In16);
        let track = Track::new(0, 2, FrameFormat::Dsd3In16);

        for (format, magic) in [
            (OutputFormat::Dsf, b"DSD "),
            (OutputFormat::Dsdiff, b"FRM8"),
            (OutputFormat::DsdiffEditMaster, b"FRM8"),
        ] {
            let buffer = SharedBuffer::default();
            let mut writer = create_writer(format, buffer.clone());
            writer.write_header(&track, &area, 0).unwrap();
            let bytes = buffer.0.lock().unwrap().get_ref().clone();
            assert_eq!(&bytes[..4], magic);
        }
    }

    #[test]
    fn test_patch_at_restores_position() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        cursor.seek(SeekFrom::End(0)).unwrap();
        patch_at(&mut cursor, 2, &[0xAB, 0xCD]).unwrap();
        assert_eq!(cursor.position(), 8);
        assert_eq!(&cursor.get_ref()[..4], &[0, 0, 0xAB, 0xCD]);
    }
}
