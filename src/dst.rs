/// DST (Direct Stream Transfer) frame decoding

use crate::error::{Result, SacdError};

/// Input buffer capacity in bytes
pub const DST_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Output buffer capacity in bytes
pub const DST_OUTPUT_BUFFER_SIZE: usize = 256 * 1024;

/// Smallest frame the decoder accepts
pub const DST_MIN_FRAME_SIZE: usize = 5;

/// A per-frame audio decoder used by the extractor.
///
/// Lifecycle: `init` moves the decoder to ready, `decode_frame` may then
/// be called any number of times, `release` frees its buffers and returns
/// it to the uninitialized state.
pub trait FrameDecoder: Send {
    /// Allocate buffers. Fails with `OutOfMemory` if allocation fails.
    fn init(&mut self) -> Result<()>;

    /// Check whether `init` has succeeded and `release` has not been called
    fn is_ready(&self) -> bool;

    /// Decode one frame, returning the decoded bytes
    fn decode_frame(&mut self, input: &[u8]) -> Result<&[u8]>;

    /// Free buffers and return to the uninitialized state
    fn release(&mut self);
}

/// Heuristic check for a DST compressed frame.
///
/// Frames starting `FF FF` are taken as raw DSD. Otherwise the big-endian
/// u16 at bytes 2..4 is read as a frame size and must be plausible.
pub fn is_dst_data(data: &[u8]) -> bool {
    if data.len() < DST_MIN_FRAME_SIZE {
        return false;
    }
    if data[0] == 0xFF && data[1] == 0xFF {
        return false;
    }
    let frame_size = u16::from_be_bytes([data[2], data[3]]) as usize;
    frame_size > 10 && frame_size < data.len()
}

/// Built-in frame decoder.
///
/// Frames that classify as raw DSD are passed through unchanged. Real DST
/// bitstreams are rejected with `Unsupported`.
#[derive(Debug, Default)]
pub struct DstDecoder {
    input: Vec<u8>,
    output: Vec<u8>,
    ready: bool,
}

impl DstDecoder {
    /// Create an uninitialized decoder
    pub fn new() -> Self {
        Self::default()
    }
}

fn allocate(size: usize, what: &str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| SacdError::out_of_memory(format!("DST {} buffer", what)))?;
    Ok(buffer)
}

impl FrameDecoder for DstDecoder {
    fn init(&mut self) -> Result<()> {
        self.release();
        self.input = allocate(DST_INPUT_BUFFER_SIZE, "input")?;
        self.output = allocate(DST_OUTPUT_BUFFER_SIZE, "output")?;
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn decode_frame(&mut self, input: &[u8]) -> Result<&[u8]> {
        if !self.ready {
            return Err(SacdError::generic("DST decoder used before init"));
        }
        if input.len() < DST_MIN_FRAME_SIZE {
            return Err(SacdError::generic(format!(
                "DST frame of {} bytes is too short",
                input.len()
            )));
        }
        if input.len() > DST_INPUT_BUFFER_SIZE {
            return Err(SacdError::generic(format!(
                "DST frame of {} bytes exceeds the input buffer",
                input.len()
            )));
        }

        self.input.clear();
        self.input.extend_from_slice(input);

        if is_dst_data(&self.input) {
            return Err(SacdError::unsupported("DST bitstream decoding"));
        }

        self.output.clear();
        self.output.extend_from_slice(&self.input);
        Ok(&self.output)
    }

    fn release(&mut self) {
        self.input = Vec::new();
        self.output = Vec::new();
        self.ready = false;
    }
}
