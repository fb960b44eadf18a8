/// Best-effort decoding of SACD text fields

/// Decode a text field, keeping valid UTF-8 and mapping anything else as
/// ISO-8859-1. Returns `None` for empty or whitespace-only fields.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let bytes = &bytes[..end];

    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    let trimmed = text.trim_end();
    if trimmed.trim_start().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read a NUL-terminated string starting at `pos`, bounded by the buffer.
/// Returns the decoded text and the position of the terminator (or end).
pub fn read_cstring(data: &[u8], pos: usize) -> (Option<String>, usize) {
    if pos >= data.len() {
        return (None, data.len());
    }
    let len = data[pos..]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(data.len() - pos);
    (decode_text(&data[pos..pos + len]), pos + len)
}

/// Decode a fixed-width ASCII field such as a catalog number or ISRC
pub fn decode_fixed(bytes: &[u8]) -> Option<String> {
    decode_text(bytes).map(|s| s.trim().to_string())
}
