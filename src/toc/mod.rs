/// Decoding of the Master TOC and area TOCs

/// Area TOC parser
pub mod area;
/// Master TOC parser
pub mod master;
/// Text field decoding
pub mod text;

pub use area::{area_type_from_signature, parse_area_toc};
pub use master::{parse_master_toc, DEFAULT_ALBUM_ARTIST, DEFAULT_ALBUM_TITLE};
