/// Output naming

use crate::extract::options::ExtractionOptions;
use crate::image::{Disc, Track};
use std::path::{Path, PathBuf};

const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make `text` safe to use as a single path component.
///
/// Reserved characters become `_`, control characters are dropped and
/// trailing whitespace is trimmed. Empty results become `Track`.
pub fn sanitize_filename(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = cleaned.trim_end();
    if trimmed.is_empty() {
        "Track".to_string()
    } else {
        trimmed.to_string()
    }
}

fn component(text: &str, options: &ExtractionOptions) -> String {
    if options.trim_whitespace {
        sanitize_filename(text.trim_start())
    } else {
        sanitize_filename(text)
    }
}

/// Output path for a track: `<dir>/<NN> - <title>[ - <artist>].<ext>`
pub fn track_output_path(dir: &Path, track: &Track, options: &ExtractionOptions) -> PathBuf {
    let fallback = format!("Track {:02}", track.number + 1);
    let title = component(track.title().unwrap_or(&fallback), options);

    let artist = match track.artist() {
        Some(artist) if options.add_performer_to_filename => {
            format!(" - {}", component(artist, options))
        }
        _ => String::new(),
    };

    dir.join(format!(
        "{:02} - {}{}.{}",
        track.number + 1,
        title,
        artist,
        options.format.extension()
    ))
}

/// Directory tracks are written to, `<dir>/<artist> - <album>` when
/// artist folders are enabled
pub fn album_output_dir(dir: &Path, disc: &Disc, options: &ExtractionOptions) -> PathBuf {
    if !options.add_artist_to_folder {
        return dir.to_path_buf();
    }
    let artist = disc.artist().unwrap_or(crate::toc::DEFAULT_ALBUM_ARTIST);
    let title = disc.title().unwrap_or(crate::toc::DEFAULT_ALBUM_TITLE);
    dir.join(component(&format!("{} - {}", artist, title), options))
}
