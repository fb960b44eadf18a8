/// Cue sheet export

use crate::error::Result;
use crate::extract::filename::sanitize_filename;
use crate::image::{Disc, Track};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// An extracted track and the file it was written to
#[derive(Debug, Clone)]
pub struct CueEntry {
    /// Track metadata
    pub track: Track,
    /// Output file
    pub path: PathBuf,
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "'"))
}

/// Render a cue sheet listing each extracted file as one track
pub fn render_cue_sheet(disc: &Disc, entries: &[CueEntry]) -> String {
    let mut cue = String::new();

    if let Some(catalog) = &disc.metadata().catalog_number {
        let _ = writeln!(cue, "CATALOG {}", catalog);
    }
    if let Some(date) = disc.metadata().release_date() {
        let _ = writeln!(cue, "REM DATE {}", date);
    }
    if let Some(artist) = disc.artist() {
        let _ = writeln!(cue, "PERFORMER {}", quoted(artist));
    }
    if let Some(title) = disc.title() {
        let _ = writeln!(cue, "TITLE {}", quoted(title));
    }

    for entry in entries {
        let file = entry
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = writeln!(cue, "FILE {} WAVE", quoted(&file));
        let _ = writeln!(cue, "  TRACK {:02} AUDIO", entry.track.number + 1);
        if let Some(title) = entry.track.title() {
            let _ = writeln!(cue, "    TITLE {}", quoted(title));
        }
        if let Some(artist) = entry.track.artist() {
            let _ = writeln!(cue, "    PERFORMER {}", quoted(artist));
        }
        if let Some(isrc) = &entry.track.isrc {
            let _ = writeln!(cue, "    ISRC {}", isrc);
        }
        let _ = writeln!(cue, "    INDEX 01 00:00:00");
    }

    cue
}

/// Write `<album>.cue` into `dir`, returning its path
pub fn write_cue_sheet(dir: &Path, disc: &Disc, entries: &[CueEntry]) -> Result<PathBuf> {
    let name = sanitize_filename(disc.title().unwrap_or(crate::toc::DEFAULT_ALBUM_TITLE));
    let path = dir.join(format!("{}.cue", name));
    std::fs::write(&path, render_cue_sheet(disc, entries))?;
    log::info!("Wrote cue sheet {}", path.display());
    Ok(path)
}
