/*!
# sacd

A Rust library for reading Super Audio CD disc images and extracting their
tracks to DSF and DSDIFF files.

## Features

- Master TOC and area TOC parsing (stereo and multichannel areas)
- Album, track text, ISRC and genre recovery
- DSF and DSDIFF container writers with in-place size patching
- Cancellable background extraction with throttled progress callbacks
- Pluggable frame decoding for DST compressed areas

## Quick Start

```rust,no_run
use sacd::{Disc, ExtractionOptions, Extractor, OutputFormat};
use std::sync::Arc;

// Open an image and pick the stereo area if there is one
let disc = Arc::new(Disc::open("album.iso")?);
let area = disc.best_area().expect("no audio areas");
for track in area.tracks() {
    println!("{:02} {} {}", track.number + 1, track.duration, track.title().unwrap_or(""));
}

// Extract every track to DSDIFF
let options = ExtractionOptions::new()
    .with_format(OutputFormat::Dsdiff)
    .on_progress(|p| println!("{}", p.status));
let extractor = Extractor::new(Arc::clone(&disc), area.area_type, "out", options)?;
extractor.add_all_tracks()?;
extractor.start()?;
extractor.wait()?;
# Ok::<(), sacd::SacdError>(())
```

## Modules

- `format`: layout constants and output formats
- `image`: disc, area and track model
- `toc`: Master TOC and area TOC parsers
- `io`: sector reader and container writers
- `dst`: frame decoder interface
- `extract`: background extraction engine
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Frame decoder interface and DST detection
pub mod dst;
/// Error types and Result alias
pub mod error;
/// Background track extraction
pub mod extract;
/// Layout constants and output formats
pub mod format;
/// Disc, area and track model
pub mod image;
/// Sector access and container writers
pub mod io;
/// Master TOC and area TOC parsing
pub mod toc;

// Re-export common types
pub use dst::{is_dst_data, DstDecoder, FrameDecoder};
pub use error::{ErrorKind, Result, SacdError};
pub use extract::{
    sanitize_filename, ExtractionOptions, ExtractionState, Extractor, Progress,
};
pub use format::OutputFormat;
pub use image::{
    estimate_track_file_size, seconds_to_time, time_to_seconds, Area, AreaPointer, AreaSpec,
    AreaType, Disc, DiscMetadata, FrameFormat, Genre, SacdImageBuilder, SacdText, SacdTime, Track,
    TrackSpec,
};
pub use io::{ContainerWriter, DsdiffWriter, DsfWriter, SectorReader};
