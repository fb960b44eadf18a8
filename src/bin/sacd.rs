/// Interactive SACD console application

use sacd::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::sync::{Arc, Mutex};

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "area", "areas", "cancel", "exit", "extract", "help", "info", "open", "quit",
                "status", "text", "tracks", "wait",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the command name
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".sacd_history");
        p
    })
}

/// Console state
#[derive(Default)]
struct Session {
    disc: Option<Arc<Disc>>,
    area: Option<AreaType>,
    extractor: Option<Extractor>,
    last_progress: Arc<Mutex<Option<Progress>>>,
}

impl Session {
    fn selected_area(&self) -> Option<&Area> {
        let disc = self.disc.as_ref()?;
        match self.area {
            Some(area_type) => disc.area(area_type),
            None => disc.best_area(),
        }
    }
}

fn main() {
    env_logger::init();

    println!("=== SACD ===");
    println!("Interactive console for exploring SACD disc images.");
    println!("Type 'help' for available commands\n");

    let mut rl = match Editor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Failed to create editor: {}", err);
            return;
        }
    };
    rl.set_helper(Some(CommandCompleter::new()));

    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let mut session = Session::default();

    loop {
        let input = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => print_help(),
            "quit" | "exit" => break,
            "open" | "load" => {
                if parts.len() < 2 {
                    println!("Usage: open <path>");
                    continue;
                }
                if session.extractor.as_ref().is_some_and(|e| e.is_running()) {
                    println!("Extraction in progress; cancel or wait first");
                    continue;
                }
                match Disc::open(&parts[1]) {
                    Ok(disc) => {
                        println!("Opened: {}", parts[1]);
                        session.extractor = None;
                        session.area = None;
                        session.disc = Some(Arc::new(disc));
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "info" => match &session.disc {
                Some(disc) => print_info(disc),
                None => println!("No disc open"),
            },
            "areas" => match &session.disc {
                Some(disc) => print_areas(disc),
                None => println!("No disc open"),
            },
            "area" => {
                let Some(disc) = &session.disc else {
                    println!("No disc open");
                    continue;
                };
                let Some(area_type) = parts.get(1).and_then(|p| parse_area_type(p)) else {
                    println!("Usage: area <stereo|multi>");
                    continue;
                };
                if disc.area(area_type).is_some() {
                    session.area = Some(area_type);
                    println!("Selected {} area", area_type);
                } else {
                    println!("Disc has no {} area", area_type);
                }
            }
            "tracks" => match session.selected_area() {
                Some(area) => list_tracks(area),
                None => println!("No area available"),
            },
            "text" => {
                let Some(area) = session.selected_area() else {
                    println!("No area available");
                    continue;
                };
                match parts.get(1).and_then(|p| p.parse::<usize>().ok()) {
                    Some(n) if n >= 1 && n <= area.track_count() => {
                        if let Some(track) = area.track(n - 1) {
                            print_track_text(track);
                        }
                    }
                    _ => println!("Usage: text <track 1-{}>", area.track_count()),
                }
            }
            "extract" => extract(&mut session, &parts[1..]),
            "status" => print_status(&session),
            "cancel" => match &session.extractor {
                Some(extractor) => {
                    extractor.cancel();
                    println!("Cancellation requested");
                }
                None => println!("No extraction started"),
            },
            "wait" => match &session.extractor {
                Some(extractor) => match extractor.wait() {
                    Ok(()) => println!("Extraction finished"),
                    Err(e) => println!("Extraction stopped: {}", e),
                },
                None => println!("No extraction started"),
            },
            _ => println!("Unknown command: {}. Type 'help' for available commands.", command),
        }
    }

    if let Some(history_path) = history_path() {
        let _ = rl.save_history(&history_path);
    }
    if let Some(extractor) = &session.extractor {
        if extractor.is_running() {
            println!("Cancelling extraction...");
        }
    }
    println!("Goodbye!");
}

/// Handle `extract <dir> [dsf|dff|em] [all|n...]`
fn extract(session: &mut Session, args: &[String]) {
    let Some(disc) = session.disc.clone() else {
        println!("No disc open");
        return;
    };
    let Some(area_type) = session.selected_area().map(|a| a.area_type) else {
        println!("No area available");
        return;
    };
    let Some(dir) = args.first() else {
        println!("Usage: extract <dir> [dsf|dff|em] [all|track...]");
        return;
    };
    if session.extractor.as_ref().is_some_and(|e| e.is_running()) {
        println!("Extraction already running");
        return;
    }

    let mut format = OutputFormat::Dsf;
    let mut tracks = Vec::new();
    for arg in &args[1..] {
        if let Ok(f) = arg.parse::<OutputFormat>() {
            format = f;
        } else if arg == "all" {
            tracks.clear();
        } else if let Ok(n) = arg.parse::<usize>() {
            if n == 0 {
                println!("Track numbers start at 1");
                return;
            }
            tracks.push(n - 1);
        } else {
            println!("Unknown argument: {}", arg);
            return;
        }
    }

    let last_progress = Arc::clone(&session.last_progress);
    let options = ExtractionOptions::new()
        .with_format(format)
        .on_progress(move |p| {
            if let Ok(mut last) = last_progress.lock() {
                *last = Some(p.clone());
            }
        })
        .on_track_complete(|number, _track, path, bytes| {
            println!("\nTrack {} written: {} ({} bytes)", number, path.display(), bytes);
        });

    let extractor = match Extractor::new(disc, area_type, dir, options) {
        Ok(extractor) => extractor,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let queued = if tracks.is_empty() {
        extractor.add_all_tracks()
    } else {
        extractor.add_tracks(&tracks)
    };
    if let Err(e) = queued.and_then(|_| extractor.start()) {
        println!("Error: {}", e);
        return;
    }

    println!(
        "Extracting {} track(s) as {} into {}",
        extractor.queue().len(),
        format.description(),
        extractor.output_dir().display()
    );
    session.extractor = Some(extractor);
}

/// Parse command line input, respecting quoted strings
fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn parse_area_type(text: &str) -> Option<AreaType> {
    match text.to_lowercase().as_str() {
        "stereo" | "2ch" => Some(AreaType::Stereo),
        "multi" | "multichannel" | "mch" => Some(AreaType::Multichannel),
        _ => None,
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  open <path>                       - Open an SACD image (use quotes for paths with spaces)");
    println!("  info                              - Show album information");
    println!("  areas                             - List audio areas");
    println!("  area <stereo|multi>               - Select the area used by tracks/text/extract");
    println!("  tracks                            - List tracks of the selected area");
    println!("  text <n>                          - Show text of track n");
    println!("  extract <dir> [dsf|dff|em] [all|n...] - Extract tracks in the background");
    println!("  status                            - Show extraction progress");
    println!("  cancel                            - Cancel the running extraction");
    println!("  wait                              - Wait for the extraction to finish");
    println!("  help                              - Show this help");
    println!("  quit, exit                        - Exit");
}

fn print_info(disc: &Disc) {
    let meta = disc.metadata();
    if let Some(filename) = disc.filename() {
        println!("Filename: {}", filename);
    }
    println!("Title: {}", disc.title().unwrap_or("-"));
    println!("Artist: {}", disc.artist().unwrap_or("-"));
    if let Some(publisher) = &disc.text().publisher {
        println!("Publisher: {}", publisher);
    }
    if let Some(catalog) = &meta.catalog_number {
        println!("Catalog: {}", catalog);
    }
    if let Some(date) = meta.release_date() {
        println!("Released: {}", date);
    }
    println!("Version: {}.{:02}", meta.version.0, meta.version.1);
    println!("Disc {} of {}", meta.album_sequence_number, meta.album_set_size);
    println!("Hybrid: {}", if meta.is_hybrid { "Yes" } else { "No" });
    println!("Areas: {}", disc.area_count());
}

fn print_areas(disc: &Disc) {
    if disc.area_count() == 0 {
        println!("No audio areas");
    }
    for area in disc.areas() {
        println!(
            "{:<12} {} ch  {:>3} tracks  {:?}  sectors {}-{}  {:.0}s",
            area.area_type.name(),
            area.channel_count,
            area.track_count(),
            area.frame_format,
            area.start_lsn,
            area.end_lsn,
            area.total_duration_seconds()
        );
    }
}

fn list_tracks(area: &Area) {
    println!("{} area:", area.area_type);
    for track in area.tracks() {
        println!(
            "  {:02}  {}  {:>8} sectors  {}{}",
            track.number + 1,
            track.duration,
            track.length_lsn,
            track.title().unwrap_or("-"),
            track.artist().map(|a| format!(" / {}", a)).unwrap_or_default()
        );
    }
}

fn print_track_text(track: &Track) {
    let text = &track.text;
    let fields = [
        ("Title", &text.title),
        ("Title (phonetic)", &text.title_phonetic),
        ("Artist", &text.artist),
        ("Artist (phonetic)", &text.artist_phonetic),
        ("Songwriter", &text.songwriter),
        ("Composer", &text.composer),
        ("Arranger", &text.arranger),
        ("Message", &text.message),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{:<18} {}", label, value);
        }
    }
    if let Some(isrc) = &track.isrc {
        println!("{:<18} {}", "ISRC", isrc);
    }
    if !track.genre.is_empty() {
        println!("{:<18} {}/{}", "Genre", track.genre.category, track.genre.genre);
    }
    println!("{:<18} {} ({} samples)", "Duration", track.duration, track.duration_samples());
}

fn print_status(session: &Session) {
    let Some(extractor) = &session.extractor else {
        println!("No extraction started");
        return;
    };
    println!("State: {:?}", extractor.state());
    if let Some(track) = extractor.current_track() {
        println!("Current track: {} ({}%)", track + 1, extractor.track_progress());
    }
    println!("Bytes written: {}", extractor.total_bytes_written());
    if let Ok(last) = session.last_progress.lock() {
        if let Some(progress) = last.as_ref() {
            println!("{} [{}% overall]", progress.status, progress.overall_percent);
        }
    }
}
