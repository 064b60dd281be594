//! Hulu Arena entry point
//!
//! Headless driver: plays autopilot matches, replays recorded sessions and
//! lists recordings. Frames are drawn into a `DrawList`, which a windowed
//! backend would hand to its renderer.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use hulu_arena::app::App;
use hulu_arena::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use hulu_arena::platform::{FileRecordingStorage, InputSnapshot, RecordingStorage};
use hulu_arena::renderer::DrawList;
use hulu_arena::sim::autopilot_input;
use hulu_arena::{Settings, init_logging};

/// Display refresh the headless driver pretends to run at
const FRAME_DT: f32 = 1.0 / 60.0;

/// Huluwa vs. monsters, with session recording and replay
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file
    #[arg(short, long, global = true, default_value = "hulu-arena.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a match driven by the autopilot
    Play {
        /// Stop after this many seconds of match time
        #[arg(long, default_value_t = 60.0)]
        seconds: f32,
        /// RNG seed (overrides the settings file)
        #[arg(long)]
        seed: Option<u64>,
        /// Do not record this match
        #[arg(long)]
        no_record: bool,
    },
    /// Replay a recorded session (the newest when omitted)
    Replay { session: Option<String> },
    /// List recorded sessions, newest first
    List,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = Settings::load_or_create(&args.config);
    match args.command {
        Command::Play {
            seconds,
            seed,
            no_record,
        } => {
            if no_record {
                settings.record = false;
            }
            let seed = seed.or(settings.seed).unwrap_or_else(clock_seed);
            play(settings, seconds, seed)
        }
        Command::Replay { session } => replay(settings, session),
        Command::List => list(&settings),
    }
}

fn play(settings: Settings, seconds: f32, seed: u64) -> Result<()> {
    let storage = FileRecordingStorage::new(settings.recordings_dir.clone());
    let mut app = App::new(settings, Box::new(storage));
    app.start_match(seed);

    let frames = (seconds.max(0.0) / FRAME_DT).ceil() as u64;
    for _ in 0..frames {
        let Some(state) = app.match_state() else {
            break;
        };
        if state.is_stopped() {
            break;
        }
        let input = autopilot_input(state);
        app.update(&input, FRAME_DT);
    }

    let mut frame = DrawList::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    app.render(&mut frame);
    if let Some(state) = app.match_state() {
        println!(
            "Match over after {:.1}s: score {}, health {}{}",
            state.elapsed,
            state.score(),
            state.player_health().unwrap_or(0),
            if state.is_stopped() { " (defeated)" } else { "" }
        );
    }
    app.end_match();
    if let Some(session) = app.last_session() {
        println!("Recorded {}", session);
    }
    Ok(())
}

fn replay(settings: Settings, session: Option<String>) -> Result<()> {
    let storage = FileRecordingStorage::new(settings.recordings_dir.clone());
    let session = match session {
        Some(s) => s,
        None => newest_recording(&storage)?,
    };

    let mut app = App::new(settings, Box::new(storage));
    app.open_replay(&session);
    let Some(playback) = app.playback() else {
        bail!("replay scene did not open");
    };
    if playback.is_empty() {
        println!("{}: no keyframes", session);
        return Ok(());
    }

    let idle = InputSnapshot::new();
    let frames = (playback.duration() / f64::from(FRAME_DT)).ceil() as u64 + 1;
    let mut frame = DrawList::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    for _ in 0..frames {
        app.update(&idle, FRAME_DT);
        frame.clear();
        app.render(&mut frame);
    }

    if let Some(playback) = app.playback() {
        println!(
            "{}: {} keyframes over {:.2}s, {} entities on the last frame ({} draw calls)",
            session,
            playback.keyframe_count(),
            playback.duration(),
            playback.active_entities().count(),
            frame.commands.len()
        );
    }
    Ok(())
}

fn list(settings: &Settings) -> Result<()> {
    let storage = FileRecordingStorage::new(settings.recordings_dir.clone());
    let recordings = storage
        .list_recordings()
        .with_context(|| format!("listing {}", storage.dir().display()))?;
    if recordings.is_empty() {
        println!("No recordings in {}", storage.dir().display());
    }
    for name in recordings {
        println!("{}", name);
    }
    Ok(())
}

fn newest_recording(storage: &FileRecordingStorage) -> Result<String> {
    let recordings = storage
        .list_recordings()
        .with_context(|| format!("listing {}", storage.dir().display()))?;
    match recordings.into_iter().next() {
        Some(name) => Ok(name),
        None => bail!("no recordings in {}", storage.dir().display()),
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
