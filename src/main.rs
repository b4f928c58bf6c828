//! Rocket Man - terminal entry point
//!
//! Threads: the game loop owns the simulation; a reader thread blocks on
//! terminal events; the main thread translates keys and renders the latest
//! snapshot until the loop stops.

use std::fs::File;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Instant;

use crossterm::event::{self, Event};

use rocket_man::assets::{Assets, DirAssets};
use rocket_man::audio::{AudioManager, BellBackend, NullBackend, SoundBackend};
use rocket_man::error::{AppError, Result};
use rocket_man::game_loop::{
    FRAME_DURATION, GameLoop, LoopCommand, LoopExit, SnapshotSlot, spawn_game_loop,
};
use rocket_man::highscores::{FileScoreStore, ScoreStore};
use rocket_man::render::keys::KeyAction;
use rocket_man::render::{KeyTranslator, TerminalOutput};
use rocket_man::settings::Settings;
use rocket_man::sim::GameState;

fn main() -> ExitCode {
    let settings = Settings::load();
    if let Err(e) = init_logger(&settings) {
        eprintln!("{e}");
    }
    log::info!("Rocket Man starting...");

    match run(settings) {
        Ok(exit) => {
            log::info!("Exited ({exit:?})");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("rocket-man: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to a file; the terminal belongs to the game. `RUST_LOG` overrides the
/// default `info` level.
fn init_logger(settings: &Settings) -> Result<()> {
    let file = File::create(&settings.log_file)
        .map_err(|e| AppError::Logger(format!("{}: {e}", settings.log_file.display())))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| AppError::Logger(e.to_string()))
}

fn run(settings: Settings) -> Result<LoopExit> {
    let assets = Assets::load(&DirAssets::new(&settings.assets_dir));

    let backend: Box<dyn SoundBackend> = if settings.terminal_bell {
        Box::new(BellBackend)
    } else {
        Box::new(NullBackend)
    };
    let audio = AudioManager::new(assets.sounds.clone(), backend, &settings);

    let scores = FileScoreStore::new(&settings.highscore_path);
    let high_score = scores.load_or_default();

    let seed = settings.seed_or_clock();
    log::info!("Game initialized with seed: {seed}");
    let state = GameState::new(settings.width, settings.height, seed, high_score);
    let game = GameLoop::new(state, Box::new(audio), Box::new(scores));

    let mut output = TerminalOutput::new();
    output.init()?;

    let result = run_frontend(game, &mut output, &assets);

    // Restore the terminal before any error reaches stderr
    output.cleanup()?;
    result
}

fn run_frontend(game: GameLoop, output: &mut TerminalOutput, assets: &Assets) -> Result<LoopExit> {
    let slot: SnapshotSlot = Arc::new(Mutex::new(None));
    let running = Arc::new(AtomicBool::new(true));
    let (cmd_tx, loop_handle) = spawn_game_loop(game, slot.clone(), running.clone())?;

    // Blocking reads live on their own thread so rendering never waits on input
    let (key_tx, key_rx) = mpsc::channel::<Event>();
    thread::Builder::new().name("terminal-input".into()).spawn(move || {
        while let Ok(ev) = event::read() {
            if key_tx.send(ev).is_err() {
                break;
            }
        }
    })?;

    let mut keys = KeyTranslator::new(output.keyboard_enhanced());
    let mut render_error = None;
    while running.load(Ordering::Relaxed) {
        let frame_start = Instant::now();

        while let Ok(ev) = key_rx.try_recv() {
            let Event::Key(key) = ev else { continue };
            match keys.translate(key, frame_start) {
                KeyAction::Input(events) => {
                    for input in events {
                        let _ = cmd_tx.send(LoopCommand::Input(input));
                    }
                }
                KeyAction::Interrupt => {
                    log::info!("Interrupted");
                    let _ = cmd_tx.send(LoopCommand::Shutdown);
                }
            }
        }
        for input in keys.expire(frame_start) {
            let _ = cmd_tx.send(LoopCommand::Input(input));
        }

        let snapshot = slot.lock().ok().and_then(|s| s.clone());
        if let Some(snapshot) = snapshot {
            if let Err(e) = output.render(&snapshot, &assets.backdrop) {
                render_error = Some(e);
                let _ = cmd_tx.send(LoopCommand::Shutdown);
                break;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    let exit = loop_handle
        .join()
        .map_err(|_| AppError::GameLoop("game loop thread panicked".into()))?;
    if let Some(e) = render_error {
        return Err(e.into());
    }
    Ok(exit)
}
