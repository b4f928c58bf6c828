//! Game loop thread: owns the simulation and runs it at a fixed rate.
//!
//! Input arrives as [`LoopCommand`]s over an `mpsc` channel. Each 60 Hz frame
//! runs up to `MAX_SUBSTEPS` physics ticks from an accumulator, publishes a
//! [`Snapshot`] for the renderer, then hands the drained `GameEvent`s to the
//! audio sink and score store.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::audio::AudioSink;
use crate::consts::{FRAME_HZ, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::ScoreStore;
use crate::input::{InputEvent, InputState};
use crate::render::snapshot::Snapshot;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, menu, tick};

/// Nominal duration of one frame
pub const FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / FRAME_HZ as u64);

/// Longest frame time fed to the accumulator
const MAX_FRAME_DT: f32 = 0.1;

/// Commands accepted by the game loop thread
#[derive(Debug, Clone, PartialEq)]
pub enum LoopCommand {
    Input(InputEvent),
    Shutdown,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Player confirmed quit from the title screen
    Quit,
    /// Shutdown command, channel closed, or `running` cleared
    Shutdown,
}

/// Latest published frame
pub type SnapshotSlot = Arc<Mutex<Option<Snapshot>>>;

/// Wall-clock source in Unix milliseconds
pub type Clock = Box<dyn Fn() -> u64 + Send>;

pub fn system_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The simulation plus its collaborators, stepped one frame at a time
pub struct GameLoop {
    state: GameState,
    held: InputState,
    pending: Vec<InputEvent>,
    accumulator: f32,
    audio: Box<dyn AudioSink>,
    scores: Box<dyn ScoreStore>,
    clock: Clock,
    quit: bool,
}

impl GameLoop {
    pub fn new(state: GameState, audio: Box<dyn AudioSink>, scores: Box<dyn ScoreStore>) -> Self {
        Self {
            state,
            held: InputState::default(),
            pending: Vec::new(),
            accumulator: 0.0,
            audio,
            scores,
            clock: Box::new(system_clock_ms),
            quit: false,
        }
    }

    /// Replace the wall clock (tests drive reload timing with this)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Quit was confirmed from the title screen
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Queue an input event for the next tick
    pub fn queue_input(&mut self, event: InputEvent) {
        self.held.apply(event);
        self.pending.push(event);
    }

    /// Advance by `elapsed` seconds of wall time. Runs at most
    /// `MAX_SUBSTEPS` ticks; time beyond that is dropped. Returns the number
    /// of ticks run.
    pub fn step_frame(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.run_tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Frame over budget, dropping {:.3}s", self.accumulator);
            self.accumulator = 0.0;
        }

        self.dispatch_events();
        substeps
    }

    /// Run exactly one tick, consuming pending input.
    ///
    /// Menu input is applied before the physics step. Held controls are
    /// released whenever it moves the game into or out of `Playing`, so
    /// letters typed into the name prompt never steer or fire the ship.
    pub fn run_tick(&mut self) {
        let events = std::mem::take(&mut self.pending);
        let Self { state, held, clock, .. } = self;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let now_ms = (*clock)();
            let was_playing = state.phase == GamePhase::Playing;
            for event in events {
                menu::handle_event(state, event, now_ms);
            }
            let playing = state.phase == GamePhase::Playing;
            if playing != was_playing {
                held.clear();
            }
            let input = TickInput {
                held: *held,
                events: Vec::new(),
                now_ms,
            };
            tick(state, &input, SIM_DT);
            // The physics step can end the game too
            if playing && state.phase != GamePhase::Playing {
                held.clear();
            }
        }));
        if result.is_err() {
            log::error!("Simulation tick panicked; continuing with next tick");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, (self.clock)())
    }

    /// Hand drained simulation events to their consumers
    pub fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(effect) => self.audio.play(effect),
                GameEvent::MusicStart => self.audio.play_loop(),
                GameEvent::MusicStop => self.audio.stop_loop(),
                GameEvent::HighScoreChanged(record) => self.scores.save_logged(&record),
                GameEvent::Quit => self.quit = true,
            }
        }
    }
}

/// Spawn the game loop on its own thread.
///
/// Returns the command sender and the thread handle, whose result says why
/// the loop stopped.
pub fn spawn_game_loop(
    game: GameLoop,
    latest_snapshot: SnapshotSlot,
    running: Arc<AtomicBool>,
) -> std::io::Result<(mpsc::Sender<LoopCommand>, JoinHandle<LoopExit>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let handle = std::thread::Builder::new()
        .name("rocket-man-game-loop".into())
        .spawn(move || run_game_loop(game, cmd_rx, &latest_snapshot, &running))?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until quit, Shutdown, channel disconnect, or `running`
/// is cleared by someone else.
fn run_game_loop(
    mut game: GameLoop,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    latest_snapshot: &Mutex<Option<Snapshot>>,
    running: &AtomicBool,
) -> LoopExit {
    log::info!("Game loop started");
    let mut last_frame = Instant::now();
    let mut next_frame_time = last_frame;

    let exit = loop {
        if !running.load(Ordering::Relaxed) {
            break LoopExit::Shutdown;
        }

        // 1. Drain all pending commands
        let mut shutdown = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Input(event)) => game.queue_input(event),
                Ok(LoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    shutdown = true;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }
        if shutdown {
            break LoopExit::Shutdown;
        }

        // 2. Advance by the wall time since the last frame
        let now = Instant::now();
        let elapsed = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        game.step_frame(elapsed);

        // 3. Publish the frame
        if let Ok(mut slot) = latest_snapshot.lock() {
            *slot = Some(game.snapshot());
        }

        if game.quit_requested() {
            break LoopExit::Quit;
        }

        // 4. Sleep until the next frame; never try to catch up
        next_frame_time += FRAME_DURATION;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else {
            next_frame_time = now;
        }
    };

    running.store(false, Ordering::Relaxed);
    log::info!("Game loop stopped ({exit:?})");
    exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCall, RecordingSink, SoundEffect};
    use crate::highscores::{HighScore, MemoryScoreStore};
    use crate::consts::PLAYER_SPAWN_ANGLE;
    use crate::input::Control;
    use crate::render::keys::{KeyAction, KeyTranslator};
    use crate::sim::Bullet;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use glam::Vec2;
    use std::sync::atomic::AtomicU32;

    fn test_loop() -> (GameLoop, Arc<RecordingSink>, Arc<MemoryScoreStore>) {
        let audio = Arc::new(RecordingSink::new());
        let scores = Arc::new(MemoryScoreStore::new());
        let state = GameState::new(800.0, 600.0, 11, HighScore::default());
        let game = GameLoop::new(state, Box::new(audio.clone()), Box::new(scores.clone()))
            .with_clock(Box::new(|| 0));
        (game, audio, scores)
    }

    fn press(game: &mut GameLoop, control: Control) {
        game.queue_input(InputEvent::Press(control));
    }

    #[test]
    fn test_frame_duration_constant() {
        assert_eq!(FRAME_DURATION.as_nanos(), 1_000_000_000u128 / 60);
    }

    #[test]
    fn test_step_frame_runs_fixed_ticks() {
        let (mut game, _, _) = test_loop();
        assert_eq!(game.step_frame(SIM_DT * 3.5), 3);
        // Leftover half tick carries into the next frame
        assert_eq!(game.step_frame(SIM_DT * 0.6), 1);
        assert_eq!(game.step_frame(0.0), 0);
    }

    #[test]
    fn test_step_frame_drops_surplus() {
        let (mut game, _, _) = test_loop();
        assert_eq!(game.step_frame(0.09), MAX_SUBSTEPS);
        // Nothing was banked from the overlong frame
        assert_eq!(game.step_frame(0.0), 0);
    }

    #[test]
    fn test_start_game_starts_music() {
        let (mut game, audio, _) = test_loop();
        press(&mut game, Control::Confirm);
        game.queue_input(InputEvent::Char('x'));
        press(&mut game, Control::Confirm);
        game.step_frame(SIM_DT);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!(audio.calls().first(), Some(&AudioCall::LoopStart));
    }

    #[test]
    fn test_high_score_is_saved() {
        let (mut game, _, scores) = test_loop();
        press(&mut game, Control::Confirm);
        game.queue_input(InputEvent::Char('x'));
        press(&mut game, Control::Confirm);
        game.step_frame(SIM_DT);

        game.state_mut().score = 6;
        crate::sim::menu::enter_game_over(game.state_mut());
        press(&mut game, Control::Confirm);
        game.step_frame(SIM_DT);

        assert_eq!(scores.get(), Some(HighScore::new("X", 6)));
    }

    #[test]
    fn test_typed_name_does_not_steer_first_tick() {
        let (mut game, _, _) = test_loop();
        let mut keys = KeyTranslator::new(false);
        let now = Instant::now();
        let typed = [
            KeyCode::Enter,
            KeyCode::Char('j'),
            KeyCode::Char('a'),
            KeyCode::Char('k'),
            KeyCode::Char('e'),
            KeyCode::Enter,
        ];
        for code in typed {
            if let KeyAction::Input(events) = keys.translate(KeyEvent::new(code, KeyModifiers::NONE), now) {
                for event in events {
                    game.queue_input(event);
                }
            }
        }

        assert_eq!(game.step_frame(SIM_DT), 1);
        let state = game.state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player_name, "JAKE");
        assert!(state.bullets.is_empty());
        assert_eq!(state.ammo.used, 0);
        assert_eq!(state.player.angle, PLAYER_SPAWN_ANGLE);

        // Keys pressed once play has started still count
        press(&mut game, Control::RotateLeft);
        game.step_frame(SIM_DT);
        assert!(game.state().player.angle < PLAYER_SPAWN_ANGLE);
    }

    #[test]
    fn test_controls_released_on_game_over() {
        let (mut game, _, _) = test_loop();
        press(&mut game, Control::Confirm);
        game.queue_input(InputEvent::Char('x'));
        press(&mut game, Control::Confirm);
        game.step_frame(SIM_DT);
        press(&mut game, Control::Thrust);
        game.step_frame(SIM_DT);
        assert!(game.held.thrust);

        // Leaving through the quit prompt
        press(&mut game, Control::Quit);
        game.step_frame(SIM_DT);
        assert_eq!(game.state().phase, GamePhase::ConfirmQuit);
        assert_eq!(game.held, InputState::default());

        press(&mut game, Control::No);
        game.step_frame(SIM_DT);
        assert_eq!(game.state().phase, GamePhase::Playing);
        press(&mut game, Control::Thrust);
        game.step_frame(SIM_DT);
        assert!(game.held.thrust);

        // Shot down mid-tick
        game.state_mut().player.hp = 5.0;
        let target = game.state().player.center();
        let mut shot = Bullet::enemy(Vec2::ZERO);
        shot.pos = target - Vec2::new(shot.size, shot.size / 4.0);
        game.state_mut().rocket_bullets.push(shot);
        game.step_frame(SIM_DT);
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert_eq!(game.held, InputState::default());
    }

    #[test]
    fn test_panicking_tick_does_not_stop_loop() {
        let reads = Arc::new(AtomicU32::new(0));
        let counter = reads.clone();
        let (game, _, _) = test_loop();
        let mut game = game.with_clock(Box::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                panic!("clock failure");
            }
            0
        }));
        press(&mut game, Control::Confirm);
        game.queue_input(InputEvent::Char('x'));
        press(&mut game, Control::Confirm);
        assert_eq!(game.step_frame(SIM_DT), 1);
        assert_eq!(game.state().phase, GamePhase::Playing);

        game.state_mut().player.speed = 100.0;
        let before = game.state().player.pos;
        // The second clock read panics mid-tick
        assert_eq!(game.step_frame(SIM_DT), 1);
        assert_eq!(game.state().player.pos, before);

        assert_eq!(game.step_frame(SIM_DT), 1);
        assert_ne!(game.state().player.pos, before);
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_quit_from_startup() {
        let (mut game, _, _) = test_loop();
        press(&mut game, Control::Quit);
        press(&mut game, Control::Yes);
        game.step_frame(SIM_DT);
        assert!(game.quit_requested());
    }

    #[test]
    fn test_sounds_reach_sink() {
        let (mut game, audio, _) = test_loop();
        game.state_mut().play(SoundEffect::Hit);
        game.dispatch_events();
        assert_eq!(audio.calls(), vec![AudioCall::Effect(SoundEffect::Hit)]);
    }

    #[test]
    fn test_thread_shutdown() {
        let (game, _, _) = test_loop();
        let slot: SnapshotSlot = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (tx, handle) = spawn_game_loop(game, slot.clone(), running.clone()).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        tx.send(LoopCommand::Shutdown).unwrap();
        assert_eq!(handle.join().unwrap(), LoopExit::Shutdown);
        assert!(!running.load(Ordering::Relaxed));
        assert!(slot.lock().unwrap().is_some());
    }

    #[test]
    fn test_thread_quit() {
        let (game, _, _) = test_loop();
        let slot: SnapshotSlot = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));
        let (tx, handle) = spawn_game_loop(game, slot, running).unwrap();

        tx.send(LoopCommand::Input(InputEvent::Press(Control::Quit))).unwrap();
        tx.send(LoopCommand::Input(InputEvent::Press(Control::Yes))).unwrap();
        assert_eq!(handle.join().unwrap(), LoopExit::Quit);
    }
}
