//! Game state and core simulation types
//!
//! Everything the tick mutates lives here. The simulation owns every entity
//! collection; nothing outside `sim` holds references into them.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Bullet, Effect, Player, Rocket};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::highscores::HighScore;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Startup,
    /// Typing a player name
    NameEntry,
    /// Active gameplay
    Playing,
    /// Player destroyed, scene frozen underneath the banner
    GameOver,
    /// Yes/no overlay over Startup or Playing
    ConfirmQuit,
}

/// Side effects requested by the simulation, drained by the game loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Sound(SoundEffect),
    MusicStart,
    MusicStop,
    /// A new record was set and should be persisted
    HighScoreChanged(HighScore),
    /// Quit confirmed from the title screen
    Quit,
}

/// Large-bullet magazine bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoState {
    pub used: u32,
    pub limit: u32,
    /// Wall-clock milliseconds of the last reload
    pub last_reload_ms: u64,
}

impl AmmoState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            used: 0,
            limit: LARGE_AMMO_LIMIT,
            last_reload_ms: now_ms,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.used >= self.limit
    }

    /// Take one round if any remain
    pub fn consume(&mut self) -> bool {
        if self.exhausted() {
            return false;
        }
        self.used += 1;
        true
    }

    /// Refill once the magazine is empty and the reload window has passed
    pub fn try_reload(&mut self, now_ms: u64) -> bool {
        if self.exhausted() && now_ms.saturating_sub(self.last_reload_ms) >= RELOAD_INTERVAL_MS {
            self.used = 0;
            self.last_reload_ms = now_ms;
            return true;
        }
        false
    }

    /// Whole seconds left before a reload, if the magazine is empty
    pub fn reload_remaining_secs(&self, now_ms: u64) -> Option<u64> {
        if !self.exhausted() {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.last_reload_ms);
        let secs = RELOAD_INTERVAL_MS.saturating_sub(elapsed) / 1000;
        (secs > 0).then_some(secs)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Playfield size
    pub width: f32,
    pub height: f32,
    pub phase: GamePhase,
    /// Where a ConfirmQuit overlay returns on "no"
    pub previous_phase: GamePhase,
    pub player: Player,
    /// Player bullets in firing order
    pub bullets: Vec<Bullet>,
    /// Enemy bullets in firing order
    pub rocket_bullets: Vec<Bullet>,
    /// Rockets in spawn order
    pub rockets: Vec<Rocket>,
    /// Visual effects, never collidable
    pub effects: Vec<Effect>,
    /// Rockets destroyed this session
    pub score: u32,
    /// Name of the current player
    pub player_name: String,
    /// Name being typed during NameEntry
    pub name_buffer: String,
    pub ammo: AmmoState,
    /// Best score on record
    pub high_score: HighScore,
    /// Seconds accumulated towards the next rocket
    pub spawn_timer: f32,
    /// Ticks into the current repeat-fire cycle
    pub shot_cooldown: u32,
    pub rng: Pcg32,
    /// Pending side effects, drained by the owner after each tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session on the title screen
    pub fn new(width: f32, height: f32, seed: u64, high_score: HighScore) -> Self {
        Self {
            width,
            height,
            phase: GamePhase::Startup,
            previous_phase: GamePhase::Startup,
            player: Player::spawn(width, height),
            bullets: Vec::new(),
            rocket_bullets: Vec::new(),
            rockets: Vec::new(),
            effects: Vec::new(),
            score: 0,
            player_name: String::new(),
            name_buffer: String::new(),
            ammo: AmmoState::new(0),
            high_score,
            spawn_timer: ROCKET_SPAWN_INTERVAL,
            shot_cooldown: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Reset counters and collections for a fresh game
    pub fn reset_session(&mut self, now_ms: u64) {
        self.player = Player::spawn(self.width, self.height);
        self.bullets.clear();
        self.rocket_bullets.clear();
        self.rockets.clear();
        self.effects.clear();
        self.score = 0;
        self.ammo = AmmoState::new(now_ms);
        self.spawn_timer = ROCKET_SPAWN_INTERVAL;
        self.shot_cooldown = 0;
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: SoundEffect) {
        self.events.push(GameEvent::Sound(sound));
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
