//! Rocket Man - a single-player arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, state machine)
//! - `input`: Logical controls and the held-control snapshot
//! - `game_loop`: Fixed-rate scheduler that owns the simulation
//! - `render`: Read-only snapshots and the terminal presentation
//! - `highscores`, `audio`, `assets`, `settings`: collaborators at the edge

pub mod assets;
pub mod audio;
pub mod error;
pub mod game_loop;
pub mod highscores;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::AppError;
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed physics timestep (200 Hz)
    pub const SIM_DT: f32 = 1.0 / 200.0;
    /// Bullet/effect sub-steps per physics tick (~1000 Hz)
    pub const BULLET_SUBSTEPS: u32 = 5;
    /// Render/update frame budget (60 Hz)
    pub const FRAME_HZ: u32 = 60;
    /// Maximum physics ticks per frame; surplus time is dropped
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield dimensions
    pub const DEFAULT_WIDTH: f32 = 1366.0;
    pub const DEFAULT_HEIGHT: f32 = 768.0;

    /// Player craft
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const PLAYER_MAX_HP: f32 = 50.0;
    /// px/s
    pub const PLAYER_MAX_SPEED: f32 = 200.0;
    /// px/s² while thrusting
    pub const PLAYER_ACCEL: f32 = 400.0;
    /// px/s² while coasting
    pub const PLAYER_DECEL: f32 = 120.0;
    /// degrees/s
    pub const PLAYER_ROTATION_RATE: f32 = 100.0;
    /// Spawn offset from the bottom edge
    pub const PLAYER_SPAWN_BOTTOM: f32 = 75.0;
    pub const PLAYER_SPAWN_ANGLE: f32 = 270.0;

    /// Enemy rockets
    pub const ROCKET_SIZE: f32 = 50.0;
    pub const ROCKET_MAX_HP: f32 = 20.0;
    pub const ROCKET_SPEED: f32 = 60.0;
    pub const ROCKET_ANGLE: f32 = 90.0;
    /// Horizontal spawn margin
    pub const ROCKET_SPAWN_MARGIN: f32 = 25.0;
    /// Seconds between spawns
    pub const ROCKET_SPAWN_INTERVAL: f32 = 3.0;
    /// Per-tick chance that a rocket fires
    pub const ROCKET_FIRE_CHANCE: f64 = 0.01;
    /// Enemy bullet origin relative to the rocket's top-centre
    pub const ROCKET_FIRE_OFFSET: (f32, f32) = (-40.0, 20.0);

    /// Bullets (size doubles as player damage)
    pub const SMALL_BULLET_SIZE: f32 = 8.0;
    pub const LARGE_BULLET_SIZE: f32 = 25.0;
    pub const PLAYER_BULLET_SPEED: f32 = 3000.0;
    pub const ENEMY_BULLET_SIZE: f32 = 8.0;
    pub const ENEMY_BULLET_SPEED: f32 = 2000.0;
    pub const ENEMY_BULLET_DAMAGE: f32 = 10.0;

    /// Physics ticks between repeat shots while a trigger is held
    pub const SHOT_INTERVAL_TICKS: u32 = 15;

    /// Large-bullet magazine
    pub const LARGE_AMMO_LIMIT: u32 = 10;
    pub const RELOAD_INTERVAL_MS: u64 = 10_000;

    /// Full heal every N rockets destroyed
    pub const HEAL_EVERY_KILLS: u32 = 10;

    /// Longest accepted player name
    pub const NAME_MAX_LEN: usize = 15;
}

/// Wrap an angle in degrees into [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit direction for an angle in degrees (screen space, y grows downward)
#[inline]
pub fn heading(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}
