//! Read-only frame data
//!
//! The game loop captures a [`Snapshot`] after each frame's ticks; renderers
//! only ever see this copy, never the live `GameState`.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PLAYER_MAX_HP, PLAYER_SIZE, ROCKET_MAX_HP, ROCKET_SIZE};
use crate::highscores::HighScore;
use crate::sim::{BulletOwner, GamePhase, GameState, Rgba};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub center: Vec2,
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletView {
    pub center: Vec2,
    pub angle: f32,
    pub size: f32,
    pub owner: BulletOwner,
    pub color: Rgba,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocketView {
    pub pos: Vec2,
    pub center: Vec2,
    pub angle: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectView {
    /// Fragment positions with their sizes
    pub fragments: Vec<(Vec2, f32)>,
    pub color: Rgba,
    pub alpha: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    /// Phase underneath a ConfirmQuit overlay
    pub previous_phase: GamePhase,
    pub width: f32,
    pub height: f32,
    pub player: PlayerView,
    pub bullets: Vec<BulletView>,
    pub rocket_bullets: Vec<BulletView>,
    pub rockets: Vec<RocketView>,
    pub effects: Vec<EffectView>,
    pub score: u32,
    pub player_name: String,
    pub name_buffer: String,
    pub ammo_used: u32,
    pub ammo_limit: u32,
    /// Seconds until large ammo reloads, while exhausted
    pub reload_secs: Option<u64>,
    pub high_score: HighScore,
    /// Wall-clock `HH:MM:SS`
    pub clock: String,
}

impl Snapshot {
    pub fn capture(state: &GameState, now_ms: u64) -> Self {
        let player = &state.player;
        let bullet_view = |b: &crate::sim::Bullet| BulletView {
            center: b.center(),
            angle: b.angle,
            size: b.size,
            owner: b.owner,
            color: b.color,
        };

        Self {
            phase: state.phase,
            previous_phase: state.previous_phase,
            width: state.width,
            height: state.height,
            player: PlayerView {
                pos: player.pos,
                center: player.center(),
                angle: player.angle,
                hp: player.hp,
                max_hp: PLAYER_MAX_HP,
                alive: player.alive,
                size: PLAYER_SIZE,
            },
            bullets: state.bullets.iter().map(bullet_view).collect(),
            rocket_bullets: state.rocket_bullets.iter().map(bullet_view).collect(),
            rockets: state
                .rockets
                .iter()
                .map(|r| RocketView {
                    pos: r.pos,
                    center: r.center(),
                    angle: r.angle,
                    hp: r.hp,
                    max_hp: ROCKET_MAX_HP,
                    size: ROCKET_SIZE,
                })
                .collect(),
            effects: state
                .effects
                .iter()
                .map(|e| EffectView {
                    fragments: e.fragment_positions().collect(),
                    color: e.color,
                    alpha: e.alpha(),
                })
                .collect(),
            score: state.score,
            player_name: state.player_name.clone(),
            name_buffer: state.name_buffer.clone(),
            ammo_used: state.ammo.used,
            ammo_limit: state.ammo.limit,
            reload_secs: state.ammo.reload_remaining_secs(now_ms),
            high_score: state.high_score.clone(),
            clock: format_clock(now_ms),
        }
    }
}

/// Local `HH:MM:SS` for a Unix timestamp in milliseconds
pub fn format_clock(unix_ms: u64) -> String {
    format_clock_in(unix_ms, &Local)
}

pub fn format_clock_in<Tz: TimeZone>(unix_ms: u64, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    i64::try_from(unix_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
