//! Effect burst recipes spawned by collisions

use glam::Vec2;
use rand::Rng;

use super::entity::{Effect, Rgba};
use crate::consts::*;

const AMBER: Rgba = Rgba::rgb(230, 207, 105);
const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const ORANGE: Rgba = Rgba::rgb(255, 150, 0);
const TEAL: Rgba = Rgba::rgb(32, 178, 169);
const TEAL_FAINT: Rgba = Rgba::rgba(32, 178, 169, 150);
const RED: Rgba = Rgba::rgb(255, 70, 70);
const GREY: Rgba = Rgba::rgb(100, 100, 100);
const SMOKE: Rgba = Rgba::rgba(50, 50, 50, 100);

/// Number of effects in a ship burst
pub const SHIP_BURST_LEN: usize = 5;
/// Number of effects when a bullet destroys a rocket
pub const ROCKET_BURST_LEN: usize = 17;

/// Effects advance once per bullet sub-step
pub fn effect_step_dt() -> f32 {
    SIM_DT / BULLET_SUBSTEPS as f32
}

fn effect<R: Rng>(rng: &mut R, at: Vec2, count: u32, max_size: f32, max_radius: f32, rate: f32, color: Rgba) -> Effect {
    Effect::new(rng, at, count, max_size, max_radius, rate, color, effect_step_dt())
}

/// Small spark where a player bullet struck
pub fn hit_spark<R: Rng>(rng: &mut R, at: Vec2) -> Effect {
    effect(rng, at, 3, 5.0, 60.0, 500.0, AMBER)
}

/// Full explosion for a rocket shot down
pub fn rocket_burst<R: Rng>(rng: &mut R, at: Vec2) -> Vec<Effect> {
    let mut out = Vec::with_capacity(ROCKET_BURST_LEN);
    out.push(effect(rng, at, 15, 20.0, 30.0, 1000.0, WHITE));
    out.push(effect(rng, at, 10, 15.0, 40.0, 800.0, ORANGE));
    out.push(effect(rng, at, 20, 5.0, 50.0, 300.0, TEAL_FAINT));
    for j in 0..8 {
        let rate = rng.random_range(2000.0..3000.0);
        out.push(effect(rng, at, 2, 3.0, 20.0 + j as f32 * 5.0, rate, RED));
    }
    for j in 0..5 {
        let rate = rng.random_range(500.0..1000.0);
        out.push(effect(rng, at, 5, 5.0, 60.0 + j as f32 * 10.0, rate, GREY));
    }
    out.push(effect(rng, at, 20, 10.0, 100.0, 100.0, SMOKE));
    out
}

/// Slower burst for the player's craft, or a rocket rammed by it
pub fn ship_burst<R: Rng>(rng: &mut R, at: Vec2) -> Vec<Effect> {
    vec![
        effect(rng, at, 5, 5.0, 75.0, 50.0, TEAL),
        effect(rng, at, 5, 5.0, 75.0, 100.0, TEAL),
        effect(rng, at, 10, 10.0, 100.0, 300.0, AMBER),
        effect(rng, at, 10, 5.0, 100.0, 500.0, RED),
        effect(rng, at, 10, 5.0, 150.0, 200.0, WHITE),
    ]
}
