//! Fixed timestep simulation tick
//!
//! Advances the session by one physics step. Menu input is applied first, then
//! the world moves only while Playing (rockets keep drifting under GameOver).

use rand::Rng;

use super::collision;
use super::effects::effect_step_dt;
use super::entity::{Bullet, Rocket};
use super::menu;
use super::state::{GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::{InputEvent, InputState};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Controls held during this tick
    pub held: InputState,
    /// Discrete events received since the previous tick, in arrival order
    pub events: Vec<InputEvent>,
    /// Wall-clock milliseconds, used only by the ammo reload timer
    pub now_ms: u64,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    for event in &input.events {
        menu::handle_event(state, *event, input.now_ms);
    }

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::GameOver => {
            drift_rockets(state, dt);
            return;
        }
        _ => return,
    }

    if state.player.alive {
        update_player(state, &input.held, dt);
        state.ammo.try_reload(input.now_ms);
    }

    spawn_rockets(state, dt);
    update_rockets(state, dt);
    collision::resolve_body_collisions(state);

    let sub_dt = dt / BULLET_SUBSTEPS as f32;
    for _ in 0..BULLET_SUBSTEPS {
        if state.phase != GamePhase::Playing {
            break;
        }
        update_bullets(state, sub_dt);
    }
}

fn update_player(state: &mut GameState, held: &InputState, dt: f32) {
    let turn = PLAYER_ROTATION_RATE * dt;
    if held.rotate_left {
        state.player.rotate(-turn);
    }
    if held.rotate_right {
        state.player.rotate(turn);
    }

    fire(state, held);

    if held.thrust {
        state.player.speed_up(dt);
    } else {
        state.player.speed_down(dt);
    }
    state.player.update(dt);
    state.player.clamp_to(state.width, state.height);
}

/// One shot per cooldown cycle while a trigger is held; small fire wins when
/// both are down
fn fire(state: &mut GameState, held: &InputState) {
    if !held.any_fire() {
        state.shot_cooldown = 0;
        return;
    }

    if state.shot_cooldown == 0 {
        let origin = state.player.pos;
        let angle = state.player.angle;
        if held.fire_small {
            state.bullets.push(Bullet::small(origin, angle));
            state.play(SoundEffect::Shoot);
        } else if held.fire_large && state.ammo.consume() {
            state.bullets.push(Bullet::large(origin, angle));
            state.play(SoundEffect::BigBullet);
        }
    }
    state.shot_cooldown = (state.shot_cooldown + 1) % SHOT_INTERVAL_TICKS;
}

fn spawn_rockets(state: &mut GameState, dt: f32) {
    state.spawn_timer += dt;
    while state.spawn_timer >= ROCKET_SPAWN_INTERVAL {
        state.spawn_timer -= ROCKET_SPAWN_INTERVAL;
        let hi = (state.width - ROCKET_SPAWN_MARGIN).max(ROCKET_SPAWN_MARGIN + 1.0);
        let x = state.rng.random_range(ROCKET_SPAWN_MARGIN..hi);
        state.rockets.push(Rocket::spawn(x));
        log::debug!("Rocket spawned at x={x:.0}");
    }
}

fn update_rockets(state: &mut GameState, dt: f32) {
    for i in 0..state.rockets.len() {
        state.rockets[i].update(dt);
        if state.rng.random_bool(ROCKET_FIRE_CHANCE) {
            let origin = state.rockets[i].fire_origin();
            state.rocket_bullets.push(Bullet::enemy(origin));
            state.play(SoundEffect::Shoot);
        }
    }
    let (w, h) = (state.width, state.height);
    state.rockets.retain(|r| r.check(w, h));
}

fn drift_rockets(state: &mut GameState, dt: f32) {
    let (w, h) = (state.width, state.height);
    for rocket in state.rockets.iter_mut() {
        rocket.update(dt);
    }
    state.rockets.retain(|r| r.check(w, h));
}

/// One fine step: move bullets, resolve hits, cull, then age effects
fn update_bullets(state: &mut GameState, dt: f32) {
    for bullet in state.bullets.iter_mut() {
        bullet.update(dt);
    }
    for bullet in state.rocket_bullets.iter_mut() {
        bullet.update(dt);
    }

    collision::resolve_player_bullets(state);
    collision::resolve_rocket_bullets(state);

    let (w, h) = (state.width, state.height);
    state.bullets.retain(|b| b.check(w, h));
    state.rocket_bullets.retain(|b| b.check(w, h));

    let effect_dt = effect_step_dt();
    for effect in state.effects.iter_mut() {
        effect.update(effect_dt);
    }
    state.effects.retain(|e| e.check());
}
