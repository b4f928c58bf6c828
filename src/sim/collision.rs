//! Collision and damage resolution
//!
//! Three passes, each iterating in insertion order. Entities hit during a pass
//! are marked and compacted out at the end of it, so nothing is skipped or
//! processed twice. First match wins: a bullet is spent on the first rocket
//! it overlaps.

use super::effects;
use super::menu;
use super::shape::Shape;
use super::state::GameState;
use crate::audio::SoundEffect;
use crate::consts::HEAL_EVERY_KILLS;

/// Player bullets against rockets
pub fn resolve_player_bullets(state: &mut GameState) {
    if state.bullets.is_empty() || state.rockets.is_empty() {
        return;
    }

    let rocket_shapes: Vec<Shape> = state.rockets.iter().map(|r| r.shape()).collect();
    let mut spent = vec![false; state.bullets.len()];
    let mut destroyed = vec![false; state.rockets.len()];

    for bi in 0..state.bullets.len() {
        let bullet_shape = state.bullets[bi].shape();
        let Some(ri) = (0..rocket_shapes.len())
            .find(|&ri| !destroyed[ri] && bullet_shape.intersects(&rocket_shapes[ri]))
        else {
            continue;
        };

        spent[bi] = true;
        let spark = effects::hit_spark(&mut state.rng, state.bullets[bi].center());
        state.effects.push(spark);

        let damage = state.bullets[bi].damage();
        if state.rockets[ri].apply_damage(damage) {
            state.play(SoundEffect::Hit);
            continue;
        }

        destroyed[ri] = true;
        state.score += 1;
        if state.score % HEAL_EVERY_KILLS == 0 && state.player.alive {
            state.player.restore_hp();
            state.play(SoundEffect::Hit);
        }
        state.play(SoundEffect::Destroy);
        let burst = effects::rocket_burst(&mut state.rng, state.rockets[ri].center());
        state.effects.extend(burst);
    }

    compact(&mut state.bullets, &spent);
    compact(&mut state.rockets, &destroyed);
}

/// Enemy bullets against the player
pub fn resolve_rocket_bullets(state: &mut GameState) {
    if !state.player.alive || state.rocket_bullets.is_empty() {
        return;
    }

    let player_shape = state.player.shape();
    let mut spent = vec![false; state.rocket_bullets.len()];

    for bi in 0..state.rocket_bullets.len() {
        if !state.player.alive {
            break;
        }
        if !state.rocket_bullets[bi].shape().intersects(&player_shape) {
            continue;
        }
        spent[bi] = true;
        let damage = state.rocket_bullets[bi].damage();
        if state.player.apply_damage(damage) {
            state.play(SoundEffect::Hit);
        } else {
            player_destroyed(state);
        }
    }

    compact(&mut state.rocket_bullets, &spent);
}

/// Rockets ramming the player. Both sides take the other's health as damage,
/// using values read before either is changed.
pub fn resolve_body_collisions(state: &mut GameState) {
    if !state.player.alive || state.rockets.is_empty() {
        return;
    }

    let player_shape = state.player.shape();
    let mut destroyed = vec![false; state.rockets.len()];

    for ri in 0..state.rockets.len() {
        if !state.player.alive {
            break;
        }
        if !state.rockets[ri].shape().intersects(&player_shape) {
            continue;
        }

        let rocket_hp = state.rockets[ri].hp;
        let player_hp = state.player.hp;

        if !state.rockets[ri].apply_damage(player_hp) {
            destroyed[ri] = true;
            state.play(SoundEffect::Destroy);
            let burst = effects::ship_burst(&mut state.rng, state.rockets[ri].center());
            state.effects.extend(burst);
        }
        if !state.player.apply_damage(rocket_hp) {
            player_destroyed(state);
        }
    }

    compact(&mut state.rockets, &destroyed);
}

fn player_destroyed(state: &mut GameState) {
    state.player.alive = false;
    state.play(SoundEffect::Destroy);
    let burst = effects::ship_burst(&mut state.rng, state.player.center());
    state.effects.extend(burst);
    menu::enter_game_over(state);
}

/// Drop every item whose mark is set, preserving order
fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !removed.get(idx).copied().unwrap_or(false);
        idx += 1;
        keep
    });
}
