//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Insertion-order iteration over every entity collection
//! - No I/O; side effects leave as `GameEvent`s

pub mod collision;
pub mod effects;
pub mod entity;
pub mod menu;
pub mod shape;
pub mod state;
pub mod tick;

pub use entity::{Bullet, BulletOwner, Effect, Player, Rgba, Rocket};
pub use shape::Shape;
pub use state::{AmmoState, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
