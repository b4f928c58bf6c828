//! Moving entities: the player craft, bullets, rockets and effects
//!
//! Positions are top-left corners in screen space (y grows downward) and
//! angles are degrees, clockwise on screen. Collidable outlines are rotated
//! about the entity centre.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::consts::*;
use crate::{heading, normalize_degrees};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub const SMALL_BULLET_COLOR: Rgba = Rgba::rgb(169, 169, 169);
pub const LARGE_BULLET_COLOR: Rgba = Rgba::rgb(184, 115, 51);
pub const ENEMY_BULLET_COLOR: Rgba = Rgba::rgb(255, 0, 0);

/// Player hull in local space (64x64 box, nose along +x)
const PLAYER_HULL: [Vec2; 5] = [
    Vec2::new(64.0, 32.0),
    Vec2::new(40.0, 14.0),
    Vec2::new(6.0, 10.0),
    Vec2::new(6.0, 54.0),
    Vec2::new(40.0, 50.0),
];

/// Rocket hull in local space (50x50 box, nose along +x)
const ROCKET_HULL: [Vec2; 5] = [
    Vec2::new(50.0, 25.0),
    Vec2::new(36.0, 13.0),
    Vec2::new(4.0, 15.0),
    Vec2::new(4.0, 35.0),
    Vec2::new(36.0, 37.0),
];

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Facing, degrees in [0, 360)
    pub angle: f32,
    pub hp: f32,
    pub alive: bool,
    /// Current speed along the facing (px/s)
    pub speed: f32,
}

impl Player {
    /// Fresh craft near the bottom centre of the playfield, facing up
    pub fn spawn(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(width / 2.0, height - PLAYER_SPAWN_BOTTOM),
            angle: PLAYER_SPAWN_ANGLE,
            hp: PLAYER_MAX_HP,
            alive: true,
            speed: 0.0,
        }
    }

    /// Turn by `degrees` (positive is clockwise on screen)
    pub fn rotate(&mut self, degrees: f32) {
        self.angle = normalize_degrees(self.angle + degrees);
    }

    pub fn speed_up(&mut self, dt: f32) {
        self.speed = (self.speed + PLAYER_ACCEL * dt).min(PLAYER_MAX_SPEED);
    }

    pub fn speed_down(&mut self, dt: f32) {
        self.speed = (self.speed - PLAYER_DECEL * dt).max(0.0);
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += heading(self.angle) * self.speed * dt;
    }

    /// Keep the whole craft inside the playfield
    pub fn clamp_to(&mut self, width: f32, height: f32) {
        let max_x = (width - PLAYER_SIZE).max(0.0);
        let max_y = (height - PLAYER_SIZE).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
        self.pos.y = self.pos.y.clamp(0.0, max_y);
    }

    /// Subtract health; returns whether the craft survived
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.hp = (self.hp - amount).max(0.0);
        if self.hp <= 0.0 {
            self.alive = false;
        }
        self.alive
    }

    pub fn restore_hp(&mut self) {
        self.hp = PLAYER_MAX_HP;
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PLAYER_SIZE / 2.0)
    }

    pub fn shape(&self) -> Shape {
        Shape::placed(&PLAYER_HULL, self.pos, Vec2::splat(PLAYER_SIZE / 2.0), self.angle)
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Rocket,
}

/// Straight-line projectile. Angle and size never change after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub angle: f32,
    pub size: f32,
    /// px/s
    pub speed: f32,
    pub owner: BulletOwner,
    pub color: Rgba,
}

impl Bullet {
    /// Create a bullet centred on an emitter whose top-left is `origin`
    pub fn new(origin: Vec2, angle: f32, size: f32, speed: f32, owner: BulletOwner, color: Rgba) -> Self {
        let centering = PLAYER_SIZE / 2.0 - size / 2.0;
        Self {
            pos: origin + Vec2::splat(centering),
            angle,
            size,
            speed,
            owner,
            color,
        }
    }

    pub fn small(origin: Vec2, angle: f32) -> Self {
        Self::new(origin, angle, SMALL_BULLET_SIZE, PLAYER_BULLET_SPEED, BulletOwner::Player, SMALL_BULLET_COLOR)
    }

    pub fn large(origin: Vec2, angle: f32) -> Self {
        Self::new(origin, angle, LARGE_BULLET_SIZE, PLAYER_BULLET_SPEED, BulletOwner::Player, LARGE_BULLET_COLOR)
    }

    pub fn enemy(origin: Vec2) -> Self {
        Self::new(origin, ROCKET_ANGLE, ENEMY_BULLET_SIZE, ENEMY_BULLET_SPEED, BulletOwner::Rocket, ENEMY_BULLET_COLOR)
    }

    /// Damage dealt on impact
    pub fn damage(&self) -> f32 {
        match self.owner {
            BulletOwner::Player => self.size,
            BulletOwner::Rocket => ENEMY_BULLET_DAMAGE,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += heading(self.angle) * self.speed * dt;
    }

    /// False once the bullet leaves the playfield. `pos` is the top-left
    /// corner, so the left and top edges allow `size` of overhang while the
    /// right and bottom edges cull as soon as `pos` crosses them.
    pub fn check(&self, width: f32, height: f32) -> bool {
        in_play(self.pos, self.size, width, height)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.size, self.size / 4.0)
    }

    pub fn shape(&self) -> Shape {
        let outline = Shape::rect_outline(self.size * 2.0, self.size / 2.0);
        Shape::placed(&outline, self.pos, Vec2::new(self.size, self.size / 4.0), self.angle)
    }
}

/// Enemy rocket descending from the top edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub pos: Vec2,
    pub angle: f32,
    pub hp: f32,
    pub speed: f32,
}

impl Rocket {
    pub fn spawn(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, 0.0),
            angle: ROCKET_ANGLE,
            hp: ROCKET_MAX_HP,
            speed: ROCKET_SPEED,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += heading(self.angle) * self.speed * dt;
    }

    pub fn check(&self, width: f32, height: f32) -> bool {
        in_play(self.pos, ROCKET_SIZE, width, height)
    }

    /// Subtract health; returns whether the rocket survived
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.hp -= amount;
        self.hp > 0.0
    }

    /// Emitter origin for an enemy bullet
    pub fn fire_origin(&self) -> Vec2 {
        let (dx, dy) = ROCKET_FIRE_OFFSET;
        Vec2::new(self.pos.x + ROCKET_SIZE / 2.0 + dx, self.pos.y + dy)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(ROCKET_SIZE / 2.0)
    }

    pub fn shape(&self) -> Shape {
        Shape::placed(&ROCKET_HULL, self.pos, Vec2::splat(ROCKET_SIZE / 2.0), self.angle)
    }
}

/// `margin` only applies past the left and top edges
fn in_play(pos: Vec2, margin: f32, width: f32, height: f32) -> bool {
    !(pos.x < -margin || pos.y < -margin || pos.x > width || pos.y > height)
}

/// One radiating fragment of an effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fragment {
    /// Heading in degrees
    pub angle: f32,
    pub size: f32,
}

/// A non-colliding expanding burst of fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    /// Burst centre
    pub pos: Vec2,
    pub fragments: Vec<Fragment>,
    pub radius: f32,
    pub max_radius: f32,
    /// Radius growth in px/s
    pub rate: f32,
    pub color: Rgba,
    /// Remaining lifetime in update steps
    pub ttl_ticks: u32,
}

impl Effect {
    /// Build a burst of `count` fragments, each with a random heading inside
    /// its angular slot and a random size in [1, max_size].
    ///
    /// `step_dt` is the interval at which [`Effect::update`] will be called;
    /// the lifetime is sized so it expires as the radius reaches its maximum.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng>(
        rng: &mut R,
        center: Vec2,
        count: u32,
        max_size: f32,
        max_radius: f32,
        rate: f32,
        color: Rgba,
        step_dt: f32,
    ) -> Self {
        let count = count.max(1);
        let slot = 360.0 / count as f32;
        let fragments = (0..count)
            .map(|i| Fragment {
                angle: i as f32 * slot + rng.random_range(0.0..slot),
                size: rng.random_range(1.0..=max_size.max(1.0)),
            })
            .collect();

        let per_step = (rate * step_dt).max(f32::EPSILON);
        let ttl_ticks = (max_radius / per_step).ceil().max(1.0) as u32;

        Self {
            pos: center,
            fragments,
            radius: 0.0,
            max_radius,
            rate,
            color,
            ttl_ticks,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.radius = (self.radius + self.rate * dt).min(self.max_radius);
        self.ttl_ticks = self.ttl_ticks.saturating_sub(1);
    }

    /// Still alive
    pub fn check(&self) -> bool {
        self.ttl_ticks > 0
    }

    /// Opacity in [0, 1], fading as the burst expands
    pub fn alpha(&self) -> f32 {
        let base = self.color.a as f32 / 255.0;
        if self.max_radius <= 0.0 {
            return 0.0;
        }
        base * (1.0 - self.radius / self.max_radius).clamp(0.0, 1.0)
    }

    /// World position of each fragment with its size
    pub fn fragment_positions(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.fragments
            .iter()
            .map(|f| (self.pos + heading(f.angle) * self.radius, f.size))
    }
}
