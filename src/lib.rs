//! Hulu Arena - Huluwa vs. monsters, with session recording and replay
//!
//! Core modules:
//! - `sim`: Match simulation (entity store, combat resolution, actors, frame tick)
//! - `persistence`: Keyframe line format and the session recorder
//! - `replay`: Keyframe loading and time-indexed interpolation
//! - `renderer`: Draw-call collaborator and scene painters
//! - `platform`: Input snapshots and recording storage
//! - `app`: Scene switching and the fixed-timestep driver
//! - `settings`: JSON settings file

pub mod app;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod replay;
pub mod settings;
pub mod sim;

pub use error::{ArenaError, Result};
pub use logging::init as init_logging;
pub use settings::Settings;

pub use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will simulate in one go
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions (screen space, y grows downward)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Player (Huluwa)
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_SPEED: f32 = 200.0;
    pub const PLAYER_FRICTION: f32 = 0.9;
    pub const PLAYER_START_HEALTH: i32 = 100;
    pub const MELEE_RANGE: f32 = 80.0;
    pub const MELEE_COOLDOWN: f32 = 0.1;
    pub const RANGED_COOLDOWN: f32 = 0.5;
    /// Health restored per kill
    pub const KILL_HEAL: i32 = 5;
    /// Kill rewards never heal past this
    pub const HEAL_CAP: i32 = 95;

    /// Monsters
    pub const MONSTER_SIZE: f32 = 25.0;
    pub const MONSTER_SPEED: f32 = 50.0;
    pub const MONSTER_FRICTION: f32 = 0.5;
    pub const MONSTER_ATTACK_RANGE: f32 = MELEE_RANGE * 0.9;
    pub const MONSTER_ATTACK_INTERVAL: f32 = 5.0;
    pub const MONSTER_DAMAGE: i32 = 10;

    /// Projectiles
    pub const PROJECTILE_SIZE: f32 = 10.0;
    pub const PROJECTILE_SPEED: f32 = 600.0;
    /// Distance in front of the player where a projectile appears
    pub const PROJECTILE_MUZZLE_OFFSET: f32 = 15.0;

    /// Spawn policy
    pub const SPAWN_INTERVAL: f32 = 2.0;
    pub const MAX_MONSTERS: usize = 15;
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Chance that a melee kill immediately spawns a replacement
    pub const REPLACEMENT_SPAWN_CHANCE: f64 = 0.5;

    /// Default recorder sampling interval (seconds)
    pub const RECORD_SAMPLE_INTERVAL: f32 = 0.05;
}

/// Unit vector pointing from `from` to `to` (zero when the points coincide)
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Linear interpolation that returns `a` exactly at `u = 0` and `b` exactly at `u = 1`
#[inline]
pub fn lerp_exact(a: Vec2, b: Vec2, u: f32) -> Vec2 {
    a * (1.0 - u) + b * u
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_unit_or_zero() {
        let d = direction(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert_eq!(direction(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_lerp_exact_endpoints() {
        let a = Vec2::new(0.1, 7.3);
        let b = Vec2::new(-3.7, 1.0e4);
        assert_eq!(lerp_exact(a, b, 0.0), a);
        assert_eq!(lerp_exact(a, b, 1.0), b);
        assert_eq!(lerp_exact(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5), Vec2::new(5.0, 0.0));
    }
}
