//! Hero Rocket - rocket vs. asteroids vs. boss UFO, drawn on a canvas overlay
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, boss state machine)
//! - `renderer`: Draw-list generation and the canvas 2D backend
//! - `session`: Fixed-timestep driver, input buffering, outcome reporting
//! - `platform`: Browser glue (listeners, animation frames, teardown)
//! - `audio`: Procedural sound cues
//! - `tuning`: Data-driven game balance
//! - `leaderboard`: Best-time board for the hosting page

pub mod audio;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::Leaderboard;
pub use session::{GameSession, OutcomeReporter};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Every duration is in simulation ticks (60 per second).
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Milliseconds per tick, used for the elapsed-time clock
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Player
    pub const PLAYER_LIVES: u8 = 3;
    pub const RESPAWN_DELAY_TICKS: u32 = 90;
    pub const INVINCIBILITY_TICKS: u32 = 120;
    /// Fraction of the pointer gap closed per tick
    pub const STEER_SMOOTHING: f32 = 0.12;
    pub const ROCKET_HIT_RADIUS: f32 = 12.0;
    /// Distance from rocket center to the nose (laser muzzle)
    pub const ROCKET_NOSE: f32 = 18.0;

    /// Lasers
    pub const LASER_SPEED: f32 = 16.0;
    pub const LASER_LIFE_TICKS: u32 = 60;
    pub const LASER_BOUNDS_MARGIN: f32 = 20.0;

    /// Asteroids
    pub const SPAWN_INTERVAL_TICKS: u32 = 70;
    /// Slower trickle while the boss is on screen
    pub const BOSS_SPAWN_INTERVAL_TICKS: u32 = 160;
    pub const ASTEROID_SPAWN_OFFSET: f32 = 40.0;
    pub const ASTEROID_DESPAWN_MARGIN: f32 = 100.0;
    pub const ASTEROID_MIN_RADIUS: f32 = 15.0;
    pub const ASTEROID_MAX_RADIUS: f32 = 40.0;
    /// Asteroids larger than this split in two when destroyed
    pub const SPLIT_RADIUS_THRESHOLD: f32 = 20.0;
    pub const SPLIT_CHILD_RATIO: f32 = 0.45;

    /// Boss
    pub const BOSS_THRESHOLD: u32 = 10;
    pub const BOSS_WARNING_TICKS: u32 = 180;
    pub const BOSS_HP: u32 = 50;
    /// Spawn height above the top edge
    pub const BOSS_SPAWN_Y: f32 = -80.0;
    /// Entry target as a fraction of canvas height
    pub const BOSS_ENTRY_HEIGHT: f32 = 0.22;
    pub const BOSS_ENTRY_EASE: f32 = 0.03;
    pub const BOSS_ENTRY_EPSILON: f32 = 1.0;
    /// Laser hit radius around the saucer center
    pub const BOSS_LASER_RADIUS: f32 = 50.0;
    /// Semi-axes of the saucer body for rocket contact
    pub const BOSS_BODY_RX: f32 = 70.0;
    pub const BOSS_BODY_RY: f32 = 34.0;
    pub const BOSS_PROJECTILE_HIT_RADIUS: f32 = 14.0;
    pub const BOSS_PROJECTILE_LIFE_TICKS: u32 = 240;
    pub const BOSS_PROJECTILE_MARGIN: f32 = 40.0;
    pub const PHASE_FLASH_TICKS: u32 = 40;

    /// Particles
    pub const PARTICLE_GRAVITY: f32 = 0.05;
    pub const PARTICLE_DAMPING: f32 = 0.97;
    /// Hard ceiling on live particles
    pub const MAX_PARTICLES: usize = 800;

    /// Screen shake
    pub const SHAKE_DECAY: f32 = 0.92;
    pub const SHAKE_CUTOFF: f32 = 0.1;
    pub const SHAKE_ROCKET_DEATH: f32 = 15.0;
    pub const SHAKE_TIER_CHANGE: f32 = 10.0;
    pub const SHAKE_BOSS_DEFEAT: f32 = 25.0;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Rotate `current` toward `target` by `factor` of the shortest signed gap
#[inline]
pub fn approach_angle(current: f32, target: f32, factor: f32) -> f32 {
    let delta = normalize_angle(target - current);
    normalize_angle(current + delta * factor)
}

/// Unit vector for an angle
#[inline]
pub fn heading(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_approach_angle_takes_short_way() {
        // From just below +π toward just above -π: should cross the seam, not sweep back
        let current = PI - 0.1;
        let target = -PI + 0.1;
        let next = approach_angle(current, target, 0.5);
        assert!(next > PI - 0.1 || next < -PI + 0.2);
        assert!((normalize_angle(next - current)).abs() < 0.15);
    }
}
