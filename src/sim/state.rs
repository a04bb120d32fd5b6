//! Game state and core simulation types
//!
//! One `GameState` is one session: constructed on mount or restart, dropped on
//! teardown. Nothing here is shared between sessions.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::shape::jagged_polygon;
use crate::consts::*;
use crate::heading;
use crate::tuning::Tuning;

/// Encounter phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Asteroids only
    Normal,
    /// Boss threshold reached, countdown running
    Warning,
    /// Boss on screen
    Boss,
}

/// The player's ship
#[derive(Debug, Clone, Serialize)]
pub struct Rocket {
    pub pos: Vec2,
    /// Facing angle (radians, (-π, π])
    pub angle: f32,
    /// Ticks of post-respawn invincibility remaining
    pub invincible: u32,
    pub alive: bool,
    /// Ticks until respawn while dead
    pub respawn_timer: u32,
}

impl Rocket {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: -std::f32::consts::FRAC_PI_2,
            invincible: 0,
            alive: true,
            respawn_timer: 0,
        }
    }

    /// Alive and past the invincibility window
    #[inline]
    pub fn collidable(&self) -> bool {
        self.alive && self.invincible == 0
    }

    /// Laser muzzle position
    #[inline]
    pub fn nose(&self) -> Vec2 {
        self.pos + heading(self.angle) * ROCKET_NOSE
    }
}

/// A laser bolt
#[derive(Debug, Clone, Serialize)]
pub struct Laser {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
}

/// A rock
#[derive(Debug, Clone, Serialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub rot_speed: f32,
    /// Outline in local space, fixed for the asteroid's lifetime
    pub shape: Vec<Vec2>,
    pub hp: u32,
    pub max_hp: u32,
    /// Selects the crack pattern family (0..4)
    pub crack_seed: u8,
}

impl Asteroid {
    pub fn new<R: Rng>(id: u32, pos: Vec2, vel: Vec2, radius: f32, hp: u32, rng: &mut R) -> Self {
        let points = rng.random_range(5..9);
        Self {
            id,
            pos,
            vel,
            radius,
            rotation: rng.random_range(0.0..TAU),
            rot_speed: rng.random_range(-0.015..0.015),
            shape: jagged_polygon(radius, points, rng),
            hp,
            max_hp: hp,
            crack_seed: rng.random_range(0..4),
        }
    }

    /// Hit points for a freshly spawned rock of this size
    pub fn hp_for_radius(radius: f32) -> u32 {
        if radius > 28.0 {
            3
        } else if radius > 20.0 {
            2
        } else {
            1
        }
    }

    /// 0 when untouched, 1 when about to break
    pub fn damage(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        1.0 - self.hp as f32 / self.max_hp as f32
    }
}

/// Particle look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParticleKind {
    Ember,
    RockShard,
    Smoke,
}

/// A cosmetic particle
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub kind: ParticleKind,
    /// Palette index for the renderer
    pub color: u8,
    pub rotation: f32,
    pub spin: f32,
}

/// Boss lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossLifecycle {
    /// Descending to its entry point, not firing
    Enter,
    /// Moving and firing
    Fight,
}

/// The boss saucer
#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub pos: Vec2,
    /// Entry point; also the anchor of the fight trajectory
    pub target: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    pub lifecycle: BossLifecycle,
    /// Escalation tier 1..=3
    pub tier: u8,
    pub move_t: u32,
    pub fire_timer: u32,
    pub bob_t: u32,
    pub light_t: u32,
    /// Ticks of tier-change flash remaining
    pub phase_flash: u32,
    pub hazard_timer: u32,
    /// Ticks of white hit flash remaining
    pub hit_flash: u32,
}

impl Boss {
    pub fn new(bounds: Vec2, max_hp: u32) -> Self {
        Self {
            pos: Vec2::new(bounds.x / 2.0, BOSS_SPAWN_Y),
            target: Vec2::new(bounds.x / 2.0, bounds.y * BOSS_ENTRY_HEIGHT),
            hp: max_hp,
            max_hp,
            lifecycle: BossLifecycle::Enter,
            tier: 1,
            move_t: 0,
            fire_timer: 0,
            bob_t: 0,
            light_t: 0,
            phase_flash: 0,
            hazard_timer: 0,
            hit_flash: 0,
        }
    }

    #[inline]
    pub fn health_fraction(&self) -> f32 {
        self.hp as f32 / self.max_hp.max(1) as f32
    }
}

/// A shot fired by the boss
#[derive(Debug, Clone, Serialize)]
pub struct BossProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
}

/// Per-session combat counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub shots_fired: u32,
    /// Asteroid and boss hits
    pub hits: u32,
    pub asteroids_destroyed: u32,
    pub boss_hits: u32,
    pub damage_taken: u32,
}

impl Analytics {
    /// Fraction of shots that hit something scoring
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// Camera shake impulse
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScreenShake {
    pub offset: Vec2,
    pub intensity: f32,
}

impl ScreenShake {
    /// Start or strengthen a shake
    pub fn kick(&mut self, intensity: f32) {
        self.intensity = self.intensity.max(intensity);
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub seed: u64,
    /// Canvas size in pixels
    pub bounds: Vec2,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub rocket: Rocket,
    pub lasers: Vec<Laser>,
    pub asteroids: Vec<Asteroid>,
    pub particles: Vec<Particle>,
    pub boss: Option<Boss>,
    pub boss_projectiles: Vec<BossProjectile>,
    /// Kill count
    pub score: u32,
    pub lives: u8,
    /// Total ticks simulated
    pub time_ticks: u64,
    /// Ticks counted by the session clock; frozen once terminal
    pub elapsed_ticks: u64,
    pub game_over: bool,
    pub boss_defeated: bool,
    /// Set once the boss has entered this session
    pub boss_appeared: bool,
    /// Warning countdown (ticks)
    pub boss_warning: u32,
    pub spawn_timer: u32,
    pub analytics: Analytics,
    pub shake: ScreenShake,
    /// Last pointer sample the rocket steers toward
    pub pointer: Vec2,
    /// Cosmetic particle cap
    pub max_particles: usize,
    /// Gameplay randomness (spawns, shapes, split angles)
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    /// Cosmetic randomness (particles, shake jitter)
    #[serde(skip)]
    pub(crate) fx_rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Fresh session with default balance
    pub fn new(seed: u64, bounds: Vec2) -> Self {
        Self::with_tuning(seed, bounds, Tuning::default())
    }

    /// Fresh session with custom balance
    pub fn with_tuning(seed: u64, bounds: Vec2, tuning: Tuning) -> Self {
        let start = Self::rocket_start(bounds);
        Self {
            seed,
            bounds,
            phase: GamePhase::Normal,
            rocket: Rocket::new(start),
            lasers: Vec::new(),
            asteroids: Vec::new(),
            particles: Vec::new(),
            boss: None,
            boss_projectiles: Vec::new(),
            score: 0,
            lives: tuning.lives,
            time_ticks: 0,
            elapsed_ticks: 0,
            game_over: false,
            boss_defeated: false,
            boss_appeared: false,
            boss_warning: 0,
            spawn_timer: 0,
            analytics: Analytics::default(),
            shake: ScreenShake::default(),
            pointer: start,
            max_particles: MAX_PARTICLES,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            next_id: 1,
            tuning,
        }
    }

    /// Respawn point: horizontally centered, low on the canvas
    pub fn rocket_start(bounds: Vec2) -> Vec2 {
        Vec2::new(bounds.x / 2.0, bounds.y * 0.75)
    }

    /// Canvas was resized
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        if let Some(boss) = &mut self.boss {
            boss.target = Vec2::new(bounds.x / 2.0, bounds.y * BOSS_ENTRY_HEIGHT);
        }
    }

    /// Game over or boss defeated
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.game_over || self.boss_defeated
    }

    /// Session clock in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        (self.elapsed_ticks as f64 * TICK_MS).round() as u64
    }

    /// Kills left before the boss warning, None once the boss has appeared
    pub fn kills_until_boss(&self) -> Option<u32> {
        if self.boss_appeared || self.boss_defeated {
            None
        } else {
            Some(self.tuning.boss_threshold.saturating_sub(self.score))
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one asteroid just outside a random edge, drifting inward
    pub fn spawn_asteroid_at_edge(&mut self) {
        let (w, h) = (self.bounds.x, self.bounds.y);
        let rng = &mut self.rng;
        let edge = rng.random_range(0..4);
        let speed = rng.random_range(0.5..2.0);
        let drift = rng.random_range(-1.0..1.0);
        let (pos, vel) = match edge {
            0 => (
                Vec2::new(rng.random_range(0.0..w.max(1.0)), -ASTEROID_SPAWN_OFFSET),
                Vec2::new(drift, speed),
            ),
            1 => (
                Vec2::new(w + ASTEROID_SPAWN_OFFSET, rng.random_range(0.0..h.max(1.0))),
                Vec2::new(-speed, drift),
            ),
            2 => (
                Vec2::new(rng.random_range(0.0..w.max(1.0)), h + ASTEROID_SPAWN_OFFSET),
                Vec2::new(drift, -speed),
            ),
            _ => (
                Vec2::new(-ASTEROID_SPAWN_OFFSET, rng.random_range(0.0..h.max(1.0))),
                Vec2::new(speed, drift),
            ),
        };
        let radius = rng.random_range(ASTEROID_MIN_RADIUS..ASTEROID_MAX_RADIUS);
        let hp = Asteroid::hp_for_radius(radius);
        let id = self.next_entity_id();
        let asteroid = Asteroid::new(id, pos, vel, radius, hp, &mut self.rng);
        self.asteroids.push(asteroid);
    }

    /// Small one-hit rock dropped by the boss
    pub fn spawn_hazard(&mut self, pos: Vec2) {
        let angle = self.rng.random_range(0.3..(std::f32::consts::PI - 0.3));
        let speed = self.rng.random_range(1.2..2.2);
        let radius = self.rng.random_range(10.0..16.0);
        let id = self.next_entity_id();
        let asteroid = Asteroid::new(id, pos, heading(angle) * speed, radius, 1, &mut self.rng);
        self.asteroids.push(asteroid);
    }

    /// Radial burst of embers, shards and smoke
    pub fn spawn_explosion(&mut self, pos: Vec2, count: usize, scale: f32) {
        for p in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let fx = &mut self.fx_rng;
            let angle = p as f32 / count as f32 * TAU + fx.random_range(0.0..0.5);
            let roll: f32 = fx.random();
            let kind = if roll < 0.5 {
                ParticleKind::Ember
            } else if roll < 0.8 {
                ParticleKind::RockShard
            } else {
                ParticleKind::Smoke
            };
            let (speed, size) = match kind {
                ParticleKind::Smoke => (
                    0.5 + fx.random_range(0.0..2.0) * scale,
                    (4.0 + fx.random_range(0.0..6.0)) * scale,
                ),
                _ => (
                    1.0 + fx.random_range(0.0..7.0) * scale,
                    (1.0 + fx.random_range(0.0..5.0)) * scale,
                ),
            };
            let life = fx.random_range(25.0..60.0);
            self.particles.push(Particle {
                pos,
                vel: heading(angle) * speed,
                life,
                max_life: life,
                size,
                kind,
                color: fx.random_range(0..6),
                rotation: fx.random_range(0.0..TAU),
                spin: fx.random_range(-0.2..0.2),
            });
        }
    }

    /// A few shards at an impact point
    pub fn spawn_sparks(&mut self, pos: Vec2, count: usize, kind: ParticleKind) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let fx = &mut self.fx_rng;
            let angle = fx.random_range(0.0..TAU);
            let speed = fx.random_range(1.0..4.0);
            let life = fx.random_range(12.0..24.0);
            self.particles.push(Particle {
                pos,
                vel: heading(angle) * speed,
                life,
                max_life: life,
                size: fx.random_range(1.0..3.0),
                kind,
                color: fx.random_range(0..6),
                rotation: fx.random_range(0.0..TAU),
                spin: fx.random_range(-0.3..0.3),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(1, Vec2::new(800.0, 600.0));
        assert_eq!(state.lives, PLAYER_LIVES);
        assert_eq!(state.phase, GamePhase::Normal);
        assert!(state.boss.is_none());
        assert!(state.rocket.collidable());
        assert_eq!(state.rocket.pos, Vec2::new(400.0, 450.0));
        assert_eq!(state.kills_until_boss(), Some(BOSS_THRESHOLD));
    }

    #[test]
    fn test_asteroid_hp_by_radius() {
        assert_eq!(Asteroid::hp_for_radius(35.0), 3);
        assert_eq!(Asteroid::hp_for_radius(25.0), 2);
        assert_eq!(Asteroid::hp_for_radius(20.0), 1);
    }

    #[test]
    fn test_spawned_asteroid_starts_outside_and_heads_in() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut state = GameState::new(42, bounds);
        for _ in 0..40 {
            state.spawn_asteroid_at_edge();
        }
        for a in &state.asteroids {
            // Inward normal of the edge the rock came from
            let inward = if a.pos.y < 0.0 {
                Vec2::Y
            } else if a.pos.y > bounds.y {
                Vec2::NEG_Y
            } else if a.pos.x < 0.0 {
                Vec2::X
            } else if a.pos.x > bounds.x {
                Vec2::NEG_X
            } else {
                panic!("asteroid spawned on screen at {:?}", a.pos);
            };
            let speed_in = a.vel.dot(inward);
            assert!(speed_in >= 0.5, "drifting outward: {:?}", a.vel);
            assert!(a.vel.perp_dot(inward).abs() <= 1.0);
            assert_eq!(a.hp, a.max_hp);
            assert!(a.crack_seed < 4);
        }
    }

    #[test]
    fn test_particle_cap_respected() {
        let mut state = GameState::new(3, Vec2::new(800.0, 600.0));
        state.max_particles = 10;
        state.spawn_explosion(Vec2::ZERO, 50, 1.0);
        assert_eq!(state.particles.len(), 10);
    }

    #[test]
    fn test_elapsed_ms_from_ticks() {
        let mut state = GameState::new(3, Vec2::new(800.0, 600.0));
        state.elapsed_ticks = 60;
        assert_eq!(state.elapsed_ms(), 1000);
    }

    #[test]
    fn test_accuracy() {
        let a = Analytics {
            shots_fired: 4,
            hits: 3,
            ..Default::default()
        };
        assert!((a.accuracy() - 0.75).abs() < 1e-6);
        assert_eq!(Analytics::default().accuracy(), 0.0);
    }
}
