//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each entity store)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod decor;
pub mod shape;
pub mod state;
pub mod tick;

pub use boss::{BossTickOutcome, Volley, tier_for_fraction};
pub use collision::{Rect, circles_overlap, out_of_bounds, point_in_ellipse};
pub use decor::{DecorTarget, DecorTargets, NoDecor, StaticDecor};
pub use shape::{jagged_polygon, regular_polygon};
pub use state::{
    Analytics, Asteroid, Boss, BossLifecycle, BossProjectile, GamePhase, GameState, Laser,
    Particle, ParticleKind, Rocket, ScreenShake,
};
pub use tick::{GameEvent, TickInput, tick};
