//! Fixed timestep simulation tick
//!
//! Advances the encounter by one 60 Hz step. The order of the steps below is
//! part of the contract: a laser fired this tick flies this tick, a kill in
//! the laser pass can start the boss warning, and the terminal check runs last.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::boss;
use super::collision::{circles_overlap, out_of_bounds, point_in_ellipse};
use super::decor::DecorTargets;
use super::state::{
    Analytics, Asteroid, Boss, BossLifecycle, GamePhase, GameState, Laser, ParticleKind,
};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::{approach_angle, heading};

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer position in canvas pixels, if it moved
    pub pointer: Option<Vec2>,
    /// Fire one laser (click edge, not button held)
    pub fire: bool,
}

/// Side effects produced by a tick, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    /// Boss health reached zero; `time_ms` is the frozen session clock
    BossDefeated { time_ms: u64, analytics: Analytics },
    /// Last life lost
    GameOver { score: u32, analytics: Analytics },
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, decor: &mut dyn DecorTargets) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if let Some(p) = input.pointer {
        state.pointer = p;
    }
    state.time_ticks += 1;
    if !state.is_terminal() {
        state.elapsed_ticks += 1;
    }

    update_respawn(state);
    update_spawning(state);
    update_boss_warning(state);
    steer_rocket(state);
    if input.fire {
        fire_laser(state, &mut events);
    }
    update_asteroids(state, &mut events);
    update_boss(state);
    check_boss_body(state, &mut events);
    update_boss_projectiles(state, &mut events);
    update_lasers(state, decor, &mut events);
    update_particles(state);
    update_shake(state);
    check_game_over(state, &mut events);

    events
}

/// Rocket can be hurt this tick
#[inline]
fn rocket_vulnerable(state: &GameState) -> bool {
    state.rocket.collidable() && !state.is_terminal()
}

fn update_respawn(state: &mut GameState) {
    let rocket = &mut state.rocket;
    if rocket.invincible > 0 {
        rocket.invincible -= 1;
    }
    if rocket.alive || state.lives == 0 || state.game_over {
        return;
    }
    rocket.respawn_timer = rocket.respawn_timer.saturating_sub(1);
    if rocket.respawn_timer == 0 {
        rocket.pos = GameState::rocket_start(state.bounds);
        rocket.angle = -FRAC_PI_2;
        rocket.alive = true;
        rocket.invincible = state.tuning.invincibility_ticks;
        log::debug!("rocket respawned, {} lives left", state.lives);
    }
}

fn update_spawning(state: &mut GameState) {
    // Hold the asteroid stream while the saucer makes its entrance
    if matches!(&state.boss, Some(b) if b.lifecycle == BossLifecycle::Enter) {
        return;
    }
    let interval = if state.phase == GamePhase::Boss {
        state.tuning.boss_spawn_interval_ticks
    } else {
        state.tuning.spawn_interval_ticks
    };
    state.spawn_timer += 1;
    if state.spawn_timer > interval {
        state.spawn_timer = 0;
        state.spawn_asteroid_at_edge();
    }
}

fn update_boss_warning(state: &mut GameState) {
    if state.phase == GamePhase::Warning {
        state.boss_warning = state.boss_warning.saturating_sub(1);
        if state.boss_warning == 0 {
            spawn_boss(state);
        }
        return;
    }
    check_boss_threshold(state);
}

/// Enter the warning phase once the kill threshold is met
fn check_boss_threshold(state: &mut GameState) {
    if state.phase != GamePhase::Normal
        || state.boss.is_some()
        || state.boss_appeared
        || state.is_terminal()
        || state.score < state.tuning.boss_threshold
    {
        return;
    }
    state.phase = GamePhase::Warning;
    state.boss_warning = state.tuning.boss_warning_ticks;
    log::info!("boss warning at {} kills", state.score);
}

fn spawn_boss(state: &mut GameState) {
    state.boss = Some(Boss::new(state.bounds, state.tuning.boss_hp));
    state.phase = GamePhase::Boss;
    state.boss_appeared = true;
    log::info!("boss spawned with {} hp", state.tuning.boss_hp);
}

fn steer_rocket(state: &mut GameState) {
    if !state.rocket.alive || state.is_terminal() {
        return;
    }
    let rocket = &mut state.rocket;
    let to = state.pointer - rocket.pos;
    if to.length_squared() > 1.0 {
        rocket.angle = approach_angle(rocket.angle, to.y.atan2(to.x), STEER_SMOOTHING);
    }
    rocket.pos += to * STEER_SMOOTHING;
}

fn fire_laser(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.rocket.alive || state.game_over {
        return;
    }
    state.lasers.push(Laser {
        pos: state.rocket.nose(),
        vel: heading(state.rocket.angle) * LASER_SPEED,
        life: LASER_LIFE_TICKS,
    });
    state.analytics.shots_fired += 1;
    events.push(GameEvent::Sound(SoundEffect::Laser));
}

fn update_asteroids(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let bounds = state.bounds;
    for a in &mut state.asteroids {
        a.pos += a.vel;
        a.rotation += a.rot_speed;
    }
    state
        .asteroids
        .retain(|a| !out_of_bounds(a.pos, bounds, ASTEROID_DESPAWN_MARGIN));

    if rocket_vulnerable(state) {
        let rp = state.rocket.pos;
        if state
            .asteroids
            .iter()
            .any(|a| circles_overlap(rp, a.pos, a.radius + ROCKET_HIT_RADIUS))
        {
            destroy_rocket(state, events);
        }
    }
}

fn update_boss(state: &mut GameState) {
    let Some(saucer) = state.boss.as_mut() else {
        return;
    };
    let outcome = boss::update(saucer, state.rocket.pos, state.bounds);
    if outcome.entered_fight {
        log::debug!("boss entry complete");
    }
    if outcome.tier_changed {
        state.shake.kick(SHAKE_TIER_CHANGE);
        log::info!("boss escalated to tier {}", outcome.tier);
    }
    state.boss_projectiles.extend(outcome.volley);
    for pos in outcome.hazards {
        state.spawn_hazard(pos);
    }
}

fn check_boss_body(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !rocket_vulnerable(state) {
        return;
    }
    let rp = state.rocket.pos;
    let hit = state
        .boss
        .as_ref()
        .is_some_and(|b| point_in_ellipse(rp, b.pos, BOSS_BODY_RX, BOSS_BODY_RY));
    if hit {
        destroy_rocket(state, events);
    }
}

fn update_boss_projectiles(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let bounds = state.bounds;
    for p in &mut state.boss_projectiles {
        p.pos += p.vel;
        p.life = p.life.saturating_sub(1);
    }
    state
        .boss_projectiles
        .retain(|p| p.life > 0 && !out_of_bounds(p.pos, bounds, BOSS_PROJECTILE_MARGIN));

    if rocket_vulnerable(state) {
        let rp = state.rocket.pos;
        if let Some(i) = state
            .boss_projectiles
            .iter()
            .position(|p| circles_overlap(p.pos, rp, BOSS_PROJECTILE_HIT_RADIUS))
        {
            state.boss_projectiles.remove(i);
            destroy_rocket(state, events);
        }
    }
}

fn update_lasers(state: &mut GameState, decor: &mut dyn DecorTargets, events: &mut Vec<GameEvent>) {
    if state.lasers.is_empty() {
        return;
    }
    let bounds = state.bounds;
    let targets = decor.live_targets();
    let mut struck: Vec<usize> = Vec::new();
    // Split children join the field after every laser has been resolved
    let mut spawned: Vec<Asteroid> = Vec::new();

    let lasers = std::mem::take(&mut state.lasers);
    let mut kept = Vec::with_capacity(lasers.len());
    for mut laser in lasers {
        laser.pos += laser.vel;
        laser.life = laser.life.saturating_sub(1);

        if laser_hits_boss(state, &laser, events) {
            continue;
        }
        if laser_hits_asteroid(state, &laser, &mut spawned, events) {
            continue;
        }
        if let Some(target) = targets
            .iter()
            .find(|t| !struck.contains(&t.id) && t.rect.contains(laser.pos))
        {
            decor.mark_hit(target.id, laser.vel);
            struck.push(target.id);
            continue;
        }
        if laser.life == 0 || out_of_bounds(laser.pos, bounds, LASER_BOUNDS_MARGIN) {
            continue;
        }
        kept.push(laser);
    }
    state.lasers = kept;
    state.asteroids.extend(spawned);
}

fn laser_hits_boss(state: &mut GameState, laser: &Laser, events: &mut Vec<GameEvent>) -> bool {
    // Once the last life is gone the saucer cannot be finished off by stray bolts,
    // even when the rocket died earlier in this same tick
    if state.game_over || state.lives == 0 {
        return false;
    }
    let Some(boss) = state.boss.as_mut() else {
        return false;
    };
    if !circles_overlap(laser.pos, boss.pos, BOSS_LASER_RADIUS) {
        return false;
    }
    boss.hp = boss.hp.saturating_sub(1);
    boss.hit_flash = boss::HIT_FLASH_TICKS;
    let boss_pos = boss.pos;
    let defeated = boss.hp == 0;

    state.analytics.hits += 1;
    state.analytics.boss_hits += 1;
    state.spawn_sparks(laser.pos, 6, ParticleKind::Ember);
    events.push(GameEvent::Sound(SoundEffect::BossHit));

    if defeated {
        defeat_boss(state, boss_pos, events);
    }
    true
}

fn defeat_boss(state: &mut GameState, pos: Vec2, events: &mut Vec<GameEvent>) {
    state.spawn_explosion(pos, 80, 2.5);
    state.shake.kick(SHAKE_BOSS_DEFEAT);
    events.push(GameEvent::Sound(SoundEffect::Explosion { intensity: 3.0 }));

    state.boss = None;
    state.boss_projectiles.clear();
    state.phase = GamePhase::Normal;
    state.boss_defeated = true;

    let time_ms = state.elapsed_ms();
    log::info!(
        "boss defeated at {time_ms} ms ({} shots, {} hits)",
        state.analytics.shots_fired,
        state.analytics.hits
    );
    events.push(GameEvent::BossDefeated {
        time_ms,
        analytics: state.analytics,
    });
}

fn laser_hits_asteroid(
    state: &mut GameState,
    laser: &Laser,
    spawned: &mut Vec<Asteroid>,
    events: &mut Vec<GameEvent>,
) -> bool {
    let Some(i) = state
        .asteroids
        .iter()
        .position(|a| circles_overlap(laser.pos, a.pos, a.radius))
    else {
        return false;
    };

    let asteroid = &mut state.asteroids[i];
    asteroid.hp = asteroid.hp.saturating_sub(1);
    let remaining = asteroid.hp;

    state.analytics.hits += 1;
    state.spawn_sparks(laser.pos, 4, ParticleKind::RockShard);

    if remaining == 0 {
        let dead = state.asteroids.remove(i);
        destroy_asteroid(state, dead, spawned, events);
    }
    true
}

/// Explode an asteroid, splitting it if it is large enough
fn destroy_asteroid(
    state: &mut GameState,
    asteroid: Asteroid,
    spawned: &mut Vec<Asteroid>,
    events: &mut Vec<GameEvent>,
) {
    let scale = asteroid.radius / 25.0;
    let count = (asteroid.radius as usize).clamp(10, 40);
    state.spawn_explosion(asteroid.pos, count, scale);
    events.push(GameEvent::Sound(SoundEffect::Explosion { intensity: scale }));

    if asteroid.radius > state.tuning.split_radius_threshold {
        spawned.extend(split_asteroid(state, &asteroid));
    }

    state.score += 1;
    state.analytics.asteroids_destroyed += 1;
    check_boss_threshold(state);
}

/// Two one-hit children flying apart from the parent's center
pub fn split_asteroid(state: &mut GameState, parent: &Asteroid) -> [Asteroid; 2] {
    let radius = parent.radius * state.tuning.split_child_ratio;
    let base = state.rng.random_range(0.0..TAU);
    let mut child = |angle: f32| {
        let dir = heading(angle);
        let id = state.next_entity_id();
        Asteroid::new(
            id,
            parent.pos + dir * radius,
            parent.vel * 0.5 + dir * 1.2,
            radius,
            1,
            &mut state.rng,
        )
    };
    [child(base), child(base + PI)]
}

/// Lose a life; no-op while dead or invincible
fn destroy_rocket(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.rocket.collidable() {
        return;
    }
    let pos = state.rocket.pos;
    state.spawn_explosion(pos, 40, 1.5);
    events.push(GameEvent::Sound(SoundEffect::Explosion { intensity: 2.0 }));
    state.shake.kick(SHAKE_ROCKET_DEATH);

    state.lives = state.lives.saturating_sub(1);
    state.analytics.damage_taken += 1;
    state.rocket.alive = false;
    if state.lives > 0 {
        state.rocket.respawn_timer = state.tuning.respawn_delay_ticks;
    }
    log::debug!("rocket destroyed, {} lives left", state.lives);
}

fn update_particles(state: &mut GameState) {
    for p in &mut state.particles {
        p.vel *= PARTICLE_DAMPING;
        p.vel.y += PARTICLE_GRAVITY;
        p.pos += p.vel;
        p.rotation += p.spin;
        p.life -= 1.0;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn update_shake(state: &mut GameState) {
    let shake = &mut state.shake;
    if shake.intensity <= 0.0 {
        return;
    }
    let fx = &mut state.fx_rng;
    shake.offset = Vec2::new(fx.random_range(-1.0..1.0), fx.random_range(-1.0..1.0)) * shake.intensity;
    shake.intensity *= SHAKE_DECAY;
    if shake.intensity < SHAKE_CUTOFF {
        shake.intensity = 0.0;
        shake.offset = Vec2::ZERO;
    }
}

fn check_game_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.lives > 0 || state.is_terminal() {
        return;
    }
    state.game_over = true;
    log::info!("game over with {} kills", state.score);
    events.push(GameEvent::GameOver {
        score: state.score,
        analytics: state.analytics,
    });
}
