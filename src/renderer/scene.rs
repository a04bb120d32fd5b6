//! World drawing: rocket, rocks, saucer, bolts, particles

use glam::Vec2;
use std::f32::consts::TAU;

use super::frame::{Color, DrawCmd, Frame, colors, flicker};
use super::hud;
use crate::consts::*;
use crate::heading;
use crate::settings::Settings;
use crate::sim::state::{Asteroid, Boss, BossProjectile, GameState, Laser, Particle, ParticleKind, Rocket};

/// Presentation switches taken from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub screen_shake: bool,
    pub flashes: bool,
    pub glow: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            screen_shake: true,
            flashes: true,
            glow: true,
        }
    }
}

impl From<&Settings> for RenderOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            screen_shake: settings.effective_screen_shake(),
            flashes: settings.effective_flashes(),
            glow: settings.quality.glow_enabled(),
        }
    }
}

/// Build the draw list for one display frame
pub fn build_frame(state: &GameState, time_secs: f32, opts: &RenderOptions) -> Frame {
    let mut frame = Frame::new(state.bounds);

    let shake = if opts.screen_shake {
        state.shake.offset
    } else {
        Vec2::ZERO
    };
    frame.with_transform(shake, 0.0, |f| {
        for p in &state.particles {
            if p.kind == ParticleKind::Smoke {
                draw_particle(f, p, opts);
            }
        }
        for a in &state.asteroids {
            draw_asteroid(f, a);
        }
        if let Some(boss) = &state.boss {
            draw_boss(f, boss, time_secs, opts);
        }
        for p in &state.boss_projectiles {
            draw_boss_projectile(f, p, opts);
        }
        for l in &state.lasers {
            draw_laser(f, l, opts);
        }
        draw_rocket(f, &state.rocket, time_secs);
        for p in &state.particles {
            if p.kind != ParticleKind::Smoke {
                draw_particle(f, p, opts);
            }
        }
    });

    hud::draw_hud(&mut frame, state, time_secs, opts);
    frame
}

/// Invincible rockets blink in 6-tick halves
pub fn rocket_visible(rocket: &Rocket) -> bool {
    rocket.alive && (rocket.invincible == 0 || (rocket.invincible / 6) % 2 == 1)
}

fn draw_rocket(frame: &mut Frame, rocket: &Rocket, time_secs: f32) {
    if !rocket_visible(rocket) {
        return;
    }

    // Aim guide: fading dots ahead of the nose
    let dir = heading(rocket.angle);
    for i in 0..4 {
        let d = 32.0 + i as f32 * 14.0;
        let alpha = colors::AIM_GUIDE.a * (1.0 - i as f32 * 0.22);
        frame.circle(rocket.pos + dir * d, 1.8, colors::AIM_GUIDE.with_alpha(alpha));
    }

    // Ship points along +X in local space
    frame.with_transform(rocket.pos, rocket.angle, |f| {
        let flame = 8.0 + flicker(time_secs, 1) * 9.0;
        f.push(DrawCmd::Polygon {
            points: vec![Vec2::new(-8.0, 5.0), Vec2::new(-8.0 - flame, 0.0), Vec2::new(-8.0, -5.0)],
            fill: Some(colors::THRUST_OUTER.with_alpha(0.85)),
            stroke: None,
        });
        f.push(DrawCmd::Polygon {
            points: vec![Vec2::new(-8.0, 2.5), Vec2::new(-8.0 - flame * 0.55, 0.0), Vec2::new(-8.0, -2.5)],
            fill: Some(colors::THRUST_INNER),
            stroke: None,
        });
        f.push(DrawCmd::Polygon {
            points: vec![
                Vec2::new(ROCKET_NOSE, 0.0),
                Vec2::new(-4.0, 8.0),
                Vec2::new(-12.0, 11.0),
                Vec2::new(-8.0, 0.0),
                Vec2::new(-12.0, -11.0),
                Vec2::new(-4.0, -8.0),
            ],
            fill: Some(colors::ROCKET_BODY),
            stroke: Some((colors::ROCKET_TRIM, 1.5)),
        });
        f.circle(Vec2::new(4.0, 0.0), 3.2, colors::ROCKET_WINDOW);
    });
}

/// Crack lines for an asteroid in local space
///
/// The family comes from `crack_seed` and the layout from the asteroid ID, so
/// a rock shows the same pattern every frame and only grows more cracks as
/// it takes damage.
pub fn crack_pattern(asteroid: &Asteroid) -> Vec<Vec<Vec2>> {
    let damage = asteroid.damage();
    if damage <= 0.0 {
        return Vec::new();
    }
    let r = asteroid.radius;
    let offset = (asteroid.id % 17) as f32 * 0.37;
    let polar = |angle: f32, dist: f32| heading(angle + offset) * dist;
    let spokes = 3 + (damage * 3.0).round() as usize;

    match asteroid.crack_seed % 4 {
        // Radial spokes
        0 => (0..spokes)
            .map(|i| {
                let a = i as f32 / spokes as f32 * TAU;
                vec![Vec2::ZERO, polar(a + 0.15, r * 0.45), polar(a, r * 0.8)]
            })
            .collect(),
        // Concentric rings
        1 => {
            let rings = if damage > 0.5 { 2 } else { 1 };
            (0..rings)
                .map(|ring| {
                    let rr = r * (0.3 + ring as f32 * 0.25);
                    (0..=10)
                        .map(|i| polar(i as f32 / 10.0 * TAU, rr))
                        .collect::<Vec<_>>()
                })
                .collect()
        }
        // Star
        2 => {
            let tips = spokes + 1;
            let star: Vec<Vec2> = (0..=tips * 2)
                .map(|i| {
                    let a = i as f32 / (tips * 2) as f32 * TAU;
                    let d = if i % 2 == 0 { r * 0.7 } else { r * 0.28 };
                    polar(a, d)
                })
                .collect();
            vec![star]
        }
        // Web: spokes joined by a ring of threads
        _ => {
            let mut lines: Vec<Vec<Vec2>> = (0..spokes)
                .map(|i| vec![Vec2::ZERO, polar(i as f32 / spokes as f32 * TAU, r * 0.75)])
                .collect();
            lines.push(
                (0..=spokes)
                    .map(|i| polar(i as f32 / spokes as f32 * TAU, r * 0.45))
                    .collect(),
            );
            lines
        }
    }
}

fn draw_asteroid(frame: &mut Frame, asteroid: &Asteroid) {
    frame.with_transform(asteroid.pos, asteroid.rotation, |f| {
        f.push(DrawCmd::Polygon {
            points: asteroid.shape.clone(),
            fill: Some(colors::ASTEROID_FILL),
            stroke: Some((colors::ASTEROID_EDGE, 2.0)),
        });
        let glow = 0.35 + asteroid.damage() * 0.6;
        for points in crack_pattern(asteroid) {
            f.push(DrawCmd::Polyline {
                points,
                width: 1.5,
                color: colors::ASTEROID_CRACK.with_alpha(glow),
            });
        }
    });
}

/// Fixed crack anchors on the saucer hull, revealed as health drops
const BOSS_CRACKS: [[(f32, f32); 3]; 6] = [
    [(-40.0, -4.0), (-30.0, 4.0), (-22.0, 2.0)],
    [(30.0, -6.0), (38.0, 2.0), (50.0, 0.0)],
    [(-8.0, 8.0), (0.0, 14.0), (10.0, 12.0)],
    [(-55.0, 2.0), (-48.0, 10.0), (-40.0, 9.0)],
    [(15.0, -2.0), (22.0, 8.0), (20.0, 16.0)],
    [(44.0, 6.0), (52.0, 12.0), (60.0, 6.0)],
];

fn draw_boss(frame: &mut Frame, boss: &Boss, time_secs: f32, opts: &RenderOptions) {
    let bob = (boss.bob_t as f32 * 0.05).sin() * 4.0;
    let health = boss.health_fraction();

    frame.with_transform(boss.pos + Vec2::new(0.0, bob), 0.0, |f| {
        // Tractor beam
        let pulse = 0.6 + 0.4 * (boss.light_t as f32 * 0.08).sin();
        f.push(DrawCmd::Polygon {
            points: vec![
                Vec2::new(-18.0, 14.0),
                Vec2::new(18.0, 14.0),
                Vec2::new(55.0, 150.0),
                Vec2::new(-55.0, 150.0),
            ],
            fill: Some(colors::BOSS_BEAM.with_alpha(colors::BOSS_BEAM.a * pulse)),
            stroke: None,
        });

        // Hull and dome
        f.push(DrawCmd::Ellipse {
            center: Vec2::new(0.0, 4.0),
            radii: Vec2::new(BOSS_BODY_RX, 16.0),
            fill: colors::BOSS_RIM,
        });
        f.push(DrawCmd::Ellipse {
            center: Vec2::ZERO,
            radii: Vec2::new(BOSS_BODY_RX - 6.0, 14.0),
            fill: colors::BOSS_HULL,
        });
        f.push(DrawCmd::Ellipse {
            center: Vec2::new(0.0, -12.0),
            radii: Vec2::new(28.0, 20.0),
            fill: colors::BOSS_DOME,
        });
        f.circle(Vec2::new(-8.0, -18.0), 5.0, Color::rgba(1.0, 1.0, 1.0, 0.35));

        // Rotating rim lights
        let spin = boss.light_t as f32 * 0.05;
        for i in 0..8 {
            let a = spin + i as f32 / 8.0 * TAU;
            let p = Vec2::new(a.cos() * (BOSS_BODY_RX - 10.0), 4.0 + a.sin() * 9.0);
            // Lights on the far side are hidden behind the hull
            if a.sin() < -0.2 {
                continue;
            }
            let c = colors::RIM_LIGHTS[(i + boss.tier as usize) % 3];
            let on = 0.6 + 0.4 * flicker(time_secs, 100 + i as u32);
            if opts.glow {
                f.glow(p, 8.0, c.with_alpha(0.4 * on));
            }
            f.circle(p, 3.0, c.with_alpha(on));
        }

        // Damage: cracks then smoke
        let cracks = ((1.0 - health) * BOSS_CRACKS.len() as f32).floor() as usize;
        for crack in BOSS_CRACKS.iter().take(cracks) {
            f.push(DrawCmd::Polyline {
                points: crack.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
                width: 1.5,
                color: colors::BOSS_CRACK,
            });
        }
        if health < 0.5 {
            let puffs = if health < 0.3 { 3 } else { 1 };
            for i in 0..puffs {
                let phase = (time_secs * 0.8 + i as f32 * 0.33).fract();
                let p = Vec2::new(-30.0 + i as f32 * 28.0, -6.0 - phase * 40.0);
                f.circle(p, 6.0 + phase * 10.0, colors::SMOKE.with_alpha(0.35 * (1.0 - phase)));
            }
        }

        if boss.hit_flash > 0 {
            f.push(DrawCmd::Ellipse {
                center: Vec2::ZERO,
                radii: Vec2::new(BOSS_BODY_RX - 6.0, 14.0),
                fill: Color::rgba(1.0, 1.0, 1.0, 0.12 * boss.hit_flash as f32),
            });
        }
        if opts.flashes && boss.phase_flash > 0 {
            let t = boss.phase_flash as f32 / PHASE_FLASH_TICKS as f32;
            f.push(DrawCmd::StrokeCircle {
                center: Vec2::ZERO,
                radius: BOSS_BODY_RX + (1.0 - t) * 60.0,
                width: 4.0,
                color: colors::WARNING.with_alpha(t),
            });
        }
    });
}

fn draw_laser(frame: &mut Frame, laser: &Laser, opts: &RenderOptions) {
    let dir = laser.vel.normalize_or(Vec2::NEG_Y);
    let tail = laser.pos - dir * 16.0;
    if opts.glow {
        frame.glow(laser.pos, 10.0, colors::LASER.with_alpha(0.35));
    }
    frame.line(tail, laser.pos, 3.0, colors::LASER.with_alpha(0.8));
    frame.line(laser.pos - dir * 8.0, laser.pos, 1.5, colors::LASER_CORE);
    // Impact light at the head
    frame.circle(laser.pos, 2.0, colors::LASER_CORE);
}

fn draw_boss_projectile(frame: &mut Frame, shot: &BossProjectile, opts: &RenderOptions) {
    let trail = shot.pos - shot.vel * 4.0;
    if opts.glow {
        frame.glow(shot.pos, 14.0, colors::BOSS_SHOT.with_alpha(0.45));
    }
    frame.line(trail, shot.pos, 4.0, colors::BOSS_SHOT.with_alpha(0.4));
    frame.circle(shot.pos, 5.0, colors::BOSS_SHOT);
    frame.circle(shot.pos, 2.5, colors::BOSS_SHOT_CORE);
}

fn draw_particle(frame: &mut Frame, p: &Particle, opts: &RenderOptions) {
    let alpha = (p.life / p.max_life).clamp(0.0, 1.0);
    match p.kind {
        ParticleKind::Ember => {
            let c = colors::EMBERS[p.color as usize % colors::EMBERS.len()];
            if opts.glow {
                frame.glow(p.pos, p.size * 3.0, c.with_alpha(alpha * 0.5));
            }
            frame.circle(p.pos, p.size * (0.5 + alpha * 0.5), c.with_alpha(alpha));
        }
        ParticleKind::RockShard => {
            let s = p.size;
            frame.with_transform(p.pos, p.rotation, |f| {
                f.push(DrawCmd::Polygon {
                    points: vec![Vec2::new(s, 0.0), Vec2::new(-s * 0.6, s * 0.7), Vec2::new(-s * 0.4, -s * 0.8)],
                    fill: Some(colors::SHARD.with_alpha(alpha)),
                    stroke: None,
                });
            });
        }
        ParticleKind::Smoke => {
            frame.circle(
                p.pos,
                p.size * (1.5 - alpha * 0.5),
                colors::SMOKE.with_alpha(alpha * 0.3),
            );
        }
    }
}
