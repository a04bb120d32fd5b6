//! Boss phase controller
//!
//! `Enter` eases the saucer down to its entry point; `Fight` moves it along a
//! tier-specific path and fires volleys. Tiers are recomputed every tick from
//! remaining health and only matter for the instant they change.

use glam::Vec2;

use super::state::{Boss, BossLifecycle, BossProjectile};
use crate::consts::*;
use crate::heading;

/// Fraction of the gap to the trajectory point closed per tick while fighting
const FIGHT_EASE: f32 = 0.08;
/// Ticks of white flash after a laser hit
pub const HIT_FLASH_TICKS: u32 = 6;

/// Shot pattern for one escalation tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volley {
    pub interval: u32,
    pub count: u32,
    pub speed: f32,
    /// Angle between neighbouring shots (radians)
    pub spread: f32,
}

impl Volley {
    pub fn for_tier(tier: u8) -> Self {
        match tier {
            1 => Volley {
                interval: 90,
                count: 1,
                speed: 3.5,
                spread: 0.0,
            },
            2 => Volley {
                interval: 60,
                count: 2,
                speed: 4.5,
                spread: 0.15,
            },
            _ => Volley {
                interval: 40,
                count: 3,
                speed: 5.5,
                spread: 0.25,
            },
        }
    }

    /// Shots fanned symmetrically around the line from `origin` to `aim`
    pub fn shots(&self, origin: Vec2, aim: Vec2) -> Vec<BossProjectile> {
        let to = aim - origin;
        let base = to.y.atan2(to.x);
        let mid = (self.count as f32 - 1.0) / 2.0;
        (0..self.count)
            .map(|i| BossProjectile {
                pos: origin,
                vel: heading(base + (i as f32 - mid) * self.spread) * self.speed,
                life: BOSS_PROJECTILE_LIFE_TICKS,
            })
            .collect()
    }
}

/// Ticks between hazard drops, none at tier 1
pub fn hazard_interval(tier: u8) -> Option<u32> {
    match tier {
        1 => None,
        2 => Some(150),
        _ => Some(90),
    }
}

/// Escalation tier from remaining health fraction
#[inline]
pub fn tier_for_fraction(fraction: f32) -> u8 {
    if fraction > 0.6 {
        1
    } else if fraction > 0.3 {
        2
    } else {
        3
    }
}

/// Where the boss wants to be at `t` ticks into the fight
///
/// Continuous in `t` for every tier; tier 3 layers a fast wobble on top of
/// the sweep.
pub fn trajectory(tier: u8, t: u32, anchor: Vec2, bounds: Vec2) -> Vec2 {
    let t = t as f32;
    let cx = bounds.x / 2.0;
    let w = bounds.x;
    match tier {
        1 => Vec2::new(
            cx + (t * 0.01).sin() * w * 0.3,
            anchor.y + (t * 0.02).sin() * 20.0,
        ),
        2 => Vec2::new(
            cx + (t * 0.018).sin() * w * 0.35 + (t * 0.041).sin() * 40.0,
            anchor.y + (t * 0.03).sin() * 35.0,
        ),
        _ => Vec2::new(
            cx + (t * 0.03).sin() * w * 0.35 + (t * 0.077).sin() * 60.0,
            anchor.y + (t * 0.05).sin() * 45.0 + (t * 0.13).sin() * 15.0,
        ),
    }
}

/// What one boss tick asks the simulation to do
#[derive(Debug, Default)]
pub struct BossTickOutcome {
    pub tier: u8,
    /// The tier differs from last tick's
    pub tier_changed: bool,
    /// Entry finished this tick
    pub entered_fight: bool,
    pub volley: Vec<BossProjectile>,
    /// Hazard asteroid drop points
    pub hazards: Vec<Vec2>,
}

/// Advance the boss one tick
pub fn update(boss: &mut Boss, rocket_pos: Vec2, bounds: Vec2) -> BossTickOutcome {
    let mut out = BossTickOutcome::default();

    boss.bob_t = boss.bob_t.wrapping_add(1);
    boss.light_t = boss.light_t.wrapping_add(1);
    boss.phase_flash = boss.phase_flash.saturating_sub(1);
    boss.hit_flash = boss.hit_flash.saturating_sub(1);

    let tier = tier_for_fraction(boss.health_fraction());
    if tier != boss.tier {
        boss.tier = tier;
        boss.phase_flash = PHASE_FLASH_TICKS;
        out.tier_changed = true;
    }
    out.tier = tier;

    match boss.lifecycle {
        BossLifecycle::Enter => {
            boss.pos += (boss.target - boss.pos) * BOSS_ENTRY_EASE;
            if boss.pos.distance(boss.target) < BOSS_ENTRY_EPSILON {
                boss.pos = boss.target;
                boss.lifecycle = BossLifecycle::Fight;
                out.entered_fight = true;
            }
        }
        BossLifecycle::Fight => {
            boss.move_t += 1;
            let goal = trajectory(tier, boss.move_t, boss.target, bounds);
            boss.pos += (goal - boss.pos) * FIGHT_EASE;

            let volley = Volley::for_tier(tier);
            boss.fire_timer += 1;
            if boss.fire_timer >= volley.interval {
                boss.fire_timer = 0;
                out.volley = volley.shots(boss.pos, rocket_pos);
            }

            match hazard_interval(tier) {
                Some(interval) => {
                    boss.hazard_timer += 1;
                    if boss.hazard_timer >= interval {
                        boss.hazard_timer = 0;
                        out.hazards.push(boss.pos + Vec2::new(0.0, BOSS_BODY_RY));
                    }
                }
                None => boss.hazard_timer = 0,
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fighting_boss() -> Boss {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = Boss::new(bounds, BOSS_HP);
        boss.pos = boss.target;
        boss.lifecycle = BossLifecycle::Fight;
        boss
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for_fraction(1.0), 1);
        assert_eq!(tier_for_fraction(0.61), 1);
        assert_eq!(tier_for_fraction(0.6), 2);
        assert_eq!(tier_for_fraction(0.31), 2);
        assert_eq!(tier_for_fraction(0.3), 3);
        assert_eq!(tier_for_fraction(0.0), 3);
    }

    #[test]
    fn test_tier_boundaries_at_integer_hp() {
        // 30/50 is exactly the 0.6 boundary
        let mut boss = fighting_boss();
        boss.hp = 31;
        update(&mut boss, Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(boss.tier, 1);
        boss.hp = 30;
        let out = update(&mut boss, Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(boss.tier, 2);
        assert!(out.tier_changed);
    }

    #[test]
    fn test_tier_change_flags_once() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = fighting_boss();
        boss.hp = 25;
        let first = update(&mut boss, Vec2::ZERO, bounds);
        assert!(first.tier_changed);
        assert_eq!(boss.phase_flash, PHASE_FLASH_TICKS);
        let second = update(&mut boss, Vec2::ZERO, bounds);
        assert!(!second.tier_changed);
    }

    #[test]
    fn test_entry_reaches_fight() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = Boss::new(bounds, BOSS_HP);
        let mut entered = 0;
        for _ in 0..600 {
            let out = update(&mut boss, Vec2::ZERO, bounds);
            assert!(out.volley.is_empty(), "no fire while entering");
            if out.entered_fight {
                entered += 1;
                break;
            }
        }
        assert_eq!(entered, 1);
        assert_eq!(boss.lifecycle, BossLifecycle::Fight);
    }

    #[test]
    fn test_tier_one_fires_single_aimed_shot() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = fighting_boss();
        let rocket = Vec2::new(400.0, 500.0);
        let mut shots = Vec::new();
        for _ in 0..90 {
            shots.extend(update(&mut boss, rocket, bounds).volley);
        }
        assert_eq!(shots.len(), 1);
        assert!((shots[0].vel.length() - 3.5).abs() < 1e-4);
        // Aimed at the rocket from where the boss stood
        let to = (rocket - shots[0].pos).normalize();
        assert!(to.dot(shots[0].vel.normalize()) > 0.999);
    }

    #[test]
    fn test_tier_three_volley_and_hazards() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = fighting_boss();
        boss.hp = 10;
        boss.tier = 3;
        let mut volleys = 0;
        let mut hazards = 0;
        for _ in 0..180 {
            let out = update(&mut boss, Vec2::new(400.0, 500.0), bounds);
            if !out.volley.is_empty() {
                assert_eq!(out.volley.len(), 3);
                volleys += 1;
            }
            hazards += out.hazards.len();
        }
        assert_eq!(volleys, 4);
        assert_eq!(hazards, 2);
    }

    #[test]
    fn test_no_hazards_at_tier_one() {
        let bounds = Vec2::new(800.0, 600.0);
        let mut boss = fighting_boss();
        for _ in 0..400 {
            assert!(update(&mut boss, Vec2::ZERO, bounds).hazards.is_empty());
        }
    }

    proptest! {
        #[test]
        fn tier_is_monotonic_in_health(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(tier_for_fraction(lo) >= tier_for_fraction(hi));
        }

        #[test]
        fn trajectory_is_continuous(tier in 1u8..=3, t in 0u32..100_000) {
            let bounds = Vec2::new(1280.0, 720.0);
            let anchor = Vec2::new(640.0, 158.0);
            let a = trajectory(tier, t, anchor, bounds);
            let b = trajectory(tier, t + 1, anchor, bounds);
            prop_assert!(a.distance(b) < 40.0);
        }

        #[test]
        fn tier_flag_matches_flips(hits in proptest::collection::vec(0u32..3, 1..60)) {
            let bounds = Vec2::new(800.0, 600.0);
            let mut boss = fighting_boss();
            let mut flips = 0;
            let mut flags = 0;
            for h in hits {
                let before = tier_for_fraction(boss.health_fraction());
                boss.hp = boss.hp.saturating_sub(h);
                if tier_for_fraction(boss.health_fraction()) != before {
                    flips += 1;
                }
                if update(&mut boss, Vec2::ZERO, bounds).tier_changed {
                    flags += 1;
                }
            }
            prop_assert_eq!(flips, flags);
        }
    }
}
