//! End-to-end encounter scenarios driven through the public API

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use hero_rocket::audio::SilentAudio;
use hero_rocket::consts::*;
use hero_rocket::renderer::{RenderOptions, build_frame};
use hero_rocket::sim::{
    Analytics, Asteroid, Boss, BossLifecycle, BossProjectile, GamePhase, GameState, Laser,
    NoDecor, Rect, StaticDecor, TickInput, tick,
};
use hero_rocket::{GameSession, OutcomeReporter};

const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

/// No background asteroid stream
fn quiet_state(seed: u64) -> GameState {
    let mut state = GameState::new(seed, BOUNDS);
    state.tuning.spawn_interval_ticks = u32::MAX;
    state.tuning.boss_spawn_interval_ticks = u32::MAX;
    state
}

fn idle(state: &mut GameState) {
    tick(state, &TickInput::default(), &mut NoDecor);
}

fn rock(state: &mut GameState, pos: Vec2, radius: f32, hp: u32) {
    let id = state.next_entity_id();
    let mut rng = Pcg32::seed_from_u64(id as u64);
    state
        .asteroids
        .push(Asteroid::new(id, pos, Vec2::ZERO, radius, hp, &mut rng));
}

/// Boss already in the fight, parked at its entry point
fn parked_boss(state: &mut GameState, hp: u32) -> Vec2 {
    let mut boss = Boss::new(state.bounds, state.tuning.boss_hp);
    boss.hp = hp;
    boss.pos = boss.target;
    boss.lifecycle = BossLifecycle::Fight;
    let pos = boss.pos;
    state.boss = Some(boss);
    state.phase = GamePhase::Boss;
    state.boss_appeared = true;
    pos
}

fn still_laser(pos: Vec2) -> Laser {
    Laser {
        pos,
        vel: Vec2::ZERO,
        life: LASER_LIFE_TICKS,
    }
}

#[derive(Default, Clone)]
struct Outcomes {
    boss: Rc<RefCell<Vec<(u64, Analytics)>>>,
    game_over: Rc<RefCell<Vec<u32>>>,
}

impl Outcomes {
    fn reporter(&self) -> OutcomeReporter {
        let boss = self.boss.clone();
        let game_over = self.game_over.clone();
        OutcomeReporter::new(
            move |time_ms, analytics| boss.borrow_mut().push((time_ms, analytics)),
            move |score| game_over.borrow_mut().push(score),
        )
    }
}

fn session(state: GameState, outcomes: &Outcomes) -> GameSession {
    GameSession::new(
        state,
        Box::new(SilentAudio),
        Box::new(NoDecor),
        outcomes.reporter(),
    )
}

#[test]
fn tenth_kill_warns_then_boss_enters() {
    let mut state = quiet_state(3);
    state.score = BOSS_THRESHOLD;
    idle(&mut state);
    assert_eq!(state.phase, GamePhase::Warning);
    assert_eq!(state.boss_warning, BOSS_WARNING_TICKS);

    for _ in 1..BOSS_WARNING_TICKS {
        idle(&mut state);
        assert!(state.boss.is_none());
        assert_eq!(state.phase, GamePhase::Warning);
    }

    idle(&mut state);
    assert_eq!(state.phase, GamePhase::Boss);
    let boss = state.boss.as_ref().expect("boss spawned");
    assert_eq!(boss.hp, boss.max_hp);
    assert_eq!(boss.lifecycle, BossLifecycle::Enter);
    assert!(boss.pos.y < 0.0, "boss starts above the top edge");
}

#[test]
fn boss_body_contact_costs_one_life_then_grants_invincibility() {
    let mut state = quiet_state(4);
    parked_boss(&mut state, BOSS_HP);
    let rocket_pos = state.rocket.pos;
    if let Some(boss) = state.boss.as_mut() {
        boss.pos = rocket_pos;
    }

    idle(&mut state);
    assert_eq!(state.lives, PLAYER_LIVES - 1);
    assert!(!state.rocket.alive);
    assert!(!state.rocket.collidable());
    assert_eq!(state.analytics.damage_taken, 1);

    // Clear the arena so only the test rock can hurt the rocket
    state.boss = None;
    state.boss_projectiles.clear();
    state.phase = GamePhase::Normal;

    for _ in 0..RESPAWN_DELAY_TICKS {
        idle(&mut state);
    }
    assert!(state.rocket.alive);
    assert!(state.rocket.invincible > 0);
    assert!(!state.rocket.collidable());

    let start = state.rocket.pos;
    rock(&mut state, start, 20.0, 1);

    let mut hit_at = None;
    for i in 0..(INVINCIBILITY_TICKS + 10) {
        let lives = state.lives;
        idle(&mut state);
        if state.lives < lives {
            assert_eq!(state.rocket.invincible, 0, "hurt while invincible");
            hit_at = Some(i);
            break;
        }
    }
    assert!(hit_at.is_some(), "rocket became collidable again");
    assert_eq!(state.lives, PLAYER_LIVES - 2);
}

#[test]
fn last_life_reports_game_over_once_and_stops_clock() {
    let outcomes = Outcomes::default();
    let mut state = quiet_state(5);
    state.lives = 1;
    state.score = 7;
    let pos = state.rocket.pos;
    state.boss_projectiles.push(BossProjectile {
        pos,
        vel: Vec2::ZERO,
        life: 30,
    });
    let mut game = session(state, &outcomes);

    game.step();
    assert!(game.state().game_over);
    assert_eq!(game.state().lives, 0);
    assert_eq!(outcomes.game_over.borrow().as_slice(), &[7]);

    let frozen = game.state().elapsed_ms();
    game.advance(1.0);
    for _ in 0..120 {
        game.step();
    }
    assert_eq!(game.state().elapsed_ms(), frozen);
    assert_eq!(outcomes.game_over.borrow().len(), 1);
    assert!(outcomes.boss.borrow().is_empty());
}

#[test]
fn boss_defeat_reports_once_with_frozen_time() {
    let outcomes = Outcomes::default();
    let mut state = quiet_state(6);
    let boss_pos = parked_boss(&mut state, 1);
    state.elapsed_ticks = 600;
    state.lasers.push(still_laser(boss_pos));
    let mut game = session(state, &outcomes);

    game.step();
    {
        let state = game.state();
        assert!(state.boss_defeated);
        assert!(state.boss.is_none());
        assert!(state.boss_projectiles.is_empty());
        assert_eq!(state.phase, GamePhase::Normal);
    }

    let reported = outcomes.boss.borrow().clone();
    assert_eq!(reported.len(), 1);
    let (time_ms, analytics) = reported[0];
    assert_eq!(time_ms, game.state().elapsed_ms());
    assert!(analytics.boss_hits >= 1);
    assert!(time_ms >= 10_000);

    for _ in 0..300 {
        game.step();
    }
    assert_eq!(game.state().elapsed_ms(), time_ms);
    assert_eq!(outcomes.boss.borrow().len(), 1);
    assert!(outcomes.game_over.borrow().is_empty());
}

#[test]
fn laser_prefers_boss_over_asteroid_and_decor() {
    let mut state = quiet_state(7);
    let boss_pos = parked_boss(&mut state, BOSS_HP);
    rock(&mut state, boss_pos, 30.0, 3);
    state.lasers.push(still_laser(boss_pos));
    let mut decor = StaticDecor::new([Rect::new(boss_pos.x - 20.0, boss_pos.y - 20.0, 40.0, 40.0)]);

    tick(&mut state, &TickInput::default(), &mut decor);

    assert!(state.lasers.is_empty());
    assert_eq!(state.boss.as_ref().map(|b| b.hp), Some(BOSS_HP - 1));
    assert_eq!(state.asteroids[0].hp, 3);
    assert!(decor.hits.is_empty());
    assert_eq!(state.analytics.boss_hits, 1);
    assert_eq!(state.analytics.hits, 1);
}

#[test]
fn decor_glyph_absorbs_laser_without_scoring() {
    let mut state = quiet_state(8);
    let spot = Vec2::new(200.0, 100.0);
    state.lasers.push(still_laser(spot));
    let mut decor = StaticDecor::new([Rect::new(spot.x - 10.0, spot.y - 10.0, 20.0, 20.0)]);

    tick(&mut state, &TickInput::default(), &mut decor);

    assert!(state.lasers.is_empty());
    assert_eq!(decor.hits.len(), 1);
    assert_eq!(decor.hits[0].0, 0);
    assert_eq!(state.score, 0);
    assert_eq!(state.analytics.hits, 0);
}

#[test]
fn identical_sessions_stay_identical() {
    let outcomes = Outcomes::default();
    let mut a = session(GameState::new(2024, BOUNDS), &outcomes);
    let mut b = session(GameState::new(2024, BOUNDS), &outcomes);

    for i in 0..900u32 {
        let t = i as f32 * 0.03;
        let pointer = Vec2::new(400.0 + t.sin() * 250.0, 380.0 + (t * 0.7).cos() * 120.0);
        for game in [&mut a, &mut b] {
            game.pointer_moved(pointer);
            if i % 9 == 0 {
                game.fire();
            }
            game.step();
        }
        assert_eq!(
            serde_json::to_value(a.state()).unwrap(),
            serde_json::to_value(b.state()).unwrap(),
            "diverged at tick {i}"
        );
    }
}

#[test]
fn played_state_renders_hud() {
    let mut game = session(GameState::new(11, BOUNDS), &Outcomes::default());
    for i in 0..240 {
        if i % 10 == 0 {
            game.fire();
        }
        game.step();
    }
    let frame = build_frame(game.state(), 4.0, &RenderOptions::default());
    assert!(!frame.cmds.is_empty());
    let kills = format!("KILLS {}", game.state().score);
    assert!(frame.texts().any(|t| t == kills));
    assert_eq!(frame.size, BOUNDS);
}
