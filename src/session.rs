//! Game loop driver
//!
//! A [`GameSession`] owns one [`GameState`] for the lifetime of a mount. The
//! host feeds it pointer samples, clicks and frame deltas; the session runs
//! whole simulation ticks, forwards sound cues to its [`AudioSink`] and hands
//! terminal outcomes to the [`OutcomeReporter`].

use glam::Vec2;

use crate::audio::AudioSink;
use crate::consts::*;
use crate::renderer::{Frame, RenderOptions, build_frame};
use crate::settings::Settings;
use crate::sim::{Analytics, DecorTargets, GameEvent, GameState, TickInput, tick};

type BossDefeatedFn = Box<dyn FnOnce(u64, Analytics)>;
type GameOverFn = Box<dyn FnOnce(u32)>;

/// One-shot notifications to the hosting page
pub struct OutcomeReporter {
    on_boss_defeated: Option<BossDefeatedFn>,
    on_game_over: Option<GameOverFn>,
}

impl OutcomeReporter {
    pub fn new(
        on_boss_defeated: impl FnOnce(u64, Analytics) + 'static,
        on_game_over: impl FnOnce(u32) + 'static,
    ) -> Self {
        Self {
            on_boss_defeated: Some(Box::new(on_boss_defeated)),
            on_game_over: Some(Box::new(on_game_over)),
        }
    }

    /// Reporter that drops every outcome
    pub fn silent() -> Self {
        Self {
            on_boss_defeated: None,
            on_game_over: None,
        }
    }

    /// Fires the boss callback; later calls do nothing
    pub fn boss_defeated(&mut self, time_ms: u64, analytics: Analytics) {
        if let Some(cb) = self.on_boss_defeated.take() {
            cb(time_ms, analytics);
        }
    }

    /// Fires the game-over callback; later calls do nothing
    pub fn game_over(&mut self, score: u32) {
        if let Some(cb) = self.on_game_over.take() {
            cb(score);
        }
    }
}

impl std::fmt::Debug for OutcomeReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeReporter")
            .field("boss_defeated_pending", &self.on_boss_defeated.is_some())
            .field("game_over_pending", &self.on_game_over.is_some())
            .finish()
    }
}

/// One running game
pub struct GameSession {
    state: GameState,
    accumulator: f32,
    input: TickInput,
    audio: Box<dyn AudioSink>,
    decor: Box<dyn DecorTargets>,
    reporter: OutcomeReporter,
    render_opts: RenderOptions,
}

impl GameSession {
    pub fn new(
        state: GameState,
        audio: Box<dyn AudioSink>,
        decor: Box<dyn DecorTargets>,
        reporter: OutcomeReporter,
    ) -> Self {
        log::info!(
            "Session start: seed {}, canvas {}x{}",
            state.seed,
            state.bounds.x,
            state.bounds.y
        );
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
            audio,
            decor,
            reporter,
            render_opts: RenderOptions::default(),
        }
    }

    /// Apply particle cap and presentation switches
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.state.max_particles = settings.max_particles();
        self.render_opts = RenderOptions::from(settings);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Latest pointer position; last writer wins
    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.input.pointer = Some(pos);
    }

    /// Queue one shot for the next tick
    pub fn fire(&mut self) {
        self.input.fire = true;
    }

    /// Canvas changed size
    pub fn resize(&mut self, bounds: Vec2) {
        self.state.resize(bounds);
    }

    /// Run as many fixed ticks as `dt_secs` of real time covers
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt_secs: f32) -> u32 {
        let dt = dt_secs.clamp(0.0, 0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Drop the backlog a slow device could never catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Run exactly one tick and dispatch its events
    pub fn step(&mut self) {
        let input = std::mem::take(&mut self.input);
        let events = tick(&mut self.state, &input, self.decor.as_mut());
        for event in events {
            match event {
                GameEvent::Sound(effect) => self.audio.play(effect),
                GameEvent::BossDefeated { time_ms, analytics } => {
                    self.reporter.boss_defeated(time_ms, analytics)
                }
                GameEvent::GameOver { score, .. } => self.reporter.game_over(score),
            }
        }
    }

    /// Draw list for the current state
    pub fn frame(&self, time_secs: f32) -> Frame {
        build_frame(&self.state, time_secs, &self.render_opts)
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        log::debug!("Session dropped after {} ticks", self.state.time_ticks);
    }
}
