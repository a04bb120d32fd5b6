//! Hero Rocket headless soak runner
//!
//! `hero-rocket --seed N --ticks N --tuning FILE` plays one session with a simple
//! autopilot and logs how it ended. Useful when balancing tuning values.
//! The browser build is driven through `hero_rocket::platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod soak {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec2;
    use hero_rocket::audio::SilentAudio;
    use hero_rocket::leaderboard::format_time;
    use hero_rocket::sim::{Analytics, GameState, NoDecor};
    use hero_rocket::{GameSession, OutcomeReporter, QualityPreset, Settings, Tuning};

    const BOUNDS: Vec2 = Vec2::new(1280.0, 720.0);
    /// Autopilot trigger cadence
    const FIRE_EVERY: u64 = 8;
    /// How far toward its target the autopilot leans
    const LEAN: f32 = 0.25;

    #[derive(Parser, Debug)]
    #[command(name = "hero-rocket")]
    #[command(about = "Play one headless session on autopilot and report how it ended")]
    pub struct Cli {
        /// Session seed
        #[arg(long, default_value_t = 1)]
        pub seed: u64,
        /// Stop after this many ticks (60 per second)
        #[arg(long, default_value_t = 60 * 60 * 5)]
        pub ticks: u64,
        /// JSON balance overrides
        #[arg(long)]
        pub tuning: Option<PathBuf>,
        /// Particle budget preset (low, medium, high)
        #[arg(long, default_value = "high")]
        pub quality: QualityPreset,
    }

    #[derive(Debug, Clone, Copy)]
    enum Ending {
        BossDefeated { time_ms: u64, analytics: Analytics },
        GameOver { score: u32 },
    }

    /// Lean toward the boss, else the nearest asteroid
    fn autopilot(state: &GameState) -> Vec2 {
        let home = GameState::rocket_start(state.bounds);
        let target = state.boss.as_ref().map(|b| b.pos).or_else(|| {
            state
                .asteroids
                .iter()
                .map(|a| a.pos)
                .min_by(|a, b| {
                    a.distance_squared(state.rocket.pos)
                        .total_cmp(&b.distance_squared(state.rocket.pos))
                })
        });
        match target {
            Some(t) => home.lerp(t, LEAN),
            None => home,
        }
    }

    fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading tuning {}", path.display()))?;
        let tuning = Tuning::from_json(&json)
            .with_context(|| format!("invalid tuning {}", path.display()))?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn run(cli: Cli) -> Result<()> {
        let tuning = load_tuning(cli.tuning.as_deref())?;

        let ending = Rc::new(RefCell::new(None));
        let on_boss = ending.clone();
        let on_over = ending.clone();
        let reporter = OutcomeReporter::new(
            move |time_ms, analytics| {
                *on_boss.borrow_mut() = Some(Ending::BossDefeated { time_ms, analytics })
            },
            move |score| *on_over.borrow_mut() = Some(Ending::GameOver { score }),
        );

        let state = GameState::with_tuning(cli.seed, BOUNDS, tuning);
        let mut session =
            GameSession::new(state, Box::new(SilentAudio), Box::new(NoDecor), reporter);
        session.apply_settings(&Settings {
            quality: cli.quality,
            ..Settings::default()
        });

        let mut ticks = 0;
        while ticks < cli.ticks && ending.borrow().is_none() {
            let aim = autopilot(session.state());
            session.pointer_moved(aim);
            if ticks % FIRE_EVERY == 0 {
                session.fire();
            }
            session.step();
            ticks += 1;
        }

        let state = session.state();
        match *ending.borrow() {
            Some(Ending::BossDefeated { time_ms, analytics }) => {
                log::info!("Boss defeated in {}", format_time(time_ms));
                log_analytics(&analytics);
            }
            Some(Ending::GameOver { score }) => {
                log::info!("Game over with {score} kills after {ticks} ticks");
                log_analytics(&state.analytics);
            }
            None => {
                log::info!(
                    "Stopped after {ticks} ticks: phase {:?}, {} kills, {} lives",
                    state.phase,
                    state.score,
                    state.lives
                );
                log_analytics(&state.analytics);
            }
        }
        Ok(())
    }

    fn log_analytics(a: &Analytics) {
        log::info!(
            "Shots {} / hits {} ({:.0}%), asteroids {}, boss hits {}, damage taken {}",
            a.shots_fired,
            a.hits,
            a.accuracy() * 100.0,
            a.asteroids_destroyed,
            a.boss_hits,
            a.damage_taken
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let cli = Cli::try_parse_from(["hero-rocket"]).unwrap();
            assert_eq!(cli.seed, 1);
            assert_eq!(cli.ticks, 18_000);
            assert!(cli.tuning.is_none());
            assert_eq!(cli.quality, QualityPreset::High);
        }

        #[test]
        fn test_cli_rejects_bad_values() {
            assert!(Cli::try_parse_from(["hero-rocket", "--seed", "abc"]).is_err());
            assert!(Cli::try_parse_from(["hero-rocket", "--ticks", "-5"]).is_err());
            assert!(Cli::try_parse_from(["hero-rocket", "--quality", "ultra"]).is_err());
        }

        #[test]
        fn test_cli_parses_options() {
            let cli = Cli::try_parse_from([
                "hero-rocket",
                "--seed",
                "42",
                "--ticks",
                "600",
                "--tuning",
                "balance.json",
                "--quality",
                "low",
            ])
            .unwrap();
            assert_eq!(cli.seed, 42);
            assert_eq!(cli.ticks, 600);
            assert_eq!(cli.tuning, Some(PathBuf::from("balance.json")));
            assert_eq!(cli.quality, QualityPreset::Low);
        }

        #[test]
        fn test_missing_tuning_file_is_an_error() {
            let err = load_tuning(Some(Path::new("/nonexistent/tuning.json"))).unwrap_err();
            assert!(err.to_string().contains("failed reading tuning"));
        }

        #[test]
        fn test_short_run_completes() {
            let cli = Cli::try_parse_from(["hero-rocket", "--seed", "7", "--ticks", "120"]).unwrap();
            assert!(run(cli).is_ok());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = <soak::Cli as clap::Parser>::parse();
    if let Err(e) = soak::run(cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
