//! Heads-up display: clock, kills, lives, boss status

use glam::Vec2;

use super::frame::{DrawCmd, Frame, TextAlign, colors};
use super::scene::RenderOptions;
use crate::leaderboard::format_hud_time;
use crate::sim::state::{Boss, GamePhase, GameState};

const MARGIN: f32 = 16.0;
const BAR_WIDTH: f32 = 240.0;
const BAR_HEIGHT: f32 = 8.0;

pub fn draw_hud(frame: &mut Frame, state: &GameState, time_secs: f32, opts: &RenderOptions) {
    let w = state.bounds.x;

    frame.text(
        Vec2::new(MARGIN, MARGIN + 14.0),
        format_hud_time(state.elapsed_ms()),
        18.0,
        colors::HUD_TEXT,
        TextAlign::Left,
    );
    frame.text(
        Vec2::new(MARGIN, MARGIN + 34.0),
        format!("KILLS {}", state.score),
        13.0,
        colors::HUD_DIM,
        TextAlign::Left,
    );

    for i in 0..state.lives {
        let c = Vec2::new(w - MARGIN - 8.0 - i as f32 * 20.0, MARGIN + 8.0);
        frame.push(DrawCmd::Polygon {
            points: vec![c + Vec2::new(0.0, -8.0), c + Vec2::new(6.0, 7.0), c + Vec2::new(-6.0, 7.0)],
            fill: Some(colors::ROCKET_BODY),
            stroke: None,
        });
    }

    match state.phase {
        GamePhase::Normal => {
            if let Some(left) = state.kills_until_boss().filter(|n| *n > 0) {
                frame.text(
                    Vec2::new(MARGIN, MARGIN + 52.0),
                    format!("BOSS IN {left}"),
                    13.0,
                    colors::HUD_DIM,
                    TextAlign::Left,
                );
            }
        }
        GamePhase::Warning => {
            // Blink at 4 Hz unless flashes are off
            let on = !opts.flashes || (time_secs * 4.0) as u32 % 2 == 0;
            if on {
                frame.text(
                    Vec2::new(w / 2.0, state.bounds.y * 0.3),
                    "WARNING",
                    36.0,
                    colors::WARNING,
                    TextAlign::Center,
                );
                frame.text(
                    Vec2::new(w / 2.0, state.bounds.y * 0.3 + 28.0),
                    "BOSS APPROACHING",
                    14.0,
                    colors::WARNING.with_alpha(0.8),
                    TextAlign::Center,
                );
            }
        }
        GamePhase::Boss => {
            if let Some(boss) = &state.boss {
                draw_boss_status(frame, boss, w);
            }
        }
    }
}

/// Health bar with a three-dot tier indicator underneath
fn draw_boss_status(frame: &mut Frame, boss: &Boss, width: f32) {
    let min = Vec2::new((width - BAR_WIDTH) / 2.0, MARGIN);
    let fill = colors::TIER_COLORS[(boss.tier.clamp(1, 3) - 1) as usize];
    frame.push(DrawCmd::Rect {
        min,
        size: Vec2::new(BAR_WIDTH, BAR_HEIGHT),
        fill: colors::HEALTH_BG,
    });
    frame.push(DrawCmd::Rect {
        min,
        size: Vec2::new(BAR_WIDTH * boss.health_fraction(), BAR_HEIGHT),
        fill,
    });

    for dot in 1..=3u8 {
        let c = Vec2::new(width / 2.0 + (dot as f32 - 2.0) * 14.0, MARGIN + BAR_HEIGHT + 10.0);
        let color = if dot <= boss.tier { fill } else { colors::HUD_DIM };
        frame.circle(c, 4.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::renderer::build_frame;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_hud_shows_clock_and_countdown() {
        let mut state = GameState::new(1, BOUNDS);
        state.elapsed_ticks = 60 * 83;
        state.score = 4;
        let frame = build_frame(&state, 0.0, &RenderOptions::default());
        let texts: Vec<&str> = frame.texts().collect();
        assert!(texts.contains(&"1:23.0"));
        assert!(texts.contains(&"KILLS 4"));
        assert!(texts.contains(&"BOSS IN 6"));
    }

    #[test]
    fn test_countdown_hidden_once_boss_appeared() {
        let mut state = GameState::new(1, BOUNDS);
        state.boss = Some(Boss::new(BOUNDS, BOSS_HP));
        state.phase = GamePhase::Boss;
        state.boss_appeared = true;
        let frame = build_frame(&state, 0.0, &RenderOptions::default());
        assert!(frame.texts().all(|t| !t.starts_with("BOSS IN")));
        // Bar background, bar fill
        let rects = frame
            .cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Rect { .. }))
            .count();
        assert_eq!(rects, 2);

        // Still hidden after the boss is gone
        state.boss = None;
        state.phase = GamePhase::Normal;
        state.boss_defeated = true;
        let frame = build_frame(&state, 0.0, &RenderOptions::default());
        assert!(frame.texts().all(|t| !t.starts_with("BOSS IN")));
    }

    #[test]
    fn test_warning_blinks_unless_reduced_motion() {
        let mut state = GameState::new(1, BOUNDS);
        state.phase = GamePhase::Warning;
        let shown = build_frame(&state, 0.0, &RenderOptions::default());
        let hidden = build_frame(&state, 0.3, &RenderOptions::default());
        assert!(shown.texts().any(|t| t == "WARNING"));
        assert!(hidden.texts().all(|t| t != "WARNING"));

        let steady = RenderOptions {
            flashes: false,
            ..Default::default()
        };
        assert!(build_frame(&state, 0.3, &steady).texts().any(|t| t == "WARNING"));
    }
}
