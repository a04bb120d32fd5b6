//! Draw-list primitives
//!
//! A [`Frame`] is a flat list of canvas-style commands in canvas pixels.
//! Building one never touches the simulation; replaying one is the backend's job.

use glam::Vec2;

/// Straight RGBA color, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color at a different opacity
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Blend toward `other` by `t`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// CSS `rgba()` string for the 2D context
    pub fn to_css(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({},{},{},{:.3})",
            c(self.r),
            c(self.g),
            c(self.b),
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const ROCKET_BODY: Color = Color::rgb(0.85, 0.9, 1.0);
    pub const ROCKET_TRIM: Color = Color::rgb(0.35, 0.55, 1.0);
    pub const ROCKET_WINDOW: Color = Color::rgb(0.4, 0.85, 1.0);
    pub const THRUST_OUTER: Color = Color::rgb(1.0, 0.55, 0.1);
    pub const THRUST_INNER: Color = Color::rgb(1.0, 0.95, 0.6);
    pub const AIM_GUIDE: Color = Color::rgba(0.6, 0.85, 1.0, 0.5);

    pub const ASTEROID_FILL: Color = Color::rgb(0.32, 0.29, 0.27);
    pub const ASTEROID_EDGE: Color = Color::rgb(0.55, 0.5, 0.46);
    pub const ASTEROID_CRACK: Color = Color::rgb(1.0, 0.55, 0.2);

    pub const LASER: Color = Color::rgb(0.3, 1.0, 0.85);
    pub const LASER_CORE: Color = Color::rgb(0.9, 1.0, 0.98);

    pub const BOSS_HULL: Color = Color::rgb(0.55, 0.58, 0.66);
    pub const BOSS_RIM: Color = Color::rgb(0.35, 0.37, 0.45);
    pub const BOSS_DOME: Color = Color::rgba(0.5, 0.9, 1.0, 0.55);
    pub const BOSS_BEAM: Color = Color::rgba(0.5, 1.0, 0.6, 0.1);
    pub const BOSS_CRACK: Color = Color::rgb(0.12, 0.1, 0.1);
    pub const BOSS_SHOT: Color = Color::rgb(1.0, 0.25, 0.35);
    pub const BOSS_SHOT_CORE: Color = Color::rgb(1.0, 0.85, 0.85);
    /// Rim light cycle
    pub const RIM_LIGHTS: [Color; 3] = [
        Color::rgb(1.0, 0.3, 0.3),
        Color::rgb(1.0, 0.9, 0.3),
        Color::rgb(0.3, 1.0, 0.5),
    ];

    pub const SMOKE: Color = Color::rgb(0.45, 0.45, 0.48);
    pub const SHARD: Color = Color::rgb(0.5, 0.46, 0.42);
    /// Ember palette, indexed by `Particle::color`
    pub const EMBERS: [Color; 6] = [
        Color::rgb(1.0, 0.85, 0.3),
        Color::rgb(1.0, 0.6, 0.15),
        Color::rgb(1.0, 0.4, 0.1),
        Color::rgb(1.0, 0.25, 0.1),
        Color::rgb(1.0, 0.95, 0.7),
        Color::rgb(0.95, 0.5, 0.2),
    ];

    pub const HUD_TEXT: Color = Color::rgba(1.0, 1.0, 1.0, 0.85);
    pub const HUD_DIM: Color = Color::rgba(1.0, 1.0, 1.0, 0.45);
    pub const WARNING: Color = Color::rgb(1.0, 0.2, 0.2);
    pub const HEALTH_BG: Color = Color::rgba(0.0, 0.0, 0.0, 0.5);
    /// Health bar fill by tier
    pub const TIER_COLORS: [Color; 3] = [
        Color::rgb(0.3, 0.9, 0.4),
        Color::rgb(1.0, 0.75, 0.2),
        Color::rgb(1.0, 0.25, 0.25),
    ];
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// One canvas operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Push the transform
    Save,
    /// Pop the transform
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
    },
    /// Soft radial glow fading to transparent at `radius`
    Glow {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        fill: Color,
    },
    /// Closed polygon, filled and/or outlined
    Polygon {
        points: Vec<Vec2>,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    /// Open path
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Rect {
        min: Vec2,
        size: Vec2,
        fill: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Color,
        align: TextAlign,
    },
}

/// A full frame of draw commands
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub size: Vec2,
    pub cmds: Vec<DrawCmd>,
}

impl Frame {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            cmds: Vec::with_capacity(512),
        }
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, fill: Color) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            fill,
        });
    }

    pub fn glow(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCmd::Glow {
            center,
            radius,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Color, align: TextAlign) {
        self.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size,
            color,
            align,
        });
    }

    /// Run `body` with a translated and rotated transform
    pub fn with_transform(&mut self, offset: Vec2, rotation: f32, body: impl FnOnce(&mut Frame)) {
        self.push(DrawCmd::Save);
        self.push(DrawCmd::Translate(offset));
        if rotation != 0.0 {
            self.push(DrawCmd::Rotate(rotation));
        }
        body(self);
        self.push(DrawCmd::Restore);
    }

    /// Text commands, for assertions on the HUD
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Deterministic 0..1 noise from frame time, used for flicker
///
/// Changes every display frame, repeats for the same `(time, salt)`.
pub fn flicker(time_secs: f32, salt: u32) -> f32 {
    let frame = (time_secs * 60.0) as u32;
    let mut h = frame.wrapping_mul(0x9E37_79B1) ^ salt.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65535.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.5).to_css(), "rgba(255,0,128,1.000)");
        assert_eq!(colors::LASER.with_alpha(2.0).a, 1.0);
    }

    #[test]
    fn test_flicker_is_stable_and_bounded() {
        for i in 0..200 {
            let t = i as f32 / 60.0;
            let a = flicker(t, 7);
            assert_eq!(a, flicker(t, 7));
            assert!((0.0..=1.0).contains(&a));
        }
        assert_ne!(flicker(1.0, 1), flicker(1.0, 2));
    }

    #[test]
    fn test_with_transform_balances_save_restore() {
        let mut frame = Frame::new(Vec2::new(100.0, 100.0));
        frame.with_transform(Vec2::ONE, 0.5, |f| f.circle(Vec2::ZERO, 1.0, colors::LASER));
        assert_eq!(frame.cmds.first(), Some(&DrawCmd::Save));
        assert_eq!(frame.cmds.last(), Some(&DrawCmd::Restore));
        assert_eq!(frame.cmds.len(), 5);
    }
}
