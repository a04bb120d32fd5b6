//! Canvas 2D backend
//!
//! Replays a [`Frame`] onto a `CanvasRenderingContext2d`. Drawing errors are
//! ignored: a dropped primitive is preferable to a stalled frame loop.

use std::f64::consts::TAU;

use glam::Vec2;
use web_sys::CanvasRenderingContext2d;

use super::frame::{Color, DrawCmd, Frame};

/// Canvas-backed renderer for one overlay
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Clear the overlay and draw `frame`
    pub fn render(&self, frame: &Frame) {
        let ctx = &self.ctx;
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        ctx.clear_rect(0.0, 0.0, frame.size.x as f64, frame.size.y as f64);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        for cmd in &frame.cmds {
            self.draw(cmd);
        }
    }

    fn draw(&self, cmd: &DrawCmd) {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Save => ctx.save(),
            DrawCmd::Restore => ctx.restore(),
            DrawCmd::Translate(v) => {
                ctx.translate(v.x as f64, v.y as f64).ok();
            }
            DrawCmd::Rotate(a) => {
                ctx.rotate(*a as f64).ok();
            }
            DrawCmd::Circle {
                center,
                radius,
                fill,
            } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
                    .ok();
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill();
            }
            DrawCmd::Glow {
                center,
                radius,
                color,
            } => self.glow(*center, *radius, *color),
            DrawCmd::StrokeCircle {
                center,
                radius,
                width,
                color,
            } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
                    .ok();
                ctx.set_line_width(*width as f64);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.stroke();
            }
            DrawCmd::Ellipse {
                center,
                radii,
                fill,
            } => {
                ctx.begin_path();
                ctx.ellipse(
                    center.x as f64,
                    center.y as f64,
                    radii.x.max(0.0) as f64,
                    radii.y.max(0.0) as f64,
                    0.0,
                    0.0,
                    TAU,
                )
                .ok();
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill();
            }
            DrawCmd::Polygon {
                points,
                fill,
                stroke,
            } => {
                if !self.trace(points) {
                    return;
                }
                ctx.close_path();
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.fill();
                }
                if let Some((color, width)) = stroke {
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&color.to_css());
                    ctx.stroke();
                }
            }
            DrawCmd::Polyline {
                points,
                width,
                color,
            } => {
                if self.trace(points) {
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&color.to_css());
                    ctx.stroke();
                }
            }
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => {
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.set_line_width(*width as f64);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.stroke();
            }
            DrawCmd::Rect { min, size, fill } => {
                ctx.set_fill_style_str(&fill.to_css());
                ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
            }
            DrawCmd::Text {
                pos,
                text,
                size,
                color,
                align,
            } => {
                ctx.set_font(&format!("bold {size}px ui-monospace, monospace"));
                ctx.set_text_align(align.as_css());
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
            }
        }
    }

    /// Begin a path through `points`; false when there is nothing to draw
    fn trace(&self, points: &[Vec2]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        true
    }

    fn glow(&self, center: Vec2, radius: f32, color: Color) {
        let ctx = &self.ctx;
        let (x, y, r) = (center.x as f64, center.y as f64, radius.max(0.1) as f64);
        let Ok(gradient) = ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
            return;
        };
        gradient.add_color_stop(0.0, &color.to_css()).ok();
        gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css()).ok();
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.begin_path();
        ctx.arc(x, y, r, 0.0, TAU).ok();
        ctx.fill();
    }
}
