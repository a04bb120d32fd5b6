//! Collision tests for the arcade entities
//!
//! Everything here is a plain overlap query on circles, ellipses and boxes;
//! the tick decides what an overlap means.

use glam::Vec2;

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Two circles overlap (strictly closer than the sum of radii)
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, combined_radius: f32) -> bool {
    a.distance_squared(b) < combined_radius * combined_radius
}

/// Point lies inside an axis-aligned ellipse with the given semi-axes
#[inline]
pub fn point_in_ellipse(point: Vec2, center: Vec2, rx: f32, ry: f32) -> bool {
    let d = point - center;
    (d.x * d.x) / (rx * rx) + (d.y * d.y) / (ry * ry) < 1.0
}

/// Point is outside the canvas by more than `margin` on any side
#[inline]
pub fn out_of_bounds(p: Vec2, bounds: Vec2, margin: f32) -> bool {
    p.x < -margin || p.y < -margin || p.x > bounds.x + margin || p.y > bounds.y + margin
}
