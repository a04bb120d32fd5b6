//! Decorative on-screen targets (hero headline glyphs)
//!
//! Purely presentational: a laser that touches a glyph is consumed and the
//! glyph is flung away, but nothing here feeds score or terminal state.

use glam::Vec2;

use super::collision::Rect;

/// A glyph that can still be hit, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorTarget {
    pub id: usize,
    pub rect: Rect,
}

/// Host-provided access to decorative glyphs
pub trait DecorTargets {
    /// Glyphs that have not been hit yet
    fn live_targets(&self) -> Vec<DecorTarget>;
    /// Mark a glyph as hit; `impulse` is the laser velocity for the fling effect
    fn mark_hit(&mut self, id: usize, impulse: Vec2);
}

/// No decorative layer
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDecor;

impl DecorTargets for NoDecor {
    fn live_targets(&self) -> Vec<DecorTarget> {
        Vec::new()
    }

    fn mark_hit(&mut self, _id: usize, _impulse: Vec2) {}
}

/// In-memory glyph set, used headless and in tests
#[derive(Debug, Default, Clone)]
pub struct StaticDecor {
    pub targets: Vec<DecorTarget>,
    pub hits: Vec<(usize, Vec2)>,
}

impl StaticDecor {
    pub fn new(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self {
            targets: rects
                .into_iter()
                .enumerate()
                .map(|(id, rect)| DecorTarget { id, rect })
                .collect(),
            hits: Vec::new(),
        }
    }
}

impl DecorTargets for StaticDecor {
    fn live_targets(&self) -> Vec<DecorTarget> {
        self.targets
            .iter()
            .filter(|t| !self.hits.iter().any(|(id, _)| *id == t.id))
            .copied()
            .collect()
    }

    fn mark_hit(&mut self, id: usize, impulse: Vec2) {
        self.hits.push((id, impulse));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_decor_hides_hit_targets() {
        let mut decor = StaticDecor::new([
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(20.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(decor.live_targets().len(), 2);
        decor.mark_hit(0, Vec2::X);
        let live = decor.live_targets();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, 1);
    }
}
