//! Polygon generation for asteroid silhouettes

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Vertices of a regular polygon centered on the origin, first vertex on +X
pub fn regular_polygon(radius: f32, points: usize) -> Vec<Vec2> {
    (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * TAU;
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Regular polygon with each vertex pushed in or out for a rocky outline
///
/// Vertices stay within `[0.75, 1.15] * radius` so the collision circle
/// remains a fair fit.
pub fn jagged_polygon<R: Rng>(radius: f32, points: usize, rng: &mut R) -> Vec<Vec2> {
    regular_polygon(radius, points)
        .into_iter()
        .map(|v| v * rng.random_range(0.75..1.15))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_regular_polygon_vertices_on_circle() {
        let verts = regular_polygon(10.0, 6);
        assert_eq!(verts.len(), 6);
        for v in &verts {
            assert!((v.length() - 10.0).abs() < 1e-4);
        }
        assert!((verts[0] - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_jagged_polygon_stays_in_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        let verts = jagged_polygon(20.0, 8, &mut rng);
        assert_eq!(verts.len(), 8);
        for v in &verts {
            let r = v.length();
            assert!((15.0..=23.0).contains(&r), "vertex radius {r} out of band");
        }
    }
}
