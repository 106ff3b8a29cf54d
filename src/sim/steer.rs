//! Steering math: bounds clamping, nearest-entity search, avoidance vectors
//!
//! Positions are top-left anchored; an entity occupies
//! `[pos, pos + 2 * radius]` on both axes. Centers are derived where needed.

use glam::Vec2;
use rand::Rng;

use crate::consts::PLAY_AREA_PADDING;

/// Clamp a scalar into `[min, max]`, tolerating a degenerate range
/// (undersized viewports collapse the range to its lower edge).
#[inline]
pub fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    value.clamp(min, max.max(min))
}

/// Clamp a top-left position so the full ball stays inside the play area.
#[inline]
pub fn clamp_to_bounds(pos: Vec2, radius: f32, bounds: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(
            pos.x,
            PLAY_AREA_PADDING,
            bounds.x - radius * 2.0 - PLAY_AREA_PADDING,
        ),
        clamp_axis(
            pos.y,
            PLAY_AREA_PADDING,
            bounds.y - radius * 2.0 - PLAY_AREA_PADDING,
        ),
    )
}

/// A random direction on the unit circle.
pub fn random_unit(rng: &mut impl Rng) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Uniformly random top-left position for an entity of the given footprint.
pub fn random_spawn_position(rng: &mut impl Rng, bounds: Vec2, footprint: f32) -> Vec2 {
    let max_x = (bounds.x - PLAY_AREA_PADDING * 2.0 - footprint).max(0.0);
    let max_y = (bounds.y - PLAY_AREA_PADDING * 2.0 - footprint).max(0.0);
    Vec2::new(
        PLAY_AREA_PADDING + rng.random_range(0.0..=max_x),
        PLAY_AREA_PADDING + rng.random_range(0.0..=max_y),
    )
}

/// Index and distance of the entity nearest to `from`.
///
/// Ties break toward the first minimum in iteration order.
pub fn nearest_index<T>(from: Vec2, items: &[T], pos_of: impl Fn(&T) -> Vec2) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, item) in items.iter().enumerate() {
        let d = from.distance(pos_of(item));
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best
}

/// Unit vector pointing from the nearest of `positions` toward `from`.
///
/// Zero when there is nothing to avoid or the nearest is coincident.
pub fn avoidance<T>(from: Vec2, items: &[T], pos_of: impl Fn(&T) -> Vec2) -> Vec2 {
    match nearest_index(from, items, &pos_of) {
        Some((idx, dist)) if dist > 0.0 => (from - pos_of(&items[idx])) / dist,
        _ => Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clamp_keeps_ball_inside() {
        let bounds = Vec2::new(800.0, 600.0);
        let clamped = clamp_to_bounds(Vec2::new(-50.0, 900.0), 8.0, bounds);
        assert_eq!(clamped.x, PLAY_AREA_PADDING);
        assert_eq!(clamped.y, 600.0 - 16.0 - PLAY_AREA_PADDING);
    }

    #[test]
    fn test_clamp_degenerate_bounds() {
        // Viewport smaller than the ball must not panic or go negative-range
        let clamped = clamp_to_bounds(Vec2::new(5.0, 5.0), 8.0, Vec2::new(12.0, 12.0));
        assert_eq!(clamped, Vec2::splat(PLAY_AREA_PADDING));
    }

    #[test]
    fn test_random_unit_has_unit_length() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..16 {
            let v = random_unit(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_nearest_ties_break_on_first() {
        let points = [Vec2::new(10.0, 0.0), Vec2::new(-10.0, 0.0), Vec2::new(0.0, 10.0)];
        let (idx, dist) = nearest_index(Vec2::ZERO, &points, |p| *p).unwrap();
        assert_eq!(idx, 0);
        assert!((dist - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_avoidance_points_away_from_nearest() {
        let enemies = [Vec2::new(0.0, -5.0), Vec2::new(100.0, 100.0)];
        let away = avoidance(Vec2::ZERO, &enemies, |p| *p);
        assert!((away - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_avoidance_zero_cases() {
        let empty: [Vec2; 0] = [];
        assert_eq!(avoidance(Vec2::ZERO, &empty, |p| *p), Vec2::ZERO);
        let coincident = [Vec2::ZERO];
        assert_eq!(avoidance(Vec2::ZERO, &coincident, |p| *p), Vec2::ZERO);
    }
}
