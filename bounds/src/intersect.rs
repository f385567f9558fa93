//! Ray and segment intersection primitives.
//!
//! Every ray query returns the parameter `t` such that `origin + direction * t`
//! lies on the boundary; with a unit direction this is the distance. Rays that
//! start inside a closed shape report the exit point.

use arena_ai_core::ortho_left;
use glam::Vec2;

/// Sentinel distance returned when a ray misses.
pub const NO_INTERSECTION: f32 = f32::MAX;

const PARALLEL_EPSILON: f32 = 1e-9;

/// Smallest non-negative ray parameter hitting the circle.
#[must_use]
pub fn ray_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> f32 {
    let a = direction.length_squared();
    if a <= PARALLEL_EPSILON || radius < 0.0 {
        return NO_INTERSECTION;
    }

    let offset = origin - center;
    let half_b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return NO_INTERSECTION;
    }

    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    if near >= 0.0 {
        return near;
    }
    let far = (-half_b + root) / a;
    if far >= 0.0 {
        far
    } else {
        NO_INTERSECTION
    }
}

/// Smallest non-negative ray parameter hitting a rectangle.
///
/// `forward` is the unit local Z axis; `half_width` extends along its left
/// orthogonal and `half_height` along `forward` itself.
#[must_use]
pub fn ray_rect(
    origin: Vec2,
    direction: Vec2,
    center: Vec2,
    forward: Vec2,
    half_width: f32,
    half_height: f32,
) -> f32 {
    let side = ortho_left(forward);
    let offset = origin - center;
    let slabs = [
        (offset.dot(side), direction.dot(side), half_width),
        (offset.dot(forward), direction.dot(forward), half_height),
    ];

    let mut enter = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;
    for (position, speed, half) in slabs {
        if speed.abs() <= PARALLEL_EPSILON {
            if position.abs() > half {
                return NO_INTERSECTION;
            }
            continue;
        }
        let t0 = (-half - position) / speed;
        let t1 = (half - position) / speed;
        enter = enter.max(t0.min(t1));
        exit = exit.min(t0.max(t1));
    }

    if enter > exit || exit < 0.0 || !exit.is_finite() {
        NO_INTERSECTION
    } else if enter >= 0.0 {
        enter
    } else {
        exit
    }
}

/// Ray parameter hitting the segment from `a` to `b`, if any.
#[must_use]
pub fn ray_segment(origin: Vec2, direction: Vec2, a: Vec2, b: Vec2) -> f32 {
    let edge = b - a;
    let denominator = direction.perp_dot(edge);
    if denominator.abs() <= PARALLEL_EPSILON {
        return NO_INTERSECTION;
    }

    let to_start = a - origin;
    let t = to_start.perp_dot(edge) / denominator;
    let s = to_start.perp_dot(direction) / denominator;
    if t >= 0.0 && (0.0..=1.0).contains(&s) {
        t
    } else {
        NO_INTERSECTION
    }
}

/// Minimum ray parameter over every polygon edge.
#[must_use]
pub fn ray_polygon(origin: Vec2, direction: Vec2, vertices: &[Vec2]) -> f32 {
    let count = vertices.len();
    (0..count)
        .map(|index| {
            let next = vertices[(index + 1) % count];
            ray_segment(origin, direction, vertices[index], next)
        })
        .fold(NO_INTERSECTION, f32::min)
}

/// Point on the segment from `a` to `b` closest to `point`.
#[must_use]
pub fn closest_point_on_segment(a: Vec2, b: Vec2, point: Vec2) -> Vec2 {
    let edge = b - a;
    let length_squared = edge.length_squared();
    if length_squared <= PARALLEL_EPSILON {
        return a;
    }
    let t = ((point - a).dot(edge) / length_squared).clamp(0.0, 1.0);
    a + edge * t
}

#[cfg(test)]
mod tests {
    use super::{
        closest_point_on_segment, ray_circle, ray_polygon, ray_rect, ray_segment, NO_INTERSECTION,
    };
    use glam::Vec2;

    #[test]
    fn ray_from_inside_circle_reports_exit() {
        let t = ray_circle(Vec2::ZERO, Vec2::X, Vec2::ZERO, 5.0);
        assert!((t - 5.0).abs() < 1e-5);
        let t = ray_circle(Vec2::new(-10.0, 0.0), Vec2::X, Vec2::ZERO, 5.0);
        assert!((t - 5.0).abs() < 1e-5);
        let behind = ray_circle(Vec2::new(-10.0, 0.0), -Vec2::X, Vec2::ZERO, 5.0);
        assert_eq!(behind, NO_INTERSECTION);
        let still = ray_circle(Vec2::ZERO, Vec2::ZERO, Vec2::ZERO, 5.0);
        assert_eq!(still, NO_INTERSECTION);
    }

    #[test]
    fn ray_rect_uses_local_axes() {
        // Facing +X: the 10 unit half height now runs along world X.
        let forward = Vec2::X;
        let t = ray_rect(Vec2::ZERO, Vec2::X, Vec2::ZERO, forward, 2.0, 10.0);
        assert!((t - 10.0).abs() < 1e-5);
        let t = ray_rect(Vec2::ZERO, Vec2::Y, Vec2::ZERO, forward, 2.0, 10.0);
        assert!((t - 2.0).abs() < 1e-5);
        let outside = Vec2::new(-20.0, 0.0);
        let t = ray_rect(outside, Vec2::X, Vec2::ZERO, forward, 2.0, 10.0);
        assert!((t - 10.0).abs() < 1e-5);
        assert_eq!(
            ray_rect(Vec2::new(0.0, 5.0), Vec2::X, Vec2::ZERO, forward, 2.0, 10.0),
            NO_INTERSECTION
        );
    }

    #[test]
    fn segment_hits_respect_extent() {
        let a = Vec2::new(3.0, -1.0);
        let b = Vec2::new(3.0, 1.0);
        assert!((ray_segment(Vec2::ZERO, Vec2::X, a, b) - 3.0).abs() < 1e-5);
        let above = Vec2::new(0.0, 2.0);
        assert_eq!(ray_segment(above, Vec2::X, a, b), NO_INTERSECTION);
        assert_eq!(ray_segment(Vec2::ZERO, Vec2::Y, a, b), NO_INTERSECTION);
    }

    #[test]
    fn polygon_takes_nearest_edge() {
        let square = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(4.0, -1.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        let t = ray_polygon(Vec2::ZERO, Vec2::X, &square);
        assert!((t - 4.0).abs() < 1e-5);
        let t = ray_polygon(Vec2::ZERO, -Vec2::Y, &square);
        assert!((t - 1.0).abs() < 1e-5);
        assert_eq!(ray_polygon(Vec2::ZERO, Vec2::X, &[]), NO_INTERSECTION);
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(4.0, 0.0);
        assert_eq!(
            closest_point_on_segment(a, b, Vec2::new(2.0, 3.0)),
            Vec2::new(2.0, 0.0)
        );
        assert_eq!(closest_point_on_segment(a, b, Vec2::new(9.0, 3.0)), b);
        assert_eq!(closest_point_on_segment(a, a, Vec2::new(9.0, 3.0)), a);
    }
}
