//! Polygonal approximation of curved outlines within a chordal error budget.

use std::f32::consts::{FRAC_PI_2, TAU};

use arena_ai_core::{Angle, Triangle};
use glam::Vec2;

/// Maximum on-screen deviation, in pixels, tolerated between a curve and its approximation.
pub const SCREEN_ERROR: f32 = 0.3;

/// Upper bound on the number of segments used for a single curve.
pub const MAX_SEGMENTS: usize = 512;

/// Number of chords needed so an arc of `angular_length` stays within `max_error` of the true
/// curve.
///
/// Non-positive error budgets fall back to [`MAX_SEGMENTS`]; every arc gets at
/// least one chord per quarter turn.
#[must_use]
pub fn segments(radius: f32, angular_length: f32, max_error: f32) -> usize {
    if !(radius > 0.0) || !(angular_length > 0.0) {
        return 1;
    }

    let minimum = (angular_length / FRAC_PI_2).ceil().max(1.0);
    if !(max_error > 0.0) || !max_error.is_finite() {
        return MAX_SEGMENTS;
    }

    let max_half_angle = (1.0 - max_error / radius).clamp(-1.0, 1.0).acos();
    let required = (angular_length / (2.0 * max_half_angle)).ceil();
    required.max(minimum).min(MAX_SEGMENTS as f32) as usize
}

/// Points along an arc from `from` to `to`, both endpoints included.
#[must_use]
pub fn arc_with_segments(
    center: Vec2,
    radius: f32,
    from: Angle,
    to: Angle,
    segments: usize,
) -> Vec<Vec2> {
    let segments = segments.max(1);
    let step = (to.radians() - from.radians()) / segments as f32;
    (0..=segments)
        .map(|index| {
            let angle = Angle::from_radians(from.radians() + step * index as f32);
            center + angle.to_direction() * radius
        })
        .collect()
}

/// Points along an arc from `from` to `to` within the error budget, both endpoints included.
#[must_use]
pub fn arc(center: Vec2, radius: f32, from: Angle, to: Angle, max_error: f32) -> Vec<Vec2> {
    let length = (to.radians() - from.radians()).abs();
    arc_with_segments(
        center,
        radius,
        from,
        to,
        segments(radius, length, max_error),
    )
}

/// Closed circle outline without a repeated final vertex; empty for non-positive radii.
#[must_use]
pub fn circle(center: Vec2, radius: f32, max_error: f32) -> Vec<Vec2> {
    if !(radius > 0.0) {
        return Vec::new();
    }

    let mut points = arc(
        center,
        radius,
        Angle::default(),
        Angle::from_radians(TAU),
        max_error,
    );
    let _ = points.pop();
    points
}

/// Pie slice outline: the apex followed by the arc.
#[must_use]
pub fn circle_sector(
    center: Vec2,
    radius: f32,
    from: Angle,
    to: Angle,
    max_error: f32,
) -> Vec<Vec2> {
    if !(radius > 0.0) {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(16);
    points.push(center);
    points.extend(arc(center, radius, from, to, max_error));
    points
}

/// Triangles covering the annulus segment between `inner` and `outer` radii.
///
/// Inner and outer arcs share the chord count of the outer arc so that each
/// band quad splits into two triangles.
#[must_use]
pub fn donut_sector(
    center: Vec2,
    inner: f32,
    outer: f32,
    from: Angle,
    to: Angle,
    max_error: f32,
) -> Vec<Triangle> {
    if !(inner >= 0.0) || !(outer > inner) {
        return Vec::new();
    }

    let length = (to.radians() - from.radians()).abs();
    let count = segments(outer, length, max_error);
    let outer_arc = arc_with_segments(center, outer, from, to, count);
    let inner_arc = arc_with_segments(center, inner, from, to, count);

    let mut triangles = Vec::with_capacity(count * 2);
    for index in 0..count {
        let (o0, o1) = (outer_arc[index], outer_arc[index + 1]);
        let (i0, i1) = (inner_arc[index], inner_arc[index + 1]);
        triangles.push(Triangle::new(o0, o1, i1));
        if inner > 0.0 {
            triangles.push(Triangle::new(o0, i1, i0));
        }
    }
    triangles
}

/// Triangles covering a full annulus.
#[must_use]
pub fn donut(center: Vec2, inner: f32, outer: f32, max_error: f32) -> Vec<Triangle> {
    donut_sector(
        center,
        inner,
        outer,
        Angle::default(),
        Angle::from_radians(TAU),
        max_error,
    )
}

#[cfg(test)]
mod tests {
    use super::{circle, donut, segments, MAX_SEGMENTS};
    use glam::Vec2;
    use std::f32::consts::TAU;

    #[test]
    fn approximation_stays_within_error_budget() {
        let radius = 10.0;
        let error = 0.05;
        let points = circle(Vec2::ZERO, radius, error);
        for (index, point) in points.iter().enumerate() {
            let next = points[(index + 1) % points.len()];
            let midpoint = (*point + next) * 0.5;
            assert!(
                radius - midpoint.length() <= error + 1e-4,
                "chord {index} deviates by {}",
                radius - midpoint.length()
            );
        }
    }

    #[test]
    fn segment_count_has_floor_and_ceiling() {
        assert_eq!(segments(10.0, TAU, 100.0), 4);
        assert_eq!(segments(10.0, TAU, 0.0), MAX_SEGMENTS);
        assert_eq!(segments(1.0e6, TAU, 1.0e-6), MAX_SEGMENTS);
        assert_eq!(segments(-1.0, TAU, 0.1), 1);
    }

    #[test]
    fn degenerate_donut_produces_nothing() {
        assert!(donut(Vec2::ZERO, 5.0, 5.0, 0.1).is_empty());
        assert!(donut(Vec2::ZERO, -1.0, 5.0, 0.1).is_empty());
        assert!(circle(Vec2::ZERO, 0.0, 0.1).is_empty());
    }

    #[test]
    fn donut_area_approaches_annulus_area() {
        let area: f32 = donut(Vec2::ZERO, 2.0, 4.0, 0.001)
            .iter()
            .map(|triangle| triangle.area())
            .sum();
        let expected = std::f32::consts::PI * (16.0 - 4.0);
        assert!((area - expected).abs() / expected < 0.01, "area {area}");
    }
}
