//! Clipping of arbitrary shapes against the active bound and triangulation of the visible
//! remainder.
//!
//! Subjects are triangulated first (ear clipping for arbitrary simple
//! polygons, band quads for rings), then every subject triangle is clipped
//! against the convex pieces of the bound outline with Sutherland-Hodgman and
//! fanned back into triangles. Concave bounds are split into triangles once,
//! when the clip cache is rebuilt.

use std::f32::consts::PI;

use arena_ai_core::{ortho_left, ortho_right, Angle, Triangle};
use glam::Vec2;

use crate::{curve, ShapeBounds};

const AREA_EPSILON: f32 = 1e-6;

/// Signed area of a polygon; positive for counter-clockwise winding.
#[must_use]
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    let count = polygon.len();
    if count < 3 {
        return 0.0;
    }
    let doubled: f32 = (0..count)
        .map(|index| {
            let next = polygon[(index + 1) % count];
            polygon[index].perp_dot(next)
        })
        .sum();
    doubled * 0.5
}

/// Reports whether a polygon is convex, ignoring collinear vertices.
#[must_use]
pub fn is_convex(polygon: &[Vec2]) -> bool {
    let count = polygon.len();
    if count < 3 {
        return false;
    }

    let mut sign = 0.0_f32;
    for index in 0..count {
        let a = polygon[index];
        let b = polygon[(index + 1) % count];
        let c = polygon[(index + 2) % count];
        let cross = (b - a).perp_dot(c - b);
        if cross.abs() <= AREA_EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Splits a bound outline into counter-clockwise convex pieces.
pub(crate) fn convex_pieces(polygon: &[Vec2]) -> Vec<Vec<Vec2>> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    if is_convex(polygon) {
        let mut piece = polygon.to_vec();
        if signed_area(&piece) < 0.0 {
            piece.reverse();
        }
        return vec![piece];
    }

    triangulate(polygon)
        .into_iter()
        .map(|triangle| vec![triangle.a, triangle.b, triangle.c])
        .collect()
}

/// Ear-clipping triangulation of a simple polygon in either winding.
///
/// Output triangles are counter-clockwise. Degenerate or self-intersecting
/// input yields whatever ears could be clipped before progress stopped.
#[must_use]
pub fn triangulate(polygon: &[Vec2]) -> Vec<Triangle> {
    let mut points: Vec<Vec2> = Vec::with_capacity(polygon.len());
    for &point in polygon {
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        let _ = points.pop();
    }
    if points.len() < 3 {
        return Vec::new();
    }

    let area = signed_area(&points);
    if area.abs() <= AREA_EPSILON {
        return Vec::new();
    }
    if area < 0.0 {
        points.reverse();
    }

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    while remaining.len() > 3 {
        let count = remaining.len();
        let mut progressed = false;

        for index in 0..count {
            let previous = points[remaining[(index + count - 1) % count]];
            let current = points[remaining[index]];
            let next = points[remaining[(index + 1) % count]];
            let cross = (current - previous).perp_dot(next - current);

            if cross.abs() <= AREA_EPSILON {
                let _ = remaining.remove(index);
                progressed = true;
                break;
            }
            if cross < 0.0 {
                continue;
            }

            let blocked = remaining.iter().any(|&other| {
                let point = points[other];
                point != previous
                    && point != current
                    && point != next
                    && point_in_triangle(point, previous, current, next)
            });
            if blocked {
                continue;
            }

            triangles.push(Triangle::new(previous, current, next));
            let _ = remaining.remove(index);
            progressed = true;
            break;
        }

        if !progressed {
            break;
        }
    }

    if let [a, b, c] = remaining[..] {
        let triangle = Triangle::new(points[a], points[b], points[c]);
        if triangle.area() > AREA_EPSILON {
            triangles.push(triangle);
        }
    }
    triangles
}

fn point_in_triangle(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let ab = (b - a).perp_dot(point - a);
    let bc = (c - b).perp_dot(point - b);
    let ca = (a - c).perp_dot(point - c);
    ab >= 0.0 && bc >= 0.0 && ca >= 0.0
}

/// Sutherland-Hodgman clip of `subject` against a counter-clockwise convex polygon.
fn clip_convex(subject: &[Vec2], clip: &[Vec2]) -> Vec<Vec2> {
    let mut output = subject.to_vec();
    let count = clip.len();

    for index in 0..count {
        if output.is_empty() {
            break;
        }

        let edge_start = clip[index];
        let edge = clip[(index + 1) % count] - edge_start;
        let side = |point: Vec2| edge.perp_dot(point - edge_start);

        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];
        for &current in &input {
            let current_side = side(current);
            let previous_side = side(previous);
            if current_side >= 0.0 {
                if previous_side < 0.0 {
                    output.push(crossing(previous, current, previous_side, current_side));
                }
                output.push(current);
            } else if previous_side >= 0.0 {
                output.push(crossing(previous, current, previous_side, current_side));
            }
            previous = current;
        }
    }
    output
}

fn crossing(from: Vec2, to: Vec2, from_side: f32, to_side: f32) -> Vec2 {
    let t = from_side / (from_side - to_side);
    from + (to - from) * t
}

fn fan(polygon: &[Vec2], out: &mut Vec<Triangle>) {
    let Some((&apex, rest)) = polygon.split_first() else {
        return;
    };
    for pair in rest.windows(2) {
        let triangle = Triangle::new(apex, pair[0], pair[1]);
        if triangle.area() > AREA_EPSILON {
            out.push(triangle);
        }
    }
}

impl ShapeBounds {
    /// Clips already-triangulated geometry against the bound.
    #[must_use]
    pub fn clip_triangles(&self, triangles: &[Triangle]) -> Vec<Triangle> {
        let mut result = Vec::with_capacity(triangles.len());
        for triangle in triangles {
            let subject = [triangle.a, triangle.b, triangle.c];
            for piece in self.convex_pieces() {
                fan(&clip_convex(&subject, piece), &mut result);
            }
        }
        result
    }

    /// Clips an arbitrary closed point sequence against the bound and triangulates the
    /// intersection.
    #[must_use]
    pub fn clip_and_triangulate(&self, polygon: &[Vec2]) -> Vec<Triangle> {
        self.clip_triangles(&triangulate(polygon))
    }

    /// Clips a circle, cone, donut, or donut sector.
    ///
    /// Inverted or negative radii and non-positive half angles produce nothing;
    /// half angles of a half turn or more describe the full ring.
    #[must_use]
    pub fn clip_and_triangulate_cone(
        &self,
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        center_direction: Angle,
        half_angle: Angle,
    ) -> Vec<Triangle> {
        if !(inner_radius < outer_radius) || inner_radius < 0.0 || half_angle.radians() <= 0.0 {
            return Vec::new();
        }

        let error = self.max_approx_error();
        let full_circle = half_angle.radians() >= PI;
        let from = center_direction - half_angle;
        let to = center_direction + half_angle;
        match (inner_radius > 0.0, full_circle) {
            (false, false) => self.clip_and_triangulate(&curve::circle_sector(
                center,
                outer_radius,
                from,
                to,
                error,
            )),
            (false, true) => self.clip_and_triangulate_circle(center, outer_radius),
            (true, false) => self.clip_triangles(&curve::donut_sector(
                center,
                inner_radius,
                outer_radius,
                from,
                to,
                error,
            )),
            (true, true) => self.clip_and_triangulate_donut(center, inner_radius, outer_radius),
        }
    }

    /// Clips a circle.
    #[must_use]
    pub fn clip_and_triangulate_circle(&self, center: Vec2, radius: f32) -> Vec<Triangle> {
        self.clip_and_triangulate(&curve::circle(center, radius, self.max_approx_error()))
    }

    /// Clips a full ring.
    #[must_use]
    pub fn clip_and_triangulate_donut(
        &self,
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
    ) -> Vec<Triangle> {
        if !(inner_radius < outer_radius) || inner_radius < 0.0 {
            return Vec::new();
        }
        self.clip_triangles(&curve::donut(
            center,
            inner_radius,
            outer_radius,
            self.max_approx_error(),
        ))
    }

    /// Clips a single triangle.
    #[must_use]
    pub fn clip_and_triangulate_tri(&self, a: Vec2, b: Vec2, c: Vec2) -> Vec<Triangle> {
        self.clip_and_triangulate(&[a, b, c])
    }

    /// Clips an isosceles triangle given its apex, height vector and half base vector.
    #[must_use]
    pub fn clip_and_triangulate_isosceles_tri(
        &self,
        apex: Vec2,
        height: Vec2,
        half_base: Vec2,
    ) -> Vec<Triangle> {
        self.clip_and_triangulate_tri(apex, apex + height + half_base, apex + height - half_base)
    }

    /// Clips an isosceles triangle given its apex, facing, half apex angle and height.
    #[must_use]
    pub fn clip_and_triangulate_isosceles_tri_facing(
        &self,
        apex: Vec2,
        direction: Angle,
        half_angle: Angle,
        height: f32,
    ) -> Vec<Triangle> {
        let forward = direction.to_direction();
        self.clip_and_triangulate_isosceles_tri(
            apex,
            forward * height,
            ortho_left(forward) * (height * half_angle.tan()),
        )
    }

    /// Clips a rectangle extending `len_front` ahead of and `len_back` behind `origin`.
    #[must_use]
    pub fn clip_and_triangulate_rect(
        &self,
        origin: Vec2,
        direction: Vec2,
        len_front: f32,
        len_back: f32,
        half_width: f32,
    ) -> Vec<Triangle> {
        let side = ortho_right(direction) * half_width;
        let front = origin + direction * len_front;
        let back = origin - direction * len_back;
        self.clip_and_triangulate(&[front + side, front - side, back - side, back + side])
    }

    /// Clips a rectangle spanning from `start` to `end`.
    #[must_use]
    pub fn clip_and_triangulate_rect_between(
        &self,
        start: Vec2,
        end: Vec2,
        half_width: f32,
    ) -> Vec<Triangle> {
        let Some(direction) = (end - start).try_normalize() else {
            return Vec::new();
        };
        let side = ortho_right(direction) * half_width;
        self.clip_and_triangulate(&[start + side, start - side, end - side, end + side])
    }
}
