//! Signed distance functions for hazard shapes.
//!
//! Every function returns a boxed closure that is negative inside the shape,
//! zero on its boundary and positive outside. Malformed parameters produce a
//! closure that reports every point as infinitely far away.

use std::f32::consts::{FRAC_PI_2, PI};

use arena_ai_core::{ortho_left, ortho_right, shape, Angle};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position-to-signed-distance function; negative values lie inside the shape.
pub type ShapeDistance = Box<dyn Fn(Vec2) -> f32>;

fn never() -> ShapeDistance {
    Box::new(|_| f32::MAX)
}

/// Area-of-effect shape positioned by an origin and a facing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AoeShape {
    /// Disc around the origin.
    Circle {
        /// Radius in world units.
        radius: f32,
    },
    /// Ring around the origin.
    Donut {
        /// Radius of the safe inner hole.
        inner_radius: f32,
        /// Outer radius.
        outer_radius: f32,
    },
    /// Circular sector centered on the facing.
    Cone {
        /// Radius in world units.
        radius: f32,
        /// Half of the opening angle.
        half_angle: Angle,
    },
    /// Ring sector centered on the facing.
    DonutSector {
        /// Radius of the safe inner hole.
        inner_radius: f32,
        /// Outer radius.
        outer_radius: f32,
        /// Half of the opening angle.
        half_angle: Angle,
    },
    /// Rectangle extending along the facing.
    Rect {
        /// Length ahead of the origin.
        length_front: f32,
        /// Length behind the origin.
        #[serde(default)]
        length_back: f32,
        /// Half of the width.
        half_width: f32,
    },
    /// Two perpendicular bars crossing at the origin.
    Cross {
        /// Length of each arm from the origin.
        length: f32,
        /// Half of the bar width.
        half_width: f32,
    },
}

impl AoeShape {
    /// Signed distance function of the shape placed at `origin` facing `rotation`.
    #[must_use]
    pub fn distance(&self, origin: Vec2, rotation: Angle) -> ShapeDistance {
        match *self {
            Self::Circle { radius } => circle(origin, radius),
            Self::Donut {
                inner_radius,
                outer_radius,
            } => donut(origin, inner_radius, outer_radius),
            Self::Cone { radius, half_angle } => cone(origin, radius, rotation, half_angle),
            Self::DonutSector {
                inner_radius,
                outer_radius,
                half_angle,
            } => donut_sector(origin, inner_radius, outer_radius, rotation, half_angle),
            Self::Rect {
                length_front,
                length_back,
                half_width,
            } => rect(
                origin,
                rotation.to_direction(),
                length_front,
                length_back,
                half_width,
            ),
            Self::Cross { length, half_width } => cross(origin, rotation, length, half_width),
        }
    }

    /// Exact containment test for the shape placed at `origin` facing `rotation`.
    #[must_use]
    pub fn check(&self, position: Vec2, origin: Vec2, rotation: Angle) -> bool {
        let direction = rotation.to_direction();
        match *self {
            Self::Circle { radius } => shape::in_circle(position, origin, radius),
            Self::Donut {
                inner_radius,
                outer_radius,
            } => {
                shape::in_circle(position, origin, outer_radius)
                    && !shape::in_circle(position, origin, inner_radius)
            }
            Self::Cone { radius, half_angle } => {
                shape::in_circle_cone(position, origin, radius, direction, half_angle)
            }
            Self::DonutSector {
                inner_radius,
                outer_radius,
                half_angle,
            } => {
                shape::in_circle_cone(position, origin, outer_radius, direction, half_angle)
                    && !shape::in_circle(position, origin, inner_radius)
            }
            Self::Rect {
                length_front,
                length_back,
                half_width,
            } => shape::in_rect(
                position,
                origin,
                direction,
                length_front,
                length_back,
                half_width,
            ),
            Self::Cross { length, half_width } => {
                shape::in_rect(position, origin, direction, length, length, half_width)
                    || shape::in_rect(
                        position,
                        origin,
                        ortho_left(direction),
                        length,
                        length,
                        half_width,
                    )
            }
        }
    }
}

/// Distance to a disc.
#[must_use]
pub fn circle(origin: Vec2, radius: f32) -> ShapeDistance {
    if !(radius > 0.0) {
        return never();
    }
    Box::new(move |point| (point - origin).length() - radius)
}

/// Distance to everything outside a disc.
#[must_use]
pub fn inverted_circle(origin: Vec2, radius: f32) -> ShapeDistance {
    if !(radius > 0.0) {
        return Box::new(|_| f32::MIN);
    }
    Box::new(move |point| radius - (point - origin).length())
}

/// Distance to a ring.
#[must_use]
pub fn donut(origin: Vec2, inner_radius: f32, outer_radius: f32) -> ShapeDistance {
    if !(inner_radius >= 0.0) || !(outer_radius > inner_radius) {
        return never();
    }
    if inner_radius == 0.0 {
        return circle(origin, outer_radius);
    }
    Box::new(move |point| {
        let length = (point - origin).length();
        (length - outer_radius).max(inner_radius - length)
    })
}

/// Distance to the wedge between the two cone edges, ignoring the radius.
fn wedge(direction: Angle, half_angle: Angle) -> impl Fn(Vec2) -> f32 {
    let half = half_angle.radians();
    let left_edge = (direction + half_angle).to_direction();
    let right_edge = (direction - half_angle).to_direction();
    let wide = half > FRAC_PI_2;
    // Wide wedges are the complement of the narrow wedge facing the other way.
    let (left, right) = if wide {
        (-ortho_left(right_edge), -ortho_right(left_edge))
    } else {
        (ortho_left(left_edge), ortho_right(right_edge))
    };
    move |offset: Vec2| {
        let left = offset.dot(left);
        let right = offset.dot(right);
        if wide {
            left.min(right)
        } else {
            left.max(right)
        }
    }
}

/// Distance to a circular sector around `direction`.
#[must_use]
pub fn cone(origin: Vec2, radius: f32, direction: Angle, half_angle: Angle) -> ShapeDistance {
    if !(radius > 0.0) || !(half_angle.radians() > 0.0) {
        return never();
    }
    if half_angle.radians() >= PI {
        return circle(origin, radius);
    }

    let wedge = wedge(direction, half_angle);
    Box::new(move |point| {
        let offset = point - origin;
        (offset.length() - radius).max(wedge(offset))
    })
}

/// Distance to a ring sector around `direction`.
#[must_use]
pub fn donut_sector(
    origin: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    direction: Angle,
    half_angle: Angle,
) -> ShapeDistance {
    if !(half_angle.radians() > 0.0) {
        return never();
    }
    if half_angle.radians() >= PI {
        return donut(origin, inner_radius, outer_radius);
    }
    if !(inner_radius >= 0.0) || !(outer_radius > inner_radius) {
        return never();
    }

    let wedge = wedge(direction, half_angle);
    Box::new(move |point| {
        let offset = point - origin;
        let length = offset.length();
        (length - outer_radius)
            .max(inner_radius - length)
            .max(wedge(offset))
    })
}

/// Distance to a rectangle extending `len_front` ahead of and `len_back` behind `origin`.
#[must_use]
pub fn rect(
    origin: Vec2,
    direction: Vec2,
    len_front: f32,
    len_back: f32,
    half_width: f32,
) -> ShapeDistance {
    let Some(direction) = direction.try_normalize() else {
        return never();
    };
    if !(half_width > 0.0) || !(len_front + len_back > 0.0) {
        return never();
    }

    let side = ortho_left(direction);
    Box::new(move |point| {
        let offset = point - origin;
        let front = offset.dot(direction);
        let lateral = offset.dot(side).abs();
        (front - len_front)
            .max(-front - len_back)
            .max(lateral - half_width)
    })
}

/// Distance to two perpendicular bars of `length` on each side of `origin`.
#[must_use]
pub fn cross(origin: Vec2, direction: Angle, length: f32, half_width: f32) -> ShapeDistance {
    if !(length > 0.0) || !(half_width > 0.0) {
        return never();
    }

    let forward = direction.to_direction();
    let first = rect(origin, forward, length, length, half_width);
    let second = rect(origin, ortho_left(forward), length, length, half_width);
    Box::new(move |point| first(point).min(second(point)))
}

/// Distance to a simple polygon in either winding.
#[must_use]
pub fn polygon(vertices: &[Vec2]) -> ShapeDistance {
    if vertices.len() < 3 {
        return never();
    }

    let vertices = vertices.to_vec();
    Box::new(move |point| {
        let edge_distance = distance_to_outline(&vertices, point);
        if shape::in_polygon(point, &vertices) {
            -edge_distance
        } else {
            edge_distance
        }
    })
}

/// Distance to everything outside a simple polygon.
#[must_use]
pub fn inverted_polygon(vertices: &[Vec2]) -> ShapeDistance {
    if vertices.len() < 3 {
        return Box::new(|_| f32::MIN);
    }

    let inner = polygon(vertices);
    Box::new(move |point| -inner(point))
}

fn distance_to_outline(vertices: &[Vec2], point: Vec2) -> f32 {
    let count = vertices.len();
    (0..count)
        .map(|index| {
            crate::intersect::closest_point_on_segment(
                vertices[index],
                vertices[(index + 1) % count],
                point,
            )
            .distance(point)
        })
        .fold(f32::MAX, f32::min)
}

#[cfg(test)]
mod tests {
    use super::{circle, cone, cross, donut, inverted_circle, polygon, rect, AoeShape};
    use arena_ai_core::Angle;
    use glam::Vec2;

    #[test]
    fn circle_and_inverse_agree_on_sign() {
        let inside = circle(Vec2::ZERO, 5.0);
        let outside = inverted_circle(Vec2::ZERO, 5.0);
        assert!((inside(Vec2::new(3.0, 0.0)) + 2.0).abs() < 1e-5);
        assert!((outside(Vec2::new(3.0, 0.0)) - 2.0).abs() < 1e-5);
        assert_eq!(circle(Vec2::ZERO, -1.0)(Vec2::ZERO), f32::MAX);
    }

    #[test]
    fn donut_excludes_hole() {
        let ring = donut(Vec2::ZERO, 2.0, 6.0);
        assert!(ring(Vec2::new(0.0, 1.0)) > 0.0);
        assert!(ring(Vec2::new(0.0, 4.0)) < 0.0);
        assert!(ring(Vec2::new(0.0, 7.0)) > 0.0);
        assert_eq!(donut(Vec2::ZERO, 6.0, 2.0)(Vec2::new(0.0, 4.0)), f32::MAX);
    }

    #[test]
    fn narrow_cone_follows_facing() {
        let half_angle = Angle::from_degrees(45.0);
        let sector = cone(Vec2::ZERO, 10.0, Angle::default(), half_angle);
        assert!(sector(Vec2::new(0.0, 5.0)) < 0.0);
        assert!(sector(Vec2::new(5.0, 0.0)) > 0.0);
        assert!(sector(Vec2::new(0.0, -5.0)) > 0.0);
        assert!(sector(Vec2::new(0.0, 11.0)) > 0.0);
    }

    #[test]
    fn wide_cone_only_excludes_rear_wedge() {
        let half_angle = Angle::from_degrees(135.0);
        let sector = cone(Vec2::ZERO, 10.0, Angle::default(), half_angle);
        assert!(sector(Vec2::new(0.0, 5.0)) < 0.0);
        assert!(sector(Vec2::new(5.0, 0.0)) < 0.0);
        assert!(sector(Vec2::new(-5.0, 0.0)) < 0.0);
        assert!(sector(Vec2::new(1.0, -5.0)) > 0.0);
    }

    #[test]
    fn rect_and_cross_cover_their_arms() {
        let bar = rect(Vec2::ZERO, Vec2::Y, 10.0, 0.0, 1.0);
        assert!(bar(Vec2::new(0.5, 9.0)) < 0.0);
        assert!(bar(Vec2::new(0.0, -1.0)) > 0.0);
        let unaimed = rect(Vec2::ZERO, Vec2::ZERO, 1.0, 1.0, 1.0);
        assert_eq!(unaimed(Vec2::ZERO), f32::MAX);

        let plus = cross(Vec2::ZERO, Angle::default(), 10.0, 1.0);
        assert!(plus(Vec2::new(0.0, -9.0)) < 0.0);
        assert!(plus(Vec2::new(9.0, 0.0)) < 0.0);
        assert!(plus(Vec2::new(5.0, 5.0)) > 0.0);
    }

    #[test]
    fn polygon_distance_is_signed() {
        let square = polygon(&[
            Vec2::new(-2.0, -2.0),
            Vec2::new(2.0, -2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(-2.0, 2.0),
        ]);
        assert!((square(Vec2::ZERO) + 2.0).abs() < 1e-5);
        assert!((square(Vec2::new(5.0, 0.0)) - 3.0).abs() < 1e-5);
        assert_eq!(polygon(&[Vec2::ZERO])(Vec2::ZERO), f32::MAX);
    }

    #[test]
    fn shape_check_matches_distance_sign() {
        let shapes = [
            AoeShape::Circle { radius: 4.0 },
            AoeShape::Donut {
                inner_radius: 2.0,
                outer_radius: 5.0,
            },
            AoeShape::Cone {
                radius: 6.0,
                half_angle: Angle::from_degrees(30.0),
            },
            AoeShape::DonutSector {
                inner_radius: 1.0,
                outer_radius: 6.0,
                half_angle: Angle::from_degrees(60.0),
            },
            AoeShape::Rect {
                length_front: 6.0,
                length_back: 1.0,
                half_width: 2.0,
            },
            AoeShape::Cross {
                length: 6.0,
                half_width: 1.0,
            },
        ];
        let origin = Vec2::new(1.0, -1.0);
        let rotation = Angle::from_degrees(20.0);
        let probes = [
            Vec2::new(1.0, 2.5),
            Vec2::new(3.5, 1.0),
            Vec2::new(-3.0, -4.0),
            Vec2::new(9.0, 9.0),
        ];

        for shape in shapes {
            let distance = shape.distance(origin, rotation);
            for probe in probes {
                let value = distance(probe);
                if value.abs() < 1e-3 {
                    continue;
                }
                assert_eq!(
                    value < 0.0,
                    shape.check(probe, origin, rotation),
                    "{shape:?} disagrees at {probe:?} (distance {value})"
                );
            }
        }
    }

    #[test]
    fn shapes_deserialize_from_tagged_tables() {
        let shape: AoeShape =
            serde_json::from_str(r#"{"kind":"rect","length_front":5.0,"half_width":1.0}"#)
                .expect("tagged rect");
        assert_eq!(
            shape,
            AoeShape::Rect {
                length_front: 5.0,
                length_back: 0.0,
                half_width: 1.0
            }
        );
    }
}
