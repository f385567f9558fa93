#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Exact geometric description of the playable region.
//!
//! A [`ShapeBounds`] is a value: changing the arena geometry means building a
//! new instance, so downstream caches may key on structural equality. The only
//! state that changes in place is the clipping cache (chordal error budget and
//! clip polygon), and it is recomputed solely when the display scale changes
//! through [`ShapeBounds::set_screen_half_size`].

use arena_ai_core::{ortho_left, shape, Angle};
use glam::Vec2;
use thiserror::Error;
use tracing::{debug, warn};

pub mod clip;
pub mod curve;
pub mod distance;
pub mod intersect;
pub mod pathfind;

pub use distance::{AoeShape, ShapeDistance};
pub use pathfind::{Bitmap, ObstacleRegion, PathfindMap, BLOCKED_COST};

/// Display half size, in pixels, assumed until the presentation layer reports one.
pub const DEFAULT_SCREEN_HALF_SIZE: f32 = 300.0;

/// Relative inset applied when clamping onto straight edges.
const CLAMP_INSET: f32 = 1e-5;

/// Errors raised when bounds are constructed from invalid input.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BoundsError {
    /// Polygon bounds were requested with fewer than three vertices.
    #[error("polygon bounds need at least three vertices, got {0}")]
    TooFewVertices(usize),
    /// A polygon vertex had a NaN or infinite coordinate.
    #[error("polygon vertex {0} is not finite")]
    NonFiniteVertex(usize),
    /// An obstacle bitmap was built from a bit buffer of the wrong length.
    #[error("bitmap of {width}x{height} needs {expected} bits, got {actual}")]
    BitmapSize {
        /// Bitmap width in cells.
        width: usize,
        /// Bitmap height in cells.
        height: usize,
        /// Number of bits the dimensions require.
        expected: usize,
        /// Number of bits supplied.
        actual: usize,
    },
}

/// Variant-specific geometry of a bound.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundsShape {
    /// Disc of the given radius.
    Circle {
        /// Radius in world units.
        radius: f32,
    },
    /// Axis-aligned square.
    Square {
        /// Half of the side length.
        half_side: f32,
    },
    /// Rotated rectangle.
    Rect {
        /// Half extent along the rectangle's local X axis.
        half_width: f32,
        /// Half extent along the rectangle's local Z axis.
        half_height: f32,
        /// Direction of the local Z axis.
        rotation: Angle,
    },
    /// Simple polygon in either winding.
    Polygon {
        /// Ordered vertices; the last vertex connects back to the first.
        vertices: Vec<Vec2>,
        /// Half width of the vertex bounding box.
        half_width: f32,
        /// Half height of the vertex bounding box.
        half_height: f32,
    },
}

/// Immutable playable region with exact containment, ray and clamp queries.
#[derive(Clone, Debug)]
pub struct ShapeBounds {
    center: Vec2,
    half_size: f32,
    shape: BoundsShape,
    cache: ClipCache,
}

#[derive(Clone, Debug, Default)]
struct ClipCache {
    screen_half_size: f32,
    max_approx_error: f32,
    polygon: Vec<Vec2>,
    convex_pieces: Vec<Vec<Vec2>>,
}

impl PartialEq for ShapeBounds {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.shape == other.shape
    }
}

impl ShapeBounds {
    /// Creates a circular bound.
    #[must_use]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::with_shape(center, radius, BoundsShape::Circle { radius })
    }

    /// Creates an axis-aligned square bound.
    #[must_use]
    pub fn square(center: Vec2, half_side: f32) -> Self {
        Self::with_shape(center, half_side, BoundsShape::Square { half_side })
    }

    /// Creates a rotated rectangular bound; the half size is the larger half extent.
    #[must_use]
    pub fn rect(center: Vec2, half_width: f32, half_height: f32, rotation: Angle) -> Self {
        Self::with_shape(
            center,
            half_width.max(half_height),
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            },
        )
    }

    /// Creates a polygonal bound centered on its vertex bounding box.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, BoundsError> {
        if vertices.len() < 3 {
            return Err(BoundsError::TooFewVertices(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|vertex| !vertex.is_finite()) {
            return Err(BoundsError::NonFiniteVertex(index));
        }

        let (half_width, half_height, center) = bounds_from_points(&vertices);
        Ok(Self::with_shape(
            center,
            half_width.max(half_height),
            BoundsShape::Polygon {
                vertices,
                half_width,
                half_height,
            },
        ))
    }

    /// Creates a polygonal bound, falling back to [`ShapeBounds::empty`] when
    /// [`ShapeBounds::polygon`] rejects the vertices.
    #[must_use]
    pub fn polygon_or_empty(vertices: Vec<Vec2>) -> Self {
        Self::polygon(vertices).unwrap_or_else(|error| {
            warn!(%error, "invalid polygon bounds, using an empty region");
            Self::empty()
        })
    }

    /// Polygonal bound without vertices.
    ///
    /// Nothing lies inside it: clipping yields no triangles, rays miss, clamps
    /// leave offsets untouched and the pathfind grid has no cells.
    #[must_use]
    pub fn empty() -> Self {
        let shape = BoundsShape::Polygon {
            vertices: Vec::new(),
            half_width: 0.0,
            half_height: 0.0,
        };
        Self::with_shape(Vec2::ZERO, 0.0, shape)
    }

    fn with_shape(center: Vec2, half_size: f32, shape: BoundsShape) -> Self {
        let mut bounds = Self {
            center,
            half_size,
            shape,
            cache: ClipCache::default(),
        };
        bounds.rebuild_cache(DEFAULT_SCREEN_HALF_SIZE);
        bounds
    }

    /// Center of the region.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Largest relevant half dimension: radius for circles, larger half extent otherwise.
    #[must_use]
    pub const fn half_size(&self) -> f32 {
        self.half_size
    }

    /// Variant-specific geometry.
    #[must_use]
    pub const fn shape(&self) -> &BoundsShape {
        &self.shape
    }

    /// Display half size the clipping cache was computed for.
    #[must_use]
    pub const fn screen_half_size(&self) -> f32 {
        self.cache.screen_half_size
    }

    /// Maximum deviation allowed between curves and their polygonal approximation.
    #[must_use]
    pub const fn max_approx_error(&self) -> f32 {
        self.cache.max_approx_error
    }

    /// Cached clip polygon for the current display scale.
    #[must_use]
    pub fn clip_polygon(&self) -> &[Vec2] {
        &self.cache.polygon
    }

    pub(crate) fn convex_pieces(&self) -> &[Vec<Vec2>] {
        &self.cache.convex_pieces
    }

    /// Updates the display half size, recomputing the clipping cache when it changes.
    ///
    /// Non-positive or non-finite sizes are ignored.
    pub fn set_screen_half_size(&mut self, screen_half_size: f32) {
        if !screen_half_size.is_finite() || screen_half_size <= 0.0 {
            return;
        }
        if screen_half_size != self.cache.screen_half_size {
            self.rebuild_cache(screen_half_size);
        }
    }

    fn rebuild_cache(&mut self, screen_half_size: f32) {
        self.cache.screen_half_size = screen_half_size;
        self.cache.max_approx_error = curve::SCREEN_ERROR / screen_half_size * self.half_size;
        self.cache.polygon = self.build_clip_polygon(0.0);
        self.cache.convex_pieces = clip::convex_pieces(&self.cache.polygon);
        debug!(
            screen_half_size,
            max_approx_error = self.cache.max_approx_error,
            vertices = self.cache.polygon.len(),
            pieces = self.cache.convex_pieces.len(),
            "rebuilt bounds clip cache"
        );
    }

    /// Exact containment test.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        match &self.shape {
            BoundsShape::Circle { radius } => shape::in_circle(position, self.center, *radius),
            BoundsShape::Square { half_side } => {
                shape::in_square(position, self.center, *half_side)
            }
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => shape::in_rect(
                position,
                self.center,
                rotation.to_direction(),
                *half_height,
                *half_height,
                *half_width,
            ),
            BoundsShape::Polygon { vertices, .. } => shape::in_polygon(position, vertices),
        }
    }

    /// Distance along `direction` from `origin` to the boundary.
    ///
    /// Returns [`intersect::NO_INTERSECTION`] when the ray misses.
    #[must_use]
    pub fn intersect_ray(&self, origin: Vec2, direction: Vec2) -> f32 {
        match &self.shape {
            BoundsShape::Circle { radius } => {
                intersect::ray_circle(origin, direction, self.center, *radius)
            }
            BoundsShape::Square { half_side } => intersect::ray_rect(
                origin,
                direction,
                self.center,
                Vec2::Y,
                *half_side,
                *half_side,
            ),
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => intersect::ray_rect(
                origin,
                direction,
                self.center,
                rotation.to_direction(),
                *half_width,
                *half_height,
            ),
            BoundsShape::Polygon { vertices, .. } => {
                intersect::ray_polygon(origin, direction, vertices)
            }
        }
    }

    /// Shrinks a displacement from the center so the resulting point stays within `scale` times
    /// the bound.
    #[must_use]
    pub fn clamp_to_bounds(&self, offset: Vec2, scale: f32) -> Vec2 {
        match &self.shape {
            BoundsShape::Circle { radius } => {
                let limit = radius * scale;
                if offset.length_squared() > limit * limit {
                    offset * (limit / offset.length())
                } else {
                    offset
                }
            }
            BoundsShape::Square { half_side } => {
                let limit = half_side * scale;
                let mut offset = offset;
                if offset.x.abs() > limit {
                    offset *= limit / offset.x.abs();
                }
                if offset.y.abs() > limit {
                    offset *= limit / offset.y.abs();
                }
                offset
            }
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => {
                let forward = rotation.to_direction();
                let inset = self.clamp_inset(scale);
                let mut offset = offset;
                let dx = offset.dot(ortho_left(forward)).abs();
                if dx > half_width * scale {
                    offset *= (half_width * scale - inset).max(0.0) / dx;
                }
                let dz = offset.dot(forward).abs();
                if dz > half_height * scale {
                    offset *= (half_height * scale - inset).max(0.0) / dz;
                }
                offset
            }
            BoundsShape::Polygon { vertices, .. } => {
                let scaled: Vec<Vec2> = vertices
                    .iter()
                    .map(|vertex| self.center + (*vertex - self.center) * scale)
                    .collect();
                let position = self.center + offset;
                if shape::in_polygon(position, &scaled) {
                    return offset;
                }
                let Some(point) = nearest_boundary_point(&scaled, position) else {
                    return offset;
                };
                let inward = point.position + point.inward * self.clamp_inset(scale);
                if shape::in_polygon(inward, &scaled) {
                    inward - self.center
                } else {
                    point.position - self.center
                }
            }
        }
    }

    /// Distance clamped rect and polygon offsets are pulled inside their edge.
    ///
    /// Grows with the coordinate magnitude so the clamped position still
    /// passes [`ShapeBounds::contains`] after rounding.
    fn clamp_inset(&self, scale: f32) -> f32 {
        CLAMP_INSET * (1.0 + self.half_size * scale.abs() + self.center.length())
    }

    /// Moves a world position onto the bound if it lies outside.
    #[must_use]
    pub fn clamp_position(&self, position: Vec2) -> Vec2 {
        self.center + self.clamp_to_bounds(position - self.center, 1.0)
    }

    /// Builds the ordered outline of the bound; a positive offset grows the area, a negative one
    /// shrinks it.
    ///
    /// Curved outlines are approximated to the current chordal error budget.
    #[must_use]
    pub fn build_clip_polygon(&self, offset: f32) -> Vec<Vec2> {
        match &self.shape {
            BoundsShape::Circle { radius } => {
                curve::circle(self.center, radius + offset, self.cache.max_approx_error)
            }
            BoundsShape::Square { half_side } => {
                let s = half_side + offset;
                vec![
                    self.center + Vec2::new(s, -s),
                    self.center + Vec2::new(s, s),
                    self.center + Vec2::new(-s, s),
                    self.center + Vec2::new(-s, -s),
                ]
            }
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => {
                let forward = rotation.to_direction();
                let dx = ortho_left(forward) * (half_width + offset);
                let dz = forward * (half_height + offset);
                vec![
                    self.center + dx - dz,
                    self.center + dx + dz,
                    self.center - dx + dz,
                    self.center - dx - dz,
                ]
            }
            BoundsShape::Polygon { vertices, .. } => offset_polygon(vertices, offset),
        }
    }
}

/// Half width, half height and center of the bounding box of `points`.
///
/// An empty list yields a zero-sized box at the origin.
#[must_use]
pub fn bounds_from_points(points: &[Vec2]) -> (f32, f32, Vec2) {
    let Some(&first) = points.first() else {
        return (0.0, 0.0, Vec2::ZERO);
    };

    let (mut min, mut max) = (first, first);
    for point in points {
        min = min.min(*point);
        max = max.max(*point);
    }
    let half = (max - min) * 0.5;
    (half.x, half.y, (min + max) * 0.5)
}

struct BoundaryPoint {
    position: Vec2,
    inward: Vec2,
}

/// Closest point on a polygon outline together with the unit direction into the polygon.
///
/// At a vertex the direction bisects the inward normals of both adjacent edges.
fn nearest_boundary_point(vertices: &[Vec2], position: Vec2) -> Option<BoundaryPoint> {
    let count = vertices.len();
    let counter_clockwise = clip::signed_area(vertices) >= 0.0;
    let inward_normal = |index: usize| {
        let start = vertices[index];
        let end = vertices[(index + 1) % count];
        let edge = (end - start).normalize_or_zero();
        if counter_clockwise {
            -ortho_left(edge)
        } else {
            ortho_left(edge)
        }
    };

    let (index, t, point, _) = (0..count)
        .map(|index| {
            let start = vertices[index];
            let edge = vertices[(index + 1) % count] - start;
            let length_squared = edge.length_squared();
            let t = if length_squared > 0.0 {
                let along = (position - start).dot(edge);
                (along / length_squared).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let point = start + edge * t;
            (index, t, point, point.distance_squared(position))
        })
        .min_by(|a, b| a.3.total_cmp(&b.3))?;

    let inward = if t <= 0.0 {
        inward_normal(index) + inward_normal((index + count - 1) % count)
    } else if t >= 1.0 {
        inward_normal(index) + inward_normal((index + 1) % count)
    } else {
        inward_normal(index)
    };
    Some(BoundaryPoint {
        position: point,
        inward: inward.normalize_or_zero(),
    })
}

fn offset_polygon(vertices: &[Vec2], offset: f32) -> Vec<Vec2> {
    let count = vertices.len();
    if offset == 0.0 || count < 3 {
        return vertices.to_vec();
    }

    let counter_clockwise = clip::signed_area(vertices) >= 0.0;
    let outward = |from: Vec2, to: Vec2| {
        let edge = (to - from).normalize_or_zero();
        if counter_clockwise {
            ortho_left(edge)
        } else {
            -ortho_left(edge)
        }
    };

    (0..count)
        .map(|index| {
            let previous = vertices[(index + count - 1) % count];
            let current = vertices[index];
            let next = vertices[(index + 1) % count];
            let incoming = outward(previous, current);
            let outgoing = outward(current, next);
            let miter = (incoming + outgoing).try_normalize().unwrap_or(outgoing);
            // Sharp corners would otherwise produce unbounded spikes.
            let stretch = miter.dot(outgoing).max(0.25);
            current + miter * (offset / stretch)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{bounds_from_points, intersect, BoundsError, BoundsShape, ShapeBounds};
    use arena_ai_core::Angle;
    use glam::Vec2;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    fn near(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-2
    }

    #[test]
    fn circle_scenario_matches_expectations() {
        let bounds = ShapeBounds::circle(Vec2::ZERO, 20.0);

        assert!(bounds.contains(Vec2::new(19.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(21.0, 0.0)));
        assert!(approx(
            bounds.clamp_to_bounds(Vec2::new(25.0, 0.0), 1.0),
            Vec2::new(20.0, 0.0)
        ));
    }

    #[test]
    fn clamp_leaves_interior_offsets_untouched() {
        let bounds = ShapeBounds::square(Vec2::new(100.0, 100.0), 10.0);
        let offset = Vec2::new(3.0, -4.0);
        assert_eq!(bounds.clamp_to_bounds(offset, 1.0), offset);
    }

    #[test]
    fn square_clamp_respects_scale() {
        let bounds = ShapeBounds::square(Vec2::ZERO, 10.0);
        let clamped = bounds.clamp_to_bounds(Vec2::new(20.0, 10.0), 0.5);
        assert!(approx(clamped, Vec2::new(5.0, 2.5)), "got {clamped:?}");
    }

    #[test]
    fn rect_contains_uses_rotation() {
        let bounds = ShapeBounds::rect(Vec2::ZERO, 2.0, 10.0, Angle::from_degrees(90.0));
        assert!(bounds.contains(Vec2::new(9.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(0.0, 9.0)));
        assert_eq!(bounds.half_size(), 10.0);
    }

    #[test]
    fn rect_clamp_scales_onto_boundary() {
        let bounds = ShapeBounds::rect(Vec2::ZERO, 5.0, 10.0, Angle::default());
        let clamped = bounds.clamp_to_bounds(Vec2::new(0.0, 30.0), 1.0);
        assert!(near(clamped, Vec2::new(0.0, 10.0)), "got {clamped:?}");
        assert!(bounds.contains(clamped), "{clamped:?} left the rect");
    }

    #[test]
    fn polygon_derives_center_from_bounding_box() {
        let bounds = ShapeBounds::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 4.0),
            Vec2::new(0.0, 4.0),
        ])
        .expect("valid polygon");

        assert_eq!(bounds.center(), Vec2::new(5.0, 2.0));
        assert_eq!(bounds.half_size(), 5.0);
        match bounds.shape() {
            BoundsShape::Polygon {
                half_width,
                half_height,
                ..
            } => {
                assert_eq!(*half_width, 5.0);
                assert_eq!(*half_height, 2.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn polygon_rejects_degenerate_input() {
        assert_eq!(
            ShapeBounds::polygon(vec![Vec2::ZERO, Vec2::ONE]),
            Err(BoundsError::TooFewVertices(2))
        );
        assert_eq!(
            ShapeBounds::polygon(vec![Vec2::ZERO, Vec2::ONE, Vec2::new(f32::NAN, 0.0)]),
            Err(BoundsError::NonFiniteVertex(2))
        );
    }

    #[test]
    fn rejected_polygon_falls_back_to_empty_region() {
        let bounds = ShapeBounds::polygon_or_empty(vec![Vec2::ZERO, Vec2::ONE]);
        assert_eq!(bounds, ShapeBounds::empty());
        assert_eq!(bounds.half_size(), 0.0);
        assert!(!bounds.contains(Vec2::ZERO));
        assert!(bounds.clip_polygon().is_empty());
        assert!(bounds.clip_and_triangulate_circle(Vec2::ZERO, 5.0).is_empty());

        let miss = bounds.intersect_ray(Vec2::ZERO, Vec2::X);
        assert_eq!(miss, intersect::NO_INTERSECTION);
        let offset = Vec2::new(3.0, 4.0);
        assert_eq!(bounds.clamp_to_bounds(offset, 1.0), offset);
        let map = bounds.build_pathfind_map(0.5);
        assert_eq!((map.width(), map.height()), (0, 0));

        let triangle = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        let valid = ShapeBounds::polygon(triangle.clone()).expect("valid polygon");
        assert_eq!(ShapeBounds::polygon_or_empty(triangle), valid);
    }

    #[test]
    fn polygon_clamp_projects_onto_nearest_edge() {
        let bounds = ShapeBounds::polygon(vec![
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ])
        .expect("valid polygon");

        let clamped = bounds.clamp_to_bounds(Vec2::new(8.0, 1.0), 1.0);
        assert!(near(clamped, Vec2::new(5.0, 1.0)), "got {clamped:?}");
        assert!(bounds.contains(clamped), "{clamped:?} left the polygon");

        let corner = bounds.clamp_to_bounds(Vec2::new(9.0, 9.0), 1.0);
        assert!(near(corner, Vec2::new(5.0, 5.0)), "got {corner:?}");
        assert!(bounds.contains(corner), "{corner:?} left the polygon");

        let inside = Vec2::new(1.0, 1.0);
        assert_eq!(bounds.clamp_to_bounds(inside, 1.0), inside);
    }

    #[test]
    fn clip_polygon_is_stable_until_scale_changes() {
        let mut bounds = ShapeBounds::circle(Vec2::ZERO, 20.0);
        let first = bounds.build_clip_polygon(0.0);
        let second = bounds.build_clip_polygon(0.0);
        assert_eq!(first, second);
        assert_eq!(bounds.clip_polygon(), first.as_slice());

        let coarse = bounds.clip_polygon().len();
        bounds.set_screen_half_size(1200.0);
        assert!(
            bounds.clip_polygon().len() > coarse,
            "a larger display should demand a finer outline"
        );

        let error = bounds.max_approx_error();
        bounds.set_screen_half_size(-1.0);
        assert_eq!(bounds.max_approx_error(), error);
    }

    #[test]
    fn offset_grows_and_shrinks_square_outline() {
        let bounds = ShapeBounds::square(Vec2::ZERO, 10.0);
        let grown = bounds.build_clip_polygon(2.0);
        assert!(grown.iter().all(|vertex| vertex.x.abs() == 12.0));
        let shrunk = bounds.build_clip_polygon(-2.0);
        assert!(shrunk.iter().all(|vertex| vertex.y.abs() == 8.0));
    }

    #[test]
    fn polygon_offset_moves_vertices_outward() {
        let bounds = ShapeBounds::polygon(vec![
            Vec2::new(-5.0, -5.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(-5.0, 5.0),
        ])
        .expect("valid polygon");

        let grown = bounds.build_clip_polygon(1.0);
        assert!(approx(grown[0], Vec2::new(-6.0, -6.0)), "{grown:?}");
        assert!(approx(grown[2], Vec2::new(6.0, 6.0)), "{grown:?}");
    }

    #[test]
    fn structural_equality_ignores_display_scale() {
        let mut a = ShapeBounds::circle(Vec2::ONE, 5.0);
        let b = ShapeBounds::circle(Vec2::ONE, 5.0);
        a.set_screen_half_size(999.0);
        assert_eq!(a, b);
        assert_ne!(a, ShapeBounds::circle(Vec2::ONE, 6.0));
    }

    #[test]
    fn bounds_from_points_handles_empty_input() {
        assert_eq!(bounds_from_points(&[]), (0.0, 0.0, Vec2::ZERO));
        let (hw, hh, center) = bounds_from_points(&[Vec2::new(-2.0, 1.0), Vec2::new(4.0, 3.0)]);
        assert_eq!((hw, hh, center), (3.0, 1.0, Vec2::new(1.0, 2.0)));
    }
}
