//! Grid discretization of a bound for an external path search.

use arena_ai_core::{ortho_left, Angle};
use glam::Vec2;
use tracing::warn;

use crate::{distance, BoundsError, BoundsShape, ShapeBounds, ShapeDistance};

/// Traversal cost written into cells that may never be entered.
pub const BLOCKED_COST: f32 = -900.0;

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// Uniform grid laid over a bound's footprint.
///
/// Cells are addressed by `(x, y)` with `x` running along the local X axis
/// (the left orthogonal of the facing) and `y` along the facing itself. Free
/// cells carry a cost of zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PathfindMap {
    resolution: f32,
    center: Vec2,
    rotation: Angle,
    width: usize,
    height: usize,
    costs: Vec<f32>,
}

impl PathfindMap {
    /// Creates an unobstructed grid covering the given half extents.
    ///
    /// Non-positive or non-finite resolutions yield an empty grid, as do
    /// resolutions so fine that the grid would exceed [`MAX_CELLS`].
    #[must_use]
    pub fn new(
        resolution: f32,
        center: Vec2,
        half_width: f32,
        half_height: f32,
        rotation: Angle,
    ) -> Self {
        let cells = |half: f32| -> Option<usize> {
            if !(resolution > 0.0 && resolution.is_finite() && half > 0.0 && half.is_finite()) {
                return Some(0);
            }
            let per_side = (half / resolution).ceil();
            if per_side > MAX_CELLS as f32 {
                return None;
            }
            (per_side as usize).checked_mul(2)
        };
        let size = match (cells(half_width), cells(half_height)) {
            (Some(width), Some(height)) => width
                .checked_mul(height)
                .filter(|count| *count <= MAX_CELLS)
                .map(|_| (width, height)),
            _ => None,
        };
        let (width, height) = size.unwrap_or_else(|| {
            warn!(
                resolution,
                half_width,
                half_height,
                "pathfind grid too fine, leaving it empty"
            );
            (0, 0)
        });
        Self {
            resolution,
            center,
            rotation,
            width,
            height,
            costs: vec![0.0; width * height],
        }
    }

    /// World units per cell side.
    #[must_use]
    pub const fn resolution(&self) -> f32 {
        self.resolution
    }

    /// World position of the grid center.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Facing of the grid's local Z axis.
    #[must_use]
    pub const fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major traversal costs.
    #[must_use]
    pub fn costs(&self) -> &[f32] {
        &self.costs
    }

    fn axes(&self) -> (Vec2, Vec2) {
        let forward = self.rotation.to_direction();
        (ortho_left(forward), forward)
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// World position of the center of a cell.
    #[must_use]
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        let (axis_x, axis_z) = self.axes();
        let local_x = (x as f32 + 0.5 - self.width as f32 * 0.5) * self.resolution;
        let local_z = (y as f32 + 0.5 - self.height as f32 * 0.5) * self.resolution;
        self.center + axis_x * local_x + axis_z * local_z
    }

    /// Cell containing a world position, if it lies on the grid.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> Option<(usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (axis_x, axis_z) = self.axes();
        let offset = position - self.center;
        let x = offset.dot(axis_x) / self.resolution + self.width as f32 * 0.5;
        let y = offset.dot(axis_z) / self.resolution + self.height as f32 * 0.5;
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Traversal cost of a cell; `None` outside the grid.
    #[must_use]
    pub fn cost(&self, x: usize, y: usize) -> Option<f32> {
        let index = self.index(x, y)?;
        self.costs.get(index).copied()
    }

    /// Reports whether a cell is blocked; cells outside the grid count as blocked.
    #[must_use]
    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        self.cost(x, y).map_or(true, |cost| cost <= BLOCKED_COST)
    }

    /// Marks a cell as impassable. Cells outside the grid are ignored.
    pub fn block(&mut self, x: usize, y: usize) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        if let Some(cost) = self.costs.get_mut(index) {
            *cost = BLOCKED_COST;
        }
    }

    /// Blocks every cell whose center satisfies `predicate`, returning how many were blocked.
    pub fn block_cells_where(&mut self, predicate: impl Fn(Vec2) -> bool) -> usize {
        let mut blocked = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if predicate(self.cell_center(x, y)) {
                    self.block(x, y);
                    blocked += 1;
                }
            }
        }
        blocked
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.costs
            .iter()
            .filter(|cost| **cost <= BLOCKED_COST)
            .count()
    }

    /// Overlays an obstacle region, blocking every covered set bit.
    ///
    /// The region's top-left corner aligns with grid cell `(0, 0)`; bits that
    /// fall outside the bitmap, the region or the grid are ignored. Returns the
    /// number of cells written.
    pub fn apply_obstacles(&mut self, region: &ObstacleRegion) -> usize {
        let bitmap = &region.bitmap;
        let left = region.left.max(0);
        let top = region.top.max(0);
        let right = region.right.min(to_i64(bitmap.width));
        let bottom = region.bottom.min(to_i64(bitmap.height));

        let mut written = 0;
        for y in top..bottom {
            for x in left..right {
                let map_x = usize::try_from(x - region.left);
                let map_y = usize::try_from(y - region.top);
                let (Ok(map_x), Ok(map_y)) = (map_x, map_y) else {
                    continue;
                };
                let (Ok(bit_x), Ok(bit_y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };
                if bitmap.get(bit_x, bit_y) && self.index(map_x, map_y).is_some() {
                    self.block(map_x, map_y);
                    written += 1;
                }
            }
        }
        written
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Dense two-dimensional bit grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Bitmap {
    /// Creates a cleared bitmap.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Creates a bitmap from row-major bits.
    pub fn from_bits(width: usize, height: usize, bits: Vec<bool>) -> Result<Self, BoundsError> {
        let expected = width * height;
        if bits.len() != expected {
            return Err(BoundsError::BitmapSize {
                width,
                height,
                expected,
                actual: bits.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Creates a bitmap from text rows where `#` marks a set bit.
    ///
    /// Every row must have the width of the first one.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoundsError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let mut lengths = rows.iter().map(|row| row.as_ref().chars().count());
        if let Some(ragged) = lengths.find(|length| *length != width) {
            return Err(BoundsError::BitmapSize {
                width,
                height,
                expected: width * height,
                actual: ragged * height,
            });
        }
        let bits: Vec<bool> = rows
            .iter()
            .flat_map(|row| row.as_ref().chars().map(|cell| cell == '#'))
            .collect();
        Self::from_bits(width, height, bits)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Reads a bit; coordinates outside the bitmap read as clear.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Writes a bit; coordinates outside the bitmap are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
        }
    }
}

/// Window into an obstacle bitmap aligned with a pathfind grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleRegion {
    /// Obstacle bits.
    pub bitmap: Bitmap,
    /// First bitmap column of the window; aligns with grid column zero.
    pub left: i64,
    /// First bitmap row of the window; aligns with grid row zero.
    pub top: i64,
    /// Column one past the window.
    pub right: i64,
    /// Row one past the window.
    pub bottom: i64,
}

impl ObstacleRegion {
    /// Window covering the whole bitmap.
    #[must_use]
    pub fn full(bitmap: Bitmap) -> Self {
        let right = to_i64(bitmap.width);
        let bottom = to_i64(bitmap.height);
        Self {
            bitmap,
            left: 0,
            top: 0,
            right,
            bottom,
        }
    }
}

impl ShapeBounds {
    /// Signed distance to the region outside the bound; negative outside, zero on the edge.
    #[must_use]
    pub fn exterior_distance(&self) -> ShapeDistance {
        let center = self.center();
        match self.shape() {
            BoundsShape::Circle { radius } => distance::inverted_circle(center, *radius),
            BoundsShape::Square { half_side } => {
                let corners = rect_corners(center, *half_side, *half_side, Angle::default());
                distance::inverted_polygon(&corners)
            }
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => {
                let corners = rect_corners(center, *half_width, *half_height, *rotation);
                distance::inverted_polygon(&corners)
            }
            BoundsShape::Polygon { vertices, .. } => distance::inverted_polygon(vertices),
        }
    }

    /// Discretizes the bound footprint, blocking every cell whose center lies outside the shape.
    #[must_use]
    pub fn build_pathfind_map(&self, resolution: f32) -> PathfindMap {
        let (half_width, half_height, rotation) = match self.shape() {
            BoundsShape::Circle { radius } => (*radius, *radius, Angle::default()),
            BoundsShape::Square { half_side } => (*half_side, *half_side, Angle::default()),
            BoundsShape::Rect {
                half_width,
                half_height,
                rotation,
            } => (*half_width, *half_height, *rotation),
            BoundsShape::Polygon {
                half_width,
                half_height,
                ..
            } => (*half_width, *half_height, Angle::default()),
        };

        let center = self.center();
        let mut map = PathfindMap::new(resolution, center, half_width, half_height, rotation);
        let exterior = self.exterior_distance();
        let _ = map.block_cells_where(|position| exterior(position) < 0.0);
        map
    }
}

fn rect_corners(center: Vec2, half_width: f32, half_height: f32, rotation: Angle) -> [Vec2; 4] {
    let forward = rotation.to_direction() * half_height;
    let side = ortho_left(rotation.to_direction()) * half_width;
    [
        center - side - forward,
        center + side - forward,
        center + side + forward,
        center - side + forward,
    ]
}
