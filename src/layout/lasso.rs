use super::Point;
use super::geometry::{closed_basis_path, point_in_polygon};
use serde::{Deserialize, Serialize};

/// Affine screen transform of the rendering surface, in SVG matrix order:
/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl SurfaceTransform {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Composition that applies `self` first, then `other`.
    pub fn then(self, other: Self) -> Self {
        Self {
            a: other.a * self.a + other.c * self.b,
            b: other.b * self.a + other.d * self.b,
            c: other.a * self.c + other.c * self.d,
            d: other.b * self.c + other.d * self.d,
            e: other.a * self.e + other.c * self.f + other.e,
            f: other.b * self.e + other.d * self.f + other.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LassoState {
    #[default]
    Idle,
    Selecting,
}

/// Freeform region selection over a rendering surface.
///
/// Samples are kept raw; consumers poll [`LassoSelection::is_point_in_selection`]
/// instead of being notified.
#[derive(Debug, Clone, Default)]
pub struct LassoSelection {
    transform: SurfaceTransform,
    state: LassoState,
    path: Vec<Point>,
    selected_area: Vec<Point>,
}

impl LassoSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: SurfaceTransform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    /// Seeds a finalized area directly, e.g. when restoring a drawn region.
    pub fn from_area(area: Vec<Point>) -> Self {
        Self {
            selected_area: area,
            ..Self::default()
        }
    }

    pub fn set_transform(&mut self, transform: SurfaceTransform) {
        self.transform = transform;
    }

    pub fn state(&self) -> LassoState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == LassoState::Selecting
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn selected_area(&self) -> &[Point] {
        &self.selected_area
    }

    /// Maps a screen-space point into surface-local coordinates.
    pub fn to_local(&self, screen: Point) -> Point {
        match self.transform.inverse() {
            Some(inv) => inv.apply(screen),
            None => {
                tracing::warn!(
                    transform = ?self.transform,
                    "surface transform is not invertible; mapping point to origin"
                );
                Point::default()
            }
        }
    }

    pub fn start_selection(&mut self, screen: Point) {
        let local = self.to_local(screen);
        self.state = LassoState::Selecting;
        self.selected_area.clear();
        self.path.clear();
        self.path.push(local);
    }

    pub fn update_selection(&mut self, screen: Point) {
        if !self.is_selecting() {
            return;
        }
        let local = self.to_local(screen);
        self.path.push(local);
    }

    pub fn end_selection(&mut self) {
        if !self.is_selecting() {
            return;
        }
        self.state = LassoState::Idle;
        self.selected_area = std::mem::take(&mut self.path);
        tracing::trace!(vertices = self.selected_area.len(), "lasso gesture finished");
    }

    pub fn is_point_in_selection(&self, point: Point) -> bool {
        if self.selected_area.len() < 3 {
            return false;
        }
        point_in_polygon(&self.selected_area, point)
    }

    pub fn clear_selection(&mut self) {
        self.selected_area.clear();
    }

    pub fn path_data(points: &[Point]) -> String {
        closed_basis_path(points)
    }
}
