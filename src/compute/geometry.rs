//! Planar geometry primitives used for collision and line-of-sight tests.

use serde::{Deserialize, Serialize};

/// A point (or displacement) in field coordinates. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by `(dx, dy) * scale`.
    #[inline]
    pub fn offset(self, dx: f32, dy: f32, scale: f32) -> Point {
        Point::new(self.x + dx * scale, self.y + dy * scale)
    }

    /// Integer pixel coordinates (truncated toward zero).
    #[inline]
    pub fn pixel(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// A closed line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Parametric segment-segment intersection test.
    ///
    /// Parallel and collinear pairs (zero denominator) never intersect.
    /// Endpoints are inclusive.
    pub fn intersects(&self, other: &Segment) -> bool {
        let (x1, y1, x2, y2) = (self.a.x, self.a.y, self.b.x, self.b.y);
        let (x3, y3, x4, y4) = (other.a.x, other.a.y, other.b.x, other.b.y);

        let den = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if den == 0.0 {
            return false;
        }

        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / den;
        let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / den;

        (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
    }
}

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of half-width `half` centered on `center`.
    #[inline]
    pub fn centered(center: Point, half: f32) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Interior overlap test. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Boundary edges in order: top, right, bottom, left.
    pub fn edges(&self) -> [Segment; 4] {
        let tl = Point::new(self.left(), self.top());
        let tr = Point::new(self.right(), self.top());
        let br = Point::new(self.right(), self.bottom());
        let bl = Point::new(self.left(), self.bottom());
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }

    /// Whether any boundary edge crosses `segment`.
    ///
    /// Stops at the first hit, so each rectangle is counted at most once by callers.
    pub fn boundary_intersects(&self, segment: &Segment) -> bool {
        self.edges().iter().any(|edge| segment.intersects(edge))
    }
}

/// True when no obstacle boundary crosses the segment from `from` to `to`.
pub fn has_clear_path(obstacles: &[Rect], from: Point, to: Point) -> bool {
    let sight = Segment::new(from, to);
    !obstacles.iter().any(|o| o.boundary_intersects(&sight))
}

/// Number of distinct obstacles whose boundary crosses the segment from `from` to `to`.
pub fn count_blocking(obstacles: &[Rect], from: Point, to: Point) -> usize {
    let sight = Segment::new(from, to);
    obstacles
        .iter()
        .filter(|o| o.boundary_intersects(&sight))
        .count()
}

/// Collision test for a creature of radius `radius` moving from `old` to `new`.
///
/// Hits when the inflated square around `new` overlaps an obstacle, or when
/// the swept segment crosses an obstacle boundary.
pub fn collides(obstacles: &[Rect], old: Point, new: Point, radius: f32) -> bool {
    let body = Rect::centered(new, radius);
    if obstacles.iter().any(|o| body.overlaps(o)) {
        return true;
    }
    let sweep = Segment::new(old, new);
    obstacles.iter().any(|o| o.boundary_intersects(&sweep))
}
