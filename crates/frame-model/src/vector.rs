//! 2D vectors and axis-aligned rectangles.
//!
//! Coordinates are in pixels with `(0, 0)` at the top-left of an image.
//! The rectangle type is used to work out how far a virtual camera can travel
//! along a direction before its crop window would leave the source frame.

use serde::{Deserialize, Serialize};

/// Determinant magnitude below which two lines are treated as parallel.
const DET_TOLERANCE: f64 = 1e-8;

/// A 2D vector of reals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}

impl Vector2d {
    pub const ZERO: Vector2d = Vector2d { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Vector2d {
        Vector2d::new(self.x * factor, self.y * factor)
    }

    pub fn neg(self) -> Vector2d {
        Vector2d::new(-self.x, -self.y)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit-length copy of this vector, or `None` for the zero vector.
    pub fn normalized(self) -> Option<Vector2d> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(self.scale(1.0 / len))
        } else {
            None
        }
    }

    /// Flip each axis whose sign disagrees with the reference direction.
    ///
    /// Axes where either value is zero are left untouched.
    pub fn align(self, reference: Vector2d) -> Vector2d {
        let flip = |v: f64, r: f64| {
            if (v > 0.0 && r < 0.0) || (v < 0.0 && r > 0.0) {
                -v
            } else {
                v
            }
        };
        Vector2d::new(flip(self.x, reference.x), flip(self.y, reference.y))
    }
}

impl From<(f64, f64)> for Vector2d {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2d::new(x, y)
    }
}

impl std::fmt::Display for Vector2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3},{:.3}", self.x, self.y)
    }
}

/// Intersection of the infinite lines through `(p1, p2)` and `(a, b)`.
///
/// Returns `None` when the lines are parallel (or either is degenerate).
pub fn intersect_lines(p1: Vector2d, p2: Vector2d, a: Vector2d, b: Vector2d) -> Option<Vector2d> {
    let d1 = p2.sub(p1);
    let d2 = b.sub(a);

    let det = -d1.x * d2.y + d1.y * d2.x;
    if det.abs() < DET_TOLERANCE {
        return None;
    }
    let det_inv = 1.0 / det;

    let r = det_inv * (-d2.y * (a.x - p1.x) + d2.x * (a.y - p1.y));
    let s = det_inv * (-d1.y * (a.x - p1.x) + d1.x * (a.y - p1.y));

    // Average the point reached along both lines to damp rounding error.
    let on_first = p1.add(d1.scale(r));
    let on_second = a.add(d2.scale(s));
    Some(on_first.add(on_second).scale(0.5))
}

/// An axis-aligned rectangle, stored as (min corner, max corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad2d {
    pub min: Vector2d,
    pub max: Vector2d,
}

impl Quad2d {
    /// Build from any two opposite corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min: Vector2d::new(x1.min(x2), y1.min(y2)),
            max: Vector2d::new(x1.max(x2), y1.max(y2)),
        }
    }

    /// A rectangle of the given size centred on `center`.
    pub fn centered(center: Vector2d, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width * 0.5,
            center.y - height * 0.5,
            center.x + width * 0.5,
            center.y + height * 0.5,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vector2d {
        self.max.add(self.min).scale(0.5)
    }

    pub fn diagonal_length(&self) -> f64 {
        self.max.sub(self.min).length()
    }

    /// Membership tolerance used when none is given.
    pub fn default_forgiveness(&self) -> f64 {
        self.diagonal_length() * 1e-5
    }

    /// Translated copy.
    pub fn translate(&self, offset: Vector2d) -> Quad2d {
        Quad2d {
            min: self.min.add(offset),
            max: self.max.add(offset),
        }
    }

    /// Corners in winding order: min, (min.x, max.y), max, (max.x, min.y).
    pub fn corners(&self) -> [Vector2d; 4] {
        [
            self.min,
            Vector2d::new(self.min.x, self.max.y),
            self.max,
            Vector2d::new(self.max.x, self.min.y),
        ]
    }

    /// Whether `v` lies inside, within the default forgiveness.
    pub fn contains_vector(&self, v: Vector2d) -> bool {
        self.contains_vector_within(v, self.default_forgiveness())
    }

    pub fn contains_vector_within(&self, v: Vector2d, forgiveness: f64) -> bool {
        (self.min.x - forgiveness) <= v.x
            && v.x <= (self.max.x + forgiveness)
            && (self.min.y - forgiveness) <= v.y
            && v.y <= (self.max.y + forgiveness)
    }

    /// The two points where the line through `origin` along `direction`
    /// crosses this rectangle's boundary.
    ///
    /// Returns `None` for a zero direction or when fewer than two distinct
    /// crossings exist (line misses the rectangle, or the rectangle is flat).
    pub fn calculate_intersections(
        &self,
        origin: Vector2d,
        direction: Vector2d,
    ) -> Option<(Vector2d, Vector2d)> {
        let dir = direction.normalized()?;
        let reach = self.diagonal_length();
        let p1 = origin.add(dir.scale(reach));
        let p2 = origin.sub(dir.scale(reach));

        let [a, b, c, d] = self.corners();
        let hits: Vec<Vector2d> = [(a, b), (b, c), (c, d), (d, a)]
            .into_iter()
            .filter_map(|(start, end)| intersect_lines(p1, p2, start, end))
            .filter(|hit| self.contains_vector(*hit))
            .collect();

        // A line through a corner hits two edges at the same point; skip duplicates.
        let tolerance = self.default_forgiveness();
        let first = *hits.first()?;
        let second = hits
            .iter()
            .skip(1)
            .find(|hit| hit.sub(first).length() > tolerance)?;
        Some((first, *second))
    }
}

impl std::fmt::Display for Quad2d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} - {})", self.min, self.max)
    }
}
