//! Planar geometry helpers: rigid frame transforms, rectangle construction and
//! heading wrap-around.
//!
//! A local frame is described by its `origin` in world coordinates and its
//! `rotation` in degrees (counter-clockwise). In a body frame `+y` points
//! forward and `+x` to the right.

use core::fmt;
use libm::{cos, fmod, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the plane.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point2 {
    /// The x-coordinate.
    pub x: f64,
    /// The y-coordinate.
    pub y: f64,
}

impl Point2 {
    /// Creates a new `Point2`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point2) -> f64 {
        libm::hypot(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

fn sin_cos_deg(rotation: f64) -> (f64, f64) {
    let rad = rotation.to_radians();
    (sin(rad), cos(rad))
}

/// Returns the four corners of a `width` × `height` rectangle centred at
/// `position` and rotated by `rotation` degrees.
///
/// Corners are ordered front-right, front-left, rear-left, rear-right, so
/// consecutive entries share an edge.
pub fn construct_rect(width: f64, height: f64, position: Point2, rotation: f64) -> [Point2; 4] {
    let dx = width / 2.0;
    let dy = height / 2.0;
    [
        absolute_position(Point2::new(dx, dy), position, rotation),
        absolute_position(Point2::new(-dx, dy), position, rotation),
        absolute_position(Point2::new(-dx, -dy), position, rotation),
        absolute_position(Point2::new(dx, -dy), position, rotation),
    ]
}

/// Maps `point`, given in the local frame `(origin, rotation)`, to world
/// coordinates.
pub fn absolute_position(point: Point2, origin: Point2, rotation: f64) -> Point2 {
    let (sin, cos) = sin_cos_deg(rotation);
    Point2::new(
        origin.x + point.x * cos - point.y * sin,
        origin.y + point.x * sin + point.y * cos,
    )
}

/// Maps a world `point` into the local frame `(origin, rotation)`.
///
/// Inverse of [`absolute_position`].
pub fn relative_position(point: Point2, origin: Point2, rotation: f64) -> Point2 {
    let (sin, cos) = sin_cos_deg(rotation);
    let x = point.x - origin.x;
    let y = point.y - origin.y;
    Point2::new(x * cos + y * sin, y * cos - x * sin)
}

/// Normalize an angle in degrees to be within `(-180, 180]`.
///
/// Angles at `-180` will be normalized to `180`.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = fmod(angle + 180.0, 360.0);
    if a < 0.0 {
        a += 360.0;
    }
    let a = a - 180.0;
    if a <= -180.0 { a + 360.0 } else { a }
}

/// Wrapped difference `a - b` between two headings, in `(-180, 180]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    normalize_angle(normalize_angle(a) - normalize_angle(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn assert_point_eq(a: Point2, b: Point2) {
        assert!(
            (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON,
            "{a} != {b}"
        );
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), 180.0); // -180 maps to 180 for (-180, 180]
        assert_eq!(normalize_angle(540.0), 180.0);
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(-720.0), 0.0);
        assert_eq!(normalize_angle(359.0), -1.0);
    }

    #[test]
    fn test_normalize_angle_periodic_and_bounded() {
        let mut a = -1000.0;
        while a < 1000.0 {
            let n = normalize_angle(a);
            assert!(n > -180.0 && n <= 180.0, "{a} -> {n}");
            let shifted = normalize_angle(a + 360.0);
            let gap = (shifted - n).abs();
            // Values straddling the seam may land on either side of ±180 by a rounding hair
            assert!(gap < 1e-9 || (gap - 360.0).abs() < 1e-9, "{a}: {n} vs {shifted}");
            a += 7.3;
        }
        for whole in -720..=720 {
            let a = whole as f64;
            assert_eq!(normalize_angle(a + 360.0), normalize_angle(a));
        }
    }

    #[test]
    fn test_angle_difference_across_seam() {
        assert!((angle_difference(179.0, -179.0) - -2.0).abs() < EPSILON);
        assert!((angle_difference(-179.0, 179.0) - 2.0).abs() < EPSILON);
        assert!((angle_difference(90.0, 450.0)).abs() < EPSILON);
    }

    #[test]
    fn test_absolute_position_rotates_counter_clockwise() {
        // Forward in a frame rotated by 90° points along world -x
        let p = absolute_position(Point2::new(0.0, 1.0), Point2::new(0.0, 0.0), 90.0);
        assert_point_eq(p, Point2::new(-1.0, 0.0));

        let p = absolute_position(Point2::new(2.0, 0.0), Point2::new(1.0, 1.0), 180.0);
        assert_point_eq(p, Point2::new(-1.0, 1.0));
    }

    #[test]
    fn test_relative_position_inverts_absolute_position() {
        let origins = [Point2::new(0.0, 0.0), Point2::new(640.0, 300.0), Point2::new(-3.5, 12.25)];
        let points = [Point2::new(1.0, 0.0), Point2::new(-40.0, 80.0), Point2::new(0.3, -7.7)];
        for origin in origins {
            for point in points {
                for rotation in [-270.0, -135.0, -30.0, 0.0, 17.5, 90.0, 179.9, 360.0] {
                    let world = absolute_position(point, origin, rotation);
                    assert_point_eq(relative_position(world, origin, rotation), point);
                }
            }
        }
    }

    #[test]
    fn test_construct_rect_corner_order() {
        let rect = construct_rect(2.0, 4.0, Point2::new(0.0, 0.0), 0.0);
        assert_point_eq(rect[0], Point2::new(1.0, 2.0)); // front-right
        assert_point_eq(rect[1], Point2::new(-1.0, 2.0)); // front-left
        assert_point_eq(rect[2], Point2::new(-1.0, -2.0)); // rear-left
        assert_point_eq(rect[3], Point2::new(1.0, -2.0)); // rear-right
    }

    #[test]
    fn test_construct_rect_corners_equidistant_from_center() {
        for (width, height) in [(60.0, 100.0), (80.0, 120.0), (1.0, 0.25)] {
            let half_diagonal = libm::hypot(width / 2.0, height / 2.0);
            for rotation in [0.0, 33.0, -90.0, 181.0] {
                let center = Point2::new(12.0, -4.0);
                let rect = construct_rect(width, height, center, rotation);
                for corner in rect {
                    assert!((corner.distance(center) - half_diagonal).abs() < EPSILON);
                }
                // Adjacent corners are one side length apart
                assert!((rect[0].distance(rect[1]) - width).abs() < EPSILON);
                assert!((rect[1].distance(rect[2]) - height).abs() < EPSILON);
            }
        }
    }
}
