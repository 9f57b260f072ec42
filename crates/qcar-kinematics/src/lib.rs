#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D steered-car kinematics."]
#![doc = ""]
#![doc = "This crate provides planar frame transforms, angle wrapping and a bicycle-style"]
#![doc = "car model that integrates its motion along exact circular arcs."]
#![doc = ""]
#![doc = "Angles are in degrees. A heading of 0 faces the world +y axis and positive"]
#![doc = "headings rotate counter-clockwise."]

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod car;
pub mod error;
pub mod geometry;

pub use car::{Car, CarOutline};
pub use error::KinematicsError;
pub use geometry::{
    Point2, absolute_position, angle_difference, construct_rect, normalize_angle,
    relative_position,
};

/// A 2‑D pose `(x, y, heading)` with the heading in degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position.
    pub x: f64,
    /// World‑frame y position.
    pub y: f64,
    /// Heading (deg), normalized to `(-180, 180]`.
    pub heading: f64,
}

impl Pose {
    /// Construct a new pose. The heading is wrapped into `(-180, 180]`.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position.
    /// * `heading`: Heading in degrees.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose {
            x,
            y,
            heading: normalize_angle(heading),
        }
    }

    /// The position part of the pose.
    pub const fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2}°)", self.x, self.y, self.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_wraps_heading() {
        let pose = Pose::new(1.0, 2.0, 450.0);
        assert_eq!(pose.position(), Point2::new(1.0, 2.0));
        assert!((pose.heading - 90.0).abs() < 1e-9);
        assert_eq!(Pose::new(0.0, 0.0, -180.0).heading, 180.0);
    }

    #[test]
    fn test_pose_display() {
        let pose = Pose::new(1.0, -2.5, 30.0);
        assert_eq!(pose.to_string(), "(x: 1.00, y: -2.50, θ: 30.00°)");
    }
}
