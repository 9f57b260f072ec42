use qcar_kinematics::{Point2, Pose, construct_rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length of the parking bay drawn around a goal.
pub const BAY_LENGTH: f64 = 120.0;
/// Width of the parking bay drawn around a goal.
pub const BAY_WIDTH: f64 = 80.0;

/// Per-axis acceptance band around a goal pose.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tolerance {
    /// Allowed |Δx|.
    pub x: f64,
    /// Allowed |Δy|.
    pub y: f64,
    /// Allowed |Δheading| in degrees.
    pub heading: f64,
}

impl Tolerance {
    /// Construct a tolerance triple.
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Tolerance { x, y, heading }
    }
}

/// Target pose the car is supposed to park at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pose: Pose,
    tolerance: Tolerance,
}

impl Goal {
    /// Construct a goal.
    pub fn new(pose: Pose, tolerance: Tolerance) -> Self {
        Goal { pose, tolerance }
    }

    /// The target pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The acceptance band.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Corners of the parking bay, in [`construct_rect`] order.
    pub fn outline(&self) -> [Point2; 4] {
        construct_rect(BAY_WIDTH, BAY_LENGTH, self.pose.position(), self.pose.heading)
    }
}
