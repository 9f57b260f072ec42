//! Control actions accepted by a [`Session`](crate::Session).

use std::fmt;

use crate::error::SimError;

/// Pedal and steering commands latched by a session.
///
/// Both components lie in `[-1, 1]`. Positive direction drives forward,
/// positive steering turns the wheels left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    /// Pedal input: -1 reverse, 0 coast, 1 forward.
    pub direction: f64,
    /// Steering input: -1 right, 0 hold, 1 left.
    pub steering: f64,
}

impl Controls {
    /// Construct controls without clamping.
    pub const fn new(direction: f64, steering: f64) -> Self {
        Controls { direction, steering }
    }
}

impl fmt::Display for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(direction: {}, steering: {})", self.direction, self.steering)
    }
}

/// The fixed table of discrete actions, indexed by [`Action::Discrete`].
pub const ACTIONS: [Controls; 9] = [
    Controls::new(0.0, 0.0),
    Controls::new(0.0, 1.0),
    Controls::new(0.0, -1.0),
    Controls::new(1.0, 0.0),
    Controls::new(1.0, 1.0),
    Controls::new(1.0, -1.0),
    Controls::new(-1.0, 0.0),
    Controls::new(-1.0, 1.0),
    Controls::new(-1.0, -1.0),
];

/// A control action, either given directly or picked from [`ACTIONS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Direct pedal and steering inputs, clamped to `[-1, 1]`.
    Continuous {
        /// Pedal input.
        direction: f64,
        /// Steering input.
        steering: f64,
    },
    /// Index into [`ACTIONS`].
    Discrete(usize),
}

impl Action {
    /// Resolves the action into controls.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidAction` for an out-of-range index or a NaN
    /// component.
    pub fn decode(self) -> Result<Controls, SimError> {
        match self {
            Action::Continuous { direction, steering } => {
                if direction.is_nan() || steering.is_nan() {
                    return Err(SimError::InvalidAction(format!(
                        "continuous action has NaN component (direction: {direction}, steering: {steering})"
                    )));
                }
                Ok(Controls::new(direction.clamp(-1.0, 1.0), steering.clamp(-1.0, 1.0)))
            }
            Action::Discrete(index) => ACTIONS.get(index).copied().ok_or_else(|| {
                SimError::InvalidAction(format!(
                    "discrete action index {index} is outside 0..{}",
                    ACTIONS.len()
                ))
            }),
        }
    }
}

impl From<Controls> for Action {
    fn from(controls: Controls) -> Self {
        Action::Continuous {
            direction: controls.direction,
            steering: controls.steering,
        }
    }
}
