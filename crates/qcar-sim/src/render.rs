//! Optional drawing capability.
//!
//! The session never draws by itself. A front end implements [`Renderer`] and
//! is handed a [`FrameView`] after simulated frames; its [`RenderSignal`]
//! reply is how user input (reset, quit) reaches the session.

use qcar_kinematics::{CarOutline, Point2};

use crate::session::StateVector;

/// Number of status lines a session keeps for its renderer.
pub const STATUS_LINES: usize = 10;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Silhouette of the car.
    pub car: CarOutline,
    /// Corners of the parking bay.
    pub goal: [Point2; 4],
    /// Turning-circle centre and pivot radius, if the last step turned.
    pub turning_circle: Option<(Point2, f64)>,
    /// World-frame state relative to the goal.
    pub state: StateVector,
    /// Whether the car is within the goal tolerance.
    pub goal_reached: bool,
    /// Caller-provided status lines; empty strings are unused slots.
    pub status: &'a [String; STATUS_LINES],
}

/// What the front end wants the session to do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderSignal {
    /// Keep running.
    #[default]
    Continue,
    /// Put the car back at its initial pose.
    Reset,
    /// Stop the session; `step` reports `false` from now on.
    Stop,
}

/// A drawing front end injected into a [`Session`](crate::Session).
pub trait Renderer {
    /// Draws one frame.
    fn render_frame(&mut self, frame: &FrameView<'_>) -> RenderSignal;
}
