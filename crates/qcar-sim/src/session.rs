use std::fmt;

use qcar_kinematics::{Car, Pose, angle_difference, relative_position};
use tracing::{debug, info, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::{Action, Controls};
use crate::error::SimError;
use crate::goal::{Goal, Tolerance};
use crate::render::{FrameView, RenderSignal, Renderer, STATUS_LINES};

/// Magnitudes below this are reported as 0 for positions and speed.
pub const LINEAR_DEAD_ZONE: f64 = 1.0;
/// Magnitudes below this are reported as 0 for heading and steering.
pub const ANGULAR_DEAD_ZONE: f64 = 0.1;

/// Parameters a session is built from and reset to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Pose the car starts from after every reset.
    pub initial: Pose,
    /// Parking target.
    pub goal: Pose,
    /// Acceptance band around the goal.
    pub tolerance: Tolerance,
    /// Simulated frames per second; one frame advances the car by `1/fps`.
    pub fps: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            initial: Pose::new(640.0, 300.0, 0.0),
            goal: Pose::new(640.0, 300.0, 0.0),
            tolerance: Tolerance::new(10.0, 10.0, 5.0),
            fps: 50.0,
        }
    }
}

/// Reference frame for [`Session::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frame {
    /// Car minus goal, along the world axes.
    #[default]
    World,
    /// Goal as seen from the car's own rotated frame.
    Egocentric,
}

/// Snapshot of the car relative to the goal, with small magnitudes zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateVector {
    /// Offset along x.
    pub dx: f64,
    /// Offset along y.
    pub dy: f64,
    /// Wrapped heading difference (deg).
    pub dheading: f64,
    /// Car speed.
    pub speed: f64,
    /// Steering angle (deg).
    pub steering: f64,
}

impl StateVector {
    /// The state as `[dx, dy, dheading, speed, steering]`.
    pub fn to_array(self) -> [f64; 5] {
        [self.dx, self.dy, self.dheading, self.speed, self.steering]
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state: [{:.0}, {:.0}, {:.0}, {:.0}, {:.0}]",
            self.dx, self.dy, self.dheading, self.speed, self.steering
        )
    }
}

fn dead_zone(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold { 0.0 } else { value }
}

/// One car driving towards one goal under latched controls.
pub struct Session {
    config: SessionConfig,
    dt: f64,
    car: Car,
    goal: Goal,
    controls: Controls,
    running: bool,
    was_reset: bool,
    status: [String; STATUS_LINES],
    renderer: Option<Box<dyn Renderer>>,
}

impl Session {
    /// Build a session with the car at `config.initial` and neutral controls.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfig` if `fps` is not a positive finite
    /// number or a tolerance component is negative.
    pub fn new(config: SessionConfig) -> Result<Self, SimError> {
        if !(config.fps.is_finite() && config.fps > 0.0) {
            return Err(SimError::InvalidConfig("fps must be positive and finite"));
        }
        let t = config.tolerance;
        if t.x < 0.0 || t.y < 0.0 || t.heading < 0.0 {
            return Err(SimError::InvalidConfig("goal tolerance must be non-negative"));
        }

        Ok(Session {
            config,
            dt: 1.0 / config.fps,
            car: Car::new(config.initial),
            goal: Goal::new(config.goal, config.tolerance),
            controls: Controls::default(),
            running: true,
            was_reset: false,
            status: Default::default(),
            renderer: None,
        })
    }

    /// Attach a front end that is called after simulated frames.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Put the car back at its initial pose, at rest with straight wheels.
    ///
    /// Latched controls are kept.
    pub fn reset(&mut self) {
        self.car = Car::new(self.config.initial);
        self.goal = Goal::new(self.config.goal, self.config.tolerance);
        self.status = Default::default();
        self.was_reset = true;
        info!(initial = %self.config.initial, "Session reset");
    }

    /// Whether a reset happened since the last call. Clears the flag.
    pub fn was_reset(&mut self) -> bool {
        std::mem::take(&mut self.was_reset)
    }

    /// Stop the session. The next [`step`](Self::step) returns `false`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the session has not been stopped.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance `frames` frames under the latched controls.
    ///
    /// Each frame first turns the wheels, then drives. With a renderer
    /// attached, it is called after every frame or once at the end.
    ///
    /// # Returns
    ///
    /// `false` once the session was stopped.
    pub fn step(&mut self, frames: usize, render_every_frame: bool) -> Result<bool, SimError> {
        for _ in 0..frames {
            self.car.turn_wheel(self.controls.steering, self.dt)?;
            self.car.drive(self.controls.direction, self.dt)?;
            if render_every_frame {
                self.render();
            }
        }
        if !render_every_frame {
            self.render();
        }
        trace!(frames, car = %self.car, "Stepped session");
        Ok(self.running)
    }

    /// Car state relative to the goal in the requested frame.
    ///
    /// Components below [`LINEAR_DEAD_ZONE`] (position, speed) or
    /// [`ANGULAR_DEAD_ZONE`] (heading, steering) are reported as exactly 0.
    pub fn state(&self, frame: Frame) -> StateVector {
        let car = self.car.pose();
        let goal = self.goal.pose();
        let (dx, dy, dheading) = match frame {
            Frame::Egocentric => {
                let p = relative_position(goal.position(), car.position(), car.heading);
                (p.x, p.y, angle_difference(goal.heading, car.heading))
            }
            Frame::World => (
                car.x - goal.x,
                car.y - goal.y,
                angle_difference(car.heading, goal.heading),
            ),
        };

        StateVector {
            dx: dead_zone(dx, LINEAR_DEAD_ZONE),
            dy: dead_zone(dy, LINEAR_DEAD_ZONE),
            dheading: dead_zone(dheading, ANGULAR_DEAD_ZONE),
            speed: dead_zone(self.car.speed(), LINEAR_DEAD_ZONE),
            steering: dead_zone(self.car.steering(), ANGULAR_DEAD_ZONE),
        }
    }

    /// Whether every world-frame offset is strictly inside the goal tolerance.
    pub fn goal_reached(&self) -> bool {
        let state = self.state(Frame::World);
        let tol = self.goal.tolerance();
        state.dx.abs() < tol.x && state.dy.abs() < tol.y && state.dheading.abs() < tol.heading
    }

    /// Latch the controls of `action` for the following frames.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidAction` if the action cannot be decoded; the
    /// previously latched controls stay in effect.
    pub fn apply_action(&mut self, action: Action) -> Result<(), SimError> {
        self.controls = action.decode()?;
        debug!(?action, controls = %self.controls, "Applied action");
        Ok(())
    }

    /// Set one of the renderer's status lines. Out-of-range lines are ignored.
    pub fn print(&mut self, line: usize, text: impl Into<String>) {
        match self.status.get_mut(line) {
            Some(slot) => *slot = text.into(),
            None => debug!(line, "Ignoring status line outside the display"),
        }
    }

    /// The simulated car.
    pub fn car(&self) -> &Car {
        &self.car
    }

    /// Mutable access to the car, for presetting speed or steering.
    pub fn car_mut(&mut self) -> &mut Car {
        &mut self.car
    }

    /// The parking goal.
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Currently latched controls.
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Seconds simulated per frame.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The configuration the session resets to.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn render(&mut self) {
        if self.renderer.is_none() {
            return;
        }
        let state = self.state(Frame::World);
        let goal_reached = self.goal_reached();
        let turning_circle = self
            .car
            .turning_center()
            .map(|center| (center, self.car.turning_radius()));
        let view = FrameView {
            car: self.car.outline(),
            goal: self.goal.outline(),
            turning_circle,
            state,
            goal_reached,
            status: &self.status,
        };

        let signal = match self.renderer.as_mut() {
            Some(renderer) => renderer.render_frame(&view),
            None => RenderSignal::Continue,
        };
        match signal {
            RenderSignal::Continue => {}
            RenderSignal::Reset => self.reset(),
            RenderSignal::Stop => self.stop(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("car", &self.car)
            .field("controls", &self.controls)
            .field("running", &self.running)
            .field("has_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f64 = 1e-9;

    fn session(initial: Pose, goal: Pose) -> Session {
        Session::new(SessionConfig {
            initial,
            goal,
            tolerance: Tolerance::new(10.0, 10.0, 5.0),
            fps: 50.0,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_config() {
        let bad_fps = SessionConfig { fps: 0.0, ..SessionConfig::default() };
        assert!(matches!(Session::new(bad_fps), Err(SimError::InvalidConfig(_))));
        let bad_tol = SessionConfig {
            tolerance: Tolerance::new(-1.0, 1.0, 1.0),
            ..SessionConfig::default()
        };
        assert!(matches!(Session::new(bad_tol), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_world_state_and_dead_zone() {
        let mut s = session(Pose::new(100.5, 250.0, 10.05), Pose::new(100.0, 200.0, 0.0));
        let state = s.state(Frame::World);
        assert_eq!(state.dx, 0.0); // 0.5 is inside the linear dead zone
        assert!((state.dy - 50.0).abs() < EPSILON);
        assert!((state.dheading - 10.05).abs() < EPSILON);
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.steering, 0.0);

        s.car_mut().set_steering(0.05);
        s.car_mut().set_speed(0.99);
        let state = s.state(Frame::World);
        assert_eq!(state.steering, 0.0);
        assert_eq!(state.speed, 0.0);
        s.car_mut().set_steering(0.1);
        assert_eq!(s.state(Frame::World).steering, 0.1);
    }

    #[test]
    fn test_heading_difference_is_wrapped() {
        let s = session(Pose::new(0.0, 0.0, 175.0), Pose::new(0.0, 0.0, -175.0));
        assert!((s.state(Frame::World).dheading - -10.0).abs() < EPSILON);
        assert!((s.state(Frame::Egocentric).dheading - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_egocentric_state() {
        // Car at origin facing -x (heading 90); goal 100 units ahead of it
        let s = session(Pose::new(0.0, 0.0, 90.0), Pose::new(-100.0, 0.0, 90.0));
        let state = s.state(Frame::Egocentric);
        assert_eq!(state.dx, 0.0);
        assert!((state.dy - 100.0).abs() < EPSILON);
        assert_eq!(state.dheading, 0.0);

        let world = s.state(Frame::World);
        assert!((world.dx - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_goal_reached_uses_strict_tolerance() {
        let goal = Pose::new(640.0, 300.0, 0.0);
        assert!(session(Pose::new(645.0, 295.0, 4.0), goal).goal_reached());
        assert!(!session(Pose::new(650.0, 300.0, 0.0), goal).goal_reached());
        assert!(!session(Pose::new(640.0, 300.0, -5.0), goal).goal_reached());
        assert!(session(Pose::new(640.0, 300.0, 359.0), goal).goal_reached());
    }

    #[test]
    fn test_step_applies_latched_controls() {
        let mut s = session(Pose::new(0.0, 0.0, 0.0), Pose::new(0.0, 0.0, 0.0));
        s.apply_action(Action::Discrete(4)).unwrap(); // forward + left
        assert!(s.step(10, false).unwrap());
        // Steering grows 60°/s · 0.02 s per frame
        assert!((s.car().steering() - 12.0).abs() < EPSILON);
        assert!(s.car().speed() > 0.0);
        assert!(s.car().heading() > 0.0);

        assert!(s.apply_action(Action::Discrete(12)).is_err());
        assert_eq!(s.controls(), Controls::new(1.0, 1.0));
    }

    #[test]
    fn test_stop_and_reset() {
        let mut s = session(Pose::new(1.0, 2.0, 3.0), Pose::new(0.0, 0.0, 0.0));
        s.apply_action(Action::Continuous { direction: 1.0, steering: 0.0 }).unwrap();
        s.step(5, true).unwrap();
        s.print(0, "hello");
        assert_ne!(s.car().pose(), Pose::new(1.0, 2.0, 3.0));

        s.reset();
        assert_eq!(s.car().pose(), Pose::new(1.0, 2.0, 3.0));
        assert_eq!(s.car().speed(), 0.0);
        assert!(s.was_reset());
        assert!(!s.was_reset());

        s.stop();
        assert!(!s.step(1, true).unwrap());
    }

    struct Recorder {
        frames: Rc<RefCell<Vec<StateVector>>>,
        stop_after: usize,
    }

    impl Renderer for Recorder {
        fn render_frame(&mut self, frame: &FrameView<'_>) -> RenderSignal {
            let mut frames = self.frames.borrow_mut();
            frames.push(frame.state);
            if frame.status[1] == "reset me" {
                return RenderSignal::Reset;
            }
            if frames.len() >= self.stop_after {
                RenderSignal::Stop
            } else {
                RenderSignal::Continue
            }
        }
    }

    #[test]
    fn test_renderer_called_per_frame_and_can_stop() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder { frames: Rc::clone(&frames), stop_after: 3 };
        let mut s = session(Pose::new(0.0, 0.0, 0.0), Pose::new(0.0, 0.0, 0.0))
            .with_renderer(Box::new(recorder));

        assert!(s.step(2, true).unwrap());
        assert_eq!(frames.borrow().len(), 2);
        assert!(!s.step(4, false).unwrap());
        assert_eq!(frames.borrow().len(), 3);
    }

    #[test]
    fn test_renderer_can_reset() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder { frames: Rc::clone(&frames), stop_after: usize::MAX };
        let mut s = session(Pose::new(0.0, 0.0, 0.0), Pose::new(0.0, 0.0, 0.0))
            .with_renderer(Box::new(recorder));
        s.apply_action(Action::Discrete(3)).unwrap();
        s.step(3, false).unwrap();
        s.print(1, "reset me");
        s.step(3, false).unwrap();
        assert!(s.was_reset());
        assert_eq!(s.car().pose(), Pose::new(0.0, 0.0, 0.0));
    }
}
