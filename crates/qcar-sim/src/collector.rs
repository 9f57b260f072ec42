//! Trajectory sampling on top of [`Session`].
//!
//! Two samplers are provided:
//!
//! * [`collect_sweep`] drives one session per initial heading with the wheel
//!   swinging between its stops and differences consecutive states.
//! * [`probe_arc`] / [`random_probes`] start the car with a preset speed and
//!   steering angle and measure where it ends up after a fixed number of
//!   frames.

use std::fmt;
use std::str::FromStr;

use qcar_kinematics::car::MAX_STEERING;
use qcar_kinematics::{Pose, angle_difference, normalize_angle};
use rand::Rng;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::SimError;
use crate::goal::Tolerance;
use crate::session::{Frame, Session, SessionConfig, StateVector};

/// One row of trajectory data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectorySample {
    /// Heading relative to the goal (deg).
    pub heading: f64,
    /// Offset from the goal along x.
    pub x: f64,
    /// Change of `x` since the previous frame.
    pub dx: f64,
    /// Offset from the goal along y.
    pub y: f64,
    /// Change of `y` since the previous frame.
    pub dy: f64,
    /// Wrapped change of heading since the previous frame.
    pub dheading: f64,
    /// Direction of the front wheels, `heading + steering`, wrapped.
    pub gamma: f64,
    /// Speed.
    pub speed: f64,
    /// Steering angle (deg).
    pub steering: f64,
}

/// Named column of a [`TrajectorySample`].
///
/// Serialized under its [`name`](FeatureColumn::name).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    /// [`TrajectorySample::heading`]
    #[cfg_attr(feature = "serde", serde(rename = "theta"))]
    Heading,
    /// [`TrajectorySample::x`]
    X,
    /// [`TrajectorySample::dx`]
    Dx,
    /// [`TrajectorySample::y`]
    Y,
    /// [`TrajectorySample::dy`]
    Dy,
    /// [`TrajectorySample::dheading`]
    #[cfg_attr(feature = "serde", serde(rename = "dtheta"))]
    Dheading,
    /// [`TrajectorySample::gamma`]
    Gamma,
    /// [`TrajectorySample::speed`]
    #[cfg_attr(feature = "serde", serde(rename = "v"))]
    Speed,
    /// [`TrajectorySample::steering`]
    #[cfg_attr(feature = "serde", serde(rename = "alpha"))]
    Steering,
}

impl FeatureColumn {
    /// Every column, in declaration order.
    pub const ALL: [FeatureColumn; 9] = [
        FeatureColumn::Heading,
        FeatureColumn::X,
        FeatureColumn::Dx,
        FeatureColumn::Y,
        FeatureColumn::Dy,
        FeatureColumn::Dheading,
        FeatureColumn::Gamma,
        FeatureColumn::Speed,
        FeatureColumn::Steering,
    ];

    /// Short attribute name used in Q-labels.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Heading => "theta",
            FeatureColumn::X => "x",
            FeatureColumn::Dx => "dx",
            FeatureColumn::Y => "y",
            FeatureColumn::Dy => "dy",
            FeatureColumn::Dheading => "dtheta",
            FeatureColumn::Gamma => "gamma",
            FeatureColumn::Speed => "v",
            FeatureColumn::Steering => "alpha",
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureColumn {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureColumn::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or(SimError::InvalidConfig("unknown feature column"))
    }
}

impl TrajectorySample {
    /// Value of one column.
    pub fn get(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Heading => self.heading,
            FeatureColumn::X => self.x,
            FeatureColumn::Dx => self.dx,
            FeatureColumn::Y => self.y,
            FeatureColumn::Dy => self.dy,
            FeatureColumn::Dheading => self.dheading,
            FeatureColumn::Gamma => self.gamma,
            FeatureColumn::Speed => self.speed,
            FeatureColumn::Steering => self.steering,
        }
    }

    fn between(previous: &StateVector, current: &StateVector) -> Self {
        TrajectorySample {
            heading: current.dheading,
            x: current.dx,
            dx: current.dx - previous.dx,
            y: current.dy,
            dy: current.dy - previous.dy,
            dheading: angle_difference(current.dheading, previous.dheading),
            gamma: normalize_angle(current.dheading + current.steering),
            speed: current.speed,
            steering: current.steering,
        }
    }
}

/// Builds row-major feature rows from samples, one entry per requested column.
pub fn feature_rows(samples: &[TrajectorySample], columns: &[FeatureColumn]) -> Vec<Vec<f64>> {
    samples
        .iter()
        .map(|s| columns.iter().map(|&c| s.get(c)).collect())
        .collect()
}

/// Extracts one column from samples.
pub fn feature_column(samples: &[TrajectorySample], column: FeatureColumn) -> Vec<f64> {
    samples.iter().map(|s| s.get(column)).collect()
}

/// Parameters of a heading sweep.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// One session is run per initial heading (deg).
    pub initial_headings: Vec<f64>,
    /// Frames simulated per session; the first frame only primes the differences.
    pub samples_per_heading: usize,
    /// Where sessions start (heading replaced per run) and what they aim for.
    pub session: SessionConfig,
    /// Pedal input held during the sweep.
    pub direction: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            initial_headings: vec![-90.0, 0.0, 90.0, 180.0],
            samples_per_heading: 180,
            session: SessionConfig::default(),
            direction: 1.0,
        }
    }
}

/// Drives one session per initial heading and records frame-to-frame samples.
///
/// The steering input is held at ±1 and flips whenever the wheels reach
/// their stop, so the car weaves.
///
/// # Errors
///
/// Propagates session construction and step errors.
pub fn collect_sweep(config: &SweepConfig) -> Result<Vec<TrajectorySample>, SimError> {
    let mut samples = Vec::with_capacity(
        config.initial_headings.len() * config.samples_per_heading.saturating_sub(1),
    );

    for &heading in &config.initial_headings {
        let initial = Pose::new(config.session.initial.x, config.session.initial.y, heading);
        let mut session = Session::new(SessionConfig { initial, ..config.session })?;
        let before = samples.len();

        let mut previous = StateVector::default();
        let mut steering = 1.0;
        for i in 0..config.samples_per_heading {
            if !session.step(1, true)? {
                break;
            }
            let current = session.state(Frame::World);
            if i > 0 {
                samples.push(TrajectorySample::between(&previous, &current));
            }
            previous = current;

            if current.steering.abs() >= MAX_STEERING {
                steering = -steering;
            }
            session.apply_action(Action::Continuous {
                direction: config.direction,
                steering,
            })?;
        }
        debug!(heading, samples = samples.len() - before, "Sweep run finished");
    }

    info!(
        runs = config.initial_headings.len(),
        samples = samples.len(),
        "Heading sweep collected"
    );
    Ok(samples)
}

/// Parameters of arc probes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeConfig {
    /// Number of random probes.
    pub count: usize,
    /// Initial speed of every probe.
    pub speed: f64,
    /// Frames simulated per probe.
    pub frames: usize,
    /// Simulation rate.
    pub fps: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            count: 1000,
            speed: 50.0,
            frames: 50,
            fps: 50.0,
        }
    }
}

/// Outcome of one arc probe.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArcProbe {
    /// Initial heading (deg).
    pub heading: f64,
    /// Preset steering angle (deg).
    pub steering: f64,
    /// Initial wheel direction `heading + steering`, wrapped.
    pub gamma: f64,
    /// Preset speed.
    pub speed: f64,
    /// Final x offset from the start.
    pub dx: f64,
    /// Final y offset from the start.
    pub dy: f64,
    /// Wrapped heading change.
    pub dheading: f64,
}

impl ArcProbe {
    /// The probe as a row, `[heading, steering, gamma, speed, dx, dy, dheading]`.
    pub fn to_array(self) -> [f64; 7] {
        [
            self.heading,
            self.steering,
            self.gamma,
            self.speed,
            self.dx,
            self.dy,
            self.dheading,
        ]
    }

    /// Value of one column; probes carry no absolute `x` or `y`.
    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::Heading => Some(self.heading),
            FeatureColumn::Steering => Some(self.steering),
            FeatureColumn::Gamma => Some(self.gamma),
            FeatureColumn::Speed => Some(self.speed),
            FeatureColumn::Dx => Some(self.dx),
            FeatureColumn::Dy => Some(self.dy),
            FeatureColumn::Dheading => Some(self.dheading),
            FeatureColumn::X | FeatureColumn::Y => None,
        }
    }
}

/// Starts a car at the origin with the given heading, steering and speed,
/// lets it coast for `config.frames` frames and reports the displacement.
///
/// # Errors
///
/// Returns `SimError::InvalidConfig` for a non-positive fps and propagates
/// step errors.
pub fn probe_arc(
    config: &ProbeConfig,
    heading: f64,
    steering: f64,
    speed: f64,
) -> Result<ArcProbe, SimError> {
    let mut session = Session::new(SessionConfig {
        initial: Pose::new(0.0, 0.0, heading),
        goal: Pose::default(),
        tolerance: Tolerance::default(),
        fps: config.fps,
    })?;
    if steering.abs() > MAX_STEERING {
        warn!(steering, "Probe steering beyond the wheel stop, saturating");
    }
    session.car_mut().set_steering(steering);
    session.car_mut().set_speed(speed);
    session.step(config.frames, false)?;

    let end = session.state(Frame::World);
    let steering = session.car().steering();
    Ok(ArcProbe {
        heading: normalize_angle(heading),
        steering,
        gamma: normalize_angle(heading + steering),
        speed,
        dx: end.dx,
        dy: end.dy,
        dheading: angle_difference(end.dheading, heading),
    })
}

/// Runs `config.count` probes with uniformly drawn heading and steering.
///
/// # Errors
///
/// Propagates [`probe_arc`] errors.
pub fn random_probes<R: Rng>(
    rng: &mut R,
    config: &ProbeConfig,
) -> Result<Vec<ArcProbe>, SimError> {
    let probes = (0..config.count)
        .map(|_| {
            let heading = rng.random_range(-180.0..180.0);
            let steering = rng.random_range(-MAX_STEERING..MAX_STEERING);
            probe_arc(config, heading, steering, config.speed)
        })
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = probes.len(), speed = config.speed, "Arc probes collected");
    Ok(probes)
}
