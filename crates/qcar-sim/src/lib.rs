//! Parking simulation on top of `qcar-kinematics`.
//!
//! A [`Session`] owns one car and one goal, latches a control [`Action`] and
//! advances the car at a fixed frame rate. The [`collector`] module drives
//! sessions to produce trajectory samples for qualitative analysis.

pub mod action;
pub mod collector;
pub mod error;
pub mod goal;
pub mod render;
pub mod session;

pub use action::{ACTIONS, Action, Controls};
pub use collector::{
    ArcProbe, FeatureColumn, ProbeConfig, SweepConfig, TrajectorySample, collect_sweep,
    feature_column, feature_rows, probe_arc, random_probes,
};
pub use error::SimError;
pub use goal::{Goal, Tolerance};
pub use render::{FrameView, RenderSignal, Renderer};
pub use session::{Frame, Session, SessionConfig, StateVector};
