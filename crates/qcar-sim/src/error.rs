//! This module defines the error types used by the `qcar-sim` crate.

use qcar_kinematics::KinematicsError;

/// Errors that can occur while driving a simulation session.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An action could not be decoded into controls.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Session or collector parameters are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The car model rejected a step.
    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),
}
