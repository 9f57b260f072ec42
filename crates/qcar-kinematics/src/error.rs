#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while advancing the car
//! model.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used for a step.
    NegativeTimeDelta(&'static str),
    /// Error for a NaN or infinite control or time input.
    NonFiniteInput(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
            KinematicsError::NonFiniteInput(msg) => write!(f, "Non-finite input: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
