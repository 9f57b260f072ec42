//! Qualitative partial-derivative estimation.
//!
//! Given `n` samples of `m` attributes and a target value per sample,
//! [`estimate`] returns a [`QTable`] holding the sign of the local partial
//! derivative of the target with respect to each attribute at each sample.
//! [`labels`] turns Q-table rows into `Q(+a, -b)` class labels.

pub mod error;
pub mod estimator;
pub mod labels;
pub mod matrix;

pub use error::PadeError;
pub use estimator::{DEFAULT_NEIGHBOURS, Pade, estimate, tube_neighbours};
pub use labels::{build_labels, enumerate_labels, format_label};
pub use matrix::{QTable, SampleMatrix};
