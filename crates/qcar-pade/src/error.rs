//! This module defines the error types used by the `qcar-pade` crate.

/// Errors raised for malformed estimator or label inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PadeError {
    /// A row's length differs from the first row's.
    #[error("Row {row} has {found} attributes, expected {expected}")]
    RaggedRows {
        /// Offending row index.
        row: usize,
        /// Attributes in the first row.
        expected: usize,
        /// Attributes in the offending row.
        found: usize,
    },

    /// The target vector does not have one value per sample.
    #[error("Target has {found} values for {expected} samples")]
    TargetLength {
        /// Number of samples.
        expected: usize,
        /// Number of target values.
        found: usize,
    },

    /// The neighbourhood size must be at least one.
    #[error("Neighbour count must be positive")]
    ZeroNeighbours,

    /// Attribute names do not match the Q-table columns.
    #[error("Got {found} attribute names for {expected} Q-table columns")]
    NameCount {
        /// Columns in the Q-table.
        expected: usize,
        /// Names supplied.
        found: usize,
    },

    /// A selected column does not exist.
    #[error("Column {column} is out of range for {columns} columns")]
    ColumnOutOfRange {
        /// Requested column.
        column: usize,
        /// Available columns.
        columns: usize,
    },
}
