//! Dense row-major tables used by the estimator.

use std::fmt;

use crate::error::PadeError;

/// `n` samples × `m` numeric attributes, stored row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    /// Builds a matrix from rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns `PadeError::RaggedRows` naming the first row whose length
    /// differs from the first row.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, PadeError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != cols {
                return Err(PadeError::RaggedRows {
                    row,
                    expected: cols,
                    found: r.len(),
                });
            }
            values.extend_from_slice(r);
        }
        Ok(SampleMatrix {
            rows: rows.len(),
            cols,
            values,
        })
    }

    /// Number of samples.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of attributes.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Attributes of sample `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    /// Attribute `d` of sample `i`.
    pub fn get(&self, i: usize, d: usize) -> f64 {
        self.values[i * self.cols + d]
    }

    /// Iterates over the samples.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // a zero-width matrix holds no values, so any nonzero chunk size yields nothing
        self.values.chunks_exact(self.cols.max(1))
    }
}

/// Signs of the local partial derivatives, one cell per sample and attribute.
///
/// Cells hold `-1`, `0` or `1`; `0` marks a flat or undetermined estimate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QTable {
    rows: usize,
    cols: usize,
    signs: Vec<i8>,
}

impl QTable {
    /// An all-zero table.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        QTable {
            rows,
            cols,
            signs: vec![0; rows * cols],
        }
    }

    /// Builds a table from per-attribute columns of equal length.
    pub(crate) fn from_columns(rows: usize, columns: Vec<Vec<i8>>) -> Self {
        let mut table = QTable::zeros(rows, columns.len());
        for (d, column) in columns.into_iter().enumerate() {
            for (i, sign) in column.into_iter().enumerate() {
                table.signs[i * table.cols + d] = sign;
            }
        }
        table
    }

    /// Number of samples.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of attributes.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Sign at sample `i`, attribute `d`.
    pub fn get(&self, i: usize, d: usize) -> i8 {
        self.signs[i * self.cols + d]
    }

    /// Signs of sample `i`.
    pub fn row(&self, i: usize) -> &[i8] {
        &self.signs[i * self.cols..(i + 1) * self.cols]
    }

    /// Signs of attribute `d` across all samples.
    pub fn column(&self, d: usize) -> Vec<i8> {
        (0..self.rows).map(|i| self.get(i, d)).collect()
    }

    /// A table restricted to `columns`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `PadeError::ColumnOutOfRange` for a column index past the end.
    pub fn select_columns(&self, columns: &[usize]) -> Result<QTable, PadeError> {
        if let Some(&column) = columns.iter().find(|&&c| c >= self.cols) {
            return Err(PadeError::ColumnOutOfRange {
                column,
                columns: self.cols,
            });
        }
        let selected = columns.iter().map(|&d| self.column(d)).collect();
        Ok(QTable::from_columns(self.rows, selected))
    }
}

impl fmt::Display for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|s| format!("{s:>2}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}
