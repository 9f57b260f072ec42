//! Partial-derivative estimation along attribute tubes.
//!
//! For every sample and attribute `d`, the estimator picks the `k` samples
//! closest to it in all attributes *except* `d` (the "tube"), fits a
//! Gaussian-weighted univariate regression of the target on attribute `d`
//! over those neighbours and keeps only the sign of the slope.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::PadeError;
use crate::matrix::{QTable, SampleMatrix};

/// Neighbourhood size used when none is configured.
pub const DEFAULT_NEIGHBOURS: usize = 10;

/// Weight given to the farthest tube neighbour.
const FARTHEST_WEIGHT: f64 = 0.001;

/// Below this spread along the tube dimension the kernel width is not scaled.
const MIN_SPREAD: f64 = 1e-10;

/// Configured PADE estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pade {
    neighbours: usize,
}

impl Default for Pade {
    fn default() -> Self {
        Pade {
            neighbours: DEFAULT_NEIGHBOURS,
        }
    }
}

impl Pade {
    /// Creates an estimator using `neighbours` tube neighbours per cell.
    pub fn new(neighbours: usize) -> Result<Self, PadeError> {
        if neighbours == 0 {
            return Err(PadeError::ZeroNeighbours);
        }
        Ok(Pade { neighbours })
    }

    /// Tube neighbourhood size.
    pub fn neighbours(&self) -> usize {
        self.neighbours
    }

    /// Estimates the sign of ∂target/∂attribute at every sample.
    ///
    /// Cells whose sample has fewer than `k` other samples, or whose
    /// regression is degenerate, are `0`.
    ///
    /// # Errors
    ///
    /// Returns `PadeError::TargetLength` if `target` does not hold one value
    /// per row of `data`.
    pub fn estimate(&self, data: &SampleMatrix, target: &[f64]) -> Result<QTable, PadeError> {
        if target.len() != data.nrows() {
            return Err(PadeError::TargetLength {
                expected: data.nrows(),
                found: target.len(),
            });
        }

        let columns: Vec<Vec<i8>> = {
            #[cfg(feature = "parallel")]
            let dims = (0..data.ncols()).into_par_iter();
            #[cfg(not(feature = "parallel"))]
            let dims = 0..data.ncols();
            dims.map(|d| self.estimate_dimension(data, target, d))
                .collect()
        };

        let table = QTable::from_columns(data.nrows(), columns);
        info!(
            samples = table.nrows(),
            attributes = table.ncols(),
            neighbours = self.neighbours,
            "PADE estimation complete"
        );
        Ok(table)
    }

    fn estimate_dimension(&self, data: &SampleMatrix, target: &[f64], d: usize) -> Vec<i8> {
        let column: Vec<i8> = (0..data.nrows())
            .map(|i| {
                let neighbours = tube_neighbours(data, i, d, self.neighbours);
                if neighbours.len() < self.neighbours {
                    return 0;
                }
                let x0 = data.get(i, d);
                let points: Vec<(f64, f64)> = neighbours
                    .iter()
                    .map(|&j| (data.get(j, d), target[j]))
                    .collect();
                sign(weighted_slope(x0, &points))
            })
            .collect();

        debug!(
            dimension = d,
            positive = column.iter().filter(|&&s| s > 0).count(),
            negative = column.iter().filter(|&&s| s < 0).count(),
            "Estimated tube dimension"
        );
        column
    }
}

/// Estimates a Q-table using `k` tube neighbours.
///
/// Shorthand for `Pade::new(k)?.estimate(data, target)`.
pub fn estimate(data: &SampleMatrix, target: &[f64], k: usize) -> Result<QTable, PadeError> {
    Pade::new(k)?.estimate(data, target)
}

/// Indices of the (up to) `k` samples nearest to sample `i`, measuring
/// Euclidean distance over every attribute except `d`.
///
/// Sample `i` itself is excluded. Ties keep their sample order.
pub fn tube_neighbours(data: &SampleMatrix, i: usize, d: usize, k: usize) -> Vec<usize> {
    let reference = data.row(i);
    let mut distances: Vec<(usize, f64)> = data
        .rows()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(j, row)| {
            let squared: f64 = row
                .iter()
                .zip(reference)
                .enumerate()
                .filter(|&(dim, _)| dim != d)
                .map(|(_, (a, b))| (a - b) * (a - b))
                .sum();
            (j, squared.sqrt())
        })
        .collect();

    // sort_by is stable
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.into_iter().take(k).map(|(j, _)| j).collect()
}

/// Gaussian kernel exponent for neighbours spread up to `max_distance`
/// from the reference value.
fn kernel_exponent(max_distance: f64) -> f64 {
    let ln = FARTHEST_WEIGHT.ln();
    if max_distance < MIN_SPREAD {
        ln
    } else {
        ln / (max_distance * max_distance)
    }
}

/// Slope of the weighted least-squares line through `points` (x, y),
/// weighting each point by its distance to `x0`.
fn weighted_slope(x0: f64, points: &[(f64, f64)]) -> f64 {
    let max_distance = points
        .iter()
        .map(|&(x, _)| (x - x0).abs())
        .fold(0.0, f64::max);
    let sigma = kernel_exponent(max_distance);

    let (mut sx, mut sy, mut sxx, mut sxy, mut n) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        let w = (sigma * (x - x0) * (x - x0)).exp();
        sx += w * x;
        sy += w * y;
        sxx += w * x * x;
        sxy += w * x * y;
        n += w;
    }

    let div = n * sxx - sx * sx;
    if div != 0.0 {
        (sxy * n - sx * sy) / div
    } else {
        0.0
    }
}

/// -1, 0 or 1; NaN maps to 0.
fn sign(b: f64) -> i8 {
    if b > 0.0 {
        1
    } else if b < 0.0 {
        -1
    } else {
        0
    }
}
