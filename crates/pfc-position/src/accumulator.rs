//! Weighted point accumulator for shower PCA.
//!
//! A weighted point cloud is represented as repeated unit samples: a point added
//! `k` times counts `k` times in the mean and covariance. Repeats are stored as
//! `(point, multiplicity)` pairs, which gives the same moments as literal
//! repetition without materializing every copy. Multiplicities are whole numbers
//! carried as `f64`, so replication counts far beyond `usize::MAX` neither
//! truncate nor wrap.
//!
//! Moments are computed around the first sample so that a cloud made of a single
//! repeated point returns that point exactly.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use std::cmp::Ordering;

/// Mean and principal axes of an accumulated point cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxes {
    /// Arithmetic mean of all samples
    pub mean: Point3<f64>,
    /// Unit eigenvector of the largest covariance eigenvalue. Sign is arbitrary
    pub axis: Vector3<f64>,
    /// Covariance eigenvalues in descending order
    pub eigenvalues: [f64; 3],
    /// Number of unit samples
    pub sample_count: f64,
}

/// Collects replicated 3D samples and exposes their first two moments.
///
/// One accumulator serves one cluster at a time; call [`clear`](Self::clear)
/// before reuse. Not shared between threads: parallel workers own one each.
#[derive(Debug, Clone, Default)]
pub struct WeightedPointAccumulator {
    samples: Vec<(Point3<f64>, f64)>,
    count: f64,
}

impl WeightedPointAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            count: 0.0,
        }
    }

    /// Discard every sample. Keeps the allocation.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.count = 0.0;
    }

    /// Append one occurrence of `point`.
    pub fn add_sample(&mut self, point: Point3<f64>) {
        self.add_samples(point, 1.0);
    }

    /// Append `multiplicity` occurrences of `point`.
    ///
    /// Zero, negative and NaN multiplicities add nothing.
    pub fn add_samples(&mut self, point: Point3<f64>, multiplicity: f64) {
        if multiplicity.is_nan() || multiplicity <= 0.0 {
            return;
        }
        self.samples.push((point, multiplicity));
        self.count += multiplicity;
    }

    /// Total number of unit samples.
    pub fn sample_count(&self) -> f64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean and dominant covariance eigenvector of the accumulated cloud.
    ///
    /// Returns `None` when no sample has been added or the total multiplicity is
    /// not finite. The decomposition is deterministic for a fixed insertion
    /// order; eigenvalue ties resolve to the lowest eigenvector index.
    pub fn finalize(&self) -> Option<PrincipalAxes> {
        let (origin, _) = *self.samples.first()?;
        let n = self.count;
        if !n.is_finite() {
            return None;
        }

        // Weights enter as k / n, never above 1.
        let mut shift = Vector3::<f64>::zeros();
        for (point, k) in &self.samples {
            shift += (*point - origin) * (*k / n);
        }
        let mean = origin + shift;

        let mut cov = Matrix3::<f64>::zeros();
        for (point, k) in &self.samples {
            let d = *point - mean;
            cov += (d * d.transpose()) * (*k / n);
        }

        let eigen = SymmetricEigen::new(cov);

        // Stable sort: equal eigenvalues keep their index order.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });

        let mut axis: Vector3<f64> = eigen.eigenvectors.column(order[0]).into_owned();
        let norm = axis.norm();
        if norm > 0.0 {
            axis /= norm;
        }

        Some(PrincipalAxes {
            mean,
            axis,
            eigenvalues: [
                eigen.eigenvalues[order[0]],
                eigen.eigenvalues[order[1]],
                eigen.eigenvalues[order[2]],
            ],
            sample_count: n,
        })
    }
}
