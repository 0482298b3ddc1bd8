//! Cluster position calculators.
//!
//! [`PositionCalculator`] is the seam every position algorithm plugs into;
//! [`Cluster3DPcaCalculator`] derives position and shower axis from an
//! energy-weighted principal component analysis of the cluster's hits.

use crate::accumulator::{PrincipalAxes, WeightedPointAccumulator};
use crate::config::{PcaCalculatorConfig, SampleProjection};
use log::debug;
use nalgebra::Point3;
use pfc_core::{Cluster, ClusterError, Layer, Result};

/// Writes position-like outputs onto clusters.
///
/// Implementations may hold per-cluster scratch state. [`reset`](Self::reset)
/// must leave no trace of the previous cluster, and [`compute`](Self::compute)
/// assumes it was called.
pub trait PositionCalculator {
    /// Short algorithm name, used in logs.
    fn name(&self) -> &str;

    /// Discard per-cluster scratch state.
    fn reset(&mut self);

    /// Compute and set outputs for one cluster from a freshly reset state.
    fn compute(&mut self, cluster: &mut Cluster) -> Result<()>;

    fn calculate_and_set_position(&mut self, cluster: &mut Cluster) -> Result<()> {
        self.reset();
        self.compute(cluster)
    }

    /// Process clusters in order, stopping at the first failure.
    fn calculate_and_set_positions(&mut self, clusters: &mut [Cluster]) -> Result<()> {
        for cluster in clusters.iter_mut() {
            self.calculate_and_set_position(cluster)?;
        }
        Ok(())
    }
}

/// Energy-weighted 3D PCA position calculator.
///
/// Each hit fraction of energy `E` is fed to the accumulator
/// `floor(E / log_weight_denominator)` times. The cluster position is the mean of
/// the resulting cloud and the axis is its dominant eigenvector, signed so that it
/// points into the same z hemisphere as the position.
///
/// Outputs: energy, layer (of the most energetic fraction), position, axis and
/// the derived position-rep. Time is left as set upstream.
///
/// Owns its accumulator; clone one calculator per worker for parallel use.
#[derive(Debug, Clone)]
pub struct Cluster3DPcaCalculator {
    config: PcaCalculatorConfig,
    pca: WeightedPointAccumulator,
}

impl Cluster3DPcaCalculator {
    /// # Errors
    /// Returns [`ClusterError::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: PcaCalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pca: WeightedPointAccumulator::new(),
        })
    }

    pub fn config(&self) -> &PcaCalculatorConfig {
        &self.config
    }

    /// Number of unit samples a contribution of `energy` is worth.
    ///
    /// A whole number carried as `f64`. Infinite when the ratio overflows.
    pub fn replicas(&self, energy: f64) -> f64 {
        let ratio = energy / self.config.log_weight_denominator;
        if ratio >= 1.0 {
            ratio.floor()
        } else {
            0.0
        }
    }

    fn sample_point(&self, position: &Point3<f64>) -> Point3<f64> {
        match self.config.sample_projection {
            SampleProjection::Xyz => *position,
            SampleProjection::XOnly => Point3::new(position.x, position.x, position.x),
        }
    }
}

/// Flip `axes.axis` into the z hemisphere of `axes.mean`.
fn signed_axis(axes: &PrincipalAxes) -> nalgebra::Vector3<f64> {
    if axes.axis.z * axes.mean.z < 0.0 {
        -axes.axis
    } else {
        axes.axis
    }
}

impl PositionCalculator for Cluster3DPcaCalculator {
    fn name(&self) -> &str {
        "Cluster3DPCACalculator"
    }

    fn reset(&mut self) {
        self.pca.clear();
    }

    fn compute(&mut self, cluster: &mut Cluster) -> Result<()> {
        let seed = match cluster.seed() {
            Some(seed) if cluster.seed_fraction().is_some() => seed,
            seed => {
                return Err(ClusterError::MissingSeed {
                    seed,
                    n_fractions: cluster.fractions().len(),
                })
            }
        };

        let mut cl_energy = 0.0;
        let mut max_e = 0.0;
        let mut max_e_layer = Layer::None;

        for rhf in cluster.fractions() {
            let hit = rhf.hit();
            let rh_energy = rhf.energy();
            if !rh_energy.is_finite() {
                return Err(ClusterError::CorruptInput {
                    det_id: hit.det_id,
                    energy: rh_energy,
                });
            }
            let k = self.replicas(rh_energy);
            if !(self.pca.sample_count() + k).is_finite() {
                return Err(ClusterError::WeightOverflow {
                    det_id: hit.det_id,
                    energy: rh_energy,
                });
            }
            cl_energy += rh_energy;

            let point = self.sample_point(&hit.position);
            self.pca.add_samples(point, k);

            if rh_energy > max_e {
                max_e = rh_energy;
                max_e_layer = hit.layer;
            }
        }

        cluster.set_energy(cl_energy);
        cluster.set_layer(max_e_layer);

        let axes = self.pca.finalize().ok_or(ClusterError::NoSamples {
            seed,
            energy: cl_energy,
        })?;

        debug!(
            "shower average (x,y,z) = ({:.4}, {:.4}, {:.4}) from {:e} samples",
            axes.mean.x, axes.mean.y, axes.mean.z, axes.sample_count
        );
        debug!(
            "shower main axis (x,y,z) = ({:.4}, {:.4}, {:.4})",
            axes.axis.x, axes.axis.y, axes.axis.z
        );

        cluster.set_position(axes.mean);
        cluster.set_axis(signed_axis(&axes));
        cluster.calculate_position_rep();
        Ok(())
    }
}
