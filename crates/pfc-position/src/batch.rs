//! Batch driver applying a position calculator to a cluster collection.

use crate::calculator::PositionCalculator;
use log::{error, info};
use pfc_core::{Cluster, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// Summary of a completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchReport {
    /// Number of clusters processed
    pub clusters: usize,
    /// Sum of cluster energies (GeV)
    pub total_energy: f64,
    /// Wall time (milliseconds)
    pub elapsed_ms: f64,
}

impl BatchReport {
    fn collect(clusters: &[Cluster], start: Instant) -> Self {
        Self {
            clusters: clusters.len(),
            total_energy: clusters.iter().map(Cluster::energy).sum(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

/// Runs a [`PositionCalculator`] over every cluster of a collection.
///
/// The calculator is reset immediately before each cluster. The first failing
/// cluster halts the batch and its error is returned; clusters before it keep
/// their outputs, clusters after it are untouched.
pub struct BatchProcessor<C> {
    calculator: C,
}

impl<C: PositionCalculator> BatchProcessor<C> {
    pub fn new(calculator: C) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn into_inner(self) -> C {
        self.calculator
    }

    /// Process clusters sequentially in collection order.
    pub fn run(&mut self, clusters: &mut [Cluster]) -> Result<BatchReport> {
        let start = Instant::now();

        for (index, cluster) in clusters.iter_mut().enumerate() {
            self.calculator.reset();
            if let Err(err) = self.calculator.compute(cluster) {
                error!(
                    "{}: cluster {} ({}) rejected, halting batch: {}",
                    self.calculator.name(),
                    index,
                    cluster,
                    err
                );
                return Err(err);
            }
        }

        let report = BatchReport::collect(clusters, start);
        info!(
            "{}: {} clusters, total energy {:.3} GeV in {:.2} ms",
            self.calculator.name(),
            report.clusters,
            report.total_energy,
            report.elapsed_ms
        );
        Ok(report)
    }
}

impl<C: PositionCalculator + Clone + Send + Sync> BatchProcessor<C> {
    /// Process clusters on the rayon pool, one calculator clone per worker.
    ///
    /// Per-cluster results are identical to [`run`](Self::run). On failure the
    /// batch stops scheduling new clusters, but clusters already finished by
    /// other workers keep their outputs regardless of their position.
    pub fn run_parallel(&self, clusters: &mut [Cluster]) -> Result<BatchReport> {
        let start = Instant::now();
        let name = self.calculator.name();

        clusters.par_iter_mut().enumerate().try_for_each_init(
            || self.calculator.clone(),
            |calculator, (index, cluster)| {
                calculator.reset();
                calculator.compute(cluster).map_err(|err| {
                    error!(
                        "{}: cluster {} ({}) rejected, halting batch: {}",
                        name, index, cluster, err
                    );
                    err
                })
            },
        )?;

        let report = BatchReport::collect(clusters, start);
        info!(
            "{}: {} clusters (parallel), total energy {:.3} GeV in {:.2} ms",
            name, report.clusters, report.total_energy, report.elapsed_ms
        );
        Ok(report)
    }
}
